#![doc = include_str!("../README.md")]

#[cfg(feature = "scheduler")]
pub mod bar;
pub mod error;
pub mod menu;
pub mod sink;
pub mod trail;

#[cfg(feature = "scheduler")]
pub use bar::{CrumbBar, CrumbBarConfig, DEFAULT_REBUILD_DELAY, RebuildComplete, RebuildState};
pub use error::{NavError, Result};
pub use menu::{ChildItem, ChildMenu, LastActivity, child_menu};
pub use sink::NavigationSink;
pub use trail::{BreadcrumbNode, NodeKind, Selection, build_trail};
