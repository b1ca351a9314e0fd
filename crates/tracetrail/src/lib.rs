#![doc = include_str!("../README.md")]

pub mod error;
pub mod query;
pub mod store;
pub mod types;

pub use error::{QueryError, Result};
pub use query::{ChildCall, ChildScan, DEFAULT_MAX_CHILDREN, ScanConfig, call_stack, direct_children};
pub use store::{RecordStore, TraceLog};
pub use types::{MethodId, Record, ThreadId};
