//! Child-call menu content for a frame.
//!
//! Presentation stays out of scope; this module only assembles what a menu
//! would show — resolved method names, repeat counts, per-item enablement —
//! from a [`direct_children`](tracetrail::direct_children) scan.

use crate::error::Result;
use tracetrail::{QueryError, RecordStore, ScanConfig, direct_children};

/// One menu entry: an aggregated run of calls to the same method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildItem {
    /// Resolved name of the called method.
    pub method_name: String,
    /// Index of the run's first entry record — the navigation target.
    pub record: usize,
    /// How many consecutive calls the entry aggregates.
    pub count: usize,
    /// Mirrors the representative record's visibility.
    pub enabled: bool,
}

/// The trailing "last message from the method" entry: the record at the
/// frame's exit boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastActivity {
    pub record: usize,
    pub enabled: bool,
}

/// Everything a child-call menu for one frame shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChildMenu {
    pub items: Vec<ChildItem>,
    pub last_activity: Option<LastActivity>,
}

/// Assembles the child-call menu content for `parent`.
///
/// Fails like [`direct_children`] does when `parent` is not an entry record.
/// An empty `items` list is the "(no calls)" case and is left to the
/// renderer to phrase.
pub fn child_menu<S: RecordStore>(
    store: &S,
    parent: usize,
    config: &ScanConfig,
) -> Result<ChildMenu> {
    let scan = direct_children(store, parent, config)?;

    let mut items = Vec::with_capacity(scan.children.len());
    for child in &scan.children {
        let name = store
            .method_name(child.method)
            .ok_or(QueryError::UnknownMethod(child.method))?;
        let rec = store
            .record(child.representative)
            .ok_or(QueryError::UnknownRecord(child.representative))?;
        items.push(ChildItem {
            method_name: name.to_string(),
            record: child.representative,
            count: child.count,
            enabled: rec.visible,
        });
    }

    let last_activity = match scan.last_activity {
        Some(index) => {
            let rec = store
                .record(index)
                .ok_or(QueryError::UnknownRecord(index))?;
            Some(LastActivity {
                record: index,
                enabled: rec.visible,
            })
        }
        None => None,
    };

    Ok(ChildMenu {
        items,
        last_activity,
    })
}
