//! Pure breadcrumb-trail assembly from a selection and a record store.

use serde::{Deserialize, Serialize};
use tracetrail::{RecordStore, query};

/// The record the user is on, together with the display row it was selected
/// through. A record can be mapped to several rows; the row disambiguates
/// which one the trail's terminal line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub record: usize,
    pub row: usize,
}

impl Selection {
    pub fn new(record: usize, row: usize) -> Self {
        Self { record, row }
    }
}

/// What a breadcrumb node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A call frame on the chain: rendered as the method name.
    Frame,
    /// The arrow after a frame; activating it opens the frame's child-call
    /// menu. Follows every frame, the deepest included.
    Separator,
    /// The selected non-entry record, rendered as its line number.
    Line { row: usize },
}

/// One element of the breadcrumb trail.
///
/// `enabled` mirrors the referenced record's visibility under the current
/// filter, except that the `current` node is always disabled — it is the
/// highlighted "you are here" marker. Separators are always enabled and
/// never current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbNode {
    pub kind: NodeKind,
    /// Index of the record the node references.
    pub record: usize,
    pub enabled: bool,
    pub current: bool,
}

/// Builds the breadcrumb trail for a selection.
///
/// The trail is the call chain leading to the selected record, root frame
/// first, each frame followed by a separator. When the selected record is
/// not itself a method entry, a terminal line node for it closes the trail.
/// Exactly one node carries the `current` marker: the frame matching the
/// selection when the selected record is an entry, the terminal line node
/// otherwise. `None` builds an empty trail.
///
/// Pure: the trail is a function of the selection and store state at call
/// time.
///
/// # Example
///
/// ```
/// use tracetrail::{Record, ThreadId, TraceLog};
/// use tracetrail_nav::{NodeKind, Selection, build_trail};
///
/// let mut log = TraceLog::new();
/// let main = log.intern_method("Main");
/// let load = log.intern_method("Load");
/// let root = log.push(Record::entry(ThreadId(1), 0, main));
/// let call = log.push(Record::entry(ThreadId(1), 1, load).with_caller(root));
/// let trace = log.push(Record::line(ThreadId(1), 2, load).with_caller(call));
///
/// let nodes = build_trail(&log, Some(Selection::new(trace, 2))).unwrap();
/// // Main → Load → Line 2, with arrows after each frame.
/// assert_eq!(nodes.len(), 5);
/// assert_eq!(nodes[4].kind, NodeKind::Line { row: 2 });
/// assert!(nodes[4].current);
/// ```
pub fn build_trail<S: RecordStore>(
    store: &S,
    selection: Option<Selection>,
) -> tracetrail::Result<Vec<BreadcrumbNode>> {
    let Some(selection) = selection else {
        return Ok(Vec::new());
    };
    let origin = store
        .record(selection.record)
        .ok_or(tracetrail::QueryError::UnknownRecord(selection.record))?;
    let origin_is_entry = origin.is_entry;
    let stack = query::call_stack(store, Some(selection.record))?;

    let mut nodes = Vec::with_capacity(stack.len() * 2 + 1);
    for rec in &stack {
        let current = origin_is_entry && rec.index == selection.record;
        nodes.push(BreadcrumbNode {
            kind: NodeKind::Frame,
            record: rec.index,
            enabled: rec.visible && !current,
            current,
        });
        nodes.push(BreadcrumbNode {
            kind: NodeKind::Separator,
            record: rec.index,
            enabled: true,
            current: false,
        });
    }

    if !origin_is_entry {
        nodes.push(BreadcrumbNode {
            kind: NodeKind::Line { row: selection.row },
            record: selection.record,
            enabled: false,
            current: true,
        });
    }

    Ok(nodes)
}
