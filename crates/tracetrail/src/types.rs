use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the logical thread that produced a record.
///
/// Threads in a trace are opaque labels; two records belong to the same
/// thread stream iff their `ThreadId`s are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThreadId(pub u32);

/// Interned method identity.
///
/// Method names repeat across many records, so records carry an interned id
/// rather than a string. *Identity* comparison of ids — never string
/// comparison — decides whether two records name the same method. Ids are
/// handed out by the store's interner (see
/// [`TraceLog::intern_method`](crate::TraceLog::intern_method)) and resolved
/// back to names through [`RecordStore::method_name`](crate::RecordStore::method_name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodId(pub u32);

/// A single trace event.
///
/// Records are created once during ingestion and never deleted while a
/// session is open. Every field except [`visible`](Record::visible) and
/// [`row_indices`](Record::row_indices) is immutable after creation;
/// `visible` is toggled by an external filter facility and `row_indices` is
/// remapped whenever the filtered row view is rematerialized.
///
/// The [`caller`](Record::caller) link is a weak reference *by index* to the
/// nearest enclosing entry record on the same thread — never an owning
/// pointer, since many records share one ancestor.
///
/// # Example
///
/// ```
/// use tracetrail::{Record, RecordStore, ThreadId, TraceLog};
///
/// let mut log = TraceLog::new();
/// let main = log.intern_method("Main");
/// let load = log.intern_method("Load");
///
/// let root = log.push(Record::entry(ThreadId(1), 0, main));
/// let child = log.push(Record::entry(ThreadId(1), 1, load).with_caller(root));
///
/// assert_eq!(log.record(child).unwrap().caller, Some(root));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Position in the global record sequence. Stable, unique, and assigned
    /// by the store on append.
    pub index: usize,
    /// Logical thread that produced the record.
    pub thread: ThreadId,
    /// Call depth on the record's thread at the time of the event.
    pub stack_depth: u32,
    /// True when the record marks entering a method.
    pub is_entry: bool,
    /// Interned identity of the method this record belongs to.
    pub method: MethodId,
    /// Index of the nearest enclosing entry record on the same thread, or
    /// `None` for root-level (depth 0) records. Set once, never mutated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<usize>,
    /// Whether the record passes the external filter. The only field that
    /// mutates after creation.
    pub visible: bool,
    /// Display-row positions currently mapped to this record, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row_indices: Vec<usize>,
    /// Wall-clock time of the event, when the source recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Record {
    /// A method-entry record at the given thread and depth.
    ///
    /// The index is a placeholder until the record is pushed into a store.
    pub fn entry(thread: ThreadId, stack_depth: u32, method: MethodId) -> Self {
        Self {
            index: 0,
            thread,
            stack_depth,
            is_entry: true,
            method,
            caller: None,
            visible: true,
            row_indices: Vec::new(),
            timestamp: None,
        }
    }

    /// A non-entry record (a trace line or a method-exit line) at the given
    /// thread and depth.
    pub fn line(thread: ThreadId, stack_depth: u32, method: MethodId) -> Self {
        Self {
            is_entry: false,
            ..Self::entry(thread, stack_depth, method)
        }
    }

    /// Sets the caller link.
    pub fn with_caller(mut self, caller: usize) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Sets the initial visibility. Records default to visible.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Appends a display-row mapping.
    pub fn with_row(mut self, row: usize) -> Self {
        self.row_indices.push(row);
        self
    }

    /// Sets the event timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
