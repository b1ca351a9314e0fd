//! Call-hierarchy queries over a record store.
//!
//! Both operations are pure reads: [`call_stack`] walks the immutable caller
//! links from a record back to its thread's root frame, and
//! [`direct_children`] scans forward through a frame's thread stream to
//! enumerate the calls it made and find where it returned.

use crate::error::{QueryError, Result};
use crate::store::RecordStore;
use crate::types::{MethodId, Record};

/// Default cap on aggregated child items, inherited from the menu the scan
/// feeds. Presentation scaling, not a correctness rule.
pub const DEFAULT_MAX_CHILDREN: usize = 30;

/// Tuning for [`direct_children`].
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum number of aggregated child items to produce. The scan itself
    /// always runs to the frame's exit boundary regardless.
    pub max_items: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_CHILDREN,
        }
    }
}

/// One aggregated child call: a run of consecutive calls to the same method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildCall {
    /// Interned identity of the called method.
    pub method: MethodId,
    /// Index of the first entry record of the run.
    pub representative: usize,
    /// How many consecutive calls the run aggregates.
    pub count: usize,
}

/// Result of scanning a frame for its direct children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChildScan {
    /// Aggregated child calls, in stream order.
    pub children: Vec<ChildCall>,
    /// Index of the record marking the frame's exit boundary — the first
    /// same-thread record at or above the frame's own depth. `None` when the
    /// stream ended while still inside the frame.
    pub last_activity: Option<usize>,
}

/// Returns the call chain leading to `origin`, root frame first.
///
/// The origin itself is the deepest element when it is an entry record;
/// otherwise the chain holds only its ancestors. Every returned record is an
/// entry record. `None` and records with no caller that are not entries both
/// yield an empty chain.
///
/// The walk is bounded by the store's maximum observed stack depth: a longer
/// chain means the caller links are cyclic or corrupt and the walk fails with
/// [`QueryError::AncestryCycle`] instead of looping.
///
/// # Example
///
/// ```
/// use tracetrail::query::call_stack;
/// use tracetrail::{Record, ThreadId, TraceLog};
///
/// let mut log = TraceLog::new();
/// let main = log.intern_method("Main");
/// let load = log.intern_method("Load");
/// let root = log.push(Record::entry(ThreadId(1), 0, main));
/// let child = log.push(Record::entry(ThreadId(1), 1, load).with_caller(root));
/// let leaf = log.push(Record::line(ThreadId(1), 2, load).with_caller(child));
///
/// let stack = call_stack(&log, Some(leaf)).unwrap();
/// let indices: Vec<usize> = stack.iter().map(|rec| rec.index).collect();
/// assert_eq!(indices, vec![root, child]);
/// ```
pub fn call_stack<S: RecordStore>(store: &S, origin: Option<usize>) -> Result<Vec<&Record>> {
    let Some(origin_index) = origin else {
        return Ok(Vec::new());
    };
    let origin_rec = store
        .record(origin_index)
        .ok_or(QueryError::UnknownRecord(origin_index))?;

    let mut chain = Vec::new();
    if origin_rec.is_entry {
        chain.push(origin_rec);
    }

    // A well-formed chain has at most max_stack_depth ancestors above any
    // record; one more hop than that means a cycle.
    let limit = store.max_stack_depth() as usize + 1;
    let mut hops = 0;
    let mut holder = origin_rec;
    while let Some(caller_index) = holder.caller {
        hops += 1;
        if hops > limit {
            return Err(QueryError::AncestryCycle {
                origin: origin_index,
                limit,
            });
        }
        let caller = store
            .record(caller_index)
            .ok_or(QueryError::DanglingCaller {
                record: holder.index,
                caller: caller_index,
            })?;
        chain.push(caller);
        holder = caller;
    }

    chain.reverse();
    Ok(chain)
}

/// Scans `parent`'s thread stream and aggregates the direct child calls the
/// frame made, locating its exit boundary on the way.
///
/// A record is direct-child activity of `parent` when it sits on the same
/// thread after `parent`, is deeper than `parent`, and names `parent` as its
/// caller. Entry records among those become child items; runs of consecutive
/// calls to the same method collapse into one item with a count. The frame's
/// own trace lines and its children's deeper activity pass through without
/// closing a run.
///
/// The scan stops at the first same-thread record at or above `parent`'s
/// depth — control returned to the parent's level — and reports that record's
/// index as the last activity. Running out of records first is the normal
/// "thread ended inside the frame" case and reports no last activity.
///
/// Fails with [`QueryError::NotAnEntry`] when `parent` is not an entry
/// record; direct children are only defined for frames.
///
/// # Example
///
/// ```
/// use tracetrail::query::{direct_children, ScanConfig};
/// use tracetrail::{Record, ThreadId, TraceLog};
///
/// let mut log = TraceLog::new();
/// let main = log.intern_method("Main");
/// let load = log.intern_method("Load");
/// let parent = log.push(Record::entry(ThreadId(1), 0, main));
/// log.push(Record::entry(ThreadId(1), 1, load).with_caller(parent));
/// log.push(Record::entry(ThreadId(1), 1, load).with_caller(parent));
/// let exit = log.push(Record::line(ThreadId(1), 0, main));
///
/// let scan = direct_children(&log, parent, &ScanConfig::default()).unwrap();
/// assert_eq!(scan.children.len(), 1);
/// assert_eq!(scan.children[0].count, 2);
/// assert_eq!(scan.last_activity, Some(exit));
/// ```
pub fn direct_children<S: RecordStore>(
    store: &S,
    parent: usize,
    config: &ScanConfig,
) -> Result<ChildScan> {
    let parent_rec = store
        .record(parent)
        .ok_or(QueryError::UnknownRecord(parent))?;
    if !parent_rec.is_entry {
        return Err(QueryError::NotAnEntry(parent));
    }

    let mut children: Vec<ChildCall> = Vec::new();
    let mut run: Option<ChildCall> = None;
    let mut last_activity = None;

    for rec in store.records_on_thread(parent_rec.thread, parent_rec.index) {
        if rec.stack_depth <= parent_rec.stack_depth {
            // Control returned to the parent's level: the exit boundary.
            last_activity = Some(rec.index);
            break;
        }
        if rec.caller != Some(parent_rec.index) || !rec.is_entry {
            continue;
        }
        match &mut run {
            Some(open) if open.method == rec.method => open.count += 1,
            _ => {
                if let Some(done) = run.take() {
                    children.push(done);
                }
                // The cap bounds item creation only; the scan continues so
                // the boundary above is still found.
                if children.len() < config.max_items {
                    run = Some(ChildCall {
                        method: rec.method,
                        representative: rec.index,
                        count: 1,
                    });
                }
            }
        }
    }

    if let Some(done) = run {
        children.push(done);
    }

    Ok(ChildScan {
        children,
        last_activity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TraceLog;
    use crate::types::ThreadId;

    fn entry(log: &mut TraceLog, thread: u32, depth: u32, name: &str, caller: Option<usize>) -> usize {
        let method = log.intern_method(name);
        let mut rec = Record::entry(ThreadId(thread), depth, method);
        if let Some(caller) = caller {
            rec = rec.with_caller(caller);
        }
        log.push(rec)
    }

    fn line(log: &mut TraceLog, thread: u32, depth: u32, name: &str, caller: Option<usize>) -> usize {
        let method = log.intern_method(name);
        let mut rec = Record::line(ThreadId(thread), depth, method);
        if let Some(caller) = caller {
            rec = rec.with_caller(caller);
        }
        log.push(rec)
    }

    fn names(log: &TraceLog, scan: &ChildScan) -> Vec<(String, usize)> {
        scan.children
            .iter()
            .map(|child| {
                let rec = log.record(child.representative).unwrap();
                (log.method_name(rec.method).unwrap().to_string(), child.count)
            })
            .collect()
    }

    // ── call_stack ─────────────────────────────────────────────────────

    #[test]
    fn call_stack_of_none_is_empty() {
        let log = TraceLog::new();
        assert!(call_stack(&log, None).unwrap().is_empty());
    }

    #[test]
    fn call_stack_includes_entry_origin_as_deepest() {
        let mut log = TraceLog::new();
        let root = entry(&mut log, 1, 0, "Main", None);
        let mid = entry(&mut log, 1, 1, "Load", Some(root));
        let leaf = entry(&mut log, 1, 2, "Parse", Some(mid));

        let stack = call_stack(&log, Some(leaf)).unwrap();
        let indices: Vec<usize> = stack.iter().map(|rec| rec.index).collect();
        assert_eq!(indices, vec![root, mid, leaf]);
    }

    #[test]
    fn call_stack_excludes_non_entry_origin() {
        let mut log = TraceLog::new();
        let root = entry(&mut log, 1, 0, "Main", None);
        let mid = entry(&mut log, 1, 1, "Load", Some(root));
        let leaf = line(&mut log, 1, 2, "Load", Some(mid));

        let stack = call_stack(&log, Some(leaf)).unwrap();
        let indices: Vec<usize> = stack.iter().map(|rec| rec.index).collect();
        assert_eq!(indices, vec![root, mid]);
    }

    #[test]
    fn call_stack_depths_increase_by_one() {
        let mut log = TraceLog::new();
        let a = entry(&mut log, 1, 0, "A", None);
        let b = entry(&mut log, 1, 1, "B", Some(a));
        let c = entry(&mut log, 1, 2, "C", Some(b));
        let d = line(&mut log, 1, 3, "C", Some(c));

        let stack = call_stack(&log, Some(d)).unwrap();
        for pair in stack.windows(2) {
            assert_eq!(pair[1].stack_depth, pair[0].stack_depth + 1);
        }
        assert!(stack.iter().all(|rec| rec.is_entry));
    }

    #[test]
    fn call_stack_of_rootless_line_is_empty() {
        let mut log = TraceLog::new();
        let lone = line(&mut log, 1, 0, "Main", None);
        assert!(call_stack(&log, Some(lone)).unwrap().is_empty());
    }

    #[test]
    fn call_stack_of_root_entry_is_itself() {
        let mut log = TraceLog::new();
        let root = entry(&mut log, 1, 0, "Main", None);
        let stack = call_stack(&log, Some(root)).unwrap();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack[0].index, root);
    }

    #[test]
    fn call_stack_unknown_origin_fails() {
        let log = TraceLog::new();
        assert_eq!(
            call_stack(&log, Some(9)).unwrap_err(),
            QueryError::UnknownRecord(9)
        );
    }

    #[test]
    fn call_stack_dangling_caller_fails() {
        let mut log = TraceLog::new();
        let root = entry(&mut log, 1, 0, "Main", None);
        let bad = entry(&mut log, 1, 1, "Load", Some(77));

        let err = call_stack(&log, Some(bad)).unwrap_err();
        assert_eq!(
            err,
            QueryError::DanglingCaller {
                record: bad,
                caller: 77
            }
        );
        // The clean chain is unaffected.
        assert_eq!(call_stack(&log, Some(root)).unwrap().len(), 1);
    }

    #[test]
    fn call_stack_terminates_on_caller_cycle() {
        let mut log = TraceLog::new();
        let a = entry(&mut log, 1, 1, "A", None);
        let b = entry(&mut log, 1, 2, "B", Some(a));
        // Corrupt the store: a and b point at each other.
        log.records[a].caller = Some(b);

        match call_stack(&log, Some(b)).unwrap_err() {
            QueryError::AncestryCycle { origin, .. } => assert_eq!(origin, b),
            other => panic!("expected AncestryCycle, got {other:?}"),
        }
    }

    // ── direct_children ────────────────────────────────────────────────

    #[test]
    fn children_require_an_entry_parent() {
        let mut log = TraceLog::new();
        let rec = line(&mut log, 1, 0, "Main", None);
        assert_eq!(
            direct_children(&log, rec, &ScanConfig::default()).unwrap_err(),
            QueryError::NotAnEntry(rec)
        );
        assert_eq!(
            direct_children(&log, 42, &ScanConfig::default()).unwrap_err(),
            QueryError::UnknownRecord(42)
        );
    }

    #[test]
    fn consecutive_same_method_calls_aggregate() {
        let mut log = TraceLog::new();
        let parent = entry(&mut log, 1, 0, "Main", None);
        entry(&mut log, 1, 1, "A", Some(parent));
        entry(&mut log, 1, 1, "A", Some(parent));
        entry(&mut log, 1, 1, "A", Some(parent));
        entry(&mut log, 1, 1, "B", Some(parent));

        let scan = direct_children(&log, parent, &ScanConfig::default()).unwrap();
        assert_eq!(
            names(&log, &scan),
            vec![("A".to_string(), 3), ("B".to_string(), 1)]
        );
        assert_eq!(scan.last_activity, None);
    }

    #[test]
    fn scan_stops_at_exit_boundary() {
        let mut log = TraceLog::new();
        let parent = entry(&mut log, 1, 1, "Load", None);
        let first = entry(&mut log, 1, 2, "Parse", Some(parent));
        entry(&mut log, 1, 2, "Parse", Some(parent));
        let boundary = line(&mut log, 1, 1, "Load", None);
        // Anything after the boundary is out of the frame.
        entry(&mut log, 1, 2, "Late", Some(parent));

        let scan = direct_children(&log, parent, &ScanConfig::default()).unwrap();
        assert_eq!(names(&log, &scan), vec![("Parse".to_string(), 2)]);
        assert_eq!(scan.children[0].representative, first);
        assert_eq!(scan.last_activity, Some(boundary));
    }

    #[test]
    fn stream_end_without_boundary_reports_no_last_activity() {
        let mut log = TraceLog::new();
        let parent = entry(&mut log, 1, 0, "Main", None);
        let only = entry(&mut log, 1, 1, "A", Some(parent));

        let scan = direct_children(&log, parent, &ScanConfig::default()).unwrap();
        assert_eq!(scan.children.len(), 1);
        assert_eq!(scan.children[0].representative, only);
        assert_eq!(scan.last_activity, None);
    }

    #[test]
    fn other_threads_do_not_contribute_or_bound() {
        let mut log = TraceLog::new();
        let parent = entry(&mut log, 1, 1, "Load", None);
        entry(&mut log, 1, 2, "Parse", Some(parent));
        // A depth-0 record on another thread must not read as the boundary.
        line(&mut log, 2, 0, "Other", None);
        entry(&mut log, 1, 2, "Parse", Some(parent));
        let boundary = line(&mut log, 1, 0, "Main", None);

        let scan = direct_children(&log, parent, &ScanConfig::default()).unwrap();
        assert_eq!(names(&log, &scan), vec![("Parse".to_string(), 2)]);
        assert_eq!(scan.last_activity, Some(boundary));
    }

    #[test]
    fn deeper_activity_does_not_close_a_run() {
        let mut log = TraceLog::new();
        let parent = entry(&mut log, 1, 0, "Main", None);
        let first_a = entry(&mut log, 1, 1, "A", Some(parent));
        // Inside the first A: a grandchild call and A's own exit line.
        entry(&mut log, 1, 2, "Deep", Some(first_a));
        line(&mut log, 1, 1, "A", Some(parent));
        entry(&mut log, 1, 1, "A", Some(parent));

        let scan = direct_children(&log, parent, &ScanConfig::default()).unwrap();
        assert_eq!(names(&log, &scan), vec![("A".to_string(), 2)]);
        assert_eq!(scan.children[0].representative, first_a);
    }

    #[test]
    fn every_child_names_the_parent_as_caller() {
        let mut log = TraceLog::new();
        let parent = entry(&mut log, 1, 0, "Main", None);
        let a = entry(&mut log, 1, 1, "A", Some(parent));
        // Grandchild: deeper, but called by A, not parent.
        entry(&mut log, 1, 2, "B", Some(a));
        entry(&mut log, 1, 1, "C", Some(parent));

        let scan = direct_children(&log, parent, &ScanConfig::default()).unwrap();
        for child in &scan.children {
            let rec = log.record(child.representative).unwrap();
            assert_eq!(rec.caller, Some(parent));
        }
        assert_eq!(
            names(&log, &scan),
            vec![("A".to_string(), 1), ("C".to_string(), 1)]
        );
    }

    #[test]
    fn item_cap_does_not_stop_boundary_detection() {
        let mut log = TraceLog::new();
        let parent = entry(&mut log, 1, 0, "Main", None);
        entry(&mut log, 1, 1, "A", Some(parent));
        entry(&mut log, 1, 1, "B", Some(parent));
        entry(&mut log, 1, 1, "C", Some(parent));
        entry(&mut log, 1, 1, "D", Some(parent));
        let boundary = line(&mut log, 1, 0, "Main", None);

        let config = ScanConfig { max_items: 2 };
        let scan = direct_children(&log, parent, &config).unwrap();
        assert_eq!(
            names(&log, &scan),
            vec![("A".to_string(), 1), ("B".to_string(), 1)]
        );
        assert_eq!(scan.last_activity, Some(boundary));
    }

    #[test]
    fn open_run_keeps_counting_at_the_cap() {
        let mut log = TraceLog::new();
        let parent = entry(&mut log, 1, 0, "Main", None);
        entry(&mut log, 1, 1, "A", Some(parent));
        entry(&mut log, 1, 1, "A", Some(parent));
        entry(&mut log, 1, 1, "B", Some(parent));
        entry(&mut log, 1, 1, "A", Some(parent));

        let config = ScanConfig { max_items: 1 };
        let scan = direct_children(&log, parent, &config).unwrap();
        // B and the second A run fall past the cap; the first run still
        // carries its full count.
        assert_eq!(names(&log, &scan), vec![("A".to_string(), 2)]);
    }

    #[test]
    fn visibility_does_not_affect_inclusion() {
        let mut log = TraceLog::new();
        let parent = entry(&mut log, 1, 0, "Main", None);
        let hidden = entry(&mut log, 1, 1, "A", Some(parent));
        log.set_visible(hidden, false).unwrap();

        let scan = direct_children(&log, parent, &ScanConfig::default()).unwrap();
        assert_eq!(scan.children.len(), 1);
        assert_eq!(scan.children[0].representative, hidden);
    }
}
