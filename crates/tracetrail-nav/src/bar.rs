//! The debounced breadcrumb model.
//!
//! [`CrumbBar`] owns the current trail and applies selection changes through
//! a quiescence window: each [`select`](CrumbBar::select) arms a single
//! cancellable delayed task, and arming a new one aborts the previous, so
//! rapid scrolling settles into exactly one rebuild for the last selection.
//! Navigating *via* the trail suppresses the rebuild entirely — the trail is
//! intentionally kept stable while the user browses through it.

use crate::error::{NavError, Result};
use crate::menu::{self, ChildMenu};
use crate::sink::NavigationSink;
use crate::trail::{self, BreadcrumbNode, NodeKind, Selection};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracetrail::{QueryError, RecordStore, ScanConfig};

/// Quiescence window between a selection change and the trail rebuild.
pub const DEFAULT_REBUILD_DELAY: Duration = Duration::from_millis(100);

/// Tuning for a [`CrumbBar`].
#[derive(Debug, Clone)]
pub struct CrumbBarConfig {
    /// How long a selection must stay unchanged before the trail rebuilds.
    pub rebuild_delay: Duration,
    /// Passed through to the child-call scan behind
    /// [`child_calls`](CrumbBar::child_calls).
    pub scan: ScanConfig,
}

impl Default for CrumbBarConfig {
    fn default() -> Self {
        Self {
            rebuild_delay: DEFAULT_REBUILD_DELAY,
            scan: ScanConfig::default(),
        }
    }
}

/// Published on the event channel after every rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildComplete {
    /// The selection the trail was rebuilt for.
    pub selection: Option<Selection>,
    /// The freshly built trail.
    pub nodes: Vec<BreadcrumbNode>,
}

/// Where the model sits in its rebuild cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildState {
    /// No rebuild pending.
    Idle,
    /// A selection is waiting out the quiescence window.
    Pending,
    /// Navigation via the trail is in progress; selections are ignored.
    Suppressed,
}

#[derive(Default)]
struct BarState {
    /// Latest selection request; what the next rebuild targets.
    current: Option<Selection>,
    /// The selection the trail in `nodes` was built for.
    built_for: Option<Selection>,
    nodes: Vec<BreadcrumbNode>,
    suppress: bool,
    pending: Option<JoinHandle<()>>,
}

/// Debounced breadcrumb model over a record store and a navigation sink.
///
/// All methods are synchronous; the delayed rebuild is the only scheduled
/// work, so the bar must live inside a tokio runtime — [`select`](CrumbBar::select)
/// arms the debounce task on the ambient runtime. The store sits behind an
/// `RwLock` so the external filter's visibility writes serialize with
/// rebuilds.
///
/// ```rust,no_run
/// use std::sync::{Arc, RwLock};
/// use tracetrail::TraceLog;
/// use tracetrail_nav::{CrumbBar, CrumbBarConfig, NavigationSink, Selection};
///
/// struct Shell;
/// impl NavigationSink for Shell {
///     fn select_row(&self, row: usize) -> anyhow::Result<()> {
///         println!("select row {row}");
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let store = Arc::new(RwLock::new(TraceLog::new()));
///     let (bar, mut rebuilt) = CrumbBar::new(store, Shell, CrumbBarConfig::default());
///
///     bar.select(Selection::new(0, 0));
///     let event = rebuilt.recv().await.unwrap();
///     println!("trail has {} nodes", event.nodes.len());
/// }
/// ```
pub struct CrumbBar<S, N> {
    store: Arc<RwLock<S>>,
    sink: N,
    state: Arc<Mutex<BarState>>,
    events: mpsc::UnboundedSender<RebuildComplete>,
    config: CrumbBarConfig,
}

impl<S, N> CrumbBar<S, N>
where
    S: RecordStore + Send + Sync + 'static,
    N: NavigationSink,
{
    /// Creates the bar and the receiving end of its rebuild-completion
    /// channel.
    pub fn new(
        store: Arc<RwLock<S>>,
        sink: N,
        config: CrumbBarConfig,
    ) -> (Self, mpsc::UnboundedReceiver<RebuildComplete>) {
        let (events, rebuilt) = mpsc::unbounded_channel();
        let bar = Self {
            store,
            sink,
            state: Arc::new(Mutex::new(BarState::default())),
            events,
            config,
        };
        (bar, rebuilt)
    }

    /// Requests a trail rebuild for `selection` after the quiescence window.
    ///
    /// A request arriving before a previous one's window elapsed replaces it
    /// outright (last request wins). Ignored while navigation via the trail
    /// is in progress.
    pub fn select(&self, selection: Selection) {
        let mut state = lock_state(&self.state);
        if state.suppress {
            return;
        }
        state.current = Some(selection);
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        let store = Arc::clone(&self.store);
        let shared = Arc::clone(&self.state);
        let events = self.events.clone();
        let delay = self.config.rebuild_delay;
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            run_rebuild(&store, &shared, &events);
        }));
    }

    /// Navigates to a trail node: a frame's entry row, or the selected line
    /// itself.
    ///
    /// The trail is kept stable while this runs — rebuild requests the sink
    /// triggers are swallowed, and any pending rebuild is cancelled. A node
    /// referencing the record the trail was built for navigates back to the
    /// trail's own row; any other node navigates to its record's first
    /// mapped row. On success the `current` highlight moves to the activated
    /// node and the previously current node is re-enabled.
    pub fn activate(&self, node_index: usize) -> Result<()> {
        let row = {
            let mut state = lock_state(&self.state);
            let node = state
                .nodes
                .get(node_index)
                .ok_or(NavError::UnknownNode(node_index))?;
            if matches!(node.kind, NodeKind::Separator) {
                return Err(NavError::NotNavigable(node_index));
            }
            let row = match state.built_for {
                Some(built) if built.record == node.record => built.row,
                _ => {
                    let record = node.record;
                    let store = read_store(&self.store);
                    let rec = store
                        .record(record)
                        .ok_or(QueryError::UnknownRecord(record))?;
                    *rec
                        .row_indices
                        .first()
                        .ok_or(NavError::UnmappedRecord(record))?
                }
            };
            if let Some(pending) = state.pending.take() {
                pending.abort();
            }
            state.suppress = true;
            row
        };

        // The sink applies the selection synchronously; selections it feeds
        // back to us are ignored until suppression lifts below.
        let outcome = self.sink.select_row(row).map_err(NavError::Navigation);

        let mut state = lock_state(&self.state);
        state.suppress = false;
        if outcome.is_ok() {
            let store = read_store(&self.store);
            for node in state.nodes.iter_mut() {
                if node.current && !matches!(node.kind, NodeKind::Separator) {
                    node.current = false;
                    node.enabled = store
                        .record(node.record)
                        .map(|rec| rec.visible)
                        .unwrap_or(false);
                }
            }
            drop(store);
            if let Some(node) = state.nodes.get_mut(node_index) {
                node.current = true;
                node.enabled = false;
            }
        }
        outcome
    }

    /// Assembles the child-call menu content for a frame record (the record
    /// a separator node references).
    pub fn child_calls(&self, record: usize) -> Result<ChildMenu> {
        let store = read_store(&self.store);
        menu::child_menu(&*store, record, &self.config.scan)
    }

    /// Navigates to a child-call menu choice.
    ///
    /// Unlike [`activate`](CrumbBar::activate) this is a real selection
    /// change — the trail rebuilds for it — so nothing is suppressed.
    pub fn activate_child(&self, record: usize) -> Result<()> {
        let row = {
            let store = read_store(&self.store);
            let rec = store
                .record(record)
                .ok_or(QueryError::UnknownRecord(record))?;
            *rec
                .row_indices
                .first()
                .ok_or(NavError::UnmappedRecord(record))?
        };
        self.sink.select_row(row).map_err(NavError::Navigation)
    }

    /// Drops the trail, the remembered selection, and any pending rebuild.
    pub fn clear(&self) {
        let mut state = lock_state(&self.state);
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        state.nodes.clear();
        state.built_for = None;
        state.current = None;
    }

    /// A snapshot of the current trail.
    pub fn nodes(&self) -> Vec<BreadcrumbNode> {
        lock_state(&self.state).nodes.clone()
    }

    /// The selection the current trail was built for.
    pub fn built_for(&self) -> Option<Selection> {
        lock_state(&self.state).built_for
    }

    /// Where the model sits in its rebuild cycle.
    pub fn state(&self) -> RebuildState {
        let state = lock_state(&self.state);
        if state.suppress {
            RebuildState::Suppressed
        } else if state.pending.is_some() {
            RebuildState::Pending
        } else {
            RebuildState::Idle
        }
    }
}

/// Rebuilds the trail for the latest selection and publishes the result.
fn run_rebuild<S: RecordStore>(
    store: &RwLock<S>,
    state: &Mutex<BarState>,
    events: &mpsc::UnboundedSender<RebuildComplete>,
) {
    let mut state = lock_state(state);
    state.pending = None;
    let selection = state.current;

    let guard = read_store(store);
    let built = trail::build_trail(&*guard, selection);
    drop(guard);

    let nodes = match built {
        Ok(nodes) => {
            state.built_for = selection;
            state.nodes = nodes.clone();
            nodes
        }
        Err(err) => {
            // Data-integrity problem in the store; show nothing rather than
            // a wrong trail.
            eprintln!("Warning: breadcrumb rebuild failed: {err}");
            state.built_for = None;
            state.nodes.clear();
            Vec::new()
        }
    };
    drop(state);

    let _ = events.send(RebuildComplete { selection, nodes });
}

fn lock_state(state: &Mutex<BarState>) -> MutexGuard<'_, BarState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_store<S>(store: &RwLock<S>) -> RwLockReadGuard<'_, S> {
    store.read().unwrap_or_else(PoisonError::into_inner)
}
