//! The capability the breadcrumb calls into when the user picks a target.

use std::sync::Arc;

/// Accepts "move the displayed selection to this row" requests.
///
/// The shell that hosts the breadcrumb injects one of these instead of
/// exposing a globally-reachable window object. Implementations must apply
/// the selection before returning; selection-change notifications the host
/// emits *during* the call are ignored by the breadcrumb, which stays stable
/// while the user navigates through it.
pub trait NavigationSink: Send + Sync {
    /// Moves the displayed selection to `row`.
    fn select_row(&self, row: usize) -> anyhow::Result<()>;
}

impl<T: NavigationSink + ?Sized> NavigationSink for Arc<T> {
    fn select_row(&self, row: usize) -> anyhow::Result<()> {
        (**self).select_row(row)
    }
}
