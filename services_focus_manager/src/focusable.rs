//! Focus capability exposed by panes
//!
//! Panes name their focusable controls (`"searchBox"`, `"editor"`) instead of
//! letting the focus manager walk a widget tree.

use core_types::{FocusTarget, PaneId};
use lifecycle::ReadySignal;

/// A pane's named, focusable controls
pub trait Focusable {
    /// Every target this pane can currently focus, preferred target first
    fn focus_targets(&self) -> Vec<FocusTarget>;

    /// Target used when a remembered one no longer exists
    fn default_target(&self) -> Option<FocusTarget> {
        self.focus_targets().into_iter().next()
    }

    /// Readiness of the control behind `target`; `None` if there is no such control
    fn ready_signal(&self, target: &FocusTarget) -> Option<ReadySignal>;

    /// Moves keyboard focus to `target`; returns false if the control refused
    fn focus(&mut self, target: &FocusTarget) -> bool;
}

/// Lookup of live panes by id
pub trait FocusHost {
    fn focusable(&mut self, pane: &PaneId) -> Option<&mut dyn Focusable>;
}
