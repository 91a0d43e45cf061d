//! # Workspace Manager Service
//!
//! Owns the open panes of the current workspace: opens and closes them,
//! decides which one is active, and rebuilds a whole workspace from saved
//! state when the user switches.
//!
//! ## Philosophy
//!
//! - **Panes own interaction, the workspace owns lifecycle**
//! - **Focus waits for readiness**: Nothing is focused before its pane signalled ready
//! - **Switches never abort**: Unknown kinds and stale focus degrade with a warning
//! - **Lifecycle is observable and auditable**
//! - **No global state**: The session owns the coordinator and lends it the dispatcher
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A renderer or layout engine
//! - A persistence backend (see [`WorkspaceStore`])
//! - A window manager
//!
//! ## Switch Sequence
//!
//! ```text
//! save current → tear down panes → build target panes → restore state → restore focus (deferred)
//! ```

pub mod pane;
pub mod persistence;
pub mod store;

pub use pane::{Pane, PaneError, PaneFactory, PaneRegistry, PaneStateBlob};
pub use persistence::{SnapshotError, WorkspaceSnapshotData};
pub use store::{InMemoryWorkspaceStore, StoreError, WorkspaceStore};

use core_types::{FocusTarget, PaneId, PaneKind, WorkspaceId};
use lifecycle::{Clock, DeferredRequests, MonotonicClock, ReadySignal, RequestState};
use serde::{Deserialize, Serialize};
use services_focus_manager::{
    FocusConfig, FocusHistoryManager, FocusHost, Focusable, DEFAULT_AUDIT_CAPACITY,
};
use services_shortcuts::ShortcutDispatcher;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use thiserror::Error;
use undo_history::UndoRedoStack;

/// Workspace opened when nothing else is configured
pub const DEFAULT_WORKSPACE: &str = "main";

/// Workspace manager errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("Pane not open: {0}")]
    PaneNotFound(PaneId),

    #[error("No factory for pane kind: {0}")]
    UnknownKind(PaneKind),

    #[error("No panes open")]
    NoPanes,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Workspace event for audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkspaceEvent {
    /// Pane was built and initialized
    PaneOpened {
        pane: PaneId,
        kind: PaneKind,
        timestamp: u64,
    },
    /// Pane was disposed
    PaneClosed { pane: PaneId, timestamp: u64 },
    /// Saved pane could not be rebuilt
    PaneSkipped {
        pane: PaneId,
        kind: PaneKind,
        timestamp: u64,
    },
    /// Pane was asked to take focus
    FocusRequested {
        pane: PaneId,
        deferred: bool,
        timestamp: u64,
    },
    /// Current workspace was written to the store
    WorkspaceSaved {
        workspace: WorkspaceId,
        timestamp: u64,
    },
    /// Current workspace changed
    WorkspaceSwitched {
        from: WorkspaceId,
        to: WorkspaceId,
        timestamp: u64,
    },
    /// Pane states were rolled back
    Undone {
        workspace: WorkspaceId,
        timestamp: u64,
    },
    /// Pane states were rolled forward
    Redone {
        workspace: WorkspaceId,
        timestamp: u64,
    },
}

/// Coordinator tunables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub initial_workspace: WorkspaceId,
    /// Undo entries kept per workspace
    pub undo_capacity: usize,
    /// Audit events kept; oldest are dropped first
    pub audit_capacity: usize,
    pub focus: FocusConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            initial_workspace: WorkspaceId::new(DEFAULT_WORKSPACE),
            undo_capacity: undo_history::DEFAULT_CAPACITY,
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            focus: FocusConfig::default(),
        }
    }
}

/// What a workspace switch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchSummary {
    pub workspace: WorkspaceId,
    /// Panes rebuilt from saved state
    pub opened: Vec<PaneId>,
    /// Saved panes whose kind has no factory
    pub skipped: Vec<PaneId>,
    /// Pane asked to take focus, if any
    pub focus: Option<PaneId>,
}

/// Open panes in opening order
#[derive(Default)]
struct OpenPanes {
    panes: Vec<Box<dyn Pane>>,
}

impl OpenPanes {
    fn position(&self, pane: &PaneId) -> Option<usize> {
        self.panes.iter().position(|p| p.pane_id() == pane)
    }

    fn contains(&self, pane: &PaneId) -> bool {
        self.position(pane).is_some()
    }

    fn get(&self, pane: &PaneId) -> Option<&dyn Pane> {
        self.panes
            .iter()
            .find(|p| p.pane_id() == pane)
            .map(|p| p.as_ref())
    }

    fn get_mut(&mut self, pane: &PaneId) -> Option<&mut Box<dyn Pane>> {
        self.panes.iter_mut().find(|p| p.pane_id() == pane)
    }

    fn ids(&self) -> Vec<PaneId> {
        self.panes.iter().map(|p| p.pane_id().clone()).collect()
    }

    fn capture(&self) -> Vec<PaneStateBlob> {
        self.panes.iter().map(|p| p.save_state()).collect()
    }
}

impl FocusHost for OpenPanes {
    fn focusable(&mut self, pane: &PaneId) -> Option<&mut dyn Focusable> {
        self.panes
            .iter_mut()
            .find(|p| p.pane_id() == pane)
            .map(|p| p.as_focusable())
    }
}

/// Pane lifecycle coordinator
///
/// Shortcut registration happens through the dispatcher passed into
/// [`open_pane`](Self::open_pane), [`close_pane`](Self::close_pane) and
/// [`switch_workspace`](Self::switch_workspace); the coordinator never
/// stores it.
pub struct PaneLifecycleCoordinator {
    current: WorkspaceId,
    panes: OpenPanes,
    registry: PaneRegistry,
    store: Box<dyn WorkspaceStore>,
    focus: FocusHistoryManager,
    /// Focus requests waiting for a pane to finish construction
    activations: DeferredRequests<PaneId>,
    clock: Box<dyn Clock>,
    active: Option<PaneId>,
    /// Latest pane asked to take focus, ready or not
    requested: Option<PaneId>,
    last_active: HashMap<WorkspaceId, PaneId>,
    undo: HashMap<WorkspaceId, UndoRedoStack<Vec<PaneStateBlob>>>,
    undo_capacity: usize,
    /// Audit trail of workspace events, newest at the back
    audit_trail: VecDeque<WorkspaceEvent>,
    audit_capacity: usize,
    /// Next timestamp (logical clock)
    next_timestamp: u64,
}

impl PaneLifecycleCoordinator {
    /// Creates a coordinator using the monotonic system clock
    pub fn new(
        config: CoordinatorConfig,
        registry: PaneRegistry,
        store: impl WorkspaceStore + 'static,
    ) -> Self {
        Self::with_clock(config, registry, store, MonotonicClock)
    }

    /// Creates a coordinator with an explicit time source
    pub fn with_clock(
        config: CoordinatorConfig,
        registry: PaneRegistry,
        store: impl WorkspaceStore + 'static,
        clock: impl Clock + Clone + 'static,
    ) -> Self {
        Self {
            current: config.initial_workspace,
            panes: OpenPanes::default(),
            registry,
            store: Box::new(store),
            focus: FocusHistoryManager::with_clock(config.focus, clock.clone()),
            activations: DeferredRequests::new().with_timeout(config.focus.ready_timeout),
            clock: Box::new(clock),
            active: None,
            requested: None,
            last_active: HashMap::new(),
            undo: HashMap::new(),
            undo_capacity: config.undo_capacity,
            audit_trail: VecDeque::new(),
            audit_capacity: config.audit_capacity,
            next_timestamp: 0,
        }
    }

    /// Builds and initializes a pane unless one with this id is already open
    ///
    /// Returns true if a pane was opened.
    pub fn open_pane(
        &mut self,
        pane: &PaneId,
        factory: impl FnOnce(&PaneId) -> Box<dyn Pane>,
        shortcuts: &mut ShortcutDispatcher,
    ) -> bool {
        if self.panes.contains(pane) {
            tracing::debug!(target: "services_workspace_manager", %pane, "pane already open");
            return false;
        }

        let mut built = factory(pane);
        if built.pane_id() != pane {
            tracing::warn!(
                target: "services_workspace_manager",
                requested = %pane,
                built = %built.pane_id(),
                "factory built a pane with a different id"
            );
            return false;
        }

        built.initialize(shortcuts);
        let kind = built.kind();
        self.panes.panes.push(built);
        tracing::debug!(target: "services_workspace_manager", %pane, %kind, "pane opened");
        let timestamp = self.next_timestamp();
        self.audit(WorkspaceEvent::PaneOpened {
            pane: pane.clone(),
            kind,
            timestamp,
        });
        true
    }

    /// Opens a pane through the factory registered for `kind`
    pub fn open_pane_of_kind(
        &mut self,
        pane: &PaneId,
        kind: &PaneKind,
        shortcuts: &mut ShortcutDispatcher,
    ) -> Result<bool, WorkspaceError> {
        if self.panes.contains(pane) {
            return Ok(false);
        }
        let built = self
            .registry
            .create(kind, pane)
            .ok_or_else(|| WorkspaceError::UnknownKind(kind.clone()))?;
        Ok(self.open_pane(pane, move |_| built, shortcuts))
    }

    /// Disposes a pane and removes its bindings and focus state
    ///
    /// If it was the active pane, its neighbour is focused.
    pub fn close_pane(
        &mut self,
        pane: &PaneId,
        shortcuts: &mut ShortcutDispatcher,
    ) -> Result<(), WorkspaceError> {
        let index = self
            .panes
            .position(pane)
            .ok_or_else(|| WorkspaceError::PaneNotFound(pane.clone()))?;

        let mut closed = self.panes.panes.remove(index);
        self.release(closed.as_mut(), shortcuts);
        if self.requested.as_ref() == Some(pane) {
            self.requested = None;
        }
        self.focus.forget_pane(pane);
        self.activations.forget(pane);

        if self.active.as_ref() == Some(pane) {
            self.active = None;
            self.last_active.remove(&self.current);
            let neighbour = index.min(self.panes.panes.len().saturating_sub(1));
            if let Some(next) = self.panes.panes.get(neighbour).map(|p| p.pane_id().clone()) {
                self.focus_pane(&next);
            }
        }
        Ok(())
    }

    /// Makes `pane` the active pane and restores its focus
    ///
    /// A pane that is still being constructed gets a deferred request
    /// instead; [`process_ready`](Self::process_ready) re-drives it once the
    /// pane signals readiness. Returns true only if focus moved now.
    pub fn focus_pane(&mut self, pane: &PaneId) -> bool {
        let Some(entry) = self.panes.get(pane) else {
            tracing::warn!(target: "services_workspace_manager", %pane, "focus requested for a pane that is not open");
            return false;
        };
        let ready = entry.is_ready();
        let signal = entry.pane_ready();

        self.requested = Some(pane.clone());
        for other in self.panes.ids().iter().filter(|id| *id != pane) {
            self.activations.cancel(other);
            self.focus.cancel_restore(other);
        }

        if !ready {
            let token = self.activations.defer(pane.clone(), &signal, self.clock.now());
            tracing::debug!(target: "services_workspace_manager", %pane, %token, "pane not ready, deferring focus");
            self.push_focus_event(pane, true);
            return false;
        }

        // A wake already queued for this pane must not focus it a second time.
        self.activations.cancel(pane);
        self.active = Some(pane.clone());
        self.last_active.insert(self.current.clone(), pane.clone());

        if self.focus.last_focus(pane).is_none() {
            let default = self
                .panes
                .focusable(pane)
                .and_then(|element| element.default_target());
            let Some(target) = default else {
                tracing::debug!(target: "services_workspace_manager", %pane, "pane has no focus targets");
                self.push_focus_event(pane, false);
                return false;
            };
            self.focus.seed_focus(pane, target);
        }

        let transferred = self.focus.restore_pane_focus(pane, &mut self.panes);
        self.push_focus_event(pane, !transferred);
        transferred
    }

    /// Focuses the pane after the active one, wrapping around
    pub fn focus_next(&mut self) -> Result<bool, WorkspaceError> {
        self.cycle_focus(true)
    }

    /// Focuses the pane before the active one, wrapping around
    pub fn focus_previous(&mut self) -> Result<bool, WorkspaceError> {
        self.cycle_focus(false)
    }

    fn cycle_focus(&mut self, forward: bool) -> Result<bool, WorkspaceError> {
        let ids = self.panes.ids();
        if ids.is_empty() {
            return Err(WorkspaceError::NoPanes);
        }

        let len = ids.len();
        let current = self
            .requested
            .as_ref()
            .or(self.active.as_ref())
            .and_then(|active| ids.iter().position(|id| id == active));
        let next = match (current, forward) {
            (Some(pos), true) => (pos + 1) % len,
            (Some(pos), false) => (pos + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };

        Ok(self.focus_pane(&ids[next]))
    }

    /// Records that the UI moved focus to `target` inside `pane`
    pub fn record_focus(&mut self, pane: &PaneId, target: impl Into<FocusTarget>) {
        if !self.panes.contains(pane) {
            tracing::warn!(target: "services_workspace_manager", %pane, "focus reported for a pane that is not open");
            return;
        }
        // The user already chose; nothing still waiting may take focus away.
        self.activations.cancel_all();
        for other in self.panes.ids().iter().filter(|id| *id != pane) {
            self.focus.cancel_restore(other);
        }
        self.focus.record_focus(pane, target);
        self.active = Some(pane.clone());
        self.requested = Some(pane.clone());
        self.last_active.insert(self.current.clone(), pane.clone());
    }

    /// Goes back to the previously focused control
    pub fn navigate_back(&mut self) -> bool {
        let moved = self.focus.navigate_back(&mut self.panes);
        if moved {
            self.sync_active_from_focus();
        }
        moved
    }

    /// Re-drives focus requests whose pane or control became ready
    ///
    /// Returns the number of focus transfers made.
    pub fn process_ready(&mut self) -> usize {
        let mut transferred = 0;
        for pane in self.activations.take_ready() {
            tracing::debug!(target: "services_workspace_manager", %pane, "pane ready, retrying focus");
            if self.focus_pane(&pane) {
                transferred += 1;
            }
        }

        let restored = self.focus.process_ready(&mut self.panes);
        if restored > 0 {
            self.sync_active_from_focus();
        }
        transferred + restored
    }

    /// Returns true if readiness callbacks fired since the last `process_ready`
    pub fn has_ready_work(&self) -> bool {
        self.activations.has_wakes() || self.focus.has_ready_work()
    }

    /// Abandons focus requests that waited longer than the readiness timeout
    pub fn expire(&mut self) -> Vec<PaneId> {
        let mut expired = self.activations.expire(self.clock.now());
        if expired.iter().any(|pane| self.requested.as_ref() == Some(pane)) {
            self.requested = self.active.clone();
        }
        expired.extend(self.focus.expire());
        expired
    }

    /// Saves the current workspace and rebuilds `target` in its place
    ///
    /// Switching to the workspace that is already current re-requests focus
    /// for its latest pane; the newer request supersedes a pending one.
    pub fn switch_workspace(
        &mut self,
        target: &WorkspaceId,
        shortcuts: &mut ShortcutDispatcher,
    ) -> SwitchSummary {
        if *target == self.current {
            tracing::debug!(target: "services_workspace_manager", workspace = %target, "already current, re-requesting focus");
            let preferred = self.requested.clone().or_else(|| self.active.clone());
            let focus = self.restore_workspace_focus(preferred);
            return SwitchSummary {
                workspace: target.clone(),
                opened: Vec::new(),
                skipped: Vec::new(),
                focus,
            };
        }

        tracing::info!(
            target: "services_workspace_manager",
            from = %self.current,
            to = %target,
            "switching workspace"
        );

        if let Err(err) = self.save_current() {
            tracing::warn!(
                target: "services_workspace_manager",
                workspace = %self.current,
                error = %err,
                "failed to save workspace, switching anyway"
            );
        }

        self.teardown(shortcuts);
        let from = std::mem::replace(&mut self.current, target.clone());
        let timestamp = self.next_timestamp();
        self.audit(WorkspaceEvent::WorkspaceSwitched {
            from,
            to: target.clone(),
            timestamp,
        });

        let snapshot = self.load_snapshot(target);
        self.instantiate(snapshot, shortcuts)
    }

    /// Rebuilds the current workspace from the store without saving first
    ///
    /// Used at startup.
    pub fn restore_current(&mut self, shortcuts: &mut ShortcutDispatcher) -> SwitchSummary {
        self.teardown(shortcuts);
        let workspace = self.current.clone();
        let snapshot = self.load_snapshot(&workspace);
        self.instantiate(snapshot, shortcuts)
    }

    /// Writes the current workspace to the store
    pub fn save_current(&mut self) -> Result<(), WorkspaceError> {
        let snapshot = self.snapshot();
        self.store.save(&self.current, &snapshot)?;
        tracing::debug!(target: "services_workspace_manager", workspace = %self.current, panes = snapshot.panes.len(), "workspace saved");
        let timestamp = self.next_timestamp();
        self.audit(WorkspaceEvent::WorkspaceSaved {
            workspace: self.current.clone(),
            timestamp,
        });
        Ok(())
    }

    /// Current workspace contents as they would be saved
    pub fn snapshot(&self) -> WorkspaceSnapshotData {
        let mut snapshot = WorkspaceSnapshotData::empty(self.current.clone());
        snapshot.panes = self.panes.capture();
        snapshot.active = self.active.clone();
        for pane in self.panes.ids() {
            if let Some(record) = self.focus.last_focus(&pane) {
                snapshot.focus.insert(pane, record.target.clone());
            }
        }
        snapshot
    }

    /// Pushes the current pane states onto this workspace's undo history
    ///
    /// Call before a mutating action.
    pub fn checkpoint(&mut self) {
        let snapshot = self.panes.capture();
        self.undo_stack_mut().push_undo(snapshot);
    }

    /// Rolls pane states back to the latest checkpoint
    pub fn undo(&mut self) -> bool {
        let current = self.panes.capture();
        let Some(previous) = self.undo_stack_mut().undo(current) else {
            tracing::debug!(target: "services_workspace_manager", workspace = %self.current, "nothing to undo");
            return false;
        };
        self.apply(&previous);
        let timestamp = self.next_timestamp();
        self.audit(WorkspaceEvent::Undone {
            workspace: self.current.clone(),
            timestamp,
        });
        true
    }

    /// Re-applies the state rolled back by the last undo
    pub fn redo(&mut self) -> bool {
        let current = self.panes.capture();
        let Some(next) = self.undo_stack_mut().redo(current) else {
            tracing::debug!(target: "services_workspace_manager", workspace = %self.current, "nothing to redo");
            return false;
        };
        self.apply(&next);
        let timestamp = self.next_timestamp();
        self.audit(WorkspaceEvent::Redone {
            workspace: self.current.clone(),
            timestamp,
        });
        true
    }

    pub fn can_undo(&self) -> bool {
        self.undo.get(&self.current).is_some_and(|stack| stack.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.undo.get(&self.current).is_some_and(|stack| stack.can_redo())
    }

    pub fn undo_depth(&self) -> usize {
        self.undo
            .get(&self.current)
            .map_or(0, |stack| stack.undo_depth())
    }

    pub fn current_workspace(&self) -> &WorkspaceId {
        &self.current
    }

    /// Pane that currently holds focus
    pub fn active_pane(&self) -> Option<&PaneId> {
        self.active.as_ref()
    }

    /// Latest pane asked to take focus, possibly still waiting for readiness
    pub fn requested_pane(&self) -> Option<&PaneId> {
        self.requested.as_ref()
    }

    /// Open pane ids in opening order
    pub fn pane_ids(&self) -> Vec<PaneId> {
        self.panes.ids()
    }

    pub fn pane_count(&self) -> usize {
        self.panes.panes.len()
    }

    pub fn is_open(&self, pane: &PaneId) -> bool {
        self.panes.contains(pane)
    }

    pub fn pane(&self, pane: &PaneId) -> Option<&dyn Pane> {
        self.panes.get(pane)
    }

    /// Runs `f` against an open pane
    pub fn with_pane<R>(&mut self, pane: &PaneId, f: impl FnOnce(&mut dyn Pane) -> R) -> Option<R> {
        self.panes.get_mut(pane).map(|p| f(p.as_mut()))
    }

    /// Readiness signal of an open pane
    pub fn pane_ready(&self, pane: &PaneId) -> Option<ReadySignal> {
        self.panes.get(pane).map(|p| p.pane_ready())
    }

    /// State of the latest deferred focus request for `pane`
    pub fn activation_state(&self, pane: &PaneId) -> RequestState {
        self.activations.state(pane)
    }

    /// Focus requests waiting on a pane or a control
    pub fn pending_focus_count(&self) -> usize {
        self.activations.pending_count() + self.focus.pending_count()
    }

    pub fn focus_history(&self) -> &FocusHistoryManager {
        &self.focus
    }

    pub fn registry(&self) -> &PaneRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PaneRegistry {
        &mut self.registry
    }

    pub fn store(&self) -> &dyn WorkspaceStore {
        self.store.as_ref()
    }

    /// Returns the most recent workspace events, oldest first
    pub fn audit_trail(&self) -> &VecDeque<WorkspaceEvent> {
        &self.audit_trail
    }

    fn audit(&mut self, event: WorkspaceEvent) {
        if self.audit_capacity == 0 {
            return;
        }
        if self.audit_trail.len() == self.audit_capacity {
            self.audit_trail.pop_front();
        }
        self.audit_trail.push_back(event);
    }

    fn teardown(&mut self, shortcuts: &mut ShortcutDispatcher) {
        self.activations.cancel_all();
        let panes = std::mem::take(&mut self.panes.panes);
        for mut pane in panes {
            self.focus.forget_pane(pane.pane_id());
            self.release(pane.as_mut(), shortcuts);
        }
        self.active = None;
        self.requested = None;
    }

    fn release(&mut self, pane: &mut dyn Pane, shortcuts: &mut ShortcutDispatcher) {
        let id = pane.pane_id().clone();
        shortcuts.clear_pane(&id);
        pane.dispose();
        tracing::debug!(target: "services_workspace_manager", pane = %id, "pane closed");
        let timestamp = self.next_timestamp();
        self.audit(WorkspaceEvent::PaneClosed { pane: id, timestamp });
    }

    fn load_snapshot(&self, workspace: &WorkspaceId) -> WorkspaceSnapshotData {
        match self.store.load(workspace) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::debug!(target: "services_workspace_manager", %workspace, "no saved state, starting empty");
                WorkspaceSnapshotData::empty(workspace.clone())
            }
            Err(err) => {
                tracing::warn!(
                    target: "services_workspace_manager",
                    %workspace,
                    error = %err,
                    "workspace state unreadable, starting empty"
                );
                WorkspaceSnapshotData::empty(workspace.clone())
            }
        }
    }

    fn instantiate(
        &mut self,
        snapshot: WorkspaceSnapshotData,
        shortcuts: &mut ShortcutDispatcher,
    ) -> SwitchSummary {
        let mut opened = Vec::new();
        let mut skipped = Vec::new();

        for blob in &snapshot.panes {
            if self.panes.contains(&blob.pane) {
                tracing::warn!(target: "services_workspace_manager", pane = %blob.pane, "duplicate pane in saved workspace");
                continue;
            }
            let Some(mut pane) = self.registry.create(&blob.kind, &blob.pane) else {
                tracing::warn!(
                    target: "services_workspace_manager",
                    pane = %blob.pane,
                    kind = %blob.kind,
                    "unknown pane kind, skipping"
                );
                let timestamp = self.next_timestamp();
                self.audit(WorkspaceEvent::PaneSkipped {
                    pane: blob.pane.clone(),
                    kind: blob.kind.clone(),
                    timestamp,
                });
                skipped.push(blob.pane.clone());
                continue;
            };

            pane.initialize(shortcuts);
            if let Err(err) = pane.restore_state(blob) {
                tracing::warn!(
                    target: "services_workspace_manager",
                    pane = %blob.pane,
                    error = %err,
                    "pane state not restored, keeping defaults"
                );
            }
            self.panes.panes.push(pane);
            let timestamp = self.next_timestamp();
            self.audit(WorkspaceEvent::PaneOpened {
                pane: blob.pane.clone(),
                kind: blob.kind.clone(),
                timestamp,
            });
            opened.push(blob.pane.clone());
        }

        for (pane, target) in &snapshot.focus {
            if self.panes.contains(pane) {
                self.focus.seed_focus(pane, target.clone());
            }
        }

        let preferred = snapshot
            .active
            .clone()
            .or_else(|| self.last_active.get(&self.current).cloned());
        let focus = self.restore_workspace_focus(preferred);

        SwitchSummary {
            workspace: self.current.clone(),
            opened,
            skipped,
            focus,
        }
    }

    /// Focuses `preferred` if it is open, else the first pane
    fn restore_workspace_focus(&mut self, preferred: Option<PaneId>) -> Option<PaneId> {
        let candidate = match preferred {
            Some(pane) if self.panes.contains(&pane) => Some(pane),
            Some(pane) => {
                tracing::warn!(
                    target: "services_workspace_manager",
                    %pane,
                    "previously active pane is gone, focusing first pane"
                );
                self.panes.ids().into_iter().next()
            }
            None => self.panes.ids().into_iter().next(),
        };

        match candidate {
            Some(pane) => {
                self.focus_pane(&pane);
                Some(pane)
            }
            None => {
                tracing::debug!(target: "services_workspace_manager", workspace = %self.current, "workspace has no panes, focus unchanged");
                None
            }
        }
    }

    fn apply(&mut self, states: &[PaneStateBlob]) {
        for blob in states {
            match self.panes.get_mut(&blob.pane) {
                Some(pane) => {
                    if let Err(err) = pane.restore_state(blob) {
                        tracing::warn!(target: "services_workspace_manager", pane = %blob.pane, error = %err, "pane rejected undo state");
                    }
                }
                None => {
                    tracing::warn!(target: "services_workspace_manager", pane = %blob.pane, "undo state names a closed pane");
                }
            }
        }
    }

    fn undo_stack_mut(&mut self) -> &mut UndoRedoStack<Vec<PaneStateBlob>> {
        let capacity = self.undo_capacity;
        self.undo
            .entry(self.current.clone())
            .or_insert_with(|| UndoRedoStack::new(capacity))
    }

    fn sync_active_from_focus(&mut self) {
        if let Some(entry) = self.focus.current() {
            if self.panes.contains(&entry.pane) {
                let pane = entry.pane.clone();
                self.active = Some(pane.clone());
                self.requested = Some(pane.clone());
                self.last_active.insert(self.current.clone(), pane);
            }
        }
    }

    fn push_focus_event(&mut self, pane: &PaneId, deferred: bool) {
        let timestamp = self.next_timestamp();
        self.audit(WorkspaceEvent::FocusRequested {
            pane: pane.clone(),
            deferred,
            timestamp,
        });
    }

    /// Gets next timestamp and increments counter
    fn next_timestamp(&mut self) -> u64 {
        let ts = self.next_timestamp;
        self.next_timestamp += 1;
        ts
    }
}

impl fmt::Debug for PaneLifecycleCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaneLifecycleCoordinator")
            .field("current", &self.current)
            .field("panes", &self.panes.ids())
            .field("active", &self.active)
            .field("requested", &self.requested)
            .finish()
    }
}
