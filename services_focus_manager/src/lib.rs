//! # Focus History Service
//!
//! Remembers the last focused control of every pane and puts focus back
//! there when a pane is shown again, but only once that control exists.
//!
//! ## Philosophy
//!
//! - **Never focus early**: Focus is only transferred to a control that signalled readiness
//! - **Latest request wins**: A newer restore for a pane supersedes a pending one
//! - **Degrade, don't fail**: Stale panes and targets fall back or are skipped with a warning
//! - **Auditable**: Every focus change is recorded for audit
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A widget tree walker (panes expose named targets, see [`Focusable`])
//! - A window manager (no Z-order, no geometry)
//! - A global focus singleton
//!
//! ## Pane States
//!
//! ```text
//! NoFocusRecorded → Recorded → RestorePending ⇄ RestoreComplete
//! ```

pub mod focusable;

pub use focusable::{FocusHost, Focusable};

use core_types::{FocusTarget, PaneId};
use lifecycle::{
    AbandonReason, Clock, DeferredRequests, MonotonicClock, RequestState, RequestToken, Timeout,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use thiserror::Error;

/// Default number of navigation entries kept for "back"
pub const DEFAULT_HISTORY_DEPTH: usize = 32;

/// Default number of focus events kept in the audit trail
pub const DEFAULT_AUDIT_CAPACITY: usize = 256;

/// Focus history error types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FocusError {
    #[error("No focus recorded for pane {0}")]
    NoRecord(PaneId),

    #[error("Pane {0} is not open")]
    StalePane(PaneId),

    #[error("Pane {pane} has no focus target {target} and no fallback")]
    StaleTarget { pane: PaneId, target: FocusTarget },

    #[error("Control {target} in pane {pane} refused focus")]
    Refused { pane: PaneId, target: FocusTarget },
}

/// Last focused control of a pane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusRecord {
    pub pane: PaneId,
    pub target: FocusTarget,
    pub timestamp: u64,
}

/// A previously focused (pane, target) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationEntry {
    pub pane: PaneId,
    pub target: FocusTarget,
}

impl NavigationEntry {
    pub fn new(pane: PaneId, target: FocusTarget) -> Self {
        Self { pane, target }
    }
}

impl fmt::Display for NavigationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pane, self.target)
    }
}

/// Where a pane is in the record/restore cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneFocusState {
    NoFocusRecorded,
    Recorded,
    RestorePending,
    RestoreComplete,
}

/// What a restore attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Focus moved to the target
    Focused(FocusTarget),
    /// Target not ready yet; the request waits for its signal
    Deferred(RequestToken),
}

/// Focus event for audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusEvent {
    /// Focus moved inside the UI and was recorded
    Recorded {
        pane: PaneId,
        target: FocusTarget,
        timestamp: u64,
    },
    /// A restore is waiting for the target to become ready
    Deferred {
        pane: PaneId,
        target: FocusTarget,
        token: u64,
        timestamp: u64,
    },
    /// Focus was transferred to a control
    Restored {
        pane: PaneId,
        target: FocusTarget,
        timestamp: u64,
    },
    /// The remembered target is gone; its pane's default was used instead
    FellBack {
        pane: PaneId,
        missing: FocusTarget,
        fallback: FocusTarget,
        timestamp: u64,
    },
    /// A pending restore ended without focusing anything
    Abandoned {
        pane: PaneId,
        reason: String,
        timestamp: u64,
    },
    /// "Back" navigation picked a history entry
    NavigatedBack {
        pane: PaneId,
        target: FocusTarget,
        timestamp: u64,
    },
}

/// Focus history tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusConfig {
    /// Navigation entries kept for "back"; oldest are dropped first
    pub history_depth: usize,
    /// How long a restore may wait for readiness; `None` waits forever
    pub ready_timeout: Option<Timeout>,
    /// Audit events kept; oldest are dropped first
    pub audit_capacity: usize,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            ready_timeout: None,
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
        }
    }
}

/// Focus history manager
///
/// Holds one [`FocusRecord`] per pane, the bounded navigation history and
/// the pending, readiness-gated restore requests.
pub struct FocusHistoryManager {
    records: HashMap<PaneId, FocusRecord>,
    /// Currently focused control, as far as this manager knows
    current: Option<NavigationEntry>,
    /// Newest at the back
    history: VecDeque<NavigationEntry>,
    history_depth: usize,
    pending: DeferredRequests<PaneId>,
    restored: HashSet<PaneId>,
    /// Panes whose next transfer comes from "back" and must not grow history
    navigating_back: HashSet<PaneId>,
    clock: Box<dyn Clock>,
    /// Audit trail of focus events, newest at the back
    audit_trail: VecDeque<FocusEvent>,
    audit_capacity: usize,
    transfers: usize,
    /// Next timestamp (logical clock)
    next_timestamp: u64,
}

impl FocusHistoryManager {
    /// Creates a manager using the monotonic system clock
    pub fn new(config: FocusConfig) -> Self {
        Self::with_clock(config, MonotonicClock)
    }

    /// Creates a manager with an explicit time source
    pub fn with_clock(config: FocusConfig, clock: impl Clock + 'static) -> Self {
        Self {
            records: HashMap::new(),
            current: None,
            history: VecDeque::new(),
            history_depth: config.history_depth,
            pending: DeferredRequests::new().with_timeout(config.ready_timeout),
            restored: HashSet::new(),
            navigating_back: HashSet::new(),
            clock: Box::new(clock),
            audit_trail: VecDeque::new(),
            audit_capacity: config.audit_capacity,
            transfers: 0,
            next_timestamp: 0,
        }
    }

    /// Remembers that `target` inside `pane` now has focus
    ///
    /// The previously focused control moves onto the navigation history. A
    /// restore still pending for this pane is cancelled: the user already
    /// put focus somewhere.
    pub fn record_focus(&mut self, pane: &PaneId, target: impl Into<FocusTarget>) {
        let target = target.into();
        let timestamp = self.next_timestamp();
        let entry = NavigationEntry::new(pane.clone(), target.clone());

        if self.current.as_ref() != Some(&entry) {
            if self.pending.cancel(pane) {
                tracing::debug!(
                    target: "services_focus_manager",
                    %pane,
                    "focus moved by user, dropping pending restore"
                );
            }
            self.restored.remove(pane);
            self.navigating_back.remove(pane);
            self.push_history_and_set_current(entry);
        }

        self.records.insert(
            pane.clone(),
            FocusRecord {
                pane: pane.clone(),
                target: target.clone(),
                timestamp,
            },
        );
        self.audit(FocusEvent::Recorded {
            pane: pane.clone(),
            target,
            timestamp,
        });
    }

    /// Remembers `target` for `pane` without touching current focus or history
    ///
    /// Used for records coming from persisted state. An existing record wins;
    /// returns false in that case.
    pub fn seed_focus(&mut self, pane: &PaneId, target: impl Into<FocusTarget>) -> bool {
        if self.records.contains_key(pane) {
            return false;
        }
        let timestamp = self.next_timestamp();
        self.records.insert(
            pane.clone(),
            FocusRecord {
                pane: pane.clone(),
                target: target.into(),
                timestamp,
            },
        );
        true
    }

    /// Puts focus back on the pane's remembered control
    ///
    /// Returns true only if focus was transferred now. When the control is
    /// not ready the request is deferred (superseding any earlier one for
    /// this pane) and false is returned; [`process_ready`](Self::process_ready)
    /// re-drives it once the control signals readiness.
    pub fn restore_pane_focus(&mut self, pane: &PaneId, host: &mut dyn FocusHost) -> bool {
        match self.try_restore(pane, host) {
            Ok(RestoreOutcome::Focused(_)) => true,
            Ok(RestoreOutcome::Deferred(_)) => false,
            Err(err) => {
                tracing::warn!(target: "services_focus_manager", %pane, error = %err, "focus restore skipped");
                false
            }
        }
    }

    /// Restore with the full outcome, for callers that want to react to errors
    pub fn try_restore(
        &mut self,
        pane: &PaneId,
        host: &mut dyn FocusHost,
    ) -> Result<RestoreOutcome, FocusError> {
        let record = self
            .records
            .get(pane)
            .cloned()
            .ok_or_else(|| FocusError::NoRecord(pane.clone()))?;

        let Some(element) = host.focusable(pane) else {
            self.abandon_pending(pane);
            return Err(FocusError::StalePane(pane.clone()));
        };

        let (target, signal) = match element.ready_signal(&record.target) {
            Some(signal) => (record.target.clone(), signal),
            None => {
                let fallback = element
                    .default_target()
                    .and_then(|t| element.ready_signal(&t).map(|signal| (t, signal)));
                let Some((fallback, signal)) = fallback else {
                    self.abandon_pending(pane);
                    return Err(FocusError::StaleTarget {
                        pane: pane.clone(),
                        target: record.target,
                    });
                };
                tracing::warn!(
                    target: "services_focus_manager",
                    %pane,
                    missing = %record.target,
                    %fallback,
                    "remembered focus target is gone, using pane default"
                );
                let timestamp = self.next_timestamp();
                self.audit(FocusEvent::FellBack {
                    pane: pane.clone(),
                    missing: record.target,
                    fallback: fallback.clone(),
                    timestamp,
                });
                (fallback, signal)
            }
        };

        if !signal.is_ready() {
            let token = self.pending.defer(pane.clone(), &signal, self.clock.now());
            self.restored.remove(pane);
            let timestamp = self.next_timestamp();
            self.audit(FocusEvent::Deferred {
                pane: pane.clone(),
                target,
                token: token.value(),
                timestamp,
            });
            return Ok(RestoreOutcome::Deferred(token));
        }

        // Ready now: an older request waiting on another element is obsolete.
        if self.pending.is_pending(pane) {
            self.pending.cancel(pane);
        }

        if !element.focus(&target) {
            self.navigating_back.remove(pane);
            return Err(FocusError::Refused {
                pane: pane.clone(),
                target,
            });
        }

        self.complete_transfer(pane, target.clone());
        Ok(RestoreOutcome::Focused(target))
    }

    /// Re-drives every restore whose control became ready
    ///
    /// Returns the number of focus transfers made.
    pub fn process_ready(&mut self, host: &mut dyn FocusHost) -> usize {
        let ready = self.pending.take_ready();
        let mut transferred = 0;
        for pane in ready {
            tracing::debug!(target: "services_focus_manager", %pane, "control ready, retrying restore");
            if self.restore_pane_focus(&pane, host) {
                transferred += 1;
            }
        }
        transferred
    }

    /// Returns true if readiness callbacks fired since the last `process_ready`
    pub fn has_ready_work(&self) -> bool {
        self.pending.has_wakes()
    }

    /// Abandons restores that waited longer than the readiness timeout
    pub fn expire(&mut self) -> Vec<PaneId> {
        let expired = self.pending.expire(self.clock.now());
        for pane in &expired {
            self.navigating_back.remove(pane);
            let timestamp = self.next_timestamp();
            self.audit(FocusEvent::Abandoned {
                pane: pane.clone(),
                reason: AbandonReason::TimedOut.to_string(),
                timestamp,
            });
        }
        expired
    }

    /// Goes back to the most recent previously focused control
    ///
    /// Entries equal to the current focus or naming closed panes are
    /// skipped. The chosen entry is restored through the same ready-aware
    /// path as [`restore_pane_focus`](Self::restore_pane_focus).
    pub fn navigate_back(&mut self, host: &mut dyn FocusHost) -> bool {
        while let Some(entry) = self.history.pop_back() {
            if self.current.as_ref() == Some(&entry) {
                continue;
            }
            if host.focusable(&entry.pane).is_none() {
                tracing::warn!(target: "services_focus_manager", %entry, "skipping history entry for closed pane");
                continue;
            }

            let timestamp = self.next_timestamp();
            self.records.insert(
                entry.pane.clone(),
                FocusRecord {
                    pane: entry.pane.clone(),
                    target: entry.target.clone(),
                    timestamp,
                },
            );
            self.navigating_back.insert(entry.pane.clone());
            self.audit(FocusEvent::NavigatedBack {
                pane: entry.pane.clone(),
                target: entry.target.clone(),
                timestamp,
            });
            return self.restore_pane_focus(&entry.pane, host);
        }

        tracing::debug!(target: "services_focus_manager", "navigation history exhausted");
        false
    }

    /// Cancels a pending restore; returns false if none was pending
    pub fn cancel_restore(&mut self, pane: &PaneId) -> bool {
        self.navigating_back.remove(pane);
        let cancelled = self.pending.cancel(pane);
        if cancelled {
            let timestamp = self.next_timestamp();
            self.audit(FocusEvent::Abandoned {
                pane: pane.clone(),
                reason: AbandonReason::Cancelled.to_string(),
                timestamp,
            });
        }
        cancelled
    }

    /// Drops everything known about a closed pane
    pub fn forget_pane(&mut self, pane: &PaneId) {
        self.cancel_restore(pane);
        self.pending.forget(pane);
        self.records.remove(pane);
        self.restored.remove(pane);
        self.history.retain(|entry| entry.pane != *pane);
        if self.current.as_ref().is_some_and(|entry| entry.pane == *pane) {
            self.current = None;
        }
    }

    pub fn pane_state(&self, pane: &PaneId) -> PaneFocusState {
        if self.pending.is_pending(pane) {
            PaneFocusState::RestorePending
        } else if !self.records.contains_key(pane) {
            PaneFocusState::NoFocusRecorded
        } else if self.restored.contains(pane) {
            PaneFocusState::RestoreComplete
        } else {
            PaneFocusState::Recorded
        }
    }

    /// State of the latest restore request for `pane`
    pub fn request_state(&self, pane: &PaneId) -> RequestState {
        self.pending.state(pane)
    }

    pub fn last_focus(&self, pane: &PaneId) -> Option<&FocusRecord> {
        self.records.get(pane)
    }

    pub fn current(&self) -> Option<&NavigationEntry> {
        self.current.as_ref()
    }

    /// Navigation history, oldest first
    pub fn history(&self) -> impl Iterator<Item = &NavigationEntry> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.pending_count()
    }

    /// Number of focus transfers performed so far
    pub fn transfer_count(&self) -> usize {
        self.transfers
    }

    /// Returns the most recent focus events, oldest first
    pub fn audit_trail(&self) -> &VecDeque<FocusEvent> {
        &self.audit_trail
    }

    /// Clears the audit trail (for testing)
    #[cfg(test)]
    pub fn clear_audit_trail(&mut self) {
        self.audit_trail.clear();
    }

    fn complete_transfer(&mut self, pane: &PaneId, target: FocusTarget) {
        let timestamp = self.next_timestamp();
        let entry = NavigationEntry::new(pane.clone(), target.clone());

        if self.navigating_back.remove(pane) {
            self.current = Some(entry);
        } else if self.current.as_ref() != Some(&entry) {
            self.push_history_and_set_current(entry);
        }

        self.records.insert(
            pane.clone(),
            FocusRecord {
                pane: pane.clone(),
                target: target.clone(),
                timestamp,
            },
        );
        self.restored.insert(pane.clone());
        self.transfers += 1;
        tracing::debug!(target: "services_focus_manager", %pane, %target, "focus restored");
        self.audit(FocusEvent::Restored {
            pane: pane.clone(),
            target,
            timestamp,
        });
    }

    fn audit(&mut self, event: FocusEvent) {
        if self.audit_capacity == 0 {
            return;
        }
        if self.audit_trail.len() == self.audit_capacity {
            self.audit_trail.pop_front();
        }
        self.audit_trail.push_back(event);
    }

    fn push_history_and_set_current(&mut self, entry: NavigationEntry) {
        if let Some(previous) = self.current.replace(entry) {
            if self.history_depth == 0 {
                return;
            }
            if self.history.back() != Some(&previous) {
                self.history.push_back(previous);
            }
            while self.history.len() > self.history_depth {
                self.history.pop_front();
            }
        }
    }

    fn abandon_pending(&mut self, pane: &PaneId) {
        if self.pending.is_pending(pane) {
            self.cancel_restore(pane);
        }
    }

    /// Gets next timestamp and increments counter
    fn next_timestamp(&mut self) -> u64 {
        let ts = self.next_timestamp;
        self.next_timestamp += 1;
        ts
    }
}

impl Default for FocusHistoryManager {
    fn default() -> Self {
        Self::new(FocusConfig::default())
    }
}

impl fmt::Debug for FocusHistoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusHistoryManager")
            .field("records", &self.records.len())
            .field("current", &self.current)
            .field("history", &self.history.len())
            .field("pending", &self.pending.pending_count())
            .finish()
    }
}
