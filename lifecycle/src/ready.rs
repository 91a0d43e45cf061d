//! One-shot readiness signal
//!
//! A [`ReadySignal`] is owned by a UI element and shared with anyone who
//! needs to wait for it. It fires exactly once: the first `mark_ready`
//! drains every registered callback, later calls are no-ops.

use crate::LifecycleError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type ReadyCallback = Box<dyn FnOnce()>;

/// Handle returned by [`ReadySignal::on_ready`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct ReadyState {
    ready: bool,
    next_subscription: u64,
    callbacks: Vec<(SubscriptionId, ReadyCallback)>,
}

/// Shared one-shot "element is constructed" notification
///
/// Cloning yields another handle to the same element's signal.
#[derive(Clone)]
pub struct ReadySignal {
    shared: Rc<RefCell<ReadyState>>,
}

impl ReadySignal {
    /// Creates a signal for an element that is still being constructed
    pub fn new() -> Self {
        Self {
            shared: Rc::new(RefCell::new(ReadyState {
                ready: false,
                next_subscription: 0,
                callbacks: Vec::new(),
            })),
        }
    }

    /// Creates a signal that has already fired
    pub fn ready() -> Self {
        let signal = Self::new();
        signal.shared.borrow_mut().ready = true;
        signal
    }

    pub fn is_ready(&self) -> bool {
        self.shared.borrow().ready
    }

    /// Fails with [`LifecycleError::NotReady`] until the signal has fired
    pub fn ensure_ready(&self) -> Result<(), LifecycleError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(LifecycleError::NotReady)
        }
    }

    /// Registers a one-shot callback
    ///
    /// If the signal already fired the callback runs immediately and `None`
    /// is returned, since there is nothing left to unsubscribe.
    pub fn on_ready(&self, callback: impl FnOnce() + 'static) -> Option<SubscriptionId> {
        if self.is_ready() {
            callback();
            return None;
        }

        let mut state = self.shared.borrow_mut();
        let id = SubscriptionId(state.next_subscription);
        state.next_subscription += 1;
        state.callbacks.push((id, Box::new(callback)));
        Some(id)
    }

    /// Removes a pending callback; returns false if it already fired or was removed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.shared.borrow_mut();
        let before = state.callbacks.len();
        state.callbacks.retain(|(sub, _)| *sub != id);
        state.callbacks.len() != before
    }

    /// Fires the signal, returning how many callbacks ran
    ///
    /// Callbacks run after the internal borrow is released, so they may
    /// register on or query this same signal.
    pub fn mark_ready(&self) -> usize {
        let callbacks = {
            let mut state = self.shared.borrow_mut();
            if state.ready {
                return 0;
            }
            state.ready = true;
            std::mem::take(&mut state.callbacks)
        };

        let fired = callbacks.len();
        for (_, callback) in callbacks {
            callback();
        }
        fired
    }

    /// Number of callbacks still waiting
    pub fn pending_callbacks(&self) -> usize {
        self.shared.borrow().callbacks.len()
    }

    /// Returns true if both handles refer to the same element
    pub fn same_element(&self, other: &ReadySignal) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReadySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.borrow();
        f.debug_struct("ReadySignal")
            .field("ready", &state.ready)
            .field("pending", &state.callbacks.len())
            .finish()
    }
}
