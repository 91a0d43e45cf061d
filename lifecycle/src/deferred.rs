//! Deferred requests gated on readiness
//!
//! Each key (a pane, usually) has at most one pending request. A request
//! moves through `Idle → AwaitingReady → Fulfilled`, or ends as
//! `Abandoned` when a newer request supersedes it, it is cancelled, or its
//! deadline passes.
//!
//! The ready callback never touches the owner directly. It only pushes the
//! request's token onto a wake queue; the owner drains that queue with
//! [`DeferredRequests::take_ready`] and re-drives the operation. A token
//! that no longer matches the key's pending request is stale and ignored,
//! so a superseded request can never cause a second transfer.

use crate::clock::{Deadline, Timeout};
use crate::ready::{ReadySignal, SubscriptionId};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use std::time::Instant;

/// Monotonically increasing request identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req#{}", self.0)
    }
}

/// Why a request ended without being fulfilled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonReason {
    /// A newer request for the same key replaced it
    Superseded,
    /// The owner cancelled it (pane closed, workspace torn down)
    Cancelled,
    /// The element never signalled readiness before the deadline
    TimedOut,
}

impl fmt::Display for AbandonReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbandonReason::Superseded => write!(f, "superseded"),
            AbandonReason::Cancelled => write!(f, "cancelled"),
            AbandonReason::TimedOut => write!(f, "timed out"),
        }
    }
}

/// State of the latest request for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    AwaitingReady(RequestToken),
    Fulfilled(RequestToken),
    Abandoned(RequestToken, AbandonReason),
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::AwaitingReady(_))
    }
}

struct PendingRequest {
    token: RequestToken,
    signal: ReadySignal,
    subscription: Option<SubscriptionId>,
    deadline: Option<Deadline>,
}

impl PendingRequest {
    fn detach(&mut self) {
        if let Some(sub) = self.subscription.take() {
            self.signal.unsubscribe(sub);
        }
    }
}

/// Table of readiness-gated requests, at most one per key
pub struct DeferredRequests<K> {
    next_token: u64,
    timeout: Option<Timeout>,
    pending: HashMap<K, PendingRequest>,
    settled: HashMap<K, RequestState>,
    wakes: Rc<RefCell<VecDeque<RequestToken>>>,
}

impl<K> DeferredRequests<K>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    /// Creates a table whose requests never time out
    pub fn new() -> Self {
        Self {
            next_token: 0,
            timeout: None,
            pending: HashMap::new(),
            settled: HashMap::new(),
            wakes: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Sets the readiness timeout applied to requests registered afterwards
    pub fn with_timeout(mut self, timeout: Option<Timeout>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Timeout> {
        self.timeout
    }

    /// Registers a request for `key` that wakes when `signal` fires
    ///
    /// Any earlier pending request for the same key is unsubscribed and
    /// marked superseded before the new one is registered.
    pub fn defer(&mut self, key: K, signal: &ReadySignal, now: Instant) -> RequestToken {
        if let Some(mut stale) = self.pending.remove(&key) {
            stale.detach();
            tracing::debug!(
                target: "lifecycle::deferred",
                ?key,
                stale = %stale.token,
                "superseding pending request"
            );
        }

        let token = RequestToken(self.next_token);
        self.next_token += 1;

        let wakes = Rc::clone(&self.wakes);
        let subscription = signal.on_ready(move || wakes.borrow_mut().push_back(token));

        self.pending.insert(
            key.clone(),
            PendingRequest {
                token,
                signal: signal.clone(),
                subscription,
                deadline: self.timeout.map(|t| t.to_deadline(now)),
            },
        );
        self.settled.remove(&key);
        tracing::debug!(target: "lifecycle::deferred", ?key, %token, "awaiting readiness");
        token
    }

    /// Drains fired wakes and returns the keys whose current request is ready
    ///
    /// Each returned request is marked fulfilled; the caller re-drives the
    /// operation for those keys.
    pub fn take_ready(&mut self) -> Vec<K> {
        let tokens: Vec<RequestToken> = self.wakes.borrow_mut().drain(..).collect();
        let mut ready = Vec::new();

        for token in tokens {
            let key = self
                .pending
                .iter()
                .find(|(_, req)| req.token == token)
                .map(|(key, _)| key.clone());

            match key {
                Some(key) => {
                    // The signal already dropped its callback when it fired.
                    self.pending.remove(&key);
                    self.settled.insert(key.clone(), RequestState::Fulfilled(token));
                    ready.push(key);
                }
                None => {
                    tracing::debug!(target: "lifecycle::deferred", %token, "ignoring stale wake");
                }
            }
        }

        ready
    }

    /// Returns true if a wake is queued and `take_ready` has work to do
    pub fn has_wakes(&self) -> bool {
        !self.wakes.borrow().is_empty()
    }

    /// Abandons requests whose deadline has passed, returning their keys
    pub fn expire(&mut self, now: Instant) -> Vec<K> {
        let expired: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, req)| req.deadline.is_some_and(|d| d.has_passed(now)))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.abandon(key, AbandonReason::TimedOut);
        }
        expired
    }

    /// Cancels the pending request for `key`; returns false if none was pending
    pub fn cancel(&mut self, key: &K) -> bool {
        self.abandon(key, AbandonReason::Cancelled)
    }

    /// Cancels everything that is pending
    pub fn cancel_all(&mut self) {
        let keys: Vec<K> = self.pending.keys().cloned().collect();
        for key in &keys {
            self.abandon(key, AbandonReason::Cancelled);
        }
    }

    /// Drops all knowledge of `key`, cancelling a pending request first
    pub fn forget(&mut self, key: &K) {
        if let Some(mut req) = self.pending.remove(key) {
            req.detach();
        }
        self.settled.remove(key);
    }

    pub fn state(&self, key: &K) -> RequestState {
        if let Some(req) = self.pending.get(key) {
            return RequestState::AwaitingReady(req.token);
        }
        self.settled.get(key).copied().unwrap_or(RequestState::Idle)
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn abandon(&mut self, key: &K, reason: AbandonReason) -> bool {
        let Some(mut req) = self.pending.remove(key) else {
            return false;
        };
        req.detach();
        self.settled
            .insert(key.clone(), RequestState::Abandoned(req.token, reason));
        if reason == AbandonReason::TimedOut {
            tracing::warn!(
                target: "lifecycle::deferred",
                ?key,
                token = %req.token,
                "element never became ready, abandoning request"
            );
        }
        true
    }
}

impl<K> Default for DeferredRequests<K>
where
    K: Clone + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for DeferredRequests<K> {
    fn drop(&mut self) {
        for req in self.pending.values_mut() {
            req.detach();
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for DeferredRequests<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredRequests")
            .field("pending", &self.pending.keys().collect::<Vec<_>>())
            .field("queued_wakes", &self.wakes.borrow().len())
            .finish()
    }
}
