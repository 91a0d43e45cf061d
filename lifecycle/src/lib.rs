//! # Lifecycle
//!
//! Readiness, deadline and deferred-request primitives for the shell.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: An element announces readiness, nobody polls for it
//! - **Testability first**: Time comes from a [`Clock`], tests drive a [`ManualClock`]
//! - **Mechanism not policy**: Callers decide what "ready" unblocks and how long to wait
//! - **No async runtime required**: Everything runs on the UI thread
//!
//! ## Core Concepts
//!
//! - `ReadySignal`: One-shot notification fired when an element is constructed
//! - `DeferredRequests`: At most one pending request per key, woken by a signal
//! - `RequestToken`: Monotonic identifier that lets stale wakes be ignored
//! - `Deadline` / `Timeout`: Optional bound on how long a request may wait

pub mod clock;
pub mod deferred;
pub mod ready;

pub use clock::{Clock, Deadline, ManualClock, MonotonicClock, Timeout};
pub use deferred::{AbandonReason, DeferredRequests, RequestState, RequestToken};
pub use ready::{ReadySignal, SubscriptionId};

use thiserror::Error;

/// Lifecycle errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Element is not ready yet")]
    NotReady,

    #[error("Request {0} was abandoned: {1}")]
    Abandoned(RequestToken, AbandonReason),
}
