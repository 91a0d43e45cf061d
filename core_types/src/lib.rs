//! # Core Types
//!
//! Identifiers shared by every crate of the shell.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: panes, workspaces and focus targets each get
//!   their own type so they cannot be confused.
//! - **Serializable**: every ID round-trips through persisted workspace state.
//!
//! ## Key Types
//!
//! - [`PaneId`]: identifier of an open pane
//! - [`PaneKind`]: pane type used to pick a factory
//! - [`WorkspaceId`]: identifier of a workspace
//! - [`FocusTarget`]: named logical control inside a pane
//! - [`SessionId`]: identifier of a running shell session

pub mod ids;

pub use ids::{FocusTarget, PaneId, PaneKind, SessionId, WorkspaceId};
