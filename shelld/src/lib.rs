//! # Shell Host
//!
//! This crate wires the shell services into one session and runs it.
//!
//! ## Philosophy
//!
//! - **One owner**: The session owns dispatcher, coordinator and palette
//! - **Actions queue, the session executes**: Shortcut actions never re-enter
//! - **Background threads post messages**: Only the UI thread touches state
//! - **Deterministic mode is first-class**: Scripts run on a manual clock
//!
//! ## Responsibilities
//!
//! The host:
//! - Resolves settings into a shell configuration
//! - Registers the global actions from the keymap
//! - Exposes workspace commands through the command palette
//! - Replays input scripts against simulated panes
//!
//! ## Non-Responsibilities
//!
//! The host does NOT:
//! - Render panes or draw a UI
//! - Own pane widgets or their layout
//! - Persist workspaces anywhere but the configured store

pub mod commands;
pub mod input_script;
pub mod panes;
pub mod queue;
pub mod runtime;
pub mod session;

pub use commands::{CommandInbox, ShellCommand};
pub use input_script::{InputScript, InputScriptError, ScriptedInput};
pub use panes::{sim_registry, SimOptions, SimPane};
pub use queue::{UiMessage, UiQueue, UiSender};
pub use runtime::{HostRuntime, HostRuntimeConfig};
pub use session::ShellSession;

use services_command_palette::PaletteError;
use services_workspace_manager::WorkspaceError;
use thiserror::Error;

/// Host error types
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("Palette error: {0}")]
    Palette(#[from] PaletteError),

    #[error("Script error: {0}")]
    Script(#[from] InputScriptError),

    #[error("No command matches {0:?}")]
    NoMatch(String),

    #[error("UI queue closed")]
    QueueClosed,
}
