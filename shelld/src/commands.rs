//! Shell commands raised by shortcut and palette actions
//!
//! Actions never reach into the session while the dispatcher is running
//! them. They push a [`ShellCommand`] onto the [`CommandInbox`] and the
//! session executes the queue once dispatch has returned.

use core_types::{FocusTarget, PaneId, WorkspaceId};
use services_shortcuts::ActionResult;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Something the session should do after dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Write the current workspace to the store
    Save,
    Undo,
    Redo,
    /// Open or close the command palette
    TogglePalette,
    FocusNext,
    FocusPrevious,
    NavigateBack,
    /// Close the active pane
    ClosePane,
    /// Move focus to a control inside a pane
    FocusControl { pane: PaneId, target: FocusTarget },
    SwitchWorkspace(WorkspaceId),
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellCommand::Save => write!(f, "save"),
            ShellCommand::Undo => write!(f, "undo"),
            ShellCommand::Redo => write!(f, "redo"),
            ShellCommand::TogglePalette => write!(f, "toggle palette"),
            ShellCommand::FocusNext => write!(f, "focus next"),
            ShellCommand::FocusPrevious => write!(f, "focus previous"),
            ShellCommand::NavigateBack => write!(f, "navigate back"),
            ShellCommand::ClosePane => write!(f, "close pane"),
            ShellCommand::FocusControl { pane, target } => write!(f, "focus {}/{}", pane, target),
            ShellCommand::SwitchWorkspace(workspace) => write!(f, "switch to {}", workspace),
        }
    }
}

/// Shared FIFO of pending shell commands
///
/// Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct CommandInbox {
    queue: Rc<RefCell<VecDeque<ShellCommand>>>,
}

impl CommandInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: ShellCommand) {
        self.queue.borrow_mut().push_back(command);
    }

    /// Removes and returns everything queued, oldest first
    pub fn take(&self) -> Vec<ShellCommand> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Shortcut action that queues `command` each time it fires
    pub fn sink(&self, command: ShellCommand) -> impl FnMut() -> ActionResult + 'static {
        let inbox = self.clone();
        move || {
            inbox.push(command.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbox_is_fifo() {
        let inbox = CommandInbox::new();
        inbox.push(ShellCommand::Save);
        inbox.push(ShellCommand::Undo);

        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox.take(), vec![ShellCommand::Save, ShellCommand::Undo]);
        assert!(inbox.is_empty());
    }

    #[test]
    fn test_sink_pushes_on_every_call() {
        let inbox = CommandInbox::new();
        let mut action = inbox.sink(ShellCommand::FocusNext);

        action().unwrap();
        action().unwrap();
        assert_eq!(inbox.take(), vec![ShellCommand::FocusNext, ShellCommand::FocusNext]);
    }

    #[test]
    fn test_display() {
        let command = ShellCommand::FocusControl {
            pane: PaneId::new("Notes"),
            target: FocusTarget::new("searchBox"),
        };
        assert_eq!(command.to_string(), "focus Notes/searchBox");
        assert_eq!(
            ShellCommand::SwitchWorkspace(WorkspaceId::new("side")).to_string(),
            "switch to side"
        );
    }
}
