//! UI thread message queue
//!
//! Background work (pane construction, file watchers) never touches shell
//! state. It posts a [`UiMessage`] through a [`UiSender`], and the UI thread
//! applies the queue in [`ShellSession::pump`](crate::ShellSession::pump).

use crate::HostError;
use core_types::{PaneId, WorkspaceId};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Notification marshaled onto the UI thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMessage {
    /// A pane finished constructing its UI
    PaneReady(PaneId),
    SwitchWorkspace(WorkspaceId),
    /// Run a palette command by id
    RunCommand { id: String, args: Vec<String> },
}

/// Sending half, safe to move to other threads
#[derive(Debug, Clone)]
pub struct UiSender {
    sender: Sender<UiMessage>,
}

impl UiSender {
    /// Posts a message; fails only once the session is gone
    pub fn post(&self, message: UiMessage) -> Result<(), HostError> {
        self.sender
            .send(message)
            .map_err(|_| HostError::QueueClosed)
    }
}

/// The UI thread's single message queue
#[derive(Debug)]
pub struct UiQueue {
    sender: Sender<UiMessage>,
    receiver: Receiver<UiMessage>,
}

impl UiQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> UiSender {
        UiSender {
            sender: self.sender.clone(),
        }
    }

    /// Takes every message posted so far without blocking
    pub fn drain(&self) -> Vec<UiMessage> {
        self.receiver.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for UiQueue {
    fn default() -> Self {
        Self::new()
    }
}
