//! Simulated panes for scripted runs
//!
//! A [`SimPane`] stands in for a real pane UI: it has named controls, a
//! readiness signal the host fires once "construction" is done, and state
//! made of one text value per control.

use crate::commands::{CommandInbox, ShellCommand};
use core_types::{FocusTarget, PaneId, PaneKind};
use input_types::{KeyChord, KeyCode};
use lifecycle::ReadySignal;
use services_focus_manager::Focusable;
use services_shortcuts::ShortcutDispatcher;
use services_workspace_manager::{Pane, PaneError, PaneRegistry, PaneStateBlob};
use std::collections::BTreeMap;

/// Note-taking pane kind
pub const NOTES: &str = "notes";
/// Task-list pane kind
pub const TASKS: &str = "tasks";

/// Control that receives search input in every simulated pane
pub const SEARCH_BOX: &str = "searchBox";

/// How simulated panes come up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimOptions {
    /// Build panes already ready instead of waiting for a `ready` call
    pub start_ready: bool,
}

/// A pane with named text controls and no rendering
pub struct SimPane {
    id: PaneId,
    kind: PaneKind,
    /// Control contents keyed by target name, preferred target first
    controls: Vec<(FocusTarget, String)>,
    ready: ReadySignal,
    focused: Option<FocusTarget>,
    commands: CommandInbox,
}

impl SimPane {
    pub fn new(
        id: PaneId,
        kind: PaneKind,
        targets: &[&str],
        ready: ReadySignal,
        commands: CommandInbox,
    ) -> Self {
        Self {
            id,
            kind,
            controls: targets
                .iter()
                .map(|t| (FocusTarget::new(*t), String::new()))
                .collect(),
            ready,
            focused: None,
            commands,
        }
    }

    /// A notes pane: editor plus search box
    pub fn notes(id: PaneId, ready: ReadySignal, commands: CommandInbox) -> Self {
        Self::new(id, PaneKind::new(NOTES), &["editor", SEARCH_BOX], ready, commands)
    }

    /// A task pane: task list plus search box
    pub fn tasks(id: PaneId, ready: ReadySignal, commands: CommandInbox) -> Self {
        Self::new(id, PaneKind::new(TASKS), &["taskList", SEARCH_BOX], ready, commands)
    }

    pub fn focused(&self) -> Option<&FocusTarget> {
        self.focused.as_ref()
    }

    pub fn text(&self, target: &str) -> Option<&str> {
        self.controls
            .iter()
            .find(|(t, _)| t.as_str() == target)
            .map(|(_, text)| text.as_str())
    }
}

impl Focusable for SimPane {
    fn focus_targets(&self) -> Vec<FocusTarget> {
        self.controls.iter().map(|(t, _)| t.clone()).collect()
    }

    fn ready_signal(&self, target: &FocusTarget) -> Option<ReadySignal> {
        self.controls
            .iter()
            .any(|(t, _)| t == target)
            .then(|| self.ready.clone())
    }

    fn focus(&mut self, target: &FocusTarget) -> bool {
        if !self.ready.is_ready() || self.ready_signal(target).is_none() {
            return false;
        }
        tracing::trace!(target: "shelld", pane = %self.id, %target, "control focused");
        self.focused = Some(target.clone());
        true
    }
}

impl Pane for SimPane {
    fn pane_id(&self) -> &PaneId {
        &self.id
    }

    fn kind(&self) -> PaneKind {
        self.kind.clone()
    }

    fn initialize(&mut self, shortcuts: &mut ShortcutDispatcher) {
        shortcuts.register_for_pane(
            &self.id,
            KeyChord::bare(KeyCode::S),
            self.commands.sink(ShellCommand::FocusControl {
                pane: self.id.clone(),
                target: FocusTarget::new(SEARCH_BOX),
            }),
            format!("Search {}", self.id),
        );
    }

    fn dispose(&mut self) {
        self.focused = None;
    }

    fn save_state(&self) -> PaneStateBlob {
        let mut blob = PaneStateBlob::new(self.id.clone(), self.kind.clone());
        for (target, text) in &self.controls {
            blob.insert(target.as_str(), text.as_str());
        }
        blob
    }

    fn restore_state(&mut self, state: &PaneStateBlob) -> Result<(), PaneError> {
        state.expect_kind(&self.kind)?;
        let mut restored = BTreeMap::new();
        for (target, _) in &self.controls {
            if let Some(value) = state.get(target.as_str()) {
                let text = value.as_str().ok_or_else(|| PaneError::BadField {
                    field: target.to_string(),
                })?;
                restored.insert(target.clone(), text.to_string());
            }
        }
        for (target, text) in &mut self.controls {
            *text = restored.remove(&*target).unwrap_or_default();
        }
        Ok(())
    }

    fn pane_ready(&self) -> ReadySignal {
        self.ready.clone()
    }

    fn as_focusable(&mut self) -> &mut dyn Focusable {
        self
    }
}

/// Registry that builds [`SimPane`]s for the `notes` and `tasks` kinds
pub fn sim_registry(commands: &CommandInbox, options: SimOptions) -> PaneRegistry {
    let signal = move || {
        if options.start_ready {
            ReadySignal::ready()
        } else {
            ReadySignal::new()
        }
    };

    let mut registry = PaneRegistry::new();
    let inbox = commands.clone();
    registry.register(NOTES, move |id| {
        Box::new(SimPane::notes(id.clone(), signal(), inbox.clone())) as Box<dyn Pane>
    });
    let inbox = commands.clone();
    registry.register(TASKS, move |id| {
        Box::new(SimPane::tasks(id.clone(), signal(), inbox.clone())) as Box<dyn Pane>
    });
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes() -> SimPane {
        SimPane::notes(PaneId::new("Notes"), ReadySignal::new(), CommandInbox::new())
    }

    #[test]
    fn test_focus_refused_before_ready() {
        let mut pane = notes();
        assert!(!pane.focus(&FocusTarget::new("editor")));

        pane.pane_ready().mark_ready();
        assert!(pane.focus(&FocusTarget::new("editor")));
        assert_eq!(pane.focused(), Some(&FocusTarget::new("editor")));
        assert!(!pane.focus(&FocusTarget::new("missing")));
    }

    #[test]
    fn test_default_target_is_first_control() {
        assert_eq!(notes().default_target(), Some(FocusTarget::new("editor")));
    }

    #[test]
    fn test_state_is_keyed_by_control() {
        let mut pane = notes();
        let blob = PaneStateBlob::new(PaneId::new("Notes"), PaneKind::new(NOTES))
            .with("editor", "draft")
            .with(SEARCH_BOX, "milk");
        pane.restore_state(&blob).unwrap();

        assert_eq!(pane.text("editor"), Some("draft"));
        assert_eq!(pane.text(SEARCH_BOX), Some("milk"));
        assert_eq!(pane.save_state(), blob);
    }

    #[test]
    fn test_restore_rejects_other_kind() {
        let mut pane = notes();
        let blob = PaneStateBlob::new(PaneId::new("Notes"), PaneKind::new(TASKS));
        assert!(matches!(
            pane.restore_state(&blob),
            Err(PaneError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_search_shortcut_queues_focus_command() {
        let inbox = CommandInbox::new();
        let mut pane = SimPane::notes(PaneId::new("Notes"), ReadySignal::ready(), inbox.clone());
        let mut shortcuts = ShortcutDispatcher::new();
        pane.initialize(&mut shortcuts);

        assert!(shortcuts.handle_key_press(
            KeyCode::S,
            input_types::Modifiers::NONE,
            input_types::ControlKind::None,
            Some(&PaneId::new("Notes")),
        ));
        assert_eq!(
            inbox.take(),
            vec![ShellCommand::FocusControl {
                pane: PaneId::new("Notes"),
                target: FocusTarget::new(SEARCH_BOX),
            }]
        );
    }
}
