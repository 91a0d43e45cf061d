//! Shell session: one dispatcher, one coordinator, one palette
//!
//! The session is the single owner of shell state on the UI thread. Key
//! presses, palette commands and queued background messages all enter
//! here, and every shell command they raise is executed here once the
//! dispatcher has returned.

use crate::commands::{CommandInbox, ShellCommand};
use crate::queue::{UiMessage, UiQueue, UiSender};
use crate::HostError;
use core_types::{FocusTarget, PaneId, PaneKind, SessionId, WorkspaceId};
use input_types::{ControlKind, KeyCode, Modifiers};
use lifecycle::{Clock, MonotonicClock, Timeout};
use services_command_palette::{CommandDescriptor, CommandHandler, CommandId, CommandPalette};
use services_focus_manager::FocusConfig;
use services_settings::{ShellConfig, SettingsRegistry};
use services_shortcuts::{actions, BindingInfo, Keymap, ShortcutDispatcher, TypingGuard};
use services_workspace_manager::{
    CoordinatorConfig, PaneLifecycleCoordinator, PaneRegistry, SwitchSummary, WorkspaceStore,
};

/// Global actions bound through the keymap, with their commands
const GLOBAL_ACTIONS: &[(&str, &str)] = &[
    (actions::SAVE, "Save workspace"),
    (actions::UNDO, "Undo"),
    (actions::REDO, "Redo"),
    (actions::COMMAND_PALETTE, "Command palette"),
    (actions::FOCUS_NEXT, "Next pane"),
    (actions::FOCUS_PREVIOUS, "Previous pane"),
    (actions::NAVIGATE_BACK, "Back"),
    (actions::CLOSE_PANE, "Close pane"),
];

fn command_for(action: &str) -> Option<ShellCommand> {
    let command = match action {
        actions::SAVE => ShellCommand::Save,
        actions::UNDO => ShellCommand::Undo,
        actions::REDO => ShellCommand::Redo,
        actions::COMMAND_PALETTE => ShellCommand::TogglePalette,
        actions::FOCUS_NEXT => ShellCommand::FocusNext,
        actions::FOCUS_PREVIOUS => ShellCommand::FocusPrevious,
        actions::NAVIGATE_BACK => ShellCommand::NavigateBack,
        actions::CLOSE_PANE => ShellCommand::ClosePane,
        _ => return None,
    };
    Some(command)
}

/// A running shell
pub struct ShellSession {
    id: SessionId,
    span: tracing::Span,
    config: ShellConfig,
    keymap: Keymap,
    shortcuts: ShortcutDispatcher,
    coordinator: PaneLifecycleCoordinator,
    palette: CommandPalette,
    palette_open: bool,
    commands: CommandInbox,
    queue: UiQueue,
    /// Set while consecutive text input goes into one undo entry
    typing: bool,
}

impl ShellSession {
    /// Creates a session using the monotonic system clock
    ///
    /// `panes` builds the pane registry; it receives the inbox pane
    /// shortcuts push their commands to.
    pub fn new(
        config: ShellConfig,
        store: impl WorkspaceStore + 'static,
        panes: impl FnOnce(&CommandInbox) -> PaneRegistry,
    ) -> Self {
        Self::with_clock(config, store, MonotonicClock, panes)
    }

    /// Creates a session from the settings of `profile`
    pub fn from_settings(
        settings: &SettingsRegistry,
        profile: &str,
        store: impl WorkspaceStore + 'static,
        panes: impl FnOnce(&CommandInbox) -> PaneRegistry,
    ) -> Self {
        Self::new(ShellConfig::from_registry(settings, profile), store, panes)
    }

    /// Creates a session with an explicit time source
    pub fn with_clock(
        config: ShellConfig,
        store: impl WorkspaceStore + 'static,
        clock: impl Clock + Clone + 'static,
        panes: impl FnOnce(&CommandInbox) -> PaneRegistry,
    ) -> Self {
        let id = SessionId::new();
        let span = tracing::info_span!(target: "shelld", "session", id = %id);

        let mut keymap = Keymap::default_global();
        for (action, chord) in &config.keymap_overrides {
            if let Some(previous) = keymap.bind(action.clone(), *chord) {
                tracing::debug!(target: "shelld", %action, %previous, %chord, "keymap override");
            }
        }

        let mut guard = TypingGuard::new();
        for chord in &config.passthrough {
            guard.allow(*chord);
        }

        let commands = CommandInbox::new();
        let mut shortcuts = ShortcutDispatcher::with_guard(guard);
        for (action, description) in GLOBAL_ACTIONS {
            if let Some(command) = command_for(action) {
                shortcuts.register_named(&keymap, action, commands.sink(command), *description);
            }
        }

        let coordinator_config = CoordinatorConfig {
            initial_workspace: config.default_workspace.clone(),
            undo_capacity: config.undo_capacity,
            focus: FocusConfig {
                history_depth: config.focus_history_depth,
                ready_timeout: config.ready_timeout.map(Timeout::after),
                ..FocusConfig::default()
            },
            ..CoordinatorConfig::default()
        };
        let registry = panes(&commands);
        let coordinator =
            PaneLifecycleCoordinator::with_clock(coordinator_config, registry, store, clock);

        let palette = build_palette(&commands, &keymap);
        tracing::info!(target: "shelld", session = %id, workspace = %config.default_workspace, "session created");

        Self {
            id,
            span,
            config,
            keymap,
            shortcuts,
            coordinator,
            palette,
            palette_open: false,
            commands,
            queue: UiQueue::new(),
            typing: false,
        }
    }

    /// Rebuilds the configured workspace from the store
    pub fn start(&mut self) -> SwitchSummary {
        let span = self.span.clone();
        let _enter = span.enter();
        let summary = self.coordinator.restore_current(&mut self.shortcuts);
        self.settle();
        summary
    }

    /// Key press as delivered by the UI framework
    ///
    /// Returns true if the shell consumed the key; false means it belongs
    /// to the focused control.
    pub fn on_key_press(
        &mut self,
        key: KeyCode,
        modifiers: Modifiers,
        control: ControlKind,
        active_pane: Option<&PaneId>,
    ) -> bool {
        let span = self.span.clone();
        let _enter = span.enter();
        let handled = self
            .shortcuts
            .handle_key_press(key, modifiers, control, active_pane);
        if handled {
            self.typing = false;
        }
        self.settle();
        handled
    }

    /// Key press routed to the coordinator's active pane
    pub fn key_press(&mut self, key: KeyCode, modifiers: Modifiers, control: ControlKind) -> bool {
        let active = self.coordinator.active_pane().cloned();
        self.on_key_press(key, modifiers, control, active.as_ref())
    }

    /// Appends text to the focused control of the active pane
    ///
    /// Stands in for the UI framework inserting characters. The first
    /// insertion of a typing run records an undo checkpoint.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let Some(pane) = self.coordinator.active_pane().cloned() else {
            tracing::debug!(target: "shelld", "no active pane, dropping text");
            return false;
        };
        let Some(target) = self
            .coordinator
            .focus_history()
            .last_focus(&pane)
            .map(|record| record.target.clone())
        else {
            return false;
        };

        if !self.typing {
            self.coordinator.checkpoint();
            self.typing = true;
        }

        let inserted = self.coordinator.with_pane(&pane, |p| {
            let mut state = p.save_state();
            let current = state
                .get_str(target.as_str())
                .unwrap_or_default()
                .to_string();
            state.insert(target.as_str(), current + text);
            p.restore_state(&state)
        });

        match inserted {
            Some(Ok(())) => true,
            Some(Err(err)) => {
                tracing::warn!(target: "shelld", %pane, error = %err, "pane rejected typed text");
                false
            }
            None => false,
        }
    }

    /// Opens a pane of a registered kind and focuses it
    pub fn open_pane(
        &mut self,
        pane: impl Into<PaneId>,
        kind: impl Into<PaneKind>,
    ) -> Result<bool, HostError> {
        let span = self.span.clone();
        let _enter = span.enter();
        let pane = pane.into();
        let opened = self
            .coordinator
            .open_pane_of_kind(&pane, &kind.into(), &mut self.shortcuts)?;
        if opened {
            self.coordinator.focus_pane(&pane);
        }
        self.settle();
        Ok(opened)
    }

    /// Moves focus to a pane
    pub fn focus_pane(&mut self, pane: &PaneId) -> bool {
        self.typing = false;
        let focused = self.coordinator.focus_pane(pane);
        self.settle();
        focused
    }

    /// Fires a pane's readiness signal, as the UI does when construction ends
    pub fn mark_ready(&mut self, pane: &PaneId) -> bool {
        let Some(signal) = self.coordinator.pane_ready(pane) else {
            tracing::warn!(target: "shelld", %pane, "readiness reported for a pane that is not open");
            return false;
        };
        signal.mark_ready();
        self.settle();
        true
    }

    pub fn switch_workspace(&mut self, workspace: &WorkspaceId) -> SwitchSummary {
        let span = self.span.clone();
        let _enter = span.enter();
        self.typing = false;
        let summary = self
            .coordinator
            .switch_workspace(workspace, &mut self.shortcuts);
        self.settle();
        summary
    }

    /// Runs the commands raised by a palette command
    pub fn run_command(&mut self, id: &str, args: &[String]) -> Result<String, HostError> {
        let span = self.span.clone();
        let _enter = span.enter();
        let result = self.palette.execute_command(&CommandId::new(id), args);
        self.palette_open = false;
        self.settle();
        Ok(result?)
    }

    /// Runs the best palette match for `query`
    pub fn run_best(&mut self, query: &str) -> Result<String, HostError> {
        let best = self
            .palette
            .filter_commands(query)
            .into_iter()
            .next()
            .ok_or_else(|| HostError::NoMatch(query.to_string()))?;
        self.run_command(best.id.as_str(), &[])
    }

    /// Palette entries matching `query`, best first
    pub fn palette_matches(&self, query: &str) -> Vec<CommandDescriptor> {
        self.palette.filter_commands(query)
    }

    /// Applies messages posted from other threads, then settles focus
    ///
    /// Returns the number of messages applied.
    pub fn pump(&mut self) -> usize {
        let span = self.span.clone();
        let _enter = span.enter();
        let messages = self.queue.drain();
        let count = messages.len();
        for message in messages {
            match message {
                UiMessage::PaneReady(pane) => {
                    self.mark_ready(&pane);
                }
                UiMessage::SwitchWorkspace(workspace) => {
                    self.switch_workspace(&workspace);
                }
                UiMessage::RunCommand { id, args } => {
                    if let Err(err) = self.run_command(&id, &args) {
                        tracing::warn!(target: "shelld", command = %id, error = %err, "queued command failed");
                    }
                }
            }
        }
        self.settle();
        count
    }

    /// Sender for background threads
    pub fn ui_sender(&self) -> UiSender {
        self.queue.sender()
    }

    /// Effective shortcuts for the active pane, for a help overlay
    pub fn help(&self) -> Vec<BindingInfo> {
        self.shortcuts.describe(self.coordinator.active_pane())
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn shortcuts(&self) -> &ShortcutDispatcher {
        &self.shortcuts
    }

    pub fn coordinator(&self) -> &PaneLifecycleCoordinator {
        &self.coordinator
    }

    pub fn is_palette_open(&self) -> bool {
        self.palette_open
    }

    /// Executes queued commands and re-drives focus that became possible
    fn settle(&mut self) {
        self.run_pending_commands();
        if self.coordinator.has_ready_work() {
            self.coordinator.process_ready();
        }
        self.coordinator.expire();
    }

    fn run_pending_commands(&mut self) {
        for command in self.commands.take() {
            tracing::debug!(target: "shelld", %command, "running shell command");
            self.execute(command);
        }
    }

    fn execute(&mut self, command: ShellCommand) {
        match command {
            ShellCommand::Save => {
                if let Err(err) = self.coordinator.save_current() {
                    tracing::warn!(target: "shelld", error = %err, "save failed");
                }
            }
            ShellCommand::Undo => {
                self.typing = false;
                self.coordinator.undo();
            }
            ShellCommand::Redo => {
                self.typing = false;
                self.coordinator.redo();
            }
            ShellCommand::TogglePalette => {
                self.palette_open = !self.palette_open;
            }
            ShellCommand::FocusNext => {
                self.typing = false;
                if let Err(err) = self.coordinator.focus_next() {
                    tracing::debug!(target: "shelld", error = %err, "focus next ignored");
                }
            }
            ShellCommand::FocusPrevious => {
                self.typing = false;
                if let Err(err) = self.coordinator.focus_previous() {
                    tracing::debug!(target: "shelld", error = %err, "focus previous ignored");
                }
            }
            ShellCommand::NavigateBack => {
                self.typing = false;
                self.coordinator.navigate_back();
            }
            ShellCommand::ClosePane => {
                self.typing = false;
                if let Some(pane) = self.coordinator.active_pane().cloned() {
                    if let Err(err) = self.coordinator.close_pane(&pane, &mut self.shortcuts) {
                        tracing::warn!(target: "shelld", %pane, error = %err, "close failed");
                    }
                }
            }
            ShellCommand::FocusControl { pane, target } => {
                self.typing = false;
                self.focus_control(&pane, target);
            }
            ShellCommand::SwitchWorkspace(workspace) => {
                self.typing = false;
                self.coordinator
                    .switch_workspace(&workspace, &mut self.shortcuts);
            }
        }
    }

    /// Moves focus inside a pane if the control exists and is ready
    fn focus_control(&mut self, pane: &PaneId, target: FocusTarget) {
        let focused = self.coordinator.with_pane(pane, |p| {
            let element = p.as_focusable();
            let ready = element
                .ready_signal(&target)
                .is_some_and(|signal| signal.is_ready());
            ready && element.focus(&target)
        });

        match focused {
            Some(true) => self.coordinator.record_focus(pane, target),
            Some(false) => {
                tracing::warn!(target: "shelld", %pane, %target, "control not available for focus")
            }
            None => tracing::warn!(target: "shelld", %pane, "focus command for a pane that is not open"),
        }
    }
}

impl std::fmt::Debug for ShellSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellSession")
            .field("id", &self.id)
            .field("coordinator", &self.coordinator)
            .field("pending_commands", &self.commands.len())
            .finish()
    }
}

fn build_palette(commands: &CommandInbox, keymap: &Keymap) -> CommandPalette {
    let mut palette = CommandPalette::new();
    let entries: &[(&str, &str, &str, &[&str], Option<&str>, ShellCommand)] = &[
        ("workspace.save", "Save Workspace", "Write open panes to the store", &["save", "write"], Some(actions::SAVE), ShellCommand::Save),
        ("edit.undo", "Undo", "Undo the last change", &["revert"], Some(actions::UNDO), ShellCommand::Undo),
        ("edit.redo", "Redo", "Redo the last undone change", &["repeat"], Some(actions::REDO), ShellCommand::Redo),
        ("focus.next", "Next Pane", "Focus the next pane", &["cycle", "tab"], Some(actions::FOCUS_NEXT), ShellCommand::FocusNext),
        ("focus.previous", "Previous Pane", "Focus the previous pane", &["cycle"], Some(actions::FOCUS_PREVIOUS), ShellCommand::FocusPrevious),
        ("focus.back", "Go Back", "Return to the previously focused control", &["history"], Some(actions::NAVIGATE_BACK), ShellCommand::NavigateBack),
        ("pane.close", "Close Pane", "Close the active pane", &["quit"], Some(actions::CLOSE_PANE), ShellCommand::ClosePane),
    ];

    for (id, name, description, tags, action, command) in entries {
        let mut descriptor = CommandDescriptor::new(
            *id,
            *name,
            *description,
            tags.iter().map(|t| t.to_string()).collect(),
        );
        if let Some(chord) = action.and_then(|a| keymap.chord_for(a)) {
            descriptor = descriptor.with_keybinding(chord);
        }
        let inbox = commands.clone();
        let command = command.clone();
        let handler: CommandHandler = Box::new(move |_args: &[String]| {
            inbox.push(command.clone());
            Ok(command.to_string())
        });
        palette.register_command(descriptor, handler);
    }

    let inbox = commands.clone();
    palette.register_command(
        CommandDescriptor::new(
            "workspace.switch",
            "Switch Workspace",
            "Save this workspace and open another",
            vec!["workspace".to_string(), "open".to_string()],
        ),
        Box::new(move |args: &[String]| {
            let name = args
                .first()
                .ok_or_else(|| "missing workspace name".to_string())?;
            let command = ShellCommand::SwitchWorkspace(WorkspaceId::new(name.as_str()));
            let message = command.to_string();
            inbox.push(command);
            Ok(message)
        }),
    );

    palette
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panes::{sim_registry, SimOptions, NOTES, TASKS};
    use input_types::KeyChord;
    use services_workspace_manager::InMemoryWorkspaceStore;

    fn session(start_ready: bool) -> ShellSession {
        ShellSession::with_clock(
            ShellConfig::default(),
            InMemoryWorkspaceStore::new(),
            lifecycle::ManualClock::new(),
            |inbox| sim_registry(inbox, SimOptions { start_ready }),
        )
    }

    #[test]
    fn test_global_actions_are_bound() {
        let session = session(true);
        let help = session.help();
        assert!(help
            .iter()
            .any(|b| b.chord == KeyChord::ctrl(KeyCode::S) && b.description == "Save workspace"));
        assert_eq!(session.shortcuts().binding_count(), GLOBAL_ACTIONS.len());
    }

    #[test]
    fn test_open_focuses_new_pane() {
        let mut session = session(true);
        assert!(session.open_pane("Notes", NOTES).unwrap());
        assert!(!session.open_pane("Notes", NOTES).unwrap());
        assert_eq!(
            session.coordinator().active_pane(),
            Some(&PaneId::new("Notes"))
        );
    }

    #[test]
    fn test_open_unknown_kind_fails() {
        let mut session = session(true);
        assert!(matches!(
            session.open_pane("Sheet", "spreadsheet"),
            Err(HostError::Workspace(_))
        ));
    }

    #[test]
    fn test_palette_toggle() {
        let mut session = session(true);
        assert!(session.key_press(KeyCode::P, Modifiers::CTRL, ControlKind::None));
        assert!(session.is_palette_open());
        assert!(session.key_press(KeyCode::P, Modifiers::CTRL, ControlKind::None));
        assert!(!session.is_palette_open());
    }

    #[test]
    fn test_focus_cycling_by_keyboard() {
        let mut session = session(true);
        session.open_pane("Notes", NOTES).unwrap();
        session.open_pane("Tasks", TASKS).unwrap();

        assert!(session.key_press(KeyCode::Tab, Modifiers::CTRL, ControlKind::None));
        assert_eq!(
            session.coordinator().active_pane(),
            Some(&PaneId::new("Notes"))
        );
    }

    #[test]
    fn test_switch_command_requires_argument() {
        let mut session = session(true);
        assert!(matches!(
            session.run_command("workspace.switch", &[]),
            Err(HostError::Palette(_))
        ));

        session
            .run_command("workspace.switch", &["side".to_string()])
            .unwrap();
        assert_eq!(
            session.coordinator().current_workspace(),
            &WorkspaceId::new("side")
        );
    }

    #[test]
    fn test_run_best_uses_fuzzy_match() {
        let mut session = session(true);
        session.open_pane("Notes", NOTES).unwrap();
        assert_eq!(session.run_best("save").unwrap(), "save");
        assert!(matches!(session.run_best("zzzz"), Err(HostError::NoMatch(_))));
    }

    #[test]
    fn test_keymap_override_rebinds_save() {
        let mut config = ShellConfig::default();
        config
            .keymap_overrides
            .insert(actions::SAVE.to_string(), KeyChord::new(KeyCode::S, Modifiers::ALT));
        let session = ShellSession::new(config, InMemoryWorkspaceStore::new(), |inbox| {
            sim_registry(inbox, SimOptions::default())
        });

        assert_eq!(
            session.keymap().chord_for(actions::SAVE),
            Some(KeyChord::new(KeyCode::S, Modifiers::ALT))
        );
        assert!(!session
            .shortcuts()
            .is_bound(&services_shortcuts::Scope::Global, &KeyChord::ctrl(KeyCode::S)));
    }
}
