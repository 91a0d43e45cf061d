//! # Host Runtime
//!
//! Replays an input script against a shell session with simulated panes
//! and a manual clock, and keeps a transcript of what each step did.

use crate::input_script::{InputScript, ScriptedInput};
use crate::panes::{sim_registry, SimOptions};
use crate::queue::UiMessage;
use crate::session::ShellSession;
use crate::HostError;
use input_types::{ControlKind, KeyCode, Modifiers};
use lifecycle::ManualClock;
use services_settings::persistence::restore_into;
use services_settings::{create_default_registry, ShellConfig};
use services_workspace_manager::InMemoryWorkspaceStore;
use std::time::Duration;

/// Host runtime configuration
#[derive(Debug, Clone)]
pub struct HostRuntimeConfig {
    /// Script text to replay
    pub script: Option<String>,
    /// Settings profile to resolve
    pub profile: String,
    /// Serialized settings overrides
    pub settings: Option<Vec<u8>>,
    /// Build panes already ready instead of waiting for `ready` steps
    pub start_ready: bool,
}

impl Default for HostRuntimeConfig {
    fn default() -> Self {
        Self {
            script: None,
            profile: "default".to_string(),
            settings: None,
            start_ready: false,
        }
    }
}

/// Host runtime
pub struct HostRuntime {
    session: ShellSession,
    clock: ManualClock,
    script: Option<InputScript>,
    /// Kind of control the following keys land in
    control: ControlKind,
    transcript: Vec<String>,
    steps: usize,
}

impl HostRuntime {
    pub fn new(config: HostRuntimeConfig) -> Result<Self, HostError> {
        let script = config
            .script
            .as_deref()
            .map(InputScript::from_text)
            .transpose()?;

        let mut settings = create_default_registry();
        if let Some(bytes) = &config.settings {
            restore_into(&mut settings, bytes);
        }
        let shell_config = ShellConfig::from_registry(&settings, &config.profile);

        let clock = ManualClock::new();
        let options = SimOptions {
            start_ready: config.start_ready,
        };
        let mut session = ShellSession::with_clock(
            shell_config,
            InMemoryWorkspaceStore::new(),
            clock.clone(),
            |inbox| sim_registry(inbox, options),
        );
        session.start();

        Ok(Self {
            session,
            clock,
            script,
            control: ControlKind::None,
            transcript: Vec::new(),
            steps: 0,
        })
    }

    /// Replays the whole script and returns the transcript
    pub fn run(&mut self) -> Result<&[String], HostError> {
        while let Some(input) = self.script.as_mut().and_then(|s| s.next_input()) {
            self.step(input)?;
        }
        let status = self.status_line();
        self.transcript.push(status);
        Ok(&self.transcript)
    }

    /// Applies one scripted step
    pub fn step(&mut self, input: ScriptedInput) -> Result<(), HostError> {
        self.steps += 1;
        let line = match input {
            ScriptedInput::Key(chord) => {
                let handled = self
                    .session
                    .key_press(chord.key, chord.modifiers, self.control);
                format!("key {}: {}", chord, outcome(handled))
            }
            ScriptedInput::Text(text) => {
                self.type_text(&text);
                format!("type {:?}", text)
            }
            ScriptedInput::Control(kind) => {
                self.control = kind;
                format!("control {:?}", kind)
            }
            ScriptedInput::Open { pane, kind } => {
                let opened = self.session.open_pane(pane.clone(), kind.clone())?;
                if opened {
                    format!("open {} ({})", pane, kind)
                } else {
                    format!("open {}: already open", pane)
                }
            }
            ScriptedInput::Focus(pane) => {
                if self.session.focus_pane(&pane) {
                    format!("focus {}", pane)
                } else {
                    format!("focus {}: pending", pane)
                }
            }
            ScriptedInput::Ready(pane) => {
                self.session
                    .ui_sender()
                    .post(UiMessage::PaneReady(pane.clone()))?;
                self.session.pump();
                format!("ready {}", pane)
            }
            ScriptedInput::Switch(workspace) => {
                let summary = self.session.switch_workspace(&workspace);
                format!(
                    "switch {}: {} opened, {} skipped",
                    summary.workspace,
                    summary.opened.len(),
                    summary.skipped.len()
                )
            }
            ScriptedInput::Run { id, args } => {
                let result = self.session.run_command(&id, &args)?;
                format!("run {}: {}", id, result)
            }
            ScriptedInput::Wait(millis) => {
                self.clock.advance(Duration::from_millis(millis));
                self.session.pump();
                format!("wait {}ms", millis)
            }
        };
        tracing::debug!(target: "shelld", step = self.steps, %line, "script step");
        self.transcript.push(line);
        Ok(())
    }

    /// Sends each character through the dispatcher first, like a real key
    /// press, and inserts it only if no shortcut consumed it
    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            if let Some(code) = KeyCode::from_char(c) {
                if self.session.key_press(code, Modifiers::NONE, self.control) {
                    self.transcript.push(format!("key {}: handled", code));
                    continue;
                }
            }
            self.session.insert_text(c.encode_utf8(&mut [0; 4]));
        }
    }

    /// One-line summary of workspace, active pane and focused control
    pub fn status_line(&self) -> String {
        let coordinator = self.session.coordinator();
        let active = coordinator.active_pane();
        let target = active
            .and_then(|pane| coordinator.focus_history().last_focus(pane))
            .map(|record| record.target.to_string());
        format!(
            "workspace {} | active {} | focus {}",
            coordinator.current_workspace(),
            active.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
            target.unwrap_or_else(|| "-".to_string())
        )
    }

    pub fn session(&self) -> &ShellSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ShellSession {
        &mut self.session
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}

fn outcome(handled: bool) -> &'static str {
    if handled {
        "handled"
    } else {
        "passed through"
    }
}
