//! # Input Script Parser
//!
//! Line-based scripts that drive a shell session deterministically.
//!
//! ## Format
//!
//! - Chords: `Ctrl+S`, `Alt+Left`, `Escape`, `s` (single key, no modifiers)
//! - Text: `"buy milk"` (typed into the focused control, key by key)
//! - Control kind under the cursor: `control text`, `control none`, `control list`
//! - Panes: `open Notes notes`, `focus Notes`, `ready Notes`
//! - Workspaces: `switch side`
//! - Palette commands: `run workspace.switch side`, or `back`, `undo`, `redo`
//! - Delays: `wait 250ms`, `wait 1s`
//! - Comments: `# ...`
//!
//! ## Example
//!
//! ```text
//! open Notes notes
//! ready Notes
//! control text
//! "buy milk"
//! s              # reaches the text box
//! Ctrl+S         # saves the workspace
//! ```

use core_types::{PaneId, PaneKind, WorkspaceId};
use input_types::{ControlKind, KeyChord};
use std::collections::VecDeque;
use thiserror::Error;

/// Input script error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputScriptError {
    #[error("Invalid chord: {0}")]
    InvalidChord(String),

    #[error("Unknown control kind: {0}")]
    UnknownControl(String),

    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Empty script")]
    EmptyScript,

    #[error("Invalid delay format: {0}")]
    InvalidDelay(String),
}

/// A single scripted step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedInput {
    /// A key press
    Key(KeyChord),
    /// Characters typed into the focused control
    Text(String),
    /// Kind of control holding focus for the following keys
    Control(ControlKind),
    Open { pane: PaneId, kind: PaneKind },
    Focus(PaneId),
    /// The pane finished constructing its UI
    Ready(PaneId),
    Switch(WorkspaceId),
    /// Palette command with arguments
    Run { id: String, args: Vec<String> },
    /// Wait for a duration (in milliseconds)
    Wait(u64),
}

/// Parsed input script
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    inputs: VecDeque<ScriptedInput>,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, InputScriptError> {
        let mut inputs = VecDeque::new();

        for (line_num, line) in text.lines().enumerate() {
            let line = strip_comment(line).trim();
            if line.is_empty() {
                continue;
            }
            inputs.push_back(Self::parse_line(line, line_num + 1)?);
        }

        if inputs.is_empty() {
            return Err(InputScriptError::EmptyScript);
        }

        Ok(Self { inputs })
    }

    fn parse_line(line: &str, line_num: usize) -> Result<ScriptedInput, InputScriptError> {
        let at_line = |message: String| InputScriptError::ParseError {
            line: line_num,
            message,
        };

        if line.len() >= 2 && line.starts_with('"') && line.ends_with('"') {
            return Ok(ScriptedInput::Text(line[1..line.len() - 1].to_string()));
        }

        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(at_line("empty line".to_string()));
        };
        let rest: Vec<&str> = words.collect();

        let one = |what: &str| -> Result<String, InputScriptError> {
            match rest.as_slice() {
                [value] => Ok(value.to_string()),
                _ => Err(at_line(format!("{} takes exactly one {}", head, what))),
            }
        };

        match head {
            "wait" => {
                let millis = Self::parse_duration(&rest.join(" "))
                    .map_err(|e| at_line(e.to_string()))?;
                Ok(ScriptedInput::Wait(millis))
            }
            "control" => Ok(ScriptedInput::Control(Self::parse_control(&one("kind")?)?)),
            "open" => match rest.as_slice() {
                [pane, kind] => Ok(ScriptedInput::Open {
                    pane: PaneId::new(*pane),
                    kind: PaneKind::new(*kind),
                }),
                _ => Err(at_line("usage: open <pane> <kind>".to_string())),
            },
            "focus" => Ok(ScriptedInput::Focus(PaneId::new(one("pane")?))),
            "ready" => Ok(ScriptedInput::Ready(PaneId::new(one("pane")?))),
            "switch" => Ok(ScriptedInput::Switch(WorkspaceId::new(one("workspace")?))),
            "back" | "undo" | "redo" if rest.is_empty() => Ok(ScriptedInput::Run {
                id: shorthand_command(head).to_string(),
                args: Vec::new(),
            }),
            "run" => match rest.split_first() {
                Some((id, args)) => Ok(ScriptedInput::Run {
                    id: id.to_string(),
                    args: args.iter().map(|a| a.to_string()).collect(),
                }),
                None => Err(at_line("usage: run <command> [args]".to_string())),
            },
            _ if rest.is_empty() => line
                .parse::<KeyChord>()
                .map(ScriptedInput::Key)
                .map_err(|e| InputScriptError::InvalidChord(format!("{} ({})", line, e))),
            _ => Err(at_line(format!("unknown directive: {}", head))),
        }
    }

    fn parse_control(name: &str) -> Result<ControlKind, InputScriptError> {
        match name.to_lowercase().as_str() {
            "none" => Ok(ControlKind::None),
            "text" | "textinput" => Ok(ControlKind::TextInput),
            "textarea" | "editor" => Ok(ControlKind::TextArea),
            "button" => Ok(ControlKind::Button),
            "list" => Ok(ControlKind::List),
            "other" => Ok(ControlKind::Other),
            _ => Err(InputScriptError::UnknownControl(name.to_string())),
        }
    }

    /// Parses a duration string (e.g., "100ms", "1s")
    fn parse_duration(s: &str) -> Result<u64, InputScriptError> {
        let s = s.trim().to_lowercase();

        if let Some(ms_str) = s.strip_suffix("ms") {
            ms_str
                .trim()
                .parse::<u64>()
                .map_err(|_| InputScriptError::InvalidDelay(s.to_string()))
        } else if let Some(s_str) = s.strip_suffix('s') {
            s_str
                .trim()
                .parse::<u64>()
                .map(|s| s * 1000)
                .map_err(|_| InputScriptError::InvalidDelay(s.to_string()))
        } else {
            Err(InputScriptError::InvalidDelay(s.to_string()))
        }
    }

    /// Returns the next step, if any
    pub fn next_input(&mut self) -> Option<ScriptedInput> {
        self.inputs.pop_front()
    }

    pub fn has_more(&self) -> bool {
        !self.inputs.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

/// Palette command behind a one-word directive
fn shorthand_command(directive: &str) -> &'static str {
    match directive {
        "back" => "focus.back",
        "undo" => "edit.undo",
        _ => "edit.redo",
    }
}

/// Drops a trailing `# comment` that sits outside quotes
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    for (index, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[..index],
            _ => {}
        }
    }
    line
}
