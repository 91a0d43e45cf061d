//! # Command Palette Service
//!
//! A searchable list of every shell command, opened with Ctrl+P.
//!
//! ## Philosophy
//!
//! - **Discoverability**: Every command is registered and searchable
//! - **Deterministic**: Ranking is a pure function of the query and descriptors
//! - **Testable**: Commands and ranking can be tested without a UI
//!
//! ## Features
//!
//! - Subsequence fuzzy ranking over name, id and tags (see [`fuzzy`])
//! - Disabled commands stay registered but never match
//! - Each command can advertise its keyboard shortcut
//!
//! ## Example
//!
//! ```ignore
//! use services_command_palette::{CommandPalette, CommandDescriptor};
//!
//! let mut palette = CommandPalette::new();
//! palette.register_command(
//!     CommandDescriptor::new("workspace.switch", "Switch Workspace", "Swap panes", vec![]),
//!     Box::new(|_args| Ok("switched".to_string())),
//! );
//!
//! let best = palette.filter_commands("swk");
//! ```

pub mod fuzzy;

use input_types::KeyChord;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique identifier for a command
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(String);

impl CommandId {
    /// Creates a new command ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Command palette errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaletteError {
    #[error("Command not found: {0}")]
    NotFound(CommandId),

    #[error("Command is disabled: {0}")]
    Disabled(CommandId),

    #[error("Command {id} failed: {reason}")]
    Failed { id: CommandId, reason: String },
}

/// Command descriptor with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// Unique command identifier
    pub id: CommandId,
    /// Human-readable command name
    pub name: String,
    /// Description of what the command does
    pub description: String,
    /// Search tags/keywords
    pub tags: Vec<String>,
    /// Shortcut shown next to the command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keybinding: Option<KeyChord>,
    /// Whether the command is enabled
    pub enabled: bool,
}

impl CommandDescriptor {
    /// Creates a new command descriptor
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            id: CommandId::new(id),
            name: name.into(),
            description: description.into(),
            tags,
            keybinding: None,
            enabled: true,
        }
    }

    /// Sets the advertised shortcut
    pub fn with_keybinding(mut self, chord: KeyChord) -> Self {
        self.keybinding = Some(chord);
        self
    }

    /// Disables the command
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Checks if this command matches the given query
    pub fn matches(&self, query: &str) -> bool {
        self.relevance_score(query) > 0
    }

    /// Best fuzzy score across name, id and tags (0 = no match)
    ///
    /// The name counts double so a strong name hit outranks a tag hit.
    pub fn relevance_score(&self, query: &str) -> u32 {
        if !self.enabled {
            return 0;
        }

        let name = fuzzy::score(query, &self.name).saturating_mul(2);
        let id = fuzzy::score(query, self.id.as_str());
        let tags = self
            .tags
            .iter()
            .map(|tag| fuzzy::score(query, tag))
            .max()
            .unwrap_or(0);

        name.max(id).max(tags)
    }
}

/// Result of command execution
pub type CommandResult = Result<String, String>;

/// Command handler function signature
pub type CommandHandler = Box<dyn Fn(&[String]) -> CommandResult>;

/// Registered command with its handler
struct RegisteredCommand {
    descriptor: CommandDescriptor,
    handler: CommandHandler,
}

/// Command palette service
pub struct CommandPalette {
    commands: Vec<RegisteredCommand>,
}

impl CommandPalette {
    /// Creates a new command palette
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Registers a command with its handler
    ///
    /// A command with the same id is replaced.
    pub fn register_command(&mut self, descriptor: CommandDescriptor, handler: CommandHandler) {
        if self.unregister_command(&descriptor.id) {
            tracing::warn!(
                target: "services_command_palette",
                id = %descriptor.id,
                "command re-registered, replacing previous handler"
            );
        }
        self.commands.push(RegisteredCommand {
            descriptor,
            handler,
        });
    }

    /// Unregisters a command by ID
    pub fn unregister_command(&mut self, id: &CommandId) -> bool {
        if let Some(pos) = self.commands.iter().position(|cmd| cmd.descriptor.id == *id) {
            self.commands.remove(pos);
            true
        } else {
            false
        }
    }

    /// Returns all registered command descriptors
    pub fn list_commands(&self) -> Vec<CommandDescriptor> {
        self.commands
            .iter()
            .map(|cmd| cmd.descriptor.clone())
            .collect()
    }

    /// Filters commands by query and returns them sorted by relevance
    ///
    /// An empty query lists every enabled command in registration order.
    pub fn filter_commands(&self, query: &str) -> Vec<CommandDescriptor> {
        if query.trim().is_empty() {
            return self
                .commands
                .iter()
                .filter(|cmd| cmd.descriptor.enabled)
                .map(|cmd| cmd.descriptor.clone())
                .collect();
        }

        let mut matches: Vec<_> = self
            .commands
            .iter()
            .map(|cmd| (cmd.descriptor.relevance_score(query), &cmd.descriptor))
            .filter(|(score, _)| *score > 0)
            .collect();

        // Stable sort keeps registration order among equal scores
        matches.sort_by(|a, b| b.0.cmp(&a.0));

        matches.into_iter().map(|(_, desc)| desc.clone()).collect()
    }

    /// Executes a command by ID with the given arguments
    pub fn execute_command(&self, id: &CommandId, args: &[String]) -> Result<String, PaletteError> {
        let cmd = self
            .commands
            .iter()
            .find(|cmd| cmd.descriptor.id == *id)
            .ok_or_else(|| PaletteError::NotFound(id.clone()))?;

        if !cmd.descriptor.enabled {
            return Err(PaletteError::Disabled(id.clone()));
        }

        tracing::debug!(target: "services_command_palette", %id, "executing command");
        (cmd.handler)(args).map_err(|reason| PaletteError::Failed {
            id: id.clone(),
            reason,
        })
    }

    /// Executes the best match for `query`, if any
    pub fn execute_best(&self, query: &str) -> Option<Result<String, PaletteError>> {
        let best = self.filter_commands(query).into_iter().next()?;
        Some(self.execute_command(&best.id, &[]))
    }

    /// Gets a command descriptor by ID
    pub fn get_command(&self, id: &CommandId) -> Option<&CommandDescriptor> {
        self.commands
            .iter()
            .find(|cmd| cmd.descriptor.id == *id)
            .map(|cmd| &cmd.descriptor)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandPalette {
    fn default() -> Self {
        Self::new()
    }
}
