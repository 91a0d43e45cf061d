//! Typed shell configuration resolved from the registry
//!
//! Invalid or mistyped values never fail startup: they are reported with a
//! warning and the built-in default is used instead.

use crate::{keys, SettingKey, SettingValue, SettingsRegistry};
use core_types::WorkspaceId;
use input_types::KeyChord;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_UNDO_CAPACITY: usize = 100;
pub const DEFAULT_HISTORY_DEPTH: usize = 32;
pub const DEFAULT_WORKSPACE: &str = "main";

/// Settings the session needs, with types resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub undo_capacity: usize,
    pub focus_history_depth: usize,
    /// `None` means restores wait for readiness indefinitely
    pub ready_timeout: Option<Duration>,
    /// Extra chords allowed through the typing guard
    pub passthrough: Vec<KeyChord>,
    pub default_workspace: WorkspaceId,
    /// Action name → chord overrides from `keymap.*`
    pub keymap_overrides: BTreeMap<String, KeyChord>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            undo_capacity: DEFAULT_UNDO_CAPACITY,
            focus_history_depth: DEFAULT_HISTORY_DEPTH,
            ready_timeout: None,
            passthrough: Vec::new(),
            default_workspace: WorkspaceId::new(DEFAULT_WORKSPACE),
            keymap_overrides: BTreeMap::new(),
        }
    }
}

impl ShellConfig {
    /// Resolves the effective configuration for `profile`
    pub fn from_registry(registry: &SettingsRegistry, profile: &str) -> Self {
        let defaults = Self::default();
        let lookup = |key: &str| registry.get(profile, &SettingKey::new(key));

        let undo_capacity = positive(lookup(keys::UNDO_CAPACITY), keys::UNDO_CAPACITY)
            .unwrap_or(defaults.undo_capacity);

        let focus_history_depth = match lookup(keys::FOCUS_HISTORY_DEPTH) {
            Some(SettingValue::Integer(n)) if *n >= 0 => *n as usize,
            Some(other) => {
                invalid(keys::FOCUS_HISTORY_DEPTH, other);
                defaults.focus_history_depth
            }
            None => defaults.focus_history_depth,
        };

        let ready_timeout = match lookup(keys::FOCUS_READY_TIMEOUT_MS) {
            Some(SettingValue::Integer(0)) | None => None,
            Some(SettingValue::Integer(ms)) if *ms > 0 => Some(Duration::from_millis(*ms as u64)),
            Some(other) => {
                invalid(keys::FOCUS_READY_TIMEOUT_MS, other);
                None
            }
        };

        let passthrough = match lookup(keys::SHORTCUTS_PASSTHROUGH) {
            Some(SettingValue::StringList(chords)) => chords
                .iter()
                .filter_map(|text| parse_chord(keys::SHORTCUTS_PASSTHROUGH, text))
                .collect(),
            Some(other) => {
                invalid(keys::SHORTCUTS_PASSTHROUGH, other);
                Vec::new()
            }
            None => Vec::new(),
        };

        let default_workspace = match lookup(keys::WORKSPACE_DEFAULT) {
            Some(SettingValue::String(name)) if !name.trim().is_empty() => {
                WorkspaceId::new(name.trim())
            }
            Some(other) => {
                invalid(keys::WORKSPACE_DEFAULT, other);
                defaults.default_workspace
            }
            None => defaults.default_workspace,
        };

        let keymap_overrides = registry
            .list_with_prefix(profile, keys::KEYMAP_PREFIX)
            .into_iter()
            .filter_map(|(key, value)| {
                let action = key.as_str().strip_prefix(keys::KEYMAP_PREFIX)?.to_string();
                match value {
                    SettingValue::String(text) => {
                        parse_chord(key.as_str(), &text).map(|chord| (action, chord))
                    }
                    other => {
                        invalid(key.as_str(), &other);
                        None
                    }
                }
            })
            .collect();

        Self {
            undo_capacity,
            focus_history_depth,
            ready_timeout,
            passthrough,
            default_workspace,
            keymap_overrides,
        }
    }
}

fn positive(value: Option<&SettingValue>, key: &str) -> Option<usize> {
    match value? {
        SettingValue::Integer(n) if *n > 0 => Some(*n as usize),
        other => {
            invalid(key, other);
            None
        }
    }
}

fn parse_chord(key: &str, text: &str) -> Option<KeyChord> {
    match text.parse::<KeyChord>() {
        Ok(chord) => Some(chord),
        Err(err) => {
            tracing::warn!(target: "services_settings", key, chord = text, error = %err, "ignoring invalid chord");
            None
        }
    }
}

fn invalid(key: &str, value: &SettingValue) {
    tracing::warn!(
        target: "services_settings",
        key,
        %value,
        kind = value.type_name(),
        "invalid setting value, using default"
    );
}
