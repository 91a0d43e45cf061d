//! # Settings Registry Service
//!
//! Typed, layered settings for the shell.
//!
//! ## Philosophy
//!
//! - **Typed settings**: All settings have explicit types, not stringly-typed
//! - **Layered**: Read-only defaults + per-profile overrides
//! - **Deterministic**: Settings are serializable and reproducible (`BTreeMap` ordering)
//! - **Testable**: All settings logic can be tested independently
//!
//! ## Features
//!
//! - Read-only defaults baked in ([`create_default_registry`])
//! - Per-profile overrides, persisted as versioned JSON ([`persistence`])
//! - Typed view for the session ([`ShellConfig`])
//!
//! ## Example
//!
//! ```ignore
//! use services_settings::{create_default_registry, keys, SettingValue, ShellConfig};
//!
//! let mut registry = create_default_registry();
//! registry.set_profile_override("work", keys::UNDO_CAPACITY, SettingValue::Integer(500));
//!
//! let config = ShellConfig::from_registry(&registry, "work");
//! assert_eq!(config.undo_capacity, 500);
//! ```

pub mod config;
pub mod persistence;

pub use config::ShellConfig;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Setting key (path-like identifier)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SettingKey(String);

impl SettingKey {
    /// Creates a new setting key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks if this key starts with the given prefix
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SettingKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SettingKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Setting value (strongly typed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    Boolean(bool),
    Integer(i64),
    String(String),
    StringList(Vec<String>),
}

impl SettingValue {
    /// Tries to get as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            SettingValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Tries to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Tries to get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            SettingValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Tries to get as string list
    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            SettingValue::StringList(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Boolean(_) => "boolean",
            SettingValue::Integer(_) => "integer",
            SettingValue::String(_) => "string",
            SettingValue::StringList(_) => "string list",
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Boolean(v) => write!(f, "{}", v),
            SettingValue::Integer(v) => write!(f, "{}", v),
            SettingValue::String(v) => write!(f, "{}", v),
            SettingValue::StringList(v) => write!(f, "{:?}", v),
        }
    }
}

/// Settings profile name
pub type ProfileId = String;

/// Settings registry
pub struct SettingsRegistry {
    /// Default settings (read-only)
    defaults: BTreeMap<SettingKey, SettingValue>,
    /// Profile-specific overrides
    profile_overrides: BTreeMap<ProfileId, BTreeMap<SettingKey, SettingValue>>,
}

impl SettingsRegistry {
    /// Creates a new settings registry
    pub fn new() -> Self {
        Self {
            defaults: BTreeMap::new(),
            profile_overrides: BTreeMap::new(),
        }
    }

    /// Registers a default setting
    pub fn register_default(&mut self, key: impl Into<SettingKey>, value: SettingValue) {
        self.defaults.insert(key.into(), value);
    }

    /// Sets a profile-specific override
    pub fn set_profile_override(
        &mut self,
        profile: impl Into<ProfileId>,
        key: impl Into<SettingKey>,
        value: SettingValue,
    ) {
        self.profile_overrides
            .entry(profile.into())
            .or_default()
            .insert(key.into(), value);
    }

    /// Removes a profile-specific override
    pub fn remove_profile_override(&mut self, profile: &str, key: &SettingKey) -> bool {
        self.profile_overrides
            .get_mut(profile)
            .is_some_and(|settings| settings.remove(key).is_some())
    }

    /// Gets the effective setting value for a profile (override or default)
    pub fn get(&self, profile: &str, key: &SettingKey) -> Option<&SettingValue> {
        self.get_profile_override(profile, key)
            .or_else(|| self.defaults.get(key))
    }

    /// Gets the default value for a setting
    pub fn get_default(&self, key: &SettingKey) -> Option<&SettingValue> {
        self.defaults.get(key)
    }

    /// Gets the profile override (if any) for a setting
    pub fn get_profile_override(&self, profile: &str, key: &SettingKey) -> Option<&SettingValue> {
        self.profile_overrides
            .get(profile)
            .and_then(|settings| settings.get(key))
    }

    /// Returns all default setting keys
    pub fn list_defaults(&self) -> Vec<SettingKey> {
        self.defaults.keys().cloned().collect()
    }

    /// Returns all effective settings with a given prefix for a profile
    pub fn list_with_prefix(&self, profile: &str, prefix: &str) -> Vec<(SettingKey, SettingValue)> {
        let mut merged: BTreeMap<&SettingKey, &SettingValue> = self
            .defaults
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .collect();

        if let Some(settings) = self.profile_overrides.get(profile) {
            merged.extend(settings.iter().filter(|(key, _)| key.starts_with(prefix)));
        }

        merged
            .into_iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Clears all overrides for a profile
    pub fn clear_profile_overrides(&mut self, profile: &str) {
        self.profile_overrides.remove(profile);
    }

    /// Resets a setting to its default value for a profile
    pub fn reset_to_default(&mut self, profile: &str, key: &SettingKey) -> bool {
        self.remove_profile_override(profile, key)
    }

    /// Exports all profile overrides for persistence
    pub fn export_overrides(&self) -> BTreeMap<ProfileId, BTreeMap<SettingKey, SettingValue>> {
        self.profile_overrides.clone()
    }

    /// Imports profile overrides (replaces existing overrides)
    pub fn import_overrides(
        &mut self,
        overrides: BTreeMap<ProfileId, BTreeMap<SettingKey, SettingValue>>,
    ) {
        self.profile_overrides = overrides;
    }
}

impl Default for SettingsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shell setting keys
pub mod keys {
    pub const UNDO_CAPACITY: &str = "undo.capacity";
    pub const FOCUS_HISTORY_DEPTH: &str = "focus.history_depth";
    pub const FOCUS_READY_TIMEOUT_MS: &str = "focus.ready_timeout_ms";
    pub const SHORTCUTS_PASSTHROUGH: &str = "shortcuts.passthrough";
    pub const WORKSPACE_DEFAULT: &str = "workspace.default";
    /// Prefix for per-action chord overrides (`keymap.save = "Ctrl+S"`)
    pub const KEYMAP_PREFIX: &str = "keymap.";
}

/// Creates a settings registry with default settings
pub fn create_default_registry() -> SettingsRegistry {
    let mut registry = SettingsRegistry::new();

    registry.register_default(
        keys::UNDO_CAPACITY,
        SettingValue::Integer(config::DEFAULT_UNDO_CAPACITY as i64),
    );
    registry.register_default(
        keys::FOCUS_HISTORY_DEPTH,
        SettingValue::Integer(config::DEFAULT_HISTORY_DEPTH as i64),
    );
    registry.register_default(keys::FOCUS_READY_TIMEOUT_MS, SettingValue::Integer(0));
    registry.register_default(keys::SHORTCUTS_PASSTHROUGH, SettingValue::StringList(Vec::new()));
    registry.register_default(
        keys::WORKSPACE_DEFAULT,
        SettingValue::String(config::DEFAULT_WORKSPACE.to_string()),
    );

    registry
}
