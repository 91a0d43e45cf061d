//! Settings persistence layer
//!
//! Loads and saves profile overrides as versioned JSON. Output is
//! deterministic and a corrupt file never prevents startup.

use crate::{ProfileId, SettingKey, SettingValue, SettingsRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Serializable container for settings overrides
/// Uses BTreeMap for stable ordering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsOverridesData {
    /// Version of the settings format (for future migrations)
    pub version: u32,
    /// Profile-specific overrides (stable ordering via BTreeMap)
    pub profile_overrides: BTreeMap<ProfileId, BTreeMap<String, SettingValue>>,
}

impl SettingsOverridesData {
    /// Current version of the settings format
    pub const CURRENT_VERSION: u32 = 1;

    /// Creates a new empty settings data
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            profile_overrides: BTreeMap::new(),
        }
    }

    /// Creates settings data from profile overrides
    pub fn from_overrides(
        overrides: &BTreeMap<ProfileId, BTreeMap<SettingKey, SettingValue>>,
    ) -> Self {
        let profile_overrides = overrides
            .iter()
            .map(|(profile, settings)| {
                let settings = settings
                    .iter()
                    .map(|(key, value)| (key.as_str().to_string(), value.clone()))
                    .collect();
                (profile.clone(), settings)
            })
            .collect();

        Self {
            version: Self::CURRENT_VERSION,
            profile_overrides,
        }
    }

    /// Converts settings data to profile overrides
    pub fn to_overrides(&self) -> BTreeMap<ProfileId, BTreeMap<SettingKey, SettingValue>> {
        self.profile_overrides
            .iter()
            .map(|(profile, settings)| {
                let settings = settings
                    .iter()
                    .map(|(key, value)| (SettingKey::new(key.as_str()), value.clone()))
                    .collect();
                (profile.clone(), settings)
            })
            .collect()
    }
}

impl Default for SettingsOverridesData {
    fn default() -> Self {
        Self::new()
    }
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors that can occur during persistence operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize settings: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize settings: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported settings version: {0}")]
    UnsupportedVersion(u32),
}

/// Serializes settings overrides to JSON bytes
pub fn serialize_overrides(data: &SettingsOverridesData) -> PersistenceResult<Vec<u8>> {
    serde_json::to_vec_pretty(data)
        .map_err(|e| PersistenceError::SerializationFailed(e.to_string()))
}

/// Deserializes settings overrides from JSON bytes
pub fn deserialize_overrides(bytes: &[u8]) -> PersistenceResult<SettingsOverridesData> {
    let data: SettingsOverridesData = serde_json::from_slice(bytes)
        .map_err(|e| PersistenceError::DeserializationFailed(e.to_string()))?;

    // Check version compatibility
    if data.version != SettingsOverridesData::CURRENT_VERSION {
        return Err(PersistenceError::UnsupportedVersion(data.version));
    }

    Ok(data)
}

/// Attempts to load settings from bytes, falling back to defaults on error
pub fn load_overrides_safe(bytes: &[u8]) -> SettingsOverridesData {
    deserialize_overrides(bytes).unwrap_or_else(|err| {
        tracing::warn!(target: "services_settings", error = %err, "discarding unreadable settings overrides");
        SettingsOverridesData::new()
    })
}

/// Replaces the registry's overrides with whatever `bytes` holds
pub fn restore_into(registry: &mut SettingsRegistry, bytes: &[u8]) {
    registry.import_overrides(load_overrides_safe(bytes).to_overrides());
}

/// Serializes the registry's overrides
pub fn snapshot_of(registry: &SettingsRegistry) -> PersistenceResult<Vec<u8>> {
    serialize_overrides(&SettingsOverridesData::from_overrides(&registry.export_overrides()))
}
