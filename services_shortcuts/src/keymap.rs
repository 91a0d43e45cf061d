//! # Keymap
//!
//! User-remappable chords for the shell's named global actions.
//!
//! ## Philosophy
//!
//! - **Named actions**: Code binds `"save"`, the keymap decides which chord that is
//! - **Persistent storage**: Keymaps are stored as readable JSON (`"save": "Ctrl+S"`)
//! - **Explicit mappings**: No hidden or implicit keybindings

use input_types::{ChordParseError, KeyChord, KeyCode, Modifiers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

/// Names of the actions the shell binds globally
pub mod actions {
    pub const SAVE: &str = "save";
    pub const UNDO: &str = "undo";
    pub const REDO: &str = "redo";
    pub const COMMAND_PALETTE: &str = "command_palette";
    pub const FOCUS_NEXT: &str = "focus_next";
    pub const FOCUS_PREVIOUS: &str = "focus_previous";
    pub const NAVIGATE_BACK: &str = "navigate_back";
    pub const CLOSE_PANE: &str = "close_pane";
}

/// Keymap errors
#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("Invalid chord {chord:?} for action '{action}': {source}")]
    InvalidChord {
        action: String,
        chord: String,
        #[source]
        source: ChordParseError,
    },

    #[error("Keymap JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Action name → chord table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keymap {
    bindings: BTreeMap<String, KeyChord>,
}

impl Keymap {
    /// Creates an empty keymap
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard chords for the shell's global actions
    pub fn default_global() -> Self {
        let mut keymap = Self::new();
        keymap.bind(actions::SAVE, KeyChord::ctrl(KeyCode::S));
        keymap.bind(actions::UNDO, KeyChord::ctrl(KeyCode::Z));
        keymap.bind(actions::REDO, KeyChord::ctrl(KeyCode::Y));
        keymap.bind(actions::COMMAND_PALETTE, KeyChord::ctrl(KeyCode::P));
        keymap.bind(actions::FOCUS_NEXT, KeyChord::ctrl(KeyCode::Tab));
        keymap.bind(
            actions::FOCUS_PREVIOUS,
            KeyChord::new(KeyCode::Tab, Modifiers::CTRL.with(Modifiers::SHIFT)),
        );
        keymap.bind(actions::NAVIGATE_BACK, KeyChord::new(KeyCode::Left, Modifiers::ALT));
        keymap.bind(actions::CLOSE_PANE, KeyChord::ctrl(KeyCode::W));
        keymap
    }

    /// Sets the chord for an action, returning the previous one
    pub fn bind(&mut self, action: impl Into<String>, chord: KeyChord) -> Option<KeyChord> {
        self.bindings.insert(action.into(), chord)
    }

    /// Parses `chord` and binds it to `action`
    pub fn remap(&mut self, action: &str, chord: &str) -> Result<Option<KeyChord>, KeymapError> {
        let parsed: KeyChord = chord.parse().map_err(|source| KeymapError::InvalidChord {
            action: action.to_string(),
            chord: chord.to_string(),
            source,
        })?;
        Ok(self.bind(action, parsed))
    }

    pub fn unbind(&mut self, action: &str) -> Option<KeyChord> {
        self.bindings.remove(action)
    }

    pub fn chord_for(&self, action: &str) -> Option<KeyChord> {
        self.bindings.get(action).copied()
    }

    /// Reverse lookup; the first action in name order wins
    pub fn action_for(&self, chord: &KeyChord) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, bound)| *bound == chord)
            .map(|(name, _)| name.as_str())
    }

    /// Actions that share a chord with another action
    pub fn conflicts(&self) -> Vec<(KeyChord, Vec<String>)> {
        let mut by_chord: BTreeMap<KeyChord, Vec<String>> = BTreeMap::new();
        for (name, chord) in &self.bindings {
            by_chord.entry(*chord).or_default().push(name.clone());
        }
        by_chord.into_iter().filter(|(_, names)| names.len() > 1).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, KeyChord)> {
        self.bindings.iter().map(|(name, chord)| (name.as_str(), *chord))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, KeymapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, KeymapError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Serialize for Keymap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let as_text: BTreeMap<&str, String> = self
            .bindings
            .iter()
            .map(|(name, chord)| (name.as_str(), chord.to_string()))
            .collect();
        as_text.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Keymap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let as_text = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut bindings = BTreeMap::new();
        for (name, text) in as_text {
            let chord: KeyChord = text.parse().map_err(|e| {
                serde::de::Error::custom(format!("action '{}': {}", name, e))
            })?;
            bindings.insert(name, chord);
        }
        Ok(Self { bindings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_global() {
        let keymap = Keymap::default_global();
        assert_eq!(keymap.chord_for(actions::SAVE), Some(KeyChord::ctrl(KeyCode::S)));
        assert_eq!(keymap.action_for(&KeyChord::ctrl(KeyCode::Z)), Some(actions::UNDO));
        assert!(keymap.conflicts().is_empty());
    }

    #[test]
    fn test_remap() {
        let mut keymap = Keymap::default_global();
        let previous = keymap.remap(actions::SAVE, "Ctrl+Shift+S").unwrap();

        assert_eq!(previous, Some(KeyChord::ctrl(KeyCode::S)));
        assert_eq!(
            keymap.chord_for(actions::SAVE).map(|c| c.to_string()),
            Some("Ctrl+Shift+S".to_string())
        );
    }

    #[test]
    fn test_remap_invalid_chord() {
        let mut keymap = Keymap::default_global();
        let err = keymap.remap(actions::SAVE, "Hyper+S").unwrap_err();

        assert!(matches!(err, KeymapError::InvalidChord { .. }));
        assert_eq!(keymap.chord_for(actions::SAVE), Some(KeyChord::ctrl(KeyCode::S)));
    }

    #[test]
    fn test_conflicts_detected() {
        let mut keymap = Keymap::default_global();
        keymap.bind(actions::REDO, KeyChord::ctrl(KeyCode::Z));

        let conflicts = keymap.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].1, vec!["redo".to_string(), "undo".to_string()]);
    }

    #[test]
    fn test_json_is_readable() {
        let mut keymap = Keymap::new();
        keymap.bind(actions::SAVE, KeyChord::ctrl(KeyCode::S));

        let json = keymap.to_json().unwrap();
        assert!(json.contains("\"save\": \"Ctrl+S\""));
        assert_eq!(Keymap::from_json(&json).unwrap(), keymap);
    }

    #[test]
    fn test_json_rejects_bad_chord() {
        let result = Keymap::from_json(r#"{"save": "Ctrl+"}"#);
        assert!(matches!(result, Err(KeymapError::Json(_))));
    }
}
