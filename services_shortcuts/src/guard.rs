//! Typing guard
//!
//! While a free-text control has focus, plain characters belong to that
//! control. Only chords that hold a command modifier (anything but Shift)
//! or that appear on the pass-through-safe list are offered to shortcuts.

use input_types::{ControlKind, KeyChord, KeyCode, Modifiers};
use std::collections::BTreeSet;

/// Chords that stay live inside text inputs regardless of modifiers
const DEFAULT_PASSTHROUGH: &[KeyChord] = &[
    // save
    KeyChord::ctrl(KeyCode::S),
    // undo / redo
    KeyChord::ctrl(KeyCode::Z),
    KeyChord::ctrl(KeyCode::Y),
    KeyChord::new(KeyCode::Z, Modifiers::CTRL.with(Modifiers::SHIFT)),
    // select all
    KeyChord::ctrl(KeyCode::A),
    // clipboard
    KeyChord::ctrl(KeyCode::X),
    KeyChord::ctrl(KeyCode::C),
    KeyChord::ctrl(KeyCode::V),
    KeyChord::new(KeyCode::Delete, Modifiers::SHIFT),
    KeyChord::new(KeyCode::Insert, Modifiers::SHIFT),
    KeyChord::ctrl(KeyCode::Insert),
];

/// Decides whether a keystroke may reach the shortcut tables
#[derive(Debug, Clone)]
pub struct TypingGuard {
    passthrough: BTreeSet<KeyChord>,
}

impl TypingGuard {
    /// Guard with the standard editing allow-list
    pub fn new() -> Self {
        Self {
            passthrough: DEFAULT_PASSTHROUGH.iter().copied().collect(),
        }
    }

    /// Adds a chord that should reach shortcuts even while typing
    pub fn allow(&mut self, chord: KeyChord) {
        self.passthrough.insert(chord);
    }

    pub fn is_passthrough(&self, chord: &KeyChord) -> bool {
        self.passthrough.contains(chord)
    }

    /// Returns true if the keystroke belongs to the focused text control
    pub fn should_block(&self, chord: &KeyChord, control: ControlKind) -> bool {
        control.accepts_text() && !chord.has_command_modifier() && !self.is_passthrough(chord)
    }

    pub fn passthrough_chords(&self) -> impl Iterator<Item = &KeyChord> {
        self.passthrough.iter()
    }
}

impl Default for TypingGuard {
    fn default() -> Self {
        Self::new()
    }
}
