//! # Input Types
//!
//! Fundamental keyboard types for the shell's input-routing layer.
//!
//! ## Philosophy
//!
//! - **Events, not bytes**: input arrives as structured key events from the UI
//!   framework, never as raw scan codes
//! - **Chords are values**: a [`KeyChord`] is an immutable (key, modifiers)
//!   pair compared by value
//! - **Context travels with the key**: the kind of control holding keyboard
//!   focus ([`ControlKind`]) is part of every routing decision
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - Raw hardware scan codes
//! - A text input / IME pipeline
//! - Global keyboard state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keyboard event
///
/// Represents a single keyboard state change (key press, release, or repeat).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// The key that was pressed/released
    pub code: KeyCode,
    /// Modifier keys that were active
    pub modifiers: Modifiers,
    /// Event state (pressed, released, repeat)
    pub state: KeyState,
}

impl KeyEvent {
    /// Creates a new key event
    pub fn new(code: KeyCode, modifiers: Modifiers, state: KeyState) -> Self {
        Self {
            code,
            modifiers,
            state,
        }
    }

    /// Creates a key pressed event
    pub fn pressed(code: KeyCode, modifiers: Modifiers) -> Self {
        Self::new(code, modifiers, KeyState::Pressed)
    }

    /// Creates a key released event
    pub fn released(code: KeyCode, modifiers: Modifiers) -> Self {
        Self::new(code, modifiers, KeyState::Released)
    }

    /// Returns the chord this event represents
    pub fn chord(&self) -> KeyChord {
        KeyChord::new(self.code, self.modifiers)
    }

    /// Returns true for presses and auto-repeats (the states shortcuts react to)
    pub fn is_activation(&self) -> bool {
        matches!(self.state, KeyState::Pressed | KeyState::Repeat)
    }
}

/// Key state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyState {
    /// Key was pressed down
    Pressed,
    /// Key was released
    Released,
    /// Key is auto-repeating
    Repeat,
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pressed => write!(f, "pressed"),
            Self::Released => write!(f, "released"),
            Self::Repeat => write!(f, "repeat"),
        }
    }
}

/// Logical key code
///
/// Symbolic keys as reported by the UI framework after layout translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyCode {
    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,

    // Function keys
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    // Editing and navigation
    Escape,
    Tab,
    Space,
    Enter,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,

    // Punctuation
    Minus,
    Equal,
    LeftBracket,
    RightBracket,
    Backslash,
    Semicolon,
    Quote,
    Comma,
    Period,
    Slash,
    Grave,

    // Unknown/unmapped key
    Unknown,
}

const LETTERS: [KeyCode; 26] = [
    KeyCode::A, KeyCode::B, KeyCode::C, KeyCode::D, KeyCode::E, KeyCode::F, KeyCode::G,
    KeyCode::H, KeyCode::I, KeyCode::J, KeyCode::K, KeyCode::L, KeyCode::M, KeyCode::N,
    KeyCode::O, KeyCode::P, KeyCode::Q, KeyCode::R, KeyCode::S, KeyCode::T, KeyCode::U,
    KeyCode::V, KeyCode::W, KeyCode::X, KeyCode::Y, KeyCode::Z,
];

const DIGITS: [KeyCode; 10] = [
    KeyCode::Num0, KeyCode::Num1, KeyCode::Num2, KeyCode::Num3, KeyCode::Num4,
    KeyCode::Num5, KeyCode::Num6, KeyCode::Num7, KeyCode::Num8, KeyCode::Num9,
];

const FUNCTION_KEYS: [KeyCode; 12] = [
    KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
    KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
];

impl KeyCode {
    /// Maps a printable character to the key that produces it
    ///
    /// Letters map case-insensitively; the caller decides about Shift.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='z' => Some(LETTERS[(c as u8 - b'a') as usize]),
            'A'..='Z' => Some(LETTERS[(c as u8 - b'A') as usize]),
            '0'..='9' => Some(DIGITS[(c as u8 - b'0') as usize]),
            ' ' => Some(Self::Space),
            '-' => Some(Self::Minus),
            '=' => Some(Self::Equal),
            '[' => Some(Self::LeftBracket),
            ']' => Some(Self::RightBracket),
            '\\' => Some(Self::Backslash),
            ';' => Some(Self::Semicolon),
            '\'' => Some(Self::Quote),
            ',' => Some(Self::Comma),
            '.' => Some(Self::Period),
            '/' => Some(Self::Slash),
            '`' => Some(Self::Grave),
            _ => None,
        }
    }

    /// Parses a key name such as `"S"`, `"F5"`, `"Escape"` or `"PgUp"`
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::from_char(c);
        }

        let lower = name.to_ascii_lowercase();
        if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<usize>().ok()) {
            return (1..=12).contains(&n).then(|| FUNCTION_KEYS[n - 1]);
        }

        let code = match lower.as_str() {
            "escape" | "esc" => Self::Escape,
            "tab" => Self::Tab,
            "space" => Self::Space,
            "enter" | "return" => Self::Enter,
            "backspace" => Self::Backspace,
            "delete" | "del" => Self::Delete,
            "insert" | "ins" => Self::Insert,
            "home" => Self::Home,
            "end" => Self::End,
            "pageup" | "pgup" => Self::PageUp,
            "pagedown" | "pgdn" => Self::PageDown,
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "minus" => Self::Minus,
            "equal" | "plus" => Self::Equal,
            "leftbracket" => Self::LeftBracket,
            "rightbracket" => Self::RightBracket,
            "backslash" => Self::Backslash,
            "semicolon" => Self::Semicolon,
            "quote" => Self::Quote,
            "comma" => Self::Comma,
            "period" => Self::Period,
            "slash" => Self::Slash,
            "grave" | "backtick" => Self::Grave,
            _ => return None,
        };
        Some(code)
    }

    /// Returns true for keys that insert a character into a text control
    pub fn is_printable(&self) -> bool {
        LETTERS.contains(self)
            || DIGITS.contains(self)
            || matches!(
                self,
                Self::Space
                    | Self::Minus
                    | Self::Equal
                    | Self::LeftBracket
                    | Self::RightBracket
                    | Self::Backslash
                    | Self::Semicolon
                    | Self::Quote
                    | Self::Comma
                    | Self::Period
                    | Self::Slash
                    | Self::Grave
            )
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(i) = DIGITS.iter().position(|d| d == self) {
            return write!(f, "{}", i);
        }
        write!(f, "{:?}", self)
    }
}

/// Modifier keys
///
/// Bitflags representing modifier key states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Modifiers {
    bits: u8,
}

impl Modifiers {
    /// No modifiers
    pub const NONE: Self = Self { bits: 0 };
    /// Control key
    pub const CTRL: Self = Self { bits: 1 << 0 };
    /// Alt key
    pub const ALT: Self = Self { bits: 1 << 1 };
    /// Shift key
    pub const SHIFT: Self = Self { bits: 1 << 2 };
    /// Meta/Super/Windows key
    pub const META: Self = Self { bits: 1 << 3 };

    /// Creates a new modifier set with no modifiers
    pub fn none() -> Self {
        Self::NONE
    }

    /// Creates a new modifier set from bits
    pub fn from_bits(bits: u8) -> Self {
        Self { bits: bits & 0x0f }
    }

    /// Returns the raw bits
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Adds a modifier
    pub const fn with(mut self, other: Modifiers) -> Self {
        self.bits |= other.bits;
        self
    }

    /// Removes a modifier
    pub const fn without(mut self, other: Modifiers) -> Self {
        self.bits &= !other.bits;
        self
    }

    /// Checks if a modifier is present
    pub fn contains(&self, other: Modifiers) -> bool {
        (self.bits & other.bits) == other.bits
    }

    pub fn is_ctrl(&self) -> bool {
        self.contains(Self::CTRL)
    }

    pub fn is_alt(&self) -> bool {
        self.contains(Self::ALT)
    }

    pub fn is_shift(&self) -> bool {
        self.contains(Self::SHIFT)
    }

    pub fn is_meta(&self) -> bool {
        self.contains(Self::META)
    }

    /// Returns true if no modifiers are pressed
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns true if any modifier other than Shift is held
    ///
    /// Shift alone still produces text, so it never lifts the typing guard.
    pub fn has_command_modifier(&self) -> bool {
        !self.without(Self::SHIFT).is_empty()
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }

        let mut parts = Vec::new();
        if self.is_ctrl() {
            parts.push("Ctrl");
        }
        if self.is_alt() {
            parts.push("Alt");
        }
        if self.is_shift() {
            parts.push("Shift");
        }
        if self.is_meta() {
            parts.push("Meta");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key plus its modifier set, the unit the dispatcher matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyChord {
    /// Creates a chord
    pub const fn new(key: KeyCode, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Creates a chord with no modifiers
    pub const fn bare(key: KeyCode) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// Creates a Ctrl+key chord
    pub const fn ctrl(key: KeyCode) -> Self {
        Self::new(key, Modifiers::CTRL)
    }

    /// Returns true if this chord needs a modifier other than Shift
    pub fn has_command_modifier(&self) -> bool {
        self.modifiers.has_command_modifier()
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

/// Error returned when a chord string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChordParseError {
    /// The string was empty
    Empty,
    /// A modifier name was not recognized
    InvalidModifier(String),
    /// The key name was not recognized
    InvalidKey(String),
}

impl fmt::Display for ChordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty chord"),
            Self::InvalidModifier(m) => write!(f, "invalid modifier: {}", m),
            Self::InvalidKey(k) => write!(f, "invalid key name: {}", k),
        }
    }
}

impl std::error::Error for ChordParseError {}

impl FromStr for KeyChord {
    type Err = ChordParseError;

    /// Parses `"Ctrl+Shift+S"`, `"Escape"`, `"Alt+F4"`, or `"Ctrl++"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ChordParseError::Empty);
        }

        // A trailing "++" means the key itself is '+'.
        let (mods_part, key_part) = if let Some(head) = s.strip_suffix("++") {
            (Some(head), "+")
        } else {
            match s.rsplit_once('+') {
                Some((head, key)) => (Some(head), key),
                None => (None, s),
            }
        };

        let mut modifiers = Modifiers::none();
        if let Some(head) = mods_part {
            for part in head.split('+') {
                modifiers = match part.trim().to_ascii_lowercase().as_str() {
                    "ctrl" | "control" => modifiers.with(Modifiers::CTRL),
                    "alt" | "option" => modifiers.with(Modifiers::ALT),
                    "shift" => modifiers.with(Modifiers::SHIFT),
                    "meta" | "super" | "win" | "cmd" => modifiers.with(Modifiers::META),
                    other => return Err(ChordParseError::InvalidModifier(other.to_string())),
                };
            }
        }

        let key_part = key_part.trim();
        let key = if key_part == "+" {
            KeyCode::Equal
        } else {
            KeyCode::from_name(key_part)
                .ok_or_else(|| ChordParseError::InvalidKey(key_part.to_string()))?
        };

        Ok(KeyChord::new(key, modifiers))
    }
}

/// Kind of UI control holding keyboard focus when a key arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    /// Nothing inside the shell has keyboard focus
    None,
    /// Single-line free-text input
    TextInput,
    /// Multi-line free-text editor
    TextArea,
    /// Button, checkbox or other activatable control
    Button,
    /// List, tree or grid navigated by keys
    List,
    /// Anything else
    Other,
}

impl ControlKind {
    /// Returns true if characters typed here must reach the control untouched
    pub fn accepts_text(&self) -> bool {
        matches!(self, Self::TextInput | Self::TextArea)
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::TextInput => "text_input",
            Self::TextArea => "text_area",
            Self::Button => "button",
            Self::List => "list",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}
