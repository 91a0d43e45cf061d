//! # Shortcut Dispatcher
//!
//! Decides, for every keystroke, whether it runs a pane shortcut, a global
//! shortcut, or passes through untouched to the focused control.
//!
//! ## Philosophy
//!
//! - **Typing first**: Text controls keep their characters (see [`guard`])
//! - **Scoped bindings**: A pane's bindings shadow global ones while it is active
//! - **Explicit ownership**: The session owns the dispatcher, panes borrow it
//! - **Failure contained**: A failing or panicking action never escapes a key press
//!
//! ## Resolution Order
//!
//! 1. Typing guard: plain text into a text control is not handled
//! 2. `(active pane, chord)` binding
//! 3. `(global, chord)` binding
//! 4. Not handled

pub mod guard;
pub mod keymap;

pub use guard::TypingGuard;
pub use keymap::{actions, Keymap, KeymapError};

use core_types::PaneId;
use input_types::{ControlKind, KeyChord, KeyCode, KeyEvent, Modifiers};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Failure reported by a shortcut action
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Action failed: {0}")]
    Failed(String),

    #[error("Action panicked: {0}")]
    Panicked(String),
}

impl ActionError {
    pub fn failed(reason: impl Into<String>) -> Self {
        ActionError::Failed(reason.into())
    }
}

/// Result of running a shortcut action
pub type ActionResult = Result<(), ActionError>;

/// Zero-argument callback run when a chord fires
pub type ShortcutAction = Box<dyn FnMut() -> ActionResult>;

/// Where a binding is live
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Global,
    Pane(PaneId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Pane(pane) => write!(f, "pane:{}", pane),
        }
    }
}

struct Binding {
    description: String,
    action: ShortcutAction,
}

/// How a keystroke was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Typing guard kept the key for the focused text control
    Guarded,
    /// A binding for the active pane ran
    Pane(PaneId),
    /// A global binding ran
    Global,
    /// Nothing is bound to the chord
    Unbound,
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Pane(_) | DispatchOutcome::Global)
    }
}

/// One line of the shortcut help overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingInfo {
    pub chord: KeyChord,
    pub scope: Scope,
    pub description: String,
}

/// Keystroke router owning every registered shortcut
pub struct ShortcutDispatcher {
    bindings: HashMap<(Scope, KeyChord), Binding>,
    guard: TypingGuard,
    last_error: Option<ActionError>,
}

impl ShortcutDispatcher {
    /// Creates a dispatcher with the standard typing guard
    pub fn new() -> Self {
        Self::with_guard(TypingGuard::new())
    }

    pub fn with_guard(guard: TypingGuard) -> Self {
        Self {
            bindings: HashMap::new(),
            guard,
            last_error: None,
        }
    }

    pub fn guard(&self) -> &TypingGuard {
        &self.guard
    }

    pub fn guard_mut(&mut self) -> &mut TypingGuard {
        &mut self.guard
    }

    /// Binds a chord usable anywhere
    pub fn register_global(
        &mut self,
        chord: KeyChord,
        action: impl FnMut() -> ActionResult + 'static,
        description: impl Into<String>,
    ) {
        self.insert(Scope::Global, chord, Box::new(action), description.into());
    }

    /// Binds a chord usable only while `pane` is the active pane
    pub fn register_for_pane(
        &mut self,
        pane: &PaneId,
        chord: KeyChord,
        action: impl FnMut() -> ActionResult + 'static,
        description: impl Into<String>,
    ) {
        self.insert(
            Scope::Pane(pane.clone()),
            chord,
            Box::new(action),
            description.into(),
        );
    }

    /// Binds a named global action to the chord `keymap` assigns it
    ///
    /// Returns the chord used, or `None` when the keymap has no entry.
    pub fn register_named(
        &mut self,
        keymap: &Keymap,
        name: &str,
        action: impl FnMut() -> ActionResult + 'static,
        description: impl Into<String>,
    ) -> Option<KeyChord> {
        let Some(chord) = keymap.chord_for(name) else {
            tracing::warn!(target: "services_shortcuts", action = name, "no chord mapped for action");
            return None;
        };
        self.register_global(chord, action, description);
        Some(chord)
    }

    fn insert(&mut self, scope: Scope, chord: KeyChord, action: ShortcutAction, description: String) {
        let key = (scope, chord);
        if let Some(previous) = self.bindings.get(&key) {
            tracing::warn!(
                target: "services_shortcuts",
                scope = %key.0,
                %chord,
                previous = %previous.description,
                replacement = %description,
                "shortcut conflict, overwriting existing binding"
            );
        }
        self.bindings.insert(key, Binding { description, action });
    }

    /// Removes a single binding
    pub fn unregister(&mut self, scope: &Scope, chord: &KeyChord) -> bool {
        self.bindings.remove(&(scope.clone(), *chord)).is_some()
    }

    /// Removes every binding registered for `pane`, returning how many went
    pub fn clear_pane(&mut self, pane: &PaneId) -> usize {
        let before = self.bindings.len();
        self.bindings
            .retain(|(scope, _), _| !matches!(scope, Scope::Pane(owner) if owner == pane));
        let removed = before - self.bindings.len();
        if removed > 0 {
            tracing::debug!(target: "services_shortcuts", %pane, removed, "cleared pane bindings");
        }
        removed
    }

    /// Entry point for the UI layer; returns true if the key was consumed
    pub fn handle_key_press(
        &mut self,
        key: KeyCode,
        modifiers: Modifiers,
        focused_control: ControlKind,
        active_pane: Option<&PaneId>,
    ) -> bool {
        self.dispatch(KeyChord::new(key, modifiers), focused_control, active_pane)
            .is_handled()
    }

    /// Like [`handle_key_press`](Self::handle_key_press); releases are never handled
    pub fn handle_key_event(
        &mut self,
        event: &KeyEvent,
        focused_control: ControlKind,
        active_pane: Option<&PaneId>,
    ) -> bool {
        event.is_activation()
            && self.handle_key_press(event.code, event.modifiers, focused_control, active_pane)
    }

    /// Resolves and runs a chord, reporting how it was resolved
    pub fn dispatch(
        &mut self,
        chord: KeyChord,
        focused_control: ControlKind,
        active_pane: Option<&PaneId>,
    ) -> DispatchOutcome {
        if self.guard.should_block(&chord, focused_control) {
            tracing::trace!(target: "services_shortcuts", %chord, control = %focused_control, "typing guard");
            return DispatchOutcome::Guarded;
        }

        if let Some(pane) = active_pane {
            let key = (Scope::Pane(pane.clone()), chord);
            if let Some(binding) = self.bindings.get_mut(&key) {
                let result = run_action(&mut binding.action);
                self.settle(&key, result);
                return DispatchOutcome::Pane(pane.clone());
            }
        }

        let key = (Scope::Global, chord);
        if let Some(binding) = self.bindings.get_mut(&key) {
            let result = run_action(&mut binding.action);
            self.settle(&key, result);
            return DispatchOutcome::Global;
        }

        DispatchOutcome::Unbound
    }

    fn settle(&mut self, key: &(Scope, KeyChord), result: ActionResult) {
        if let Err(err) = result {
            tracing::warn!(
                target: "services_shortcuts",
                scope = %key.0,
                chord = %key.1,
                error = %err,
                "shortcut action failed"
            );
            self.last_error = Some(err);
        }
    }

    /// Takes the most recent action failure, if any
    pub fn take_last_error(&mut self) -> Option<ActionError> {
        self.last_error.take()
    }

    pub fn is_bound(&self, scope: &Scope, chord: &KeyChord) -> bool {
        self.bindings.contains_key(&(scope.clone(), *chord))
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn pane_binding_count(&self, pane: &PaneId) -> usize {
        self.bindings
            .keys()
            .filter(|(scope, _)| matches!(scope, Scope::Pane(owner) if owner == pane))
            .count()
    }

    /// Effective bindings for a help overlay
    ///
    /// Pane bindings for `active_pane` are listed; a global binding is only
    /// listed when no pane binding shadows its chord. Sorted by chord.
    pub fn describe(&self, active_pane: Option<&PaneId>) -> Vec<BindingInfo> {
        let active_scope = active_pane.map(|pane| Scope::Pane(pane.clone()));
        let shadowed = |chord: &KeyChord| {
            active_scope
                .as_ref()
                .is_some_and(|scope| self.bindings.contains_key(&(scope.clone(), *chord)))
        };

        let mut infos: Vec<BindingInfo> = self
            .bindings
            .iter()
            .filter(|((scope, chord), _)| match scope {
                Scope::Global => !shadowed(chord),
                pane_scope => Some(pane_scope) == active_scope.as_ref(),
            })
            .map(|((scope, chord), binding)| BindingInfo {
                chord: *chord,
                scope: scope.clone(),
                description: binding.description.clone(),
            })
            .collect();

        infos.sort_by(|a, b| a.chord.cmp(&b.chord));
        infos
    }
}

impl Default for ShortcutDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ShortcutDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutDispatcher")
            .field("bindings", &self.bindings.len())
            .field("guard", &self.guard)
            .finish()
    }
}

fn run_action(action: &mut ShortcutAction) -> ActionResult {
    match panic::catch_unwind(AssertUnwindSafe(|| action())) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            Err(ActionError::Panicked(message))
        }
    }
}
