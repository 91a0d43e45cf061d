//! Pane contract and pane factories
//!
//! A pane is anything the coordinator can build, show, persist and tear
//! down. Rendering and business logic live behind this trait.

use core_types::{PaneId, PaneKind};
use lifecycle::ReadySignal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use services_focus_manager::Focusable;
use services_shortcuts::ShortcutDispatcher;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Pane error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaneError {
    #[error("State for pane {pane} belongs to kind {found}, expected {expected}")]
    KindMismatch {
        pane: PaneId,
        expected: PaneKind,
        found: PaneKind,
    },

    #[error("State field {field} is missing or malformed")]
    BadField { field: String },
}

/// Opaque saved state of one pane
///
/// Carries the pane kind so the right factory can rebuild the pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneStateBlob {
    pub pane: PaneId,
    pub kind: PaneKind,
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

impl PaneStateBlob {
    pub fn new(pane: PaneId, kind: PaneKind) -> Self {
        Self {
            pane,
            kind,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// String field or [`PaneError::BadField`]
    pub fn require_str(&self, key: &str) -> Result<&str, PaneError> {
        self.get_str(key).ok_or_else(|| PaneError::BadField {
            field: key.to_string(),
        })
    }

    /// Fails with [`PaneError::KindMismatch`] unless the blob was saved by `kind`
    pub fn expect_kind(&self, kind: &PaneKind) -> Result<(), PaneError> {
        if &self.kind == kind {
            Ok(())
        } else {
            Err(PaneError::KindMismatch {
                pane: self.pane.clone(),
                expected: kind.clone(),
                found: self.kind.clone(),
            })
        }
    }
}

/// A hosted pane
pub trait Pane {
    fn pane_id(&self) -> &PaneId;

    fn kind(&self) -> PaneKind;

    /// Registers the pane's shortcuts; called once after construction
    fn initialize(&mut self, shortcuts: &mut ShortcutDispatcher);

    /// Releases pane resources; bindings are cleared by the coordinator
    fn dispose(&mut self) {}

    fn save_state(&self) -> PaneStateBlob;

    fn restore_state(&mut self, state: &PaneStateBlob) -> Result<(), PaneError>;

    /// Fires once the pane's UI has been constructed
    fn pane_ready(&self) -> ReadySignal;

    fn is_ready(&self) -> bool {
        self.pane_ready().is_ready()
    }

    fn as_focusable(&mut self) -> &mut dyn Focusable;
}

/// Builds a pane of one kind for a given id
pub type PaneFactory = Box<dyn Fn(&PaneId) -> Box<dyn Pane>>;

/// Factories keyed by pane kind
#[derive(Default)]
pub struct PaneRegistry {
    factories: HashMap<PaneKind, PaneFactory>,
}

impl PaneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory for `kind`, replacing an earlier one
    pub fn register(
        &mut self,
        kind: impl Into<PaneKind>,
        factory: impl Fn(&PaneId) -> Box<dyn Pane> + 'static,
    ) {
        let kind = kind.into();
        if self.factories.contains_key(&kind) {
            tracing::warn!(target: "services_workspace_manager", %kind, "replacing pane factory");
        }
        self.factories.insert(kind, Box::new(factory));
    }

    /// Builds a pane; `None` for unknown kinds
    pub fn create(&self, kind: &PaneKind, pane: &PaneId) -> Option<Box<dyn Pane>> {
        self.factories.get(kind).map(|factory| factory(pane))
    }

    pub fn knows(&self, kind: &PaneKind) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<PaneKind> {
        let mut kinds: Vec<PaneKind> = self.factories.keys().cloned().collect();
        kinds.sort();
        kinds
    }
}

impl std::fmt::Debug for PaneRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaneRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
