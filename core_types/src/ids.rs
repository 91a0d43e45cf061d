//! Identifiers for shell entities

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a shell session
///
/// A session owns exactly one dispatcher, focus manager and coordinator.
/// The ID only exists so log lines from concurrent test sessions can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a session ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

macro_rules! named_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates the identifier from any string-like value
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Returns the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

named_id!(
    /// Identifier of an open pane (`"Notes"`, `"Tasks"`)
    ///
    /// Pane IDs are chosen by the host and are stable across restarts so
    /// persisted state and focus records can find their pane again.
    PaneId
);

named_id!(
    /// Identifier of a workspace (a named group of panes)
    WorkspaceId
);

named_id!(
    /// Pane type name used to look up the factory that builds the pane
    PaneKind
);

named_id!(
    /// Named logical focus target inside a pane (`"searchBox"`, `"editor"`)
    ///
    /// Panes expose these through the `Focusable` capability instead of
    /// leaking visual-tree paths.
    FocusTarget
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_session_id_creation() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_session_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = SessionId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn test_session_id_display() {
        let display = format!("{}", SessionId::new());
        assert!(display.starts_with("Session("));
    }

    #[test]
    fn test_pane_id_equality_by_name() {
        assert_eq!(PaneId::new("Notes"), PaneId::from("Notes"));
        assert_ne!(PaneId::new("Notes"), PaneId::new("Tasks"));
    }

    #[test]
    fn test_pane_id_borrow_lookup() {
        let mut map = HashMap::new();
        map.insert(PaneId::new("Notes"), 1);
        assert_eq!(map.get("Notes"), Some(&1));
    }

    #[test]
    fn test_named_ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&WorkspaceId::new("main")).unwrap();
        assert_eq!(json, "\"main\"");

        let target: FocusTarget = serde_json::from_str("\"searchBox\"").unwrap();
        assert_eq!(target.as_str(), "searchBox");
    }

    #[test]
    fn test_display() {
        assert_eq!(PaneKind::new("notes").to_string(), "notes");
    }
}
