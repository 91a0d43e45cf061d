//! Workspace snapshot persistence
//!
//! A workspace is saved as versioned JSON holding every pane's state blob,
//! the pane that was active and each pane's last focus target.

use crate::pane::PaneStateBlob;
use core_types::{FocusTarget, PaneId, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Serializable workspace contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSnapshotData {
    /// Version of the snapshot format (for future migrations)
    pub version: u32,
    pub workspace: WorkspaceId,
    /// Pane states in opening order
    pub panes: Vec<PaneStateBlob>,
    #[serde(default)]
    pub active: Option<PaneId>,
    /// Last focused target per pane (stable ordering via BTreeMap)
    #[serde(default)]
    pub focus: BTreeMap<PaneId, FocusTarget>,
}

impl WorkspaceSnapshotData {
    /// Current version of the snapshot format
    pub const CURRENT_VERSION: u32 = 1;

    /// Creates an empty snapshot of `workspace`
    pub fn empty(workspace: WorkspaceId) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            workspace,
            panes: Vec::new(),
            active: None,
            focus: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    pub fn pane(&self, pane: &PaneId) -> Option<&PaneStateBlob> {
        self.panes.iter().find(|blob| &blob.pane == pane)
    }
}

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Errors that can occur while encoding or decoding a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Failed to serialize workspace: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize workspace: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported workspace snapshot version: {0}")]
    UnsupportedVersion(u32),
}

/// Serializes a snapshot to JSON bytes
pub fn serialize_snapshot(data: &WorkspaceSnapshotData) -> SnapshotResult<Vec<u8>> {
    serde_json::to_vec_pretty(data).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
}

/// Deserializes a snapshot from JSON bytes
pub fn deserialize_snapshot(bytes: &[u8]) -> SnapshotResult<WorkspaceSnapshotData> {
    let data: WorkspaceSnapshotData = serde_json::from_slice(bytes)
        .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;

    if data.version != WorkspaceSnapshotData::CURRENT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(data.version));
    }

    Ok(data)
}

/// Decodes a snapshot, falling back to an empty workspace on error
pub fn load_snapshot_safe(bytes: &[u8], workspace: &WorkspaceId) -> WorkspaceSnapshotData {
    deserialize_snapshot(bytes).unwrap_or_else(|err| {
        tracing::warn!(
            target: "services_workspace_manager",
            %workspace,
            error = %err,
            "discarding unreadable workspace snapshot"
        );
        WorkspaceSnapshotData::empty(workspace.clone())
    })
}
