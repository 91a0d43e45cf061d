//! Workspace persistence collaborator
//!
//! The coordinator only knows [`WorkspaceStore`]. Concrete backends (files,
//! databases) live outside this crate; [`InMemoryWorkspaceStore`] keeps
//! encoded snapshots in memory for tests and the scripted host.

use crate::persistence::{
    deserialize_snapshot, serialize_snapshot, SnapshotError, WorkspaceSnapshotData,
};
use core_types::WorkspaceId;
use std::collections::BTreeMap;
use thiserror::Error;

/// Store error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Store backend failed: {0}")]
    Backend(String),
}

/// Loads and saves workspace snapshots
pub trait WorkspaceStore {
    /// `Ok(None)` when nothing was ever saved for `workspace`
    fn load(&self, workspace: &WorkspaceId) -> Result<Option<WorkspaceSnapshotData>, StoreError>;

    fn save(
        &mut self,
        workspace: &WorkspaceId,
        snapshot: &WorkspaceSnapshotData,
    ) -> Result<(), StoreError>;
}

/// Store holding encoded snapshots in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryWorkspaceStore {
    entries: BTreeMap<WorkspaceId, Vec<u8>>,
    saves: usize,
}

impl InMemoryWorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw bytes as the snapshot of `workspace`
    pub fn insert_raw(&mut self, workspace: impl Into<WorkspaceId>, bytes: Vec<u8>) {
        self.entries.insert(workspace.into(), bytes);
    }

    pub fn raw(&self, workspace: &WorkspaceId) -> Option<&[u8]> {
        self.entries.get(workspace).map(Vec::as_slice)
    }

    /// Workspaces that have a stored snapshot, sorted
    pub fn workspaces(&self) -> Vec<WorkspaceId> {
        self.entries.keys().cloned().collect()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl WorkspaceStore for InMemoryWorkspaceStore {
    fn load(&self, workspace: &WorkspaceId) -> Result<Option<WorkspaceSnapshotData>, StoreError> {
        match self.entries.get(workspace) {
            Some(bytes) => Ok(Some(deserialize_snapshot(bytes)?)),
            None => Ok(None),
        }
    }

    fn save(
        &mut self,
        workspace: &WorkspaceId,
        snapshot: &WorkspaceSnapshotData,
    ) -> Result<(), StoreError> {
        let bytes = serialize_snapshot(snapshot)?;
        self.entries.insert(workspace.clone(), bytes);
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_workspace_loads_none() {
        let store = InMemoryWorkspaceStore::new();
        assert_eq!(store.load(&WorkspaceId::new("main")), Ok(None));
    }

    #[test]
    fn test_save_then_load() {
        let mut store = InMemoryWorkspaceStore::new();
        let main = WorkspaceId::new("main");
        let snapshot = WorkspaceSnapshotData::empty(main.clone());

        store.save(&main, &snapshot).unwrap();
        assert_eq!(store.load(&main), Ok(Some(snapshot)));
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.workspaces(), vec![main]);
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let mut store = InMemoryWorkspaceStore::new();
        store.insert_raw("main", b"{broken".to_vec());
        assert!(matches!(
            store.load(&WorkspaceId::new("main")),
            Err(StoreError::Snapshot(SnapshotError::DeserializationFailed(_)))
        ));
    }
}
