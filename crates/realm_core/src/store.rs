//! Persistence collaborator: versioned village load/save.
//!
//! The engine performs no I/O of its own; it loads snapshots, computes,
//! and saves. Serialization of two ticks for the same village is
//! enforced by optimistic versioning: a save carrying a stale version
//! fails with a conflict the caller retries, so production and queue
//! effects are never double-applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::village::{Village, VillageId};

/// A village snapshot plus the version token needed to save it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedVillage {
    /// The loaded state.
    pub village: Village,
    /// Version at load time; pass back to `save`.
    pub version: u64,
}

/// The persistence collaborator the tick scheduler drives.
pub trait VillageRepository {
    /// All village ids, in ascending order (deterministic tick order).
    fn village_ids(&self) -> Vec<VillageId>;

    /// Load a village snapshot with its current version.
    fn load(&self, id: VillageId) -> Result<VersionedVillage>;

    /// Save a village if `expected_version` still matches.
    ///
    /// Returns the new version on success; a stale version yields
    /// [`EngineError::ConcurrentTickConflict`] and stores nothing.
    fn save(&mut self, village: Village, expected_version: u64) -> Result<u64>;
}

/// In-memory repository with per-village version counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    villages: BTreeMap<VillageId, VersionedVillage>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a village at version 0, replacing any previous state.
    pub fn insert(&mut self, village: Village) {
        self.villages
            .insert(village.id, VersionedVillage { village, version: 0 });
    }

    /// Number of stored villages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.villages.len()
    }

    /// Whether the store holds no villages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.villages.is_empty()
    }

    /// Read-only peek at a village (no lock, no version token).
    #[must_use]
    pub fn peek(&self, id: VillageId) -> Option<&Village> {
        self.villages.get(&id).map(|entry| &entry.village)
    }

    /// Serialize the whole store to bytes.
    pub fn snapshot(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }

    /// Rebuild a store from a snapshot.
    pub fn restore(bytes: &[u8]) -> bincode::Result<Self> {
        bincode::deserialize(bytes)
    }
}

impl VillageRepository for MemoryStore {
    fn village_ids(&self) -> Vec<VillageId> {
        self.villages.keys().copied().collect()
    }

    fn load(&self, id: VillageId) -> Result<VersionedVillage> {
        self.villages
            .get(&id)
            .cloned()
            .ok_or(EngineError::VillageNotFound(id))
    }

    fn save(&mut self, village: Village, expected_version: u64) -> Result<u64> {
        let id = village.id;
        let entry = self
            .villages
            .get_mut(&id)
            .ok_or(EngineError::VillageNotFound(id))?;
        if entry.version != expected_version {
            return Err(EngineError::ConcurrentTickConflict {
                village: id,
                expected: expected_version,
                found: entry.version,
            });
        }
        entry.village = village;
        entry.version += 1;
        Ok(entry.version)
    }
}
