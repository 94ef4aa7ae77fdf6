//! Village state: buildings, stockpile, garrison, and build queue.
//!
//! A village is a plain owned record; nothing here persists itself.
//! The repository collaborator loads and saves whole villages, and the
//! tick scheduler mutates them through the engine modules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::BuildingKind;
use crate::clock::GameTime;
use crate::queue::BuildQueue;
use crate::resources::VillageResources;
use crate::troops::Troops;

/// Unique identifier for a village.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VillageId(pub u32);

impl std::fmt::Display for VillageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One village's complete mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Village {
    /// Unique identifier.
    pub id: VillageId,
    /// Display name.
    pub name: String,
    /// Building levels; absent kinds are level 0.
    buildings: BTreeMap<BuildingKind, u8>,
    /// Stockpile and storage caps.
    pub resources: VillageResources,
    /// Troops currently at home (defenders in a battle).
    pub garrison: Troops,
    /// Pending build and training orders.
    pub queue: BuildQueue,
    /// Last time the tick scheduler advanced this village.
    pub last_updated: GameTime,
}

impl Village {
    /// Create an empty village at time zero.
    #[must_use]
    pub fn new(id: VillageId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            buildings: BTreeMap::new(),
            resources: VillageResources::default(),
            garrison: Troops::ZERO,
            queue: BuildQueue::new(),
            last_updated: GameTime::ZERO,
        }
    }

    /// Level of a building kind (0 if never built).
    #[must_use]
    pub fn building_level(&self, kind: BuildingKind) -> u8 {
        self.buildings.get(&kind).copied().unwrap_or(0)
    }

    /// Set a building level directly (world setup, admin tooling).
    pub fn set_building_level(&mut self, kind: BuildingKind, level: u8) {
        if level == 0 {
            self.buildings.remove(&kind);
        } else {
            self.buildings.insert(kind, level);
        }
    }

    /// Raise a building by one level, saturating at `u8::MAX`.
    ///
    /// Returns the new level.
    pub fn raise_building(&mut self, kind: BuildingKind) -> u8 {
        let level = self.building_level(kind).saturating_add(1);
        self.buildings.insert(kind, level);
        level
    }

    /// Lower a building by `levels`, clamping at zero.
    ///
    /// Returns the new level. Used for siege damage.
    pub fn damage_building(&mut self, kind: BuildingKind, levels: u8) -> u8 {
        let level = self.building_level(kind).saturating_sub(levels);
        self.set_building_level(kind, level);
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbuilt_is_level_zero() {
        let village = Village::new(VillageId(1), "Rivermouth");
        assert_eq!(village.building_level(BuildingKind::Woodcutter), 0);
    }

    #[test]
    fn test_raise_and_damage_building() {
        let mut village = Village::new(VillageId(1), "Rivermouth");
        assert_eq!(village.raise_building(BuildingKind::Wall), 1);
        assert_eq!(village.raise_building(BuildingKind::Wall), 2);
        assert_eq!(village.building_level(BuildingKind::Wall), 2);

        // Damage clamps at zero
        assert_eq!(village.damage_building(BuildingKind::Wall, 5), 0);
        assert_eq!(village.building_level(BuildingKind::Wall), 0);
    }
}
