//! In-flight troop movements between villages.
//!
//! A movement is pure data; the tick scheduler resolves arrivals in
//! arrival-time order and decides what landing means (merge, battle,
//! or unload).

use serde::{Deserialize, Serialize};

use crate::clock::GameTime;
use crate::resources::Resources;
use crate::troops::Troops;
use crate::village::VillageId;

/// Unique identifier for a troop movement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MovementId(pub u64);

impl std::fmt::Display for MovementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the troops do when they land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mission {
    /// Fight the destination's garrison and raid its stockpile.
    Attack,
    /// Merge into the destination's garrison.
    Reinforce,
    /// Survivors heading home with loot.
    Return,
}

/// Troops in flight between two villages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Unique identifier.
    pub id: MovementId,
    /// Where the troops set out from.
    pub origin: VillageId,
    /// Where they land.
    pub destination: VillageId,
    /// What landing means.
    pub mission: Mission,
    /// The travelling army.
    pub troops: Troops,
    /// Resources carried (loot on a return, zero otherwise).
    pub carrying: Resources,
    /// Departure time.
    pub departed_at: GameTime,
    /// Arrival time.
    pub arrives_at: GameTime,
}

impl Movement {
    /// Whether the movement has landed by `now`.
    #[must_use]
    pub fn has_arrived(&self, now: GameTime) -> bool {
        self.arrives_at <= now
    }

    /// One-way travel time in logical seconds.
    #[must_use]
    pub fn travel_secs(&self) -> u64 {
        self.arrives_at.saturating_since(self.departed_at)
    }
}
