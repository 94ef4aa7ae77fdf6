//! Data-driven building and unit definitions.
//!
//! Per-kind, per-level numbers (costs, durations, production, storage,
//! wall bonus) live in a registry loaded from data rather than being
//! scattered through engine code. The standard catalog covers a default
//! world; servers can load a tuned one from RON.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};
use crate::resources::Resources;
use crate::troops::TroopType;

/// Every building kind a village can construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Produces wood.
    Woodcutter,
    /// Produces clay.
    ClayPit,
    /// Produces iron.
    IronMine,
    /// Produces crop.
    CropField,
    /// Stores wood, clay and iron.
    Warehouse,
    /// Stores crop.
    Granary,
    /// Trains infantry and archers.
    Barracks,
    /// Trains cavalry.
    Stable,
    /// Builds siege engines.
    Workshop,
    /// Grants the defender a power bonus per level.
    Wall,
}

impl BuildingKind {
    /// All building kinds in canonical order.
    pub const ALL: [Self; 10] = [
        Self::Woodcutter,
        Self::ClayPit,
        Self::IronMine,
        Self::CropField,
        Self::Warehouse,
        Self::Granary,
        Self::Barracks,
        Self::Stable,
        Self::Workshop,
        Self::Wall,
    ];
}

/// Blueprint defining one building kind's per-level numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSpec {
    /// Display name of the building.
    pub name: String,
    /// Cost of level 1.
    pub base_cost: Resources,
    /// Cost multiplier per additional level.
    #[serde(with = "fixed_serde")]
    pub cost_growth: Fixed,
    /// Build time of level 1 in base (1x speed) seconds.
    pub base_duration_secs: u64,
    /// Duration multiplier per additional level.
    #[serde(with = "fixed_serde")]
    pub duration_growth: Fixed,
    /// Resource output per level per tick (zero for non-field buildings).
    pub production_per_level: u32,
    /// Storage granted at level 0 (zero for non-storage buildings).
    pub base_capacity: u32,
    /// Additional storage per level.
    pub capacity_per_level: u32,
    /// Defender power bonus in percent per level (Wall only).
    pub defense_percent_per_level: u32,
    /// Highest reachable level.
    pub max_level: u8,
}

impl BuildingSpec {
    fn field(name: &str, base_cost: Resources, production_per_level: u32) -> Self {
        Self {
            name: name.to_owned(),
            base_cost,
            cost_growth: Fixed::from_num(1.28),
            base_duration_secs: 260,
            duration_growth: Fixed::from_num(1.16),
            production_per_level,
            base_capacity: 0,
            capacity_per_level: 0,
            defense_percent_per_level: 0,
            max_level: 20,
        }
    }

    fn storage(name: &str, base_cost: Resources, capacity_per_level: u32) -> Self {
        Self {
            name: name.to_owned(),
            base_cost,
            cost_growth: Fixed::from_num(1.28),
            base_duration_secs: 600,
            duration_growth: Fixed::from_num(1.16),
            production_per_level: 0,
            base_capacity: 800,
            capacity_per_level,
            defense_percent_per_level: 0,
            max_level: 20,
        }
    }

    fn military(name: &str, base_cost: Resources) -> Self {
        Self {
            name: name.to_owned(),
            base_cost,
            cost_growth: Fixed::from_num(1.28),
            base_duration_secs: 900,
            duration_growth: Fixed::from_num(1.16),
            production_per_level: 0,
            base_capacity: 0,
            capacity_per_level: 0,
            defense_percent_per_level: 0,
            max_level: 20,
        }
    }
}

/// Blueprint defining one troop type's training numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    /// Display name of the unit.
    pub name: String,
    /// Cost per head.
    pub cost: Resources,
    /// Training time per head in base (1x speed) seconds.
    pub train_secs: u64,
    /// Building that must exist to train this unit.
    pub trained_at: BuildingKind,
}

/// Registry of all building and unit blueprints for a world.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    buildings: HashMap<BuildingKind, BuildingSpec>,
    units: HashMap<TroopType, UnitSpec>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard world catalog.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self::new();

        catalog.register_building(
            BuildingKind::Woodcutter,
            BuildingSpec::field("Woodcutter", Resources::new(40, 100, 50, 60), 6),
        );
        catalog.register_building(
            BuildingKind::ClayPit,
            BuildingSpec::field("Clay Pit", Resources::new(80, 40, 80, 50), 5),
        );
        catalog.register_building(
            BuildingKind::IronMine,
            BuildingSpec::field("Iron Mine", Resources::new(100, 80, 30, 60), 5),
        );
        catalog.register_building(
            BuildingKind::CropField,
            BuildingSpec::field("Crop Field", Resources::new(70, 90, 70, 20), 7),
        );
        catalog.register_building(
            BuildingKind::Warehouse,
            BuildingSpec::storage("Warehouse", Resources::new(130, 160, 90, 40), 1200),
        );
        catalog.register_building(
            BuildingKind::Granary,
            BuildingSpec::storage("Granary", Resources::new(80, 100, 70, 20), 1600),
        );
        catalog.register_building(
            BuildingKind::Barracks,
            BuildingSpec::military("Barracks", Resources::new(210, 140, 260, 120)),
        );
        catalog.register_building(
            BuildingKind::Stable,
            BuildingSpec::military("Stable", Resources::new(260, 140, 220, 100)),
        );
        catalog.register_building(
            BuildingKind::Workshop,
            BuildingSpec::military("Workshop", Resources::new(460, 510, 600, 320)),
        );
        catalog.register_building(BuildingKind::Wall, {
            let mut wall = BuildingSpec::military("Wall", Resources::new(110, 160, 70, 60));
            wall.defense_percent_per_level = 3;
            wall
        });

        catalog.register_unit(
            TroopType::Infantry,
            UnitSpec {
                name: "Legionnaire".to_owned(),
                cost: Resources::new(120, 100, 150, 30),
                train_secs: 120,
                trained_at: BuildingKind::Barracks,
            },
        );
        catalog.register_unit(
            TroopType::Archer,
            UnitSpec {
                name: "Archer".to_owned(),
                cost: Resources::new(140, 150, 20, 40),
                train_secs: 180,
                trained_at: BuildingKind::Barracks,
            },
        );
        catalog.register_unit(
            TroopType::Cavalry,
            UnitSpec {
                name: "Knight".to_owned(),
                cost: Resources::new(550, 440, 320, 100),
                train_secs: 360,
                trained_at: BuildingKind::Stable,
            },
        );
        catalog.register_unit(
            TroopType::Siege,
            UnitSpec {
                name: "Catapult".to_owned(),
                cost: Resources::new(900, 1200, 600, 60),
                train_secs: 900,
                trained_at: BuildingKind::Workshop,
            },
        );

        catalog
    }

    /// Register a building blueprint.
    pub fn register_building(&mut self, kind: BuildingKind, spec: BuildingSpec) {
        self.buildings.insert(kind, spec);
    }

    /// Register a unit blueprint.
    pub fn register_unit(&mut self, troop: TroopType, spec: UnitSpec) {
        self.units.insert(troop, spec);
    }

    /// Get a building blueprint.
    #[must_use]
    pub fn building(&self, kind: BuildingKind) -> Option<&BuildingSpec> {
        self.buildings.get(&kind)
    }

    /// Get a unit blueprint.
    #[must_use]
    pub fn unit(&self, troop: TroopType) -> Option<&UnitSpec> {
        self.units.get(&troop)
    }

    /// Resource output per tick for a building kind at a level.
    ///
    /// Unknown kinds and level 0 produce nothing; malformed data never
    /// turns into an error or a negative rate.
    #[must_use]
    pub fn production_per_tick(&self, kind: BuildingKind, level: u8) -> u32 {
        self.buildings
            .get(&kind)
            .map_or(0, |spec| spec.production_per_level * level as u32)
    }

    /// Storage capacity granted by a building kind at a level.
    #[must_use]
    pub fn capacity(&self, kind: BuildingKind, level: u8) -> u32 {
        self.buildings.get(&kind).map_or(0, |spec| {
            spec.base_capacity + spec.capacity_per_level * level as u32
        })
    }

    /// Cost of building the given level (level 1 costs the base cost).
    ///
    /// `None` for unknown kinds or levels past the cap.
    #[must_use]
    pub fn upgrade_cost(&self, kind: BuildingKind, level: u8) -> Option<Resources> {
        let spec = self.buildings.get(&kind)?;
        if level == 0 || level > spec.max_level {
            return None;
        }
        let factor = compound(spec.cost_growth, level - 1);
        Some(spec.base_cost.multiply_by(factor))
    }

    /// Base-speed duration of building the given level.
    #[must_use]
    pub fn upgrade_duration(&self, kind: BuildingKind, level: u8) -> Option<u64> {
        let spec = self.buildings.get(&kind)?;
        if level == 0 || level > spec.max_level {
            return None;
        }
        let factor = compound(spec.duration_growth, level - 1);
        let scaled = Fixed::from_num(spec.base_duration_secs.min(i32::MAX as u64) as u32)
            .saturating_mul(factor);
        Some(scaled.to_num::<i64>().max(0) as u64)
    }

    /// Defender power multiplier granted by the wall at a level.
    ///
    /// Level 0 (or a kind without a defense bonus) is a 1.0 multiplier.
    #[must_use]
    pub fn defense_bonus(&self, kind: BuildingKind, level: u8) -> Fixed {
        let per_level = self
            .buildings
            .get(&kind)
            .map_or(0, |spec| spec.defense_percent_per_level);
        Fixed::ONE + Fixed::from_num(per_level * level as u32) / Fixed::from_num(100)
    }

    /// Serialize the catalog to RON.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Load a catalog from RON.
    pub fn from_ron(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }
}

/// `growth^exponent` by repeated multiplication (levels are small).
fn compound(growth: Fixed, exponent: u8) -> Fixed {
    let mut factor = Fixed::ONE;
    for _ in 0..exponent {
        factor = factor.saturating_mul(growth);
    }
    factor
}
