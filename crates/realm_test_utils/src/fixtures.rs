//! Test fixtures and helpers.
//!
//! Pre-built villages and worlds for consistent testing.

use fixed::types::I32F32;
use realm_core::catalog::{BuildingKind, Catalog};
use realm_core::resources::{Resources, VillageResources};
use realm_core::store::MemoryStore;
use realm_core::tick::TickEngine;
use realm_core::troops::Troops;
use realm_core::village::{Village, VillageId};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real engine code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A small working village: level-2 resource fields, a stocked but
/// far-from-full warehouse, no garrison.
#[must_use]
pub fn homestead(id: u32) -> Village {
    let mut village = Village::new(VillageId(id), format!("homestead-{id}"));
    village.set_building_level(BuildingKind::Woodcutter, 2);
    village.set_building_level(BuildingKind::ClayPit, 2);
    village.set_building_level(BuildingKind::IronMine, 1);
    village.set_building_level(BuildingKind::CropField, 2);
    village.resources = VillageResources::new(Resources::splat(750), Resources::splat(100_000));
    village
}

/// A homestead with a garrison, a wall, and military buildings.
#[must_use]
pub fn stronghold(id: u32, garrison: Troops) -> Village {
    let mut village = homestead(id);
    village.set_building_level(BuildingKind::Barracks, 1);
    village.set_building_level(BuildingKind::Wall, 5);
    village.garrison = garrison;
    village
}

/// A world of `count` homesteads (ids starting at 1) on the standard
/// catalog.
#[must_use]
pub fn standard_world(count: u32) -> (TickEngine, MemoryStore) {
    let mut store = MemoryStore::new();
    for id in 1..=count {
        store.insert(homestead(id));
    }
    (TickEngine::new(Catalog::standard()), store)
}
