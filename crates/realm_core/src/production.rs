//! Resource production and storage capacity engine.
//!
//! Rates and caps are pure functions of building levels; applying
//! production is the only mutation and it upholds the storage
//! invariant: current never exceeds capacity.

use crate::catalog::{BuildingKind, Catalog};
use crate::clock::GameSpeed;
use crate::resources::{Resources, VillageResources};
use crate::village::Village;

/// Per-tick production rate of a village.
///
/// A pure function of building levels and world speed; never negative.
/// A village with no resource fields (or a kind missing from the
/// catalog) simply produces zero for that resource.
#[must_use]
pub fn production_rate(village: &Village, catalog: &Catalog, speed: GameSpeed) -> Resources {
    let base = Resources::new(
        catalog.production_per_tick(
            BuildingKind::Woodcutter,
            village.building_level(BuildingKind::Woodcutter),
        ),
        catalog.production_per_tick(
            BuildingKind::ClayPit,
            village.building_level(BuildingKind::ClayPit),
        ),
        catalog.production_per_tick(
            BuildingKind::IronMine,
            village.building_level(BuildingKind::IronMine),
        ),
        catalog.production_per_tick(
            BuildingKind::CropField,
            village.building_level(BuildingKind::CropField),
        ),
    );
    Resources::new(
        speed.scale_amount(base.wood),
        speed.scale_amount(base.clay),
        speed.scale_amount(base.iron),
        speed.scale_amount(base.crop),
    )
}

/// Storage caps of a village.
///
/// Warehouse level caps wood, clay and iron; granary level caps crop.
#[must_use]
pub fn storage_capacity(village: &Village, catalog: &Catalog) -> Resources {
    let warehouse = catalog.capacity(
        BuildingKind::Warehouse,
        village.building_level(BuildingKind::Warehouse),
    );
    let granary = catalog.capacity(
        BuildingKind::Granary,
        village.building_level(BuildingKind::Granary),
    );
    Resources::new(warehouse, warehouse, warehouse, granary)
}

/// Add `rate * elapsed_ticks` to the stockpile, clamping at capacity.
///
/// Returns the amounts actually stored (overflow past the caps is
/// discarded).
pub fn apply_production(
    state: &mut VillageResources,
    rate: Resources,
    elapsed_ticks: u64,
) -> Resources {
    let produced = Resources::from_array(rate.to_array().map(|component| {
        let total = component as u64 * elapsed_ticks;
        u32::try_from(total).unwrap_or(u32::MAX)
    }));
    state.add(produced)
}

/// Recompute a village's storage caps from its current building levels.
///
/// Called after queue completion so a finished warehouse raises the cap
/// before production for the next interval is applied.
pub fn refresh_storage(village: &mut Village, catalog: &Catalog) {
    let capacity = storage_capacity(village, catalog);
    village.resources.set_capacity(capacity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::village::VillageId;

    fn field_village() -> Village {
        let mut village = Village::new(VillageId(1), "Rivermouth");
        village.set_building_level(BuildingKind::Woodcutter, 2);
        village.set_building_level(BuildingKind::ClayPit, 1);
        village.set_building_level(BuildingKind::CropField, 3);
        village
    }

    #[test]
    fn test_production_rate_from_levels() {
        let catalog = Catalog::standard();
        let rate = production_rate(&field_village(), &catalog, GameSpeed::NORMAL);
        // Woodcutter 6/level, clay 5, iron unbuilt, crop 7
        assert_eq!(rate, Resources::new(12, 5, 0, 21));
    }

    #[test]
    fn test_production_rate_scales_with_speed() {
        let catalog = Catalog::standard();
        let rate = production_rate(
            &field_village(),
            &catalog,
            GameSpeed::from_percentage(300),
        );
        assert_eq!(rate, Resources::new(36, 15, 0, 63));
    }

    #[test]
    fn test_empty_village_produces_nothing() {
        let catalog = Catalog::standard();
        let village = Village::new(VillageId(2), "Bare Hill");
        assert_eq!(
            production_rate(&village, &catalog, GameSpeed::NORMAL),
            Resources::ZERO
        );
    }

    #[test]
    fn test_storage_capacity_from_levels() {
        let catalog = Catalog::standard();
        let mut village = Village::new(VillageId(1), "Rivermouth");
        village.set_building_level(BuildingKind::Warehouse, 1);
        village.set_building_level(BuildingKind::Granary, 2);

        let caps = storage_capacity(&village, &catalog);
        assert_eq!(caps, Resources::new(2000, 2000, 2000, 4000));
    }

    #[test]
    fn test_apply_production_clamps_at_cap() {
        // Cap 2000, current 1800, rate 500 for one tick -> 2000, not 2300
        let mut state = VillageResources::new(
            Resources::new(1800, 0, 0, 0),
            Resources::new(2000, 2000, 2000, 2000),
        );
        let stored = apply_production(&mut state, Resources::new(500, 0, 0, 0), 1);
        assert_eq!(state.current().wood, 2000);
        assert_eq!(stored.wood, 200);
    }

    #[test]
    fn test_apply_production_multiplies_elapsed() {
        let mut state =
            VillageResources::new(Resources::ZERO, Resources::splat(100_000));
        apply_production(&mut state, Resources::new(12, 5, 0, 21), 100);
        assert_eq!(state.current(), Resources::new(1200, 500, 0, 2100));
    }

    #[test]
    fn test_apply_production_zero_elapsed_is_noop() {
        let mut state =
            VillageResources::new(Resources::splat(7), Resources::splat(100));
        apply_production(&mut state, Resources::splat(50), 0);
        assert_eq!(state.current(), Resources::splat(7));
    }

    #[test]
    fn test_refresh_storage_clamps_stockpile() {
        let catalog = Catalog::standard();
        let mut village = field_village();
        village.resources = VillageResources::new(
            Resources::splat(5000),
            Resources::splat(5000),
        );

        // No storage buildings: base floor is 800 per resource
        refresh_storage(&mut village, &catalog);
        assert_eq!(village.resources.current(), Resources::splat(800));
    }
}
