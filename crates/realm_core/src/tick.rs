//! World tick scheduler.
//!
//! The tick is invoked externally on a fixed cadence (or on demand for
//! catch-up). For every village owed elapsed time it runs, in fixed
//! order: resource production, queue completion, then movement
//! arrivals, so that a finished wall or training batch defends the
//! village in a battle landing the same tick. Re-invoking with no
//! elapsed time performs no mutation.
//!
//! Per-village serialization comes from the repository's optimistic
//! versioning; a lost race surfaces as a conflict for the caller to
//! retry, never as double-applied production.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::battle::{self, BattleParticipant};
use crate::catalog::{BuildingKind, Catalog};
use crate::clock::{Clock, GameTime};
use crate::error::{EngineError, Result};
use crate::movement::{Mission, Movement, MovementId};
use crate::production::{apply_production, production_rate, refresh_storage};
use crate::queue::{self, CompletedEffect};
use crate::report::{BattleReport, Report, ReportSink};
use crate::store::VillageRepository;
use crate::troops::{BattleWeights, CarryWeights, TroopType, Troops};
use crate::village::{Village, VillageId};

/// Counters for one tick invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSummary {
    /// Villages examined this tick.
    pub villages: usize,
    /// Queue effects applied across all villages.
    pub queue_effects: usize,
    /// Movements that landed.
    pub arrivals: usize,
    /// Battles fought.
    pub battles: usize,
}

/// The top-level tick driver for one world.
///
/// Owns the world's catalog, battle tuning, and in-flight movements.
/// Village state itself lives behind the repository collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickEngine {
    catalog: Catalog,
    weights: BattleWeights,
    carry: CarryWeights,
    movements: Vec<Movement>,
    next_movement_id: u64,
}

impl TickEngine {
    /// Create a tick engine with default battle tuning.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            weights: BattleWeights::default(),
            carry: CarryWeights::default(),
            movements: Vec::new(),
            next_movement_id: 1,
        }
    }

    /// Builder method to set battle power weights.
    #[must_use]
    pub fn with_weights(mut self, weights: BattleWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Builder method to set carry capacity weights.
    #[must_use]
    pub fn with_carry(mut self, carry: CarryWeights) -> Self {
        self.carry = carry;
        self
    }

    /// The world's catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Movements currently in flight, in dispatch order.
    #[must_use]
    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    /// Dispatch troops from a village's garrison.
    ///
    /// Deducts the troops from the origin immediately; travel time is
    /// scaled by world speed. `Return` movements are scheduled by the
    /// engine itself after a battle.
    pub fn send_troops<R: VillageRepository, C: Clock>(
        &mut self,
        repo: &mut R,
        clock: &C,
        origin: VillageId,
        destination: VillageId,
        mission: Mission,
        troops: Troops,
        base_travel_secs: u64,
    ) -> Result<MovementId> {
        // Both endpoints must exist before anything is deducted
        repo.load(destination)?;
        let loaded = repo.load(origin)?;
        let mut village = loaded.village;

        for troop in TroopType::ALL {
            let available = village.garrison.get(troop);
            let required = troops.get(troop);
            if available < required {
                return Err(EngineError::InsufficientTroops {
                    troop: troop.name(),
                    required,
                    available,
                });
            }
        }
        village.garrison = village.garrison.subtract(troops);
        repo.save(village, loaded.version)?;

        let now = clock.now();
        let id = self.next_movement();
        self.movements.push(Movement {
            id,
            origin,
            destination,
            mission,
            troops,
            carrying: crate::resources::Resources::ZERO,
            departed_at: now,
            arrives_at: now.plus_secs(clock.speed().scale_duration(base_travel_secs)),
        });
        Ok(id)
    }

    /// Advance the whole world to the clock's current time.
    ///
    /// Per village: production, queue completion, `last_updated`
    /// bumped. Then every movement with `arrives_at <= now` lands, in
    /// arrival-time order (ties by movement id). Conflicts from
    /// concurrent saves propagate for the caller to retry with backoff.
    pub fn process_tick<R, C, S>(
        &mut self,
        repo: &mut R,
        clock: &C,
        sink: &mut S,
    ) -> Result<TickSummary>
    where
        R: VillageRepository,
        C: Clock,
        S: ReportSink,
    {
        let now = clock.now();
        let mut summary = TickSummary::default();

        for id in repo.village_ids() {
            let loaded = repo.load(id)?;
            let mut village = loaded.village;
            if let Some(effects) = advance_village(&self.catalog, &mut village, clock, sink) {
                summary.queue_effects += effects;
                repo.save(village, loaded.version)?;
            }
            summary.villages += 1;
        }

        let mut arrived: Vec<Movement> = Vec::new();
        self.movements.retain(|movement| {
            if movement.has_arrived(now) {
                arrived.push(*movement);
                false
            } else {
                true
            }
        });
        arrived.sort_unstable_by_key(|movement| (movement.arrives_at, movement.id));
        for movement in arrived {
            self.resolve_arrival(repo, movement, now, sink, &mut summary)?;
        }

        debug!(
            villages = summary.villages,
            queue_effects = summary.queue_effects,
            arrivals = summary.arrivals,
            battles = summary.battles,
            now = %now,
            "tick processed"
        );
        Ok(summary)
    }

    fn resolve_arrival<R: VillageRepository, S: ReportSink>(
        &mut self,
        repo: &mut R,
        movement: Movement,
        now: GameTime,
        sink: &mut S,
        summary: &mut TickSummary,
    ) -> Result<()> {
        match movement.mission {
            Mission::Reinforce | Mission::Return => {
                let Ok(loaded) = repo.load(movement.destination) else {
                    warn!(
                        movement = %movement.id,
                        destination = %movement.destination,
                        "arrival at missing village dropped"
                    );
                    return Ok(());
                };
                let mut village = loaded.village;
                village.garrison = village.garrison.add(movement.troops);
                if !movement.carrying.is_zero() {
                    // Loot past the caps is discarded like any deposit
                    village.resources.add(movement.carrying);
                }
                repo.save(village, loaded.version)?;
                sink.record(Report::MovementArrived {
                    movement: movement.id,
                    village: movement.destination,
                    mission: movement.mission,
                    at: now,
                });
                summary.arrivals += 1;
            }
            Mission::Attack => {
                let Ok(loaded) = repo.load(movement.destination) else {
                    warn!(
                        movement = %movement.id,
                        destination = %movement.destination,
                        "attack on missing village dropped"
                    );
                    return Ok(());
                };
                let mut village = loaded.village;

                let wall_level = village.building_level(BuildingKind::Wall);
                let defender = BattleParticipant::new(village.garrison).with_modifier(
                    self.catalog.defense_bonus(BuildingKind::Wall, wall_level),
                );
                let attacker = BattleParticipant::new(movement.troops);
                let outcome = battle::resolve(
                    &attacker,
                    &defender,
                    village.resources.current(),
                    &self.weights,
                    &self.carry,
                );

                village.garrison = outcome.defender_survivors;
                if outcome.attacker_wins {
                    village.resources.take_up_to(outcome.loot);
                    if outcome.wall_damage > 0 {
                        village.damage_building(BuildingKind::Wall, outcome.wall_damage);
                    }
                }
                repo.save(village, loaded.version)?;

                // One report copy per side
                for recipient in [movement.origin, movement.destination] {
                    sink.record(Report::Battle(BattleReport {
                        recipient,
                        attacker: movement.origin,
                        defender: movement.destination,
                        outcome,
                        fought_at: now,
                    }));
                }
                summary.arrivals += 1;
                summary.battles += 1;

                // Survivors march home with the loot
                if !outcome.attacker_survivors.is_empty() {
                    let id = self.next_movement();
                    self.movements.push(Movement {
                        id,
                        origin: movement.destination,
                        destination: movement.origin,
                        mission: Mission::Return,
                        troops: outcome.attacker_survivors,
                        carrying: outcome.loot,
                        departed_at: now,
                        arrives_at: now.plus_secs(movement.travel_secs()),
                    });
                }
            }
        }
        Ok(())
    }

    fn next_movement(&mut self) -> MovementId {
        let id = MovementId(self.next_movement_id);
        self.next_movement_id += 1;
        id
    }
}

/// Advance one village to `now`: production then queue completion.
///
/// Returns `None` (and mutates nothing) when no time has elapsed or
/// the clock ran backwards; the latter is logged as anomalous.
fn advance_village<C: Clock, S: ReportSink>(
    catalog: &Catalog,
    village: &mut Village,
    clock: &C,
    sink: &mut S,
) -> Option<usize> {
    let now = clock.now();
    if now < village.last_updated {
        warn!(
            village = %village.id,
            now = %now,
            last_updated = %village.last_updated,
            "clock regression; treating as zero elapsed time"
        );
        return None;
    }
    let elapsed = now.saturating_since(village.last_updated);
    if elapsed == 0 {
        return None;
    }

    let rate = production_rate(village, catalog, clock.speed());
    apply_production(&mut village.resources, rate, elapsed);

    let effects = queue::advance(village, now);
    let storage_changed = effects.iter().any(|effect| {
        matches!(
            effect,
            CompletedEffect::BuildingUpgraded {
                kind: BuildingKind::Warehouse | BuildingKind::Granary,
                ..
            }
        )
    });
    if storage_changed {
        refresh_storage(village, catalog);
    }
    let count = effects.len();
    for effect in effects {
        sink.record(Report::QueueCompleted {
            village: village.id,
            effect,
            at: now,
        });
    }

    village.last_updated = now;
    Some(count)
}
