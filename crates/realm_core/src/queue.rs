//! Build and training queue engine.
//!
//! Each village owns a bounded FIFO queue of in-progress upgrades and
//! training batches. Enqueueing atomically checks affordability and
//! deducts the cost up front; advancing time resolves due entries
//! exactly once. Entries complete in completion-time order with ties
//! broken by insertion order.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{BuildingKind, Catalog};
use crate::clock::{Clock, GameTime};
use crate::error::{EngineError, Result};
use crate::resources::Resources;
use crate::troops::TroopType;
use crate::village::Village;

/// What a queue entry is building or training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueTarget {
    /// Upgrade a building by one level.
    Building(BuildingKind),
    /// Train a batch of troops.
    Training {
        /// The troop type to train.
        troop: TroopType,
        /// Heads in the batch.
        count: u32,
    },
}

/// Lifecycle state of a queue entry.
///
/// Entries never linger in a finished state: `advance` applies a due
/// entry's effect and drains it from the queue in the same call, then
/// promotes the next pending entry to the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueStatus {
    /// Waiting behind earlier entries.
    Pending,
    /// The entry currently at the head of the queue.
    InProgress,
}

/// One in-progress order in a village's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// What is being built or trained.
    pub target: QueueTarget,
    /// When the order was placed.
    pub started_at: GameTime,
    /// When the order resolves (speed scaling already applied).
    pub completes_at: GameTime,
    /// Lifecycle state.
    pub status: QueueStatus,
}

/// Bounded FIFO queue of orders for one village.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildQueue {
    entries: VecDeque<QueueEntry>,
    max_len: usize,
}

impl BuildQueue {
    /// Default maximum queue length.
    pub const DEFAULT_MAX_LEN: usize = 5;

    /// Create an empty queue with the default slot count.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_len(Self::DEFAULT_MAX_LEN)
    }

    /// Create an empty queue with a specific slot count.
    #[must_use]
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_len,
        }
    }

    /// Whether every slot is taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max_len
    }

    /// Whether the queue holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of queued entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of slots in this queue.
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    /// Entry at an insertion-order index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&QueueEntry> {
        self.entries.get(index)
    }

    /// Number of queued entries upgrading the given building.
    #[must_use]
    pub fn pending_upgrades(&self, kind: BuildingKind) -> u8 {
        let count = self
            .entries
            .iter()
            .filter(|entry| entry.target == QueueTarget::Building(kind))
            .count();
        u8::try_from(count).unwrap_or(u8::MAX)
    }

    /// Append an entry, failing when no slot is free.
    pub fn push(&mut self, mut entry: QueueEntry) -> Result<()> {
        if self.is_full() {
            return Err(EngineError::QueueFull {
                capacity: self.max_len,
            });
        }
        entry.status = if self.entries.is_empty() {
            QueueStatus::InProgress
        } else {
            QueueStatus::Pending
        };
        self.entries.push_back(entry);
        Ok(())
    }

    /// Remove an entry by insertion-order index.
    pub fn remove(&mut self, index: usize) -> Option<QueueEntry> {
        let removed = self.entries.remove(index);
        self.refresh_head();
        removed
    }

    fn refresh_head(&mut self) {
        if let Some(front) = self.entries.front_mut() {
            if front.status == QueueStatus::Pending {
                front.status = QueueStatus::InProgress;
            }
        }
    }
}

impl Default for BuildQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// The applied effect of one resolved queue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletedEffect {
    /// A building finished upgrading.
    BuildingUpgraded {
        /// The upgraded building.
        kind: BuildingKind,
        /// Its level after the upgrade.
        new_level: u8,
    },
    /// A training batch finished.
    TroopsTrained {
        /// The trained troop type.
        troop: TroopType,
        /// Heads added to the garrison.
        count: u32,
    },
    /// A corrupted entry was skipped; the scan continued.
    Skipped {
        /// Why the entry could not be applied.
        reason: String,
    },
}

/// Place a build or training order on a village's queue.
///
/// Atomic: the affordability check, cost deduction, and queue append
/// either all happen or none do. Costs scale with world difficulty and
/// durations with world speed.
///
/// Returns the completion time of the new entry.
pub fn enqueue(
    village: &mut Village,
    target: QueueTarget,
    catalog: &Catalog,
    clock: &impl Clock,
) -> Result<GameTime> {
    let (base_cost, base_duration) = order_numbers(village, target, catalog)?;

    // Verify the slot before touching the stockpile
    if village.queue.is_full() {
        return Err(EngineError::QueueFull {
            capacity: village.queue.max_len(),
        });
    }

    let difficulty = clock.difficulty();
    let cost = Resources::from_array(base_cost.to_array().map(|v| difficulty.scale_cost(v)));
    village.resources.spend(cost)?;

    let now = clock.now();
    let completes_at = now.plus_secs(clock.speed().scale_duration(base_duration));
    village.queue.push(QueueEntry {
        target,
        started_at: now,
        completes_at,
        status: QueueStatus::Pending,
    })?;
    Ok(completes_at)
}

/// Base (1x) cost and duration for an order, or why it is invalid.
fn order_numbers(
    village: &Village,
    target: QueueTarget,
    catalog: &Catalog,
) -> Result<(Resources, u64)> {
    match target {
        QueueTarget::Building(kind) => {
            // Queued upgrades of the same kind stack: the next order
            // prices the level those will reach.
            let next_level = village
                .building_level(kind)
                .saturating_add(village.queue.pending_upgrades(kind))
                .saturating_add(1);
            let cost = catalog.upgrade_cost(kind, next_level).ok_or_else(|| {
                EngineError::InvalidQueueEntry(format!(
                    "no upgrade to level {next_level} for {kind:?}"
                ))
            })?;
            let duration = catalog.upgrade_duration(kind, next_level).ok_or_else(|| {
                EngineError::InvalidQueueEntry(format!(
                    "no duration for {kind:?} level {next_level}"
                ))
            })?;
            Ok((cost, duration))
        }
        QueueTarget::Training { troop, count } => {
            if count == 0 {
                return Err(EngineError::InvalidQueueEntry(
                    "training batch of zero".to_owned(),
                ));
            }
            let spec = catalog.unit(troop).ok_or_else(|| {
                EngineError::InvalidQueueEntry(format!("unknown unit {troop:?}"))
            })?;
            if village.building_level(spec.trained_at) == 0 {
                return Err(EngineError::InvalidQueueEntry(format!(
                    "{:?} requires {:?}",
                    troop, spec.trained_at
                )));
            }
            Ok((
                spec.cost.multiply_count(count),
                spec.train_secs.saturating_mul(count as u64),
            ))
        }
    }
}

/// Resolve every due entry on the village queue, exactly once.
///
/// Entries with `completes_at <= now` are applied in completion-time
/// order (ties by insertion order), marked completed, and drained.
/// Calling `advance` again with the same `now` produces no further
/// effects. A corrupted entry is skipped with a logged reason; the
/// rest of the scan continues.
pub fn advance(village: &mut Village, now: GameTime) -> Vec<CompletedEffect> {
    let mut due: Vec<(GameTime, usize)> = village
        .queue
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.completes_at <= now)
        .map(|(index, entry)| (entry.completes_at, index))
        .collect();
    if due.is_empty() {
        return Vec::new();
    }
    due.sort_unstable();

    let mut effects = Vec::with_capacity(due.len());
    for &(_, index) in &due {
        let Some(entry) = village.queue.get(index).copied() else {
            continue;
        };
        effects.push(apply_entry(village, entry.target));
    }

    // Drain resolved entries from the back so earlier indices stay valid
    let mut indices: Vec<usize> = due.into_iter().map(|(_, index)| index).collect();
    indices.sort_unstable_by(|a, b| b.cmp(a));
    for index in indices {
        village.queue.remove(index);
    }

    effects
}

fn apply_entry(village: &mut Village, target: QueueTarget) -> CompletedEffect {
    match target {
        QueueTarget::Building(kind) => {
            let new_level = village.raise_building(kind);
            CompletedEffect::BuildingUpgraded { kind, new_level }
        }
        QueueTarget::Training { troop, count } => {
            if count == 0 {
                let reason = format!("corrupted training entry for {troop:?}");
                warn!(village = %village.id, %reason, "skipping queue entry");
                return CompletedEffect::Skipped { reason };
            }
            let trained = crate::troops::Troops::only(troop, count);
            village.garrison = village.garrison.add(trained);
            CompletedEffect::TroopsTrained { troop, count }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{GameDifficulty, GameSpeed, ManualClock};
    use crate::resources::VillageResources;
    use crate::village::VillageId;

    fn village_with(resources: Resources) -> Village {
        let mut village = Village::new(VillageId(1), "Rivermouth");
        village.resources = VillageResources::new(resources, Resources::splat(100_000));
        village
    }

    fn flat_catalog() -> Catalog {
        // Growth factor 1 keeps level costs equal to base for exact tests
        let mut catalog = Catalog::standard();
        let mut spec = catalog.building(BuildingKind::Woodcutter).unwrap().clone();
        spec.base_cost = Resources::new(100, 50, 25, 10);
        spec.cost_growth = crate::math::Fixed::ONE;
        spec.base_duration_secs = 3600;
        spec.duration_growth = crate::math::Fixed::ONE;
        catalog.register_building(BuildingKind::Woodcutter, spec);
        catalog
    }

    #[test]
    fn test_enqueue_deducts_cost() {
        let mut village = village_with(Resources::splat(1000));
        let clock = ManualClock::at(GameTime::from_secs(0));

        let done = enqueue(
            &mut village,
            QueueTarget::Building(BuildingKind::Woodcutter),
            &flat_catalog(),
            &clock,
        )
        .unwrap();

        assert_eq!(done, GameTime::from_secs(3600));
        assert_eq!(village.queue.len(), 1);
        assert_eq!(
            village.resources.current(),
            Resources::new(900, 950, 975, 990)
        );
        assert_eq!(
            village.queue.get(0).unwrap().status,
            QueueStatus::InProgress
        );
    }

    #[test]
    fn test_enqueue_insufficient_resources_has_no_side_effects() {
        // Cost is {wood:100, clay:50, iron:25, crop:10}; only 10 wood held
        let mut village = village_with(Resources::new(10, 1000, 1000, 1000));
        let clock = ManualClock::at(GameTime::from_secs(0));

        let err = enqueue(
            &mut village,
            QueueTarget::Building(BuildingKind::Woodcutter),
            &flat_catalog(),
            &clock,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            EngineError::InsufficientResources {
                resource: "wood",
                required: 100,
                available: 10,
            }
        ));
        assert!(village.queue.is_empty());
        assert_eq!(
            village.resources.current(),
            Resources::new(10, 1000, 1000, 1000)
        );
    }

    #[test]
    fn test_enqueue_full_queue_rejected_before_deduction() {
        let mut village = village_with(Resources::splat(100_000));
        let clock = ManualClock::at(GameTime::from_secs(0));
        let catalog = flat_catalog();

        for _ in 0..BuildQueue::DEFAULT_MAX_LEN {
            enqueue(
                &mut village,
                QueueTarget::Building(BuildingKind::Woodcutter),
                &catalog,
                &clock,
            )
            .unwrap();
        }
        let before = village.resources.current();

        let err = enqueue(
            &mut village,
            QueueTarget::Building(BuildingKind::Woodcutter),
            &catalog,
            &clock,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::QueueFull { .. }));
        assert_eq!(village.resources.current(), before);
    }

    #[test]
    fn test_game_speed_scales_completion() {
        // 3600 s base duration at 1.5x speed completes at now + 2400
        let mut village = village_with(Resources::splat(1000));
        let clock = ManualClock::at(GameTime::from_secs(100))
            .with_speed(GameSpeed::from_percentage(150));

        let done = enqueue(
            &mut village,
            QueueTarget::Building(BuildingKind::Woodcutter),
            &flat_catalog(),
            &clock,
        )
        .unwrap();
        assert_eq!(done, GameTime::from_secs(2500));
    }

    #[test]
    fn test_difficulty_scales_cost() {
        let mut village = village_with(Resources::splat(1000));
        let clock = ManualClock::at(GameTime::ZERO)
            .with_difficulty(GameDifficulty::from_percentage(200));

        enqueue(
            &mut village,
            QueueTarget::Building(BuildingKind::Woodcutter),
            &flat_catalog(),
            &clock,
        )
        .unwrap();
        // Base cost {100,50,25,10} doubled
        assert_eq!(
            village.resources.current(),
            Resources::new(800, 900, 950, 980)
        );
    }

    #[test]
    fn test_training_requires_building() {
        let mut village = village_with(Resources::splat(100_000));
        let clock = ManualClock::at(GameTime::ZERO);
        let catalog = Catalog::standard();

        let err = enqueue(
            &mut village,
            QueueTarget::Training {
                troop: TroopType::Cavalry,
                count: 2,
            },
            &catalog,
            &clock,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidQueueEntry(_)));

        village.set_building_level(BuildingKind::Stable, 1);
        enqueue(
            &mut village,
            QueueTarget::Training {
                troop: TroopType::Cavalry,
                count: 2,
            },
            &catalog,
            &clock,
        )
        .unwrap();
        assert_eq!(village.queue.len(), 1);
    }

    #[test]
    fn test_advance_applies_effects_exactly_once() {
        let mut village = village_with(Resources::splat(100_000));
        let clock = ManualClock::at(GameTime::ZERO);
        enqueue(
            &mut village,
            QueueTarget::Building(BuildingKind::Woodcutter),
            &flat_catalog(),
            &clock,
        )
        .unwrap();

        let now = GameTime::from_secs(3600);
        let effects = advance(&mut village, now);
        assert_eq!(
            effects,
            vec![CompletedEffect::BuildingUpgraded {
                kind: BuildingKind::Woodcutter,
                new_level: 1,
            }]
        );
        assert_eq!(village.building_level(BuildingKind::Woodcutter), 1);

        // Second call at the same time is a no-op
        let effects = advance(&mut village, now);
        assert!(effects.is_empty());
        assert_eq!(village.building_level(BuildingKind::Woodcutter), 1);
    }

    #[test]
    fn test_advance_ignores_undue_entries() {
        let mut village = village_with(Resources::splat(100_000));
        let clock = ManualClock::at(GameTime::ZERO);
        enqueue(
            &mut village,
            QueueTarget::Building(BuildingKind::Woodcutter),
            &flat_catalog(),
            &clock,
        )
        .unwrap();

        let effects = advance(&mut village, GameTime::from_secs(3599));
        assert!(effects.is_empty());
        assert_eq!(village.queue.len(), 1);
    }

    #[test]
    fn test_advance_resolves_in_completion_time_order() {
        let mut village = village_with(Resources::splat(100_000));
        village.set_building_level(BuildingKind::Barracks, 1);
        let catalog = Catalog::standard();
        let clock = ManualClock::at(GameTime::ZERO);

        // Woodcutter (260 s) enqueued after a single infantry (120 s):
        // the later insertion completes first
        enqueue(
            &mut village,
            QueueTarget::Building(BuildingKind::Woodcutter),
            &catalog,
            &clock,
        )
        .unwrap();
        enqueue(
            &mut village,
            QueueTarget::Training {
                troop: TroopType::Infantry,
                count: 1,
            },
            &catalog,
            &clock,
        )
        .unwrap();

        let effects = advance(&mut village, GameTime::from_secs(3600));
        assert_eq!(effects.len(), 2);
        assert!(matches!(
            effects[0],
            CompletedEffect::TroopsTrained { .. }
        ));
        assert!(matches!(
            effects[1],
            CompletedEffect::BuildingUpgraded { .. }
        ));
        assert_eq!(village.garrison.infantry, 1);
    }

    #[test]
    fn test_advance_ties_break_by_insertion_order() {
        let mut village = village_with(Resources::splat(100_000));
        let at = GameTime::from_secs(500);
        village
            .queue
            .push(QueueEntry {
                target: QueueTarget::Building(BuildingKind::ClayPit),
                started_at: GameTime::ZERO,
                completes_at: at,
                status: QueueStatus::Pending,
            })
            .unwrap();
        village
            .queue
            .push(QueueEntry {
                target: QueueTarget::Building(BuildingKind::IronMine),
                started_at: GameTime::ZERO,
                completes_at: at,
                status: QueueStatus::Pending,
            })
            .unwrap();

        let effects = advance(&mut village, at);
        assert_eq!(
            effects,
            vec![
                CompletedEffect::BuildingUpgraded {
                    kind: BuildingKind::ClayPit,
                    new_level: 1,
                },
                CompletedEffect::BuildingUpgraded {
                    kind: BuildingKind::IronMine,
                    new_level: 1,
                },
            ]
        );
    }

    #[test]
    fn test_advance_drains_resolved_entries_and_promotes_next() {
        let mut village = village_with(Resources::splat(100_000));
        village
            .queue
            .push(QueueEntry {
                target: QueueTarget::Building(BuildingKind::ClayPit),
                started_at: GameTime::ZERO,
                completes_at: GameTime::from_secs(100),
                status: QueueStatus::Pending,
            })
            .unwrap();
        village
            .queue
            .push(QueueEntry {
                target: QueueTarget::Building(BuildingKind::IronMine),
                started_at: GameTime::ZERO,
                completes_at: GameTime::from_secs(900),
                status: QueueStatus::Pending,
            })
            .unwrap();

        let effects = advance(&mut village, GameTime::from_secs(100));
        assert_eq!(effects.len(), 1);

        // The resolved entry leaves the queue outright and the next
        // one takes over the head slot
        assert_eq!(village.queue.len(), 1);
        let head = village.queue.iter().next().unwrap();
        assert_eq!(head.target, QueueTarget::Building(BuildingKind::IronMine));
        assert_eq!(head.status, QueueStatus::InProgress);
    }

    #[test]
    fn test_advance_skips_corrupted_entry_and_continues() {
        let mut village = village_with(Resources::splat(100_000));
        let at = GameTime::from_secs(10);
        village
            .queue
            .push(QueueEntry {
                target: QueueTarget::Training {
                    troop: TroopType::Archer,
                    count: 0,
                },
                started_at: GameTime::ZERO,
                completes_at: at,
                status: QueueStatus::Pending,
            })
            .unwrap();
        village
            .queue
            .push(QueueEntry {
                target: QueueTarget::Building(BuildingKind::Granary),
                started_at: GameTime::ZERO,
                completes_at: at,
                status: QueueStatus::Pending,
            })
            .unwrap();

        let effects = advance(&mut village, at);
        assert!(matches!(effects[0], CompletedEffect::Skipped { .. }));
        assert_eq!(
            effects[1],
            CompletedEffect::BuildingUpgraded {
                kind: BuildingKind::Granary,
                new_level: 1,
            }
        );
        assert!(village.queue.is_empty());
    }

    #[test]
    fn test_stacked_upgrades_price_successive_levels() {
        let mut village = village_with(Resources::splat(100_000));
        let clock = ManualClock::at(GameTime::ZERO);
        let catalog = Catalog::standard();

        enqueue(
            &mut village,
            QueueTarget::Building(BuildingKind::ClayPit),
            &catalog,
            &clock,
        )
        .unwrap();
        let after_first = village.resources.current();
        enqueue(
            &mut village,
            QueueTarget::Building(BuildingKind::ClayPit),
            &catalog,
            &clock,
        )
        .unwrap();
        let after_second = village.resources.current();

        // Second queued upgrade prices level 2, which costs more
        let first_cost = Resources::splat(100_000).subtract(after_first);
        let second_cost = after_first.subtract(after_second);
        assert!(second_cost.total() > first_cost.total());
    }
}
