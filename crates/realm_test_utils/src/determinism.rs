//! Determinism testing utilities.
//!
//! The engine must produce identical world state given identical
//! inputs, or catch-up ticks and battle replays diverge between runs.
//! Sources of non-determinism the harness guards against:
//!
//! - **Floating-point math**: different CPUs can produce different
//!   results. The engine uses fixed-point arithmetic throughout.
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Villages are ticked in sorted id order, arrivals in arrival-time
//!   order with movement-id tie breaks.
//! - **Ambient time**: the clock is an injected collaborator, never
//!   read from the system.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use realm_core::clock::{GameTime, ManualClock};
use realm_core::report::NullReportSink;
use realm_core::store::MemoryStore;
use realm_core::tick::TickEngine;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical final state.
    pub is_deterministic: bool,
    /// World hashes from each run.
    pub hashes: Vec<u64>,
    /// Seconds of game time each run covered.
    pub elapsed_secs: u64,
}

impl DeterminismResult {
    /// All unique hashes (should be 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different world hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Engine is non-deterministic!\n\
                 Runs: {}\n\
                 Elapsed: {}s\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.elapsed_secs,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Hash a world's full serialized state.
///
/// # Panics
///
/// Panics if the store fails to serialize (should never happen for
/// in-memory state).
#[must_use]
pub fn world_hash(store: &MemoryStore) -> u64 {
    let bytes = store.snapshot().expect("world state must serialize");
    compute_hash(&bytes)
}

/// Hash any hashable value with the standard hasher.
#[must_use]
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Run the same tick schedule against freshly built worlds and compare
/// final state.
///
/// `setup` must build an identical world each call; `schedule` is a
/// list of clock advances (seconds), with one tick processed after
/// each.
///
/// # Panics
///
/// Panics if a tick fails; determinism runs use a single writer, so
/// version conflicts indicate a harness bug.
#[must_use]
pub fn replay_schedule(
    setup: impl Fn() -> (TickEngine, MemoryStore),
    schedule: &[u64],
    runs: usize,
) -> DeterminismResult {
    let mut hashes = Vec::with_capacity(runs);
    for _ in 0..runs {
        let (mut engine, mut store) = setup();
        let mut clock = ManualClock::at(GameTime::ZERO);
        let mut sink = NullReportSink;
        for &advance in schedule {
            clock.advance(advance);
            engine
                .process_tick(&mut store, &clock, &mut sink)
                .expect("tick must succeed in single-writer replay");
        }
        hashes.push(world_hash(&store));
    }
    let is_deterministic = hashes.windows(2).all(|pair| pair[0] == pair[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        elapsed_secs: schedule.iter().sum(),
    }
}

/// Proptest strategies for engine inputs.
pub mod strategies {
    use proptest::prelude::*;
    use realm_core::math::Fixed;
    use realm_core::resources::Resources;
    use realm_core::troops::Troops;

    /// Generate a resource vector with each component in `0..max`.
    pub fn arb_resources(max: u32) -> impl Strategy<Value = Resources> {
        (0..max, 0..max, 0..max, 0..max)
            .prop_map(|(wood, clay, iron, crop)| Resources::new(wood, clay, iron, crop))
    }

    /// Generate an army with each troop count in `0..max`.
    pub fn arb_troops(max: u32) -> impl Strategy<Value = Troops> {
        (0..max, 0..max, 0..max, 0..max)
            .prop_map(|(infantry, archer, cavalry, siege)| {
                Troops::new(infantry, archer, cavalry, siege)
            })
    }

    /// Generate a fraction in `[0, 1]` with 1/1000 granularity.
    pub fn arb_fraction() -> impl Strategy<Value = Fixed> {
        (0u32..=1000).prop_map(|permille| Fixed::from_num(permille) / Fixed::from_num(1000))
    }

    /// Generate a battle modifier in `[1.0, 2.0]` (wall bonuses and
    /// the like).
    pub fn arb_modifier() -> impl Strategy<Value = Fixed> {
        (100u32..=200).prop_map(|percent| Fixed::from_num(percent) / Fixed::from_num(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_replay_schedule_matches_across_runs() {
        let result = replay_schedule(|| fixtures::standard_world(3), &[60, 600, 30, 3600], 4);
        result.assert_deterministic();
        assert_eq!(result.elapsed_secs, 4290);
    }

    #[test]
    fn test_world_hash_changes_with_state() {
        let (_, store_a) = fixtures::standard_world(1);
        let (_, store_b) = fixtures::standard_world(2);
        assert_ne!(world_hash(&store_a), world_hash(&store_b));
    }
}
