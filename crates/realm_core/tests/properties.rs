//! Cross-module property tests for the engine's core invariants:
//! storage caps, atomic spends, bounded battle losses, and
//! schedule-invariant catch-up ticks.

#![allow(missing_docs)]

use proptest::prelude::*;
use realm_core::battle::{self, BattleParticipant};
use realm_core::prelude::*;
use realm_core::report::NullReportSink;
use realm_test_utils::determinism::{replay_schedule, strategies};
use realm_test_utils::fixtures;

proptest! {
    /// Deposits can never push the stockpile past its caps.
    #[test]
    fn prop_stockpile_never_exceeds_capacity(
        start in strategies::arb_resources(5_000),
        capacity in strategies::arb_resources(5_000),
        deposit in strategies::arb_resources(5_000),
    ) {
        let mut state = VillageResources::new(start, capacity);
        state.add(deposit);
        for kind in ResourceKind::ALL {
            prop_assert!(state.current().get(kind) <= state.capacity().get(kind));
        }
    }

    /// A spend either debits exactly the cost or changes nothing.
    #[test]
    fn prop_spend_is_atomic(
        start in strategies::arb_resources(2_000),
        cost in strategies::arb_resources(2_000),
    ) {
        let mut state = VillageResources::new(start, Resources::splat(10_000));
        let before = state.current();
        match state.spend(cost) {
            Ok(()) => prop_assert_eq!(state.current(), before.subtract(cost)),
            Err(EngineError::InsufficientResources { .. }) => {
                prop_assert_eq!(state.current(), before);
            }
            Err(other) => {
                return Err(TestCaseError::fail(format!("unexpected error: {other}")));
            }
        }
    }

    /// Survivors never exceed the pre-battle count, component-wise.
    #[test]
    fn prop_losses_bounded_by_army(
        army in strategies::arb_troops(10_000),
        fraction in strategies::arb_fraction(),
    ) {
        let survivors = army.apply_losses(fraction);
        for troop in TroopType::ALL {
            prop_assert!(survivors.get(troop) <= army.get(troop));
        }
    }

    /// Battle resolution conserves both armies (losses + survivors)
    /// and loot stays within carry capacity and the defender's stock.
    #[test]
    fn prop_battle_conserves_armies_and_caps_loot(
        attacker in strategies::arb_troops(2_000),
        defender in strategies::arb_troops(2_000),
        stock in strategies::arb_resources(50_000),
        modifier in strategies::arb_modifier(),
    ) {
        let weights = BattleWeights::default();
        let carry = CarryWeights::default();
        let outcome = battle::resolve(
            &BattleParticipant::new(attacker),
            &BattleParticipant::new(defender).with_modifier(modifier),
            stock,
            &weights,
            &carry,
        );

        for troop in TroopType::ALL {
            prop_assert_eq!(
                outcome.attacker_survivors.get(troop) + outcome.attacker_losses.get(troop),
                attacker.get(troop)
            );
            prop_assert_eq!(
                outcome.defender_survivors.get(troop) + outcome.defender_losses.get(troop),
                defender.get(troop)
            );
        }

        prop_assert!(outcome.loot.total() <= outcome.attacker_survivors.carry_capacity(&carry));
        for kind in ResourceKind::ALL {
            prop_assert!(outcome.loot.get(kind) <= stock.get(kind));
        }
        if !outcome.attacker_wins {
            prop_assert!(outcome.loot.is_zero());
        }
    }

    /// One long catch-up tick lands on the same state as the same span
    /// split across two ticks (no queue or movements in flight).
    #[test]
    fn prop_catchup_is_schedule_invariant(elapsed in 1u64..100_000) {
        let run = |schedule: &[u64]| -> Vec<Village> {
            let (mut engine, mut store) = fixtures::standard_world(2);
            let mut clock = ManualClock::at(GameTime::ZERO);
            let mut sink = NullReportSink;
            for &step in schedule {
                clock.advance(step);
                engine.process_tick(&mut store, &clock, &mut sink).unwrap();
            }
            store
                .village_ids()
                .iter()
                .map(|&id| store.peek(id).unwrap().clone())
                .collect()
        };
        let single = run(&[elapsed]);
        let split = run(&[elapsed / 2, elapsed - elapsed / 2]);
        prop_assert_eq!(single, split);
    }

    /// Any tick schedule replays to an identical world.
    #[test]
    fn prop_random_schedules_are_deterministic(
        schedule in proptest::collection::vec(1u64..3_600, 1..6),
    ) {
        let result = replay_schedule(|| fixtures::standard_world(3), &schedule, 3);
        prop_assert!(result.is_deterministic);
    }
}
