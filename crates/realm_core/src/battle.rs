//! Battle resolution engine.
//!
//! `resolve` is a pure function over in-memory snapshots: no I/O, no
//! randomness, no locking. The caller persists the outcome as reports
//! to both sides and applies losses, loot, and wall damage to village
//! and army state.
//!
//! # Formulas
//!
//! Power is a weighted linear sum over troop counts times the side's
//! modifier. Each side's loss fraction is
//! `opposing_power / (own_power + opposing_power)`, which guarantees:
//!
//! - losses are monotonic in the opposing power,
//! - losses never exceed pre-battle counts component-wise,
//! - zero opposing power yields zero losses.
//!
//! Ties go to the defender: an attacker must bring strictly greater
//! power to take a village's loot.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};
use crate::resources::{ResourceKind, Resources};
use crate::troops::{BattleWeights, CarryWeights, Troops};

/// Surviving siege engines needed per wall level torn down.
pub const SIEGE_PER_WALL_LEVEL: u32 = 4;

/// Most wall levels a single battle can tear down.
pub const MAX_WALL_DAMAGE: u8 = 3;

/// One side of a battle: an army plus its combined modifiers.
///
/// The modifier folds wall defense and terrain bonuses; the battle
/// engine consumes it, it does not compute it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BattleParticipant {
    /// The side's troops.
    pub troops: Troops,
    /// Combined power multiplier (1.0 = unmodified).
    #[serde(with = "fixed_serde")]
    pub modifier: Fixed,
}

impl BattleParticipant {
    /// An unmodified participant.
    #[must_use]
    pub const fn new(troops: Troops) -> Self {
        Self {
            troops,
            modifier: Fixed::ONE,
        }
    }

    /// Builder method to set the power modifier.
    #[must_use]
    pub const fn with_modifier(mut self, modifier: Fixed) -> Self {
        self.modifier = modifier;
        self
    }

    /// Total battle power: weighted troop sum times the modifier.
    #[must_use]
    pub fn power(&self, weights: &BattleWeights) -> Fixed {
        self.troops.battle_power(weights).saturating_mul(self.modifier)
    }
}

/// Immutable result of one battle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Whether the attacker took the field.
    pub attacker_wins: bool,
    /// Attacker troops destroyed, per type.
    pub attacker_losses: Troops,
    /// Defender troops destroyed, per type.
    pub defender_losses: Troops,
    /// Attacker troops left standing.
    pub attacker_survivors: Troops,
    /// Defender troops left standing.
    pub defender_survivors: Troops,
    /// Resources carried off (zero on an attacker loss).
    pub loot: Resources,
    /// Wall levels torn down by surviving siege.
    pub wall_damage: u8,
    /// Attacker's total power going in.
    #[serde(with = "fixed_serde")]
    pub attacker_power: Fixed,
    /// Defender's total power going in.
    #[serde(with = "fixed_serde")]
    pub defender_power: Fixed,
}

/// Resolve a battle between two participants.
///
/// Never fails: zero-troop participants are valid (power 0), and an
/// attack on an empty village resolves as an attacker win with zero
/// losses and full loot up to carry capacity.
#[must_use]
pub fn resolve(
    attacker: &BattleParticipant,
    defender: &BattleParticipant,
    defender_stock: Resources,
    weights: &BattleWeights,
    carry: &CarryWeights,
) -> BattleOutcome {
    let attacker_power = attacker.power(weights);
    let defender_power = defender.power(weights);
    let attacker_wins = attacker_power > defender_power;

    let attacker_survivors = attacker
        .troops
        .apply_losses(loss_fraction(attacker_power, defender_power));
    let defender_survivors = defender
        .troops
        .apply_losses(loss_fraction(defender_power, attacker_power));
    let attacker_losses = attacker.troops.subtract(attacker_survivors);
    let defender_losses = defender.troops.subtract(defender_survivors);

    let loot = if attacker_wins {
        plunder(attacker_survivors.carry_capacity(carry), defender_stock)
    } else {
        Resources::ZERO
    };

    let wall_damage = if attacker_wins {
        let levels = attacker_survivors.siege / SIEGE_PER_WALL_LEVEL;
        u8::try_from(levels).unwrap_or(u8::MAX).min(MAX_WALL_DAMAGE)
    } else {
        0
    };

    BattleOutcome {
        attacker_wins,
        attacker_losses,
        defender_losses,
        attacker_survivors,
        defender_survivors,
        loot,
        wall_damage,
        attacker_power,
        defender_power,
    }
}

/// Fraction of `own` troops destroyed by `opposing` power.
fn loss_fraction(own: Fixed, opposing: Fixed) -> Fixed {
    let total = own.saturating_add(opposing);
    if total == Fixed::ZERO || opposing == Fixed::ZERO {
        Fixed::ZERO
    } else {
        opposing / total
    }
}

/// Loot up to carry capacity, split across kinds in proportion to what
/// the defender actually holds.
fn plunder(capacity: u64, stock: Resources) -> Resources {
    let available = stock.total();
    if available == 0 || capacity == 0 {
        return Resources::ZERO;
    }
    let budget = capacity.min(available);

    let mut loot = Resources::ZERO;
    for kind in ResourceKind::ALL {
        // Widened so near-cap stockpiles cannot overflow the product
        let share = u128::from(stock.get(kind)) * u128::from(budget) / u128::from(available);
        loot = loot.with(kind, u32::try_from(share).unwrap_or(u32::MAX));
    }
    loot
}
