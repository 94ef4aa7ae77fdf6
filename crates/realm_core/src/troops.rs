//! Troop vectors: army composition, battle power, and loss application.
//!
//! Troop arithmetic follows the same clamping policy as resource
//! arithmetic: subtraction saturates at zero. A garrison can be wiped
//! out but never holds a negative count.

use serde::{Deserialize, Serialize};

use crate::math::{scale_u32, Fixed};

/// The four troop classes an army is composed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TroopType {
    /// Foot soldiers - cheap, fast to train.
    Infantry,
    /// Ranged units - stronger per head, slower to train.
    Archer,
    /// Mounted units - high power, high carry capacity.
    Cavalry,
    /// Rams and catapults - wall breakers, carry nothing.
    Siege,
}

impl TroopType {
    /// All troop types in canonical order.
    pub const ALL: [Self; 4] = [Self::Infantry, Self::Archer, Self::Cavalry, Self::Siege];

    /// Static display name, used in error reporting.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Infantry => "infantry",
            Self::Archer => "archer",
            Self::Cavalry => "cavalry",
            Self::Siege => "siege",
        }
    }
}

/// Per-type battle power weights.
///
/// Power is a weighted linear sum over troop counts. The defaults give
/// one infantry a power of 10, so a 150-head infantry army has power
/// 1500 under default weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleWeights {
    /// Power per infantry.
    pub infantry: u32,
    /// Power per archer.
    pub archer: u32,
    /// Power per cavalry.
    pub cavalry: u32,
    /// Power per siege engine.
    pub siege: u32,
}

impl Default for BattleWeights {
    fn default() -> Self {
        Self {
            infantry: 10,
            archer: 20,
            cavalry: 40,
            siege: 15,
        }
    }
}

/// Per-type carry capacity weights, in resource units per head.
///
/// Siege engines carry nothing; their job is the wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryWeights {
    /// Carry per infantry.
    pub infantry: u32,
    /// Carry per archer.
    pub archer: u32,
    /// Carry per cavalry.
    pub cavalry: u32,
    /// Carry per siege engine.
    pub siege: u32,
}

impl Default for CarryWeights {
    fn default() -> Self {
        Self {
            infantry: 30,
            archer: 20,
            cavalry: 80,
            siege: 0,
        }
    }
}

/// An immutable four-component troop count vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Troops {
    /// Infantry count.
    pub infantry: u32,
    /// Archer count.
    pub archer: u32,
    /// Cavalry count.
    pub cavalry: u32,
    /// Siege engine count.
    pub siege: u32,
}

impl Troops {
    /// The empty army.
    pub const ZERO: Self = Self {
        infantry: 0,
        archer: 0,
        cavalry: 0,
        siege: 0,
    };

    /// Create a troop vector.
    #[must_use]
    pub const fn new(infantry: u32, archer: u32, cavalry: u32, siege: u32) -> Self {
        Self {
            infantry,
            archer,
            cavalry,
            siege,
        }
    }

    /// An army of a single troop type.
    #[must_use]
    pub const fn only(troop: TroopType, count: u32) -> Self {
        Self::ZERO.with(troop, count)
    }

    /// Count for a given type.
    #[must_use]
    pub const fn get(self, troop: TroopType) -> u32 {
        match troop {
            TroopType::Infantry => self.infantry,
            TroopType::Archer => self.archer,
            TroopType::Cavalry => self.cavalry,
            TroopType::Siege => self.siege,
        }
    }

    /// Copy of this vector with one count replaced.
    #[must_use]
    pub const fn with(mut self, troop: TroopType, count: u32) -> Self {
        match troop {
            TroopType::Infantry => self.infantry = count,
            TroopType::Archer => self.archer = count,
            TroopType::Cavalry => self.cavalry = count,
            TroopType::Siege => self.siege = count,
        }
        self
    }

    /// Component-wise sum, saturating at `u32::MAX`.
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self {
            infantry: self.infantry.saturating_add(other.infantry),
            archer: self.archer.saturating_add(other.archer),
            cavalry: self.cavalry.saturating_add(other.cavalry),
            siege: self.siege.saturating_add(other.siege),
        }
    }

    /// Component-wise difference, clamped at zero.
    #[must_use]
    pub const fn subtract(self, other: Self) -> Self {
        Self {
            infantry: self.infantry.saturating_sub(other.infantry),
            archer: self.archer.saturating_sub(other.archer),
            cavalry: self.cavalry.saturating_sub(other.cavalry),
            siege: self.siege.saturating_sub(other.siege),
        }
    }

    /// Each count multiplied by a fixed-point factor, floored.
    #[must_use]
    pub fn multiply_by(self, factor: Fixed) -> Self {
        Self {
            infantry: scale_u32(self.infantry, factor),
            archer: scale_u32(self.archer, factor),
            cavalry: scale_u32(self.cavalry, factor),
            siege: scale_u32(self.siege, factor),
        }
    }

    /// Total heads in the army.
    #[must_use]
    pub const fn total(self) -> u64 {
        self.infantry as u64 + self.archer as u64 + self.cavalry as u64 + self.siege as u64
    }

    /// Whether the army is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.total() == 0
    }

    /// Counts in canonical order (infantry, archer, cavalry, siege).
    #[must_use]
    pub const fn to_array(self) -> [u32; 4] {
        [self.infantry, self.archer, self.cavalry, self.siege]
    }

    /// Rebuild a vector from its canonical array form.
    #[must_use]
    pub const fn from_array(values: [u32; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }

    /// Weighted linear battle power of the army.
    #[must_use]
    pub fn battle_power(self, weights: &BattleWeights) -> Fixed {
        let raw = self.infantry as u64 * weights.infantry as u64
            + self.archer as u64 * weights.archer as u64
            + self.cavalry as u64 * weights.cavalry as u64
            + self.siege as u64 * weights.siege as u64;
        Fixed::from_num(raw.min(i32::MAX as u64) as u32)
    }

    /// Total loot the army can haul home.
    #[must_use]
    pub const fn carry_capacity(self, weights: &CarryWeights) -> u64 {
        self.infantry as u64 * weights.infantry as u64
            + self.archer as u64 * weights.archer as u64
            + self.cavalry as u64 * weights.cavalry as u64
            + self.siege as u64 * weights.siege as u64
    }

    /// Survivors after losing `fraction` of every component.
    ///
    /// The fraction is clamped to `[0, 1]`; losses floor, so survivors
    /// round up. Losing fraction 1 always empties the army.
    #[must_use]
    pub fn apply_losses(self, fraction: Fixed) -> Self {
        let fraction = fraction.clamp(Fixed::ZERO, Fixed::ONE);
        let lost = self.multiply_by(fraction);
        if fraction == Fixed::ONE {
            Self::ZERO
        } else {
            self.subtract(lost)
        }
    }

    /// The most numerous troop type, `None` for an empty army.
    ///
    /// Ties resolve to the earlier type in canonical order.
    #[must_use]
    pub fn strongest_type(self) -> Option<TroopType> {
        let mut best: Option<(TroopType, u32)> = None;
        for troop in TroopType::ALL {
            let count = self.get(troop);
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((troop, count));
            }
        }
        best.map(|(troop, _)| troop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::percent;

    #[test]
    fn test_subtract_clamps_at_zero() {
        let a = Troops::new(10, 0, 5, 2);
        let b = Troops::new(20, 1, 5, 1);
        assert_eq!(a.subtract(b), Troops::new(0, 0, 0, 1));
    }

    #[test]
    fn test_array_round_trip() {
        let a = Troops::new(1, 0, 17, 4);
        assert_eq!(Troops::from_array(a.to_array()), a);
    }

    #[test]
    fn test_battle_power_default_weights() {
        let weights = BattleWeights::default();
        // 150 infantry at weight 10 -> power 1500
        assert_eq!(
            Troops::only(TroopType::Infantry, 150).battle_power(&weights),
            Fixed::from_num(1500)
        );
        // Mixed army sums per-type contributions
        let army = Troops::new(10, 5, 2, 1);
        assert_eq!(
            army.battle_power(&weights),
            Fixed::from_num(10 * 10 + 5 * 20 + 2 * 40 + 15)
        );
        // Empty army has zero power
        assert_eq!(Troops::ZERO.battle_power(&weights), Fixed::ZERO);
    }

    #[test]
    fn test_carry_capacity() {
        let weights = CarryWeights::default();
        let army = Troops::new(10, 0, 2, 5);
        // 10 * 30 + 2 * 80, siege carry nothing
        assert_eq!(army.carry_capacity(&weights), 460);
    }

    #[test]
    fn test_apply_losses_floors_losses() {
        let army = Troops::new(10, 3, 1, 0);
        let survivors = army.apply_losses(percent(50));
        // 50% of 3 floors to 1 lost, 2 survive; 50% of 1 floors to 0 lost
        assert_eq!(survivors, Troops::new(5, 2, 1, 0));
    }

    #[test]
    fn test_apply_losses_bounds() {
        let army = Troops::new(7, 7, 7, 7);
        assert_eq!(army.apply_losses(Fixed::ZERO), army);
        assert_eq!(army.apply_losses(Fixed::ONE), Troops::ZERO);
        // Out-of-range fractions clamp
        assert_eq!(army.apply_losses(Fixed::from_num(3)), Troops::ZERO);
        assert_eq!(army.apply_losses(Fixed::from_num(-1)), army);
    }

    #[test]
    fn test_losses_never_exceed_counts() {
        let army = Troops::new(13, 1, 999, 2);
        let survivors = army.apply_losses(percent(73));
        let losses = army.subtract(survivors);
        for (lost, before) in losses.to_array().iter().zip(army.to_array().iter()) {
            assert!(lost <= before);
        }
    }

    #[test]
    fn test_strongest_type() {
        assert_eq!(Troops::ZERO.strongest_type(), None);
        assert_eq!(
            Troops::new(5, 9, 2, 0).strongest_type(),
            Some(TroopType::Archer)
        );
        // Tie resolves to earlier type in canonical order
        assert_eq!(
            Troops::new(4, 4, 0, 0).strongest_type(),
            Some(TroopType::Infantry)
        );
    }
}
