//! Resource vectors and per-village stockpile state.
//!
//! All arithmetic is immutable (operands are never mutated) and clamps
//! instead of erroring: subtraction saturates at zero and deposits clamp
//! at storage capacity. This keeps village state well-formed no matter
//! what order engine mutations arrive in.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::math::{scale_u32, Fixed};

/// The four resource kinds every village produces and stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Wood, from woodcutters.
    Wood,
    /// Clay, from clay pits.
    Clay,
    /// Iron, from iron mines.
    Iron,
    /// Crop, from crop fields.
    Crop,
}

impl ResourceKind {
    /// All resource kinds in canonical order.
    pub const ALL: [Self; 4] = [Self::Wood, Self::Clay, Self::Iron, Self::Crop];

    /// Static display name, used in error reporting.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Clay => "clay",
            Self::Iron => "iron",
            Self::Crop => "crop",
        }
    }
}

/// An immutable four-component resource vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Resources {
    /// Wood amount.
    pub wood: u32,
    /// Clay amount.
    pub clay: u32,
    /// Iron amount.
    pub iron: u32,
    /// Crop amount.
    pub crop: u32,
}

impl Resources {
    /// The zero vector.
    pub const ZERO: Self = Self {
        wood: 0,
        clay: 0,
        iron: 0,
        crop: 0,
    };

    /// Create a resource vector.
    #[must_use]
    pub const fn new(wood: u32, clay: u32, iron: u32, crop: u32) -> Self {
        Self {
            wood,
            clay,
            iron,
            crop,
        }
    }

    /// A vector with the same amount in every component.
    #[must_use]
    pub const fn splat(amount: u32) -> Self {
        Self::new(amount, amount, amount, amount)
    }

    /// Component for a given kind.
    #[must_use]
    pub const fn get(self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.wood,
            ResourceKind::Clay => self.clay,
            ResourceKind::Iron => self.iron,
            ResourceKind::Crop => self.crop,
        }
    }

    /// Copy of this vector with one component replaced.
    #[must_use]
    pub const fn with(mut self, kind: ResourceKind, amount: u32) -> Self {
        match kind {
            ResourceKind::Wood => self.wood = amount,
            ResourceKind::Clay => self.clay = amount,
            ResourceKind::Iron => self.iron = amount,
            ResourceKind::Crop => self.crop = amount,
        }
        self
    }

    /// Component-wise sum, saturating at `u32::MAX`.
    #[must_use]
    pub const fn add(self, other: Self) -> Self {
        Self {
            wood: self.wood.saturating_add(other.wood),
            clay: self.clay.saturating_add(other.clay),
            iron: self.iron.saturating_add(other.iron),
            crop: self.crop.saturating_add(other.crop),
        }
    }

    /// Component-wise difference, clamped at zero.
    ///
    /// Clamping is the documented design choice for resource arithmetic:
    /// a stockpile can be emptied but never driven negative.
    #[must_use]
    pub const fn subtract(self, other: Self) -> Self {
        Self {
            wood: self.wood.saturating_sub(other.wood),
            clay: self.clay.saturating_sub(other.clay),
            iron: self.iron.saturating_sub(other.iron),
            crop: self.crop.saturating_sub(other.crop),
        }
    }

    /// Each component multiplied by a fixed-point factor, floored.
    #[must_use]
    pub fn multiply_by(self, factor: Fixed) -> Self {
        Self {
            wood: scale_u32(self.wood, factor),
            clay: scale_u32(self.clay, factor),
            iron: scale_u32(self.iron, factor),
            crop: scale_u32(self.crop, factor),
        }
    }

    /// Each component multiplied by an integer count, saturating.
    #[must_use]
    pub const fn multiply_count(self, count: u32) -> Self {
        Self {
            wood: self.wood.saturating_mul(count),
            clay: self.clay.saturating_mul(count),
            iron: self.iron.saturating_mul(count),
            crop: self.crop.saturating_mul(count),
        }
    }

    /// Sum of all four components.
    #[must_use]
    pub const fn total(self) -> u64 {
        self.wood as u64 + self.clay as u64 + self.iron as u64 + self.crop as u64
    }

    /// Whether every component is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.total() == 0
    }

    /// Components in canonical order (wood, clay, iron, crop).
    #[must_use]
    pub const fn to_array(self) -> [u32; 4] {
        [self.wood, self.clay, self.iron, self.crop]
    }

    /// Rebuild a vector from its canonical array form.
    #[must_use]
    pub const fn from_array(values: [u32; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }

    /// Build a vector from sparse (kind, amount) pairs.
    ///
    /// Missing kinds default to zero; duplicate kinds keep the last value.
    #[must_use]
    pub fn from_partial<I: IntoIterator<Item = (ResourceKind, u32)>>(pairs: I) -> Self {
        let mut out = Self::ZERO;
        for (kind, amount) in pairs {
            out = out.with(kind, amount);
        }
        out
    }
}

/// Current stockpile plus per-resource storage capacity for one village.
///
/// Invariant: after any engine-driven mutation, every component of
/// `current` is at most the matching component of `capacity`. Overflow
/// is silently discarded, not wrapped or errored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VillageResources {
    current: Resources,
    capacity: Resources,
}

impl VillageResources {
    /// Create stockpile state, clamping the initial amounts to capacity.
    #[must_use]
    pub fn new(current: Resources, capacity: Resources) -> Self {
        let mut state = Self {
            current: Resources::ZERO,
            capacity,
        };
        state.add(current);
        state
    }

    /// The current stockpile.
    #[must_use]
    pub const fn current(&self) -> Resources {
        self.current
    }

    /// The per-resource storage caps.
    #[must_use]
    pub const fn capacity(&self) -> Resources {
        self.capacity
    }

    /// Replace the storage caps, clamping the stockpile down if a
    /// warehouse was destroyed.
    pub fn set_capacity(&mut self, capacity: Resources) {
        self.capacity = capacity;
        self.current = Self::clamped(self.current, capacity);
    }

    /// Deposit resources, discarding whatever exceeds capacity.
    ///
    /// Returns the amounts actually stored.
    pub fn add(&mut self, amounts: Resources) -> Resources {
        let before = self.current;
        self.current = Self::clamped(before.add(amounts), self.capacity);
        self.current.subtract(before)
    }

    /// Component-wise affordability check.
    #[must_use]
    pub const fn can_afford(&self, cost: Resources) -> bool {
        self.current.wood >= cost.wood
            && self.current.clay >= cost.clay
            && self.current.iron >= cost.iron
            && self.current.crop >= cost.crop
    }

    /// Per-component `max(0, cost - current)`.
    #[must_use]
    pub const fn shortage(&self, cost: Resources) -> Resources {
        cost.subtract(self.current)
    }

    /// Atomically deduct a cost, or fail with zero side effects.
    pub fn spend(&mut self, cost: Resources) -> Result<()> {
        for kind in ResourceKind::ALL {
            let available = self.current.get(kind);
            let required = cost.get(kind);
            if available < required {
                return Err(EngineError::InsufficientResources {
                    resource: kind.name(),
                    required,
                    available,
                });
            }
        }
        self.current = self.current.subtract(cost);
        Ok(())
    }

    /// Remove up to `amounts`, returning what was actually taken.
    ///
    /// Used for loot: raiders take what is there, not what they asked for.
    pub fn take_up_to(&mut self, amounts: Resources) -> Resources {
        let taken = Resources {
            wood: amounts.wood.min(self.current.wood),
            clay: amounts.clay.min(self.current.clay),
            iron: amounts.iron.min(self.current.iron),
            crop: amounts.crop.min(self.current.crop),
        };
        self.current = self.current.subtract(taken);
        taken
    }

    const fn clamped(amounts: Resources, capacity: Resources) -> Resources {
        Resources {
            wood: if amounts.wood > capacity.wood {
                capacity.wood
            } else {
                amounts.wood
            },
            clay: if amounts.clay > capacity.clay {
                capacity.clay
            } else {
                amounts.clay
            },
            iron: if amounts.iron > capacity.iron {
                capacity.iron
            } else {
                amounts.iron
            },
            crop: if amounts.crop > capacity.crop {
                capacity.crop
            } else {
                amounts.crop
            },
        }
    }
}
