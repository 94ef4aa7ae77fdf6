//! Fixed-point math utilities for deterministic simulation.
//!
//! All engine math uses fixed-point arithmetic so that a tick replayed
//! on a different host produces byte-identical village state. Floating
//! point can round differently across CPUs and must never leak into
//! battle or production calculations.

use fixed::types::I32F32;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Build a fixed-point fraction from an integer percentage.
///
/// `percent(150)` is `1.5`, `percent(100)` is `1.0`.
#[must_use]
pub fn percent(value: u32) -> Fixed {
    Fixed::from_num(value) / Fixed::from_num(100)
}

/// Multiply an integer amount by a fixed-point factor, flooring the result.
///
/// Negative products clamp to zero; the engine never produces negative
/// quantities.
#[must_use]
pub fn scale_u32(amount: u32, factor: Fixed) -> u32 {
    let scaled = Fixed::saturating_from_num(amount).saturating_mul(factor);
    let floored: i64 = scaled.to_num::<i64>();
    u32::try_from(floored.max(0)).unwrap_or(u32::MAX)
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}
