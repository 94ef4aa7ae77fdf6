//! Error types for the engine core.

use thiserror::Error;

use crate::village::VillageId;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for all engine errors.
///
/// Clock regression and arithmetic underflow are deliberately *not*
/// errors: the former is treated as zero elapsed time (and logged),
/// the latter clamps so village state stays well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A build or training order was placed without affordable cost.
    #[error("Insufficient resources: need {required} {resource}, have {available}")]
    InsufficientResources {
        /// Resource type.
        resource: &'static str,
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// Troops were dispatched that the garrison does not hold.
    #[error("Insufficient troops: need {required} {troop}, have {available}")]
    InsufficientTroops {
        /// Troop type.
        troop: &'static str,
        /// Count required.
        required: u32,
        /// Count available.
        available: u32,
    },

    /// The village build queue has no free slot.
    #[error("Build queue is full ({capacity} slots)")]
    QueueFull {
        /// Maximum queue length.
        capacity: usize,
    },

    /// A queue entry referenced a target that is no longer valid.
    #[error("Invalid queue entry: {0}")]
    InvalidQueueEntry(String),

    /// An optimistic save lost the race against a concurrent tick.
    #[error(
        "Concurrent tick conflict on village {village}: expected version {expected}, found {found}"
    )]
    ConcurrentTickConflict {
        /// The contested village.
        village: VillageId,
        /// Version the caller loaded.
        expected: u64,
        /// Version actually stored.
        found: u64,
    },

    /// The referenced village does not exist in the store.
    #[error("Village not found: {0}")]
    VillageNotFound(VillageId),
}
