//! # Realm Core
//!
//! Deterministic battle resolution and world tick core for a
//! browser-style strategy game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Identical replays of any battle or catch-up tick
//! - Headless server builds
//! - Property testing of economy and combat invariants
//!
//! ## Crate Structure
//!
//! - [`resources`] / [`troops`] - saturating value-type vectors
//! - [`catalog`] - data-driven building and unit blueprints
//! - [`production`] - resource production and storage caps
//! - [`queue`] - construction and training queue
//! - [`battle`] - pure battle resolution
//! - [`tick`] - the world tick scheduler tying it all together
//! - [`store`] / [`report`] / [`clock`] - persistence, report, and
//!   time collaborators injected at the seams

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battle;
pub mod catalog;
pub mod clock;
pub mod error;
pub mod math;
pub mod movement;
pub mod production;
pub mod queue;
pub mod report;
pub mod resources;
pub mod store;
pub mod tick;
pub mod troops;
pub mod village;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::{resolve, BattleOutcome, BattleParticipant};
    pub use crate::catalog::{BuildingKind, BuildingSpec, Catalog, UnitSpec};
    pub use crate::clock::{Clock, GameDifficulty, GameSpeed, GameTime, ManualClock};
    pub use crate::error::{EngineError, Result};
    pub use crate::math::Fixed;
    pub use crate::movement::{Mission, Movement, MovementId};
    pub use crate::queue::{
        enqueue, BuildQueue, CompletedEffect, QueueEntry, QueueStatus, QueueTarget,
    };
    pub use crate::report::{BattleReport, Report, ReportSink, VecReportSink};
    pub use crate::resources::{ResourceKind, Resources, VillageResources};
    pub use crate::store::{MemoryStore, VersionedVillage, VillageRepository};
    pub use crate::tick::{TickEngine, TickSummary};
    pub use crate::troops::{BattleWeights, CarryWeights, TroopType, Troops};
    pub use crate::village::{Village, VillageId};
}
