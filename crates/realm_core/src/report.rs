//! Outcome records written for players to read later.
//!
//! The engine writes reports through a sink collaborator; notification
//! and UI concerns live outside this crate.

use serde::{Deserialize, Serialize};

use crate::battle::BattleOutcome;
use crate::clock::GameTime;
use crate::movement::{Mission, MovementId};
use crate::queue::CompletedEffect;
use crate::village::VillageId;

/// A battle report, persisted once to each side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    /// The village this copy of the report belongs to.
    pub recipient: VillageId,
    /// The attacking village.
    pub attacker: VillageId,
    /// The defending village.
    pub defender: VillageId,
    /// The resolved outcome.
    pub outcome: BattleOutcome,
    /// When the battle happened.
    pub fought_at: GameTime,
}

/// Any record the engine emits for later consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Report {
    /// A battle was fought.
    Battle(BattleReport),
    /// A queue entry resolved.
    QueueCompleted {
        /// The village whose queue advanced.
        village: VillageId,
        /// What was applied (or skipped).
        effect: CompletedEffect,
        /// When it resolved.
        at: GameTime,
    },
    /// A non-battle movement landed.
    MovementArrived {
        /// The landed movement.
        movement: MovementId,
        /// The receiving village.
        village: VillageId,
        /// The movement's mission.
        mission: Mission,
        /// When it landed.
        at: GameTime,
    },
}

/// The report sink collaborator the engine writes outcome records to.
pub trait ReportSink {
    /// Record one report.
    fn record(&mut self, report: Report);
}

/// In-memory sink collecting reports in emission order.
#[derive(Debug, Clone, Default)]
pub struct VecReportSink {
    /// Collected reports.
    pub reports: Vec<Report>,
}

impl VecReportSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports addressed to a village.
    pub fn for_village(&self, village: VillageId) -> impl Iterator<Item = &Report> {
        self.reports.iter().filter(move |report| match report {
            Report::Battle(battle) => battle.recipient == village,
            Report::QueueCompleted { village: v, .. }
            | Report::MovementArrived { village: v, .. } => *v == village,
        })
    }
}

impl ReportSink for VecReportSink {
    fn record(&mut self, report: Report) {
        self.reports.push(report);
    }
}

/// Sink that drops everything; for callers that only want state deltas.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReportSink;

impl ReportSink for NullReportSink {
    fn record(&mut self, _report: Report) {}
}
