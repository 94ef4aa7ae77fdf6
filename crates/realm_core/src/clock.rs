//! Logical game time, world speed, and the clock collaborator.
//!
//! Engine code never reads wall-clock or ambient global time. Every
//! time-dependent computation receives a [`Clock`] so that resolution
//! and production stay deterministic and testable.

use serde::{Deserialize, Serialize};

use crate::math::{percent, Fixed};

/// A point in logical game time, measured in whole seconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct GameTime(u64);

impl GameTime {
    /// The start of the world.
    pub const ZERO: Self = Self(0);

    /// Create a game time from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Total seconds since the start of the world.
    #[must_use]
    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Whole-hours component of the decomposition.
    #[must_use]
    pub const fn hours(self) -> u64 {
        self.0 / 3600
    }

    /// Minutes component (0-59).
    #[must_use]
    pub const fn minutes(self) -> u64 {
        (self.0 % 3600) / 60
    }

    /// Seconds component (0-59).
    #[must_use]
    pub const fn seconds(self) -> u64 {
        self.0 % 60
    }

    /// Seconds elapsed since `earlier`, saturating at zero.
    ///
    /// A clock that ran backwards yields zero elapsed time rather than
    /// an error; the scheduler logs the anomaly.
    #[must_use]
    pub const fn saturating_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// This time advanced by `secs` seconds.
    #[must_use]
    pub const fn plus_secs(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl std::fmt::Display for GameTime {
    /// Compact `H:MM:SS` rendering, e.g. `1:02:03`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

/// World speed multiplier.
///
/// Stored as an integer percentage so duration scaling stays in integer
/// math: a 3600 s build at 150% speed completes in 2400 s, exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameSpeed {
    percentage: u32,
}

impl GameSpeed {
    /// Normal (1x) speed.
    pub const NORMAL: Self = Self { percentage: 100 };

    /// Create a speed from an integer percentage.
    ///
    /// A zero percentage is treated as normal speed; a world cannot
    /// stand still.
    #[must_use]
    pub const fn from_percentage(percentage: u32) -> Self {
        if percentage == 0 {
            Self::NORMAL
        } else {
            Self { percentage }
        }
    }

    /// The raw percentage.
    #[must_use]
    pub const fn percentage(self) -> u32 {
        self.percentage
    }

    /// The speed as a fixed-point multiplier: 150% is `1.5`.
    #[must_use]
    pub fn multiplier(self) -> Fixed {
        percent(self.percentage)
    }

    /// Scale a base duration by this speed (faster worlds finish sooner).
    ///
    /// Pure integer math: `base * 100 / percentage`, floored.
    #[must_use]
    pub const fn scale_duration(self, base_secs: u64) -> u64 {
        base_secs * 100 / self.percentage as u64
    }

    /// Scale a per-tick amount by this speed (faster worlds produce more).
    #[must_use]
    pub const fn scale_amount(self, base: u32) -> u32 {
        let scaled = base as u64 * self.percentage as u64 / 100;
        if scaled > u32::MAX as u64 {
            u32::MAX
        } else {
            scaled as u32
        }
    }
}

impl Default for GameSpeed {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// World difficulty multiplier, applied to build and training costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameDifficulty {
    percentage: u32,
}

impl GameDifficulty {
    /// Normal (1x) difficulty.
    pub const NORMAL: Self = Self { percentage: 100 };

    /// Create a difficulty from an integer percentage.
    #[must_use]
    pub const fn from_percentage(percentage: u32) -> Self {
        if percentage == 0 {
            Self::NORMAL
        } else {
            Self { percentage }
        }
    }

    /// The raw percentage.
    #[must_use]
    pub const fn percentage(self) -> u32 {
        self.percentage
    }

    /// Scale a cost amount by this difficulty, flooring.
    #[must_use]
    pub const fn scale_cost(self, base: u32) -> u32 {
        let scaled = base as u64 * self.percentage as u64 / 100;
        if scaled > u32::MAX as u64 {
            u32::MAX
        } else {
            scaled as u32
        }
    }
}

impl Default for GameDifficulty {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// The clock collaborator handed to every tick-dependent entry point.
pub trait Clock {
    /// Current logical time.
    fn now(&self) -> GameTime;

    /// Active world speed.
    fn speed(&self) -> GameSpeed;

    /// Active world difficulty.
    fn difficulty(&self) -> GameDifficulty;
}

/// A manually driven clock for deterministic tests and catch-up runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManualClock {
    now: GameTime,
    speed: GameSpeed,
    difficulty: GameDifficulty,
}

impl ManualClock {
    /// Create a clock at `now` with normal speed and difficulty.
    #[must_use]
    pub const fn at(now: GameTime) -> Self {
        Self {
            now,
            speed: GameSpeed::NORMAL,
            difficulty: GameDifficulty::NORMAL,
        }
    }

    /// Builder method to set the world speed.
    #[must_use]
    pub const fn with_speed(mut self, speed: GameSpeed) -> Self {
        self.speed = speed;
        self
    }

    /// Builder method to set the world difficulty.
    #[must_use]
    pub const fn with_difficulty(mut self, difficulty: GameDifficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Advance the clock by `secs` seconds.
    pub fn advance(&mut self, secs: u64) {
        self.now = self.now.plus_secs(secs);
    }

    /// Jump the clock to an absolute time (may run backwards in tests).
    pub fn set(&mut self, now: GameTime) {
        self.now = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> GameTime {
        self.now
    }

    fn speed(&self) -> GameSpeed {
        self.speed
    }

    fn difficulty(&self) -> GameDifficulty {
        self.difficulty
    }
}
