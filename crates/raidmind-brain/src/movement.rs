//! Movement speed selection by remaining distance.
//!
//! Far goals are approached at a sprint, medium ones at a jog, close ones at
//! a walk. Both comparisons are strict: a distance exactly on a threshold
//! falls into the slower tier.

use raidmind_types::SpeedTier;
use serde::Deserialize;

use crate::error::BrainError;

/// Default distance above which agents sprint.
pub const DEFAULT_SPRINT_THRESHOLD: f64 = 30.0;

/// Default distance above which agents jog rather than walk.
pub const DEFAULT_WALK_THRESHOLD: f64 = 10.0;

/// Validated sprint and walk thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawTiers")]
pub struct MovementTiers {
    sprint_threshold: f64,
    walk_threshold: f64,
}

#[derive(Deserialize)]
struct RawTiers {
    #[serde(default = "default_sprint_threshold")]
    sprint_threshold: f64,
    #[serde(default = "default_walk_threshold")]
    walk_threshold: f64,
}

const fn default_sprint_threshold() -> f64 {
    DEFAULT_SPRINT_THRESHOLD
}

const fn default_walk_threshold() -> f64 {
    DEFAULT_WALK_THRESHOLD
}

impl TryFrom<RawTiers> for MovementTiers {
    type Error = BrainError;

    fn try_from(raw: RawTiers) -> Result<Self, Self::Error> {
        Self::new(raw.sprint_threshold, raw.walk_threshold)
    }
}

impl MovementTiers {
    /// Build tiers, requiring `sprint_threshold > walk_threshold >= 0`.
    pub fn new(sprint_threshold: f64, walk_threshold: f64) -> Result<Self, BrainError> {
        if walk_threshold < 0.0 || sprint_threshold <= walk_threshold {
            return Err(BrainError::InvalidThresholds {
                reason: format!(
                    "sprint threshold {sprint_threshold} must exceed walk threshold {walk_threshold} (both non-negative)"
                ),
            });
        }
        Ok(Self {
            sprint_threshold,
            walk_threshold,
        })
    }

    /// Pick the tier for the remaining `distance`.
    pub fn tier_for(&self, distance: f64) -> SpeedTier {
        if distance > self.sprint_threshold {
            SpeedTier::Sprint
        } else if distance > self.walk_threshold {
            SpeedTier::Jog
        } else {
            SpeedTier::Walk
        }
    }

    /// Distance above which agents sprint.
    pub const fn sprint_threshold(&self) -> f64 {
        self.sprint_threshold
    }

    /// Distance above which agents jog.
    pub const fn walk_threshold(&self) -> f64 {
        self.walk_threshold
    }
}

impl Default for MovementTiers {
    fn default() -> Self {
        Self {
            sprint_threshold: DEFAULT_SPRINT_THRESHOLD,
            walk_threshold: DEFAULT_WALK_THRESHOLD,
        }
    }
}
