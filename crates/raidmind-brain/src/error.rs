//! Error types for the raidmind-brain crate.
//!
//! Construction and configuration errors are returned to the caller.
//! Per-tick errors never escape a tick: the owning brain logs them and
//! falls back to the idle action.

use raidmind_types::LayerKind;

/// Errors raised while building or running a behavior layer.
#[derive(Debug, thiserror::Error)]
pub enum BrainError {
    /// A tunable is outside its allowed range.
    #[error("{field} = {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The configured value.
        value: f64,
        /// Lowest allowed value.
        min: f64,
        /// Highest allowed value.
        max: f64,
    },

    /// Distance tiers are empty, inverted, or lack a reachable close tier.
    #[error("invalid distance tiers: {reason}")]
    InvalidTiers {
        /// What is wrong with the tiers.
        reason: String,
    },

    /// Two thresholds are in the wrong order.
    #[error("invalid thresholds: {reason}")]
    InvalidThresholds {
        /// What is wrong with the thresholds.
        reason: String,
    },

    /// A layer was asked for an action without anything to act on.
    #[error("{layer} layer has no active target")]
    NoActiveTarget {
        /// The layer that was asked.
        layer: LayerKind,
    },
}

/// A collaborator (world query, navigation, quest data) failed.
///
/// These are transient: the caller treats the tick as having no candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The collaborator is not ready (level still loading, navmesh missing).
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator raised an error while answering.
    #[error("query failed: {0}")]
    Failed(String),
}
