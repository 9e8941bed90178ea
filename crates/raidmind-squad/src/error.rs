//! Error types for the raidmind-squad crate.
//!
//! A rejected summon is reported to the player; none of these errors is
//! fatal to the raid. A lost race for a state transition is not an error at
//! all: [`TeamStateCell::try_transition`](crate::TeamStateCell::try_transition)
//! simply returns `false`.

use raidmind_types::{RaidType, SupportTeamState};

/// Errors raised by the support team.
#[derive(Debug, thiserror::Error)]
pub enum SquadError {
    /// The support team feature is switched off.
    #[error("support team is disabled")]
    Disabled,

    /// The current raid type does not allow a support team.
    #[error("support team is not available in {raid_type:?} raids")]
    RaidTypeNotAllowed {
        /// The raid type in progress.
        raid_type: RaidType,
    },

    /// The previous team despawned too recently.
    #[error("summon on cooldown for another {remaining_secs:.1}s")]
    SummonOnCooldown {
        /// Seconds until a summon is allowed again.
        remaining_secs: f64,
    },

    /// A team is already in the field.
    #[error("a support team is already active ({state:?})")]
    TeamActive {
        /// The team's current state.
        state: SupportTeamState,
    },

    /// The configured team size is outside `[2, 6]`.
    #[error("team size {size} is outside the allowed range [{min}, {max}]")]
    InvalidTeamSize {
        /// The configured size.
        size: usize,
        /// Smallest allowed size.
        min: usize,
        /// Largest allowed size.
        max: usize,
    },

    /// A phase duration is zero or negative.
    #[error("{field} must be positive, got {value}")]
    InvalidDuration {
        /// Name of the offending field.
        field: &'static str,
        /// The configured value.
        value: f64,
    },

    /// A spawn confirmation referenced a slot the roster does not have.
    #[error("roster has no slot {slot}")]
    UnknownSlot {
        /// The requested slot.
        slot: usize,
    },

    /// A spawn confirmation arrived while no spawn was pending.
    #[error("no spawn pending (team is {state:?})")]
    NotSpawning {
        /// The team's current state.
        state: SupportTeamState,
    },
}
