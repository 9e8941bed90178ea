//! Player-summoned support team and spawn capacity reservation.
//!
//! The support team runs its own lifecycle independently of the per-agent
//! behavior layers: a summon starts the cycle, a per-frame update advances
//! it, and abort paths tear it down early. The capacity module decides how
//! many ordinary agents may exist so the team always has room to spawn.
//!
//! # Modules
//!
//! - [`state`] -- Atomic lifecycle cell ([`TeamStateCell`])
//! - [`roster`] -- Slot-indexed member roster with medic promotion
//! - [`team`] -- The [`SupportTeam`] state machine
//! - [`capacity`] -- [`compute_budget`] and the shared [`CapacityGate`]
//! - [`config`] -- Team and capacity configuration
//! - [`error`] -- Error types ([`SquadError`])

pub mod capacity;
pub mod config;
pub mod error;
pub mod roster;
pub mod state;
pub mod team;

pub use capacity::{CapacityBudget, CapacityGate, compute_budget};
pub use config::{CapacityConfig, SupportTeamConfig};
pub use error::SquadError;
pub use roster::{Roster, RosterSlot};
pub use state::TeamStateCell;
pub use team::{MemberStatus, SpawnRequest, SpawnSlot, SupportTeam, TeamSnapshot, TeamUpdate};
