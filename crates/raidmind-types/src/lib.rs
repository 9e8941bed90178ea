//! Shared type definitions for the raidmind bot behavior core.
//!
//! This crate is the single source of truth for the data that flows between
//! the host simulation, the behavior layers, and the support team.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifiers (UUID-backed agent ids, stable string
//!   ids for targets and objectives)
//! - [`geometry`] -- World positions and distance helpers
//! - [`enums`] -- Enumeration types (objective kinds, team states, agent classes)
//! - [`structs`] -- Core entity structs (targets, objectives, agent snapshots)
//! - [`actions`] -- Action tokens and per-tick results handed back to the host

pub mod actions;
pub mod enums;
pub mod geometry;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{ActionResult, ActionToken, HoldReason};
pub use enums::{
    AgentClass, LayerKind, LootCategory, ObjectiveType, PathStatus, RaidType, SpeedTier,
    SupportTeamState, TeamRole,
};
pub use geometry::Position;
pub use ids::{AgentId, ObjectiveId, TargetId, TeamId};
pub use structs::{AgentSnapshot, LootItem, Objective, Target};
