//! Behavior layers and decision primitives for raidmind bots.
//!
//! This crate contains the logic layer evaluated once per agent per tick --
//! everything that decides what a bot does without touching I/O. World and
//! navigation queries are reached through the collaborator traits in
//! [`world`]; the host implements them.
//!
//! # Modules
//!
//! - [`priority`] -- Value/distance scoring, weighted picks, graded distance search
//! - [`dedup`] -- Bounded concurrent "seen" set ([`DedupGuard`])
//! - [`progress`] -- Stuck and timeout detection ([`ProgressTracker`])
//! - [`throttle`] -- Scan timers, cooldowns, and the session limiter
//! - [`movement`] -- Distance-tiered movement speed ([`MovementTiers`])
//! - [`objective`] -- Objective ranking with fallback tiers ([`ObjectiveSelector`])
//! - [`combat`] -- Optional combat-awareness capability ([`CombatAwareness`])
//! - [`world`] -- Collaborator traits and the failure latch
//! - [`layer`] -- The [`BehaviorLayer`] activation contract and shared raid memory
//! - [`looting`] -- The looting layer
//! - [`questing`] -- The questing layer
//! - [`config`] -- Tunables for every layer
//! - [`error`] -- Error types ([`BrainError`], [`QueryError`])

pub mod combat;
pub mod config;
pub mod dedup;
pub mod error;
pub mod layer;
pub mod looting;
pub mod movement;
pub mod objective;
pub mod priority;
pub mod progress;
pub mod questing;
pub mod throttle;
pub mod world;

pub use combat::{CombatAwareness, CombatOracle};
pub use config::{CombatConfig, LootCategories, LootingConfig, QuestingConfig};
pub use dedup::DedupGuard;
pub use error::{BrainError, QueryError};
pub use layer::{BehaviorLayer, LayerContext, LayerStats, RaidMemory};
pub use looting::LootingLayer;
pub use movement::MovementTiers;
pub use objective::ObjectiveSelector;
pub use priority::{DistanceTier, DistanceTiers, graded_search, price_per_slot, score_target, weighted_pick};
pub use progress::{AbortReason, ProgressTracker, ProgressVerdict, TrackedAction};
pub use questing::QuestingLayer;
pub use throttle::{Cooldown, CooldownRange, ScanTimer, SessionLimiter};
pub use world::{FailureLatch, Navigation, QuestSource, ScanFilter, WorldQuery};
