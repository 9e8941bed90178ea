//! Raid orchestration for raidmind.
//!
//! This crate wires the behavior layers and the support team into a frame
//! loop: configuration is loaded once, a [`RaidSession`] owns the raid-wide
//! shared state, one [`BotBrain`] per agent decides each frame, and the
//! runner drives frames until the raid ends.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `raidmind-config.yaml` into
//!   strongly-typed structs.
//! - [`clock`] -- Frame counter and game time.
//! - [`session`] -- The explicitly owned raid context ([`RaidSession`]).
//! - [`brain`] -- Per-agent layered decision maker with a panic-safe tick.
//! - [`tick`] -- Whole-frame evaluation, optionally across worker threads.
//! - [`runner`] -- Async bounded session loop with pause, resume and stop.

pub mod brain;
pub mod clock;
pub mod config;
pub mod runner;
pub mod session;
pub mod tick;

pub use brain::{BotBrain, Collaborators};
pub use clock::{ClockError, FrameClock};
pub use config::{ConfigError, HostConfig, RaidMindConfig};
pub use runner::{
    FrameCallback, FrameHost, HostChanges, NoOpCallback, RunnerError, SessionControl, SessionEndReason,
    SessionResult, log_session_end, run_session,
};
pub use session::{RaidSession, RaidSummary};
pub use tick::{FrameInput, FrameSummary, run_frame};
