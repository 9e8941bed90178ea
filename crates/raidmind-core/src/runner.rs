//! Bounded session runner.
//!
//! [`run_session`] drives [`run_frame`] at a fixed real-time interval until
//! one of these happens:
//!
//! - **Frame limit**: `host.max_frames` frames have run (0 = unlimited)
//! - **Stop request**: [`SessionControl::request_stop`] was called
//!
//! Between frames the runner honors pause and resume, hands each summary to
//! the [`FrameHost`] so it can act on the results, and builds or drops
//! brains for the agents the host spawned or removed. When the loop ends
//! the raid is closed with [`RaidSession::end_raid`].
//!
//! [`run_frame`]: crate::tick::run_frame

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use raidmind_brain::BrainError;
use raidmind_types::AgentId;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::brain::{BotBrain, Collaborators};
use crate::clock::{ClockError, FrameClock};
use crate::config::HostConfig;
use crate::session::{RaidSession, RaidSummary};
use crate::tick::{self, FrameInput, FrameSummary};

/// Errors that can occur during the session run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The frame clock failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A brain could not be built for a newly spawned agent.
    #[error("failed to build brain for {agent_id}: {source}")]
    Brain {
        /// The agent that was spawned.
        agent_id: AgentId,
        /// The underlying brain error.
        source: BrainError,
    },
}

/// Reason why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEndReason {
    /// Reached the configured `max_frames` limit.
    MaxFramesReached,
    /// A stop was requested.
    StopRequested,
}

/// Agents that appeared or left during a frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostChanges {
    /// Agents that need a brain from the next frame on.
    pub spawned: Vec<AgentId>,
    /// Agents whose brains should be stopped and dropped.
    pub removed: Vec<AgentId>,
}

/// The game side of the loop.
pub trait FrameHost: Send {
    /// Observe the world for `frame` at game time `now`.
    fn begin_frame(&mut self, frame: u64, now: f64, session: &RaidSession) -> FrameInput;

    /// Collaborators the brains query during the frame.
    fn collaborators(&self) -> Collaborators<'_>;

    /// Carry out the frame's decisions.
    fn apply(&mut self, summary: &FrameSummary, session: &RaidSession) -> HostChanges;
}

/// Callback invoked after each frame completes.
pub trait FrameCallback: Send {
    /// Called after a frame has been applied.
    fn on_frame(&mut self, summary: &FrameSummary, session: &RaidSession);
}

/// A no-op frame callback for testing.
pub struct NoOpCallback;

impl FrameCallback for NoOpCallback {
    fn on_frame(&mut self, _summary: &FrameSummary, _session: &RaidSession) {}
}

/// Shared run control.
///
/// Wrapped in an `Arc` and shared between the frame loop and whatever
/// drives it (signal handler, tests).
#[derive(Debug)]
pub struct SessionControl {
    paused: AtomicBool,
    resume_notify: Notify,
    stop_requested: AtomicBool,
    frame_interval_ms: AtomicU64,
    /// Maximum number of frames (0 = unlimited).
    max_frames: u64,
}

impl SessionControl {
    /// Create control state from the host configuration.
    pub fn new(host: &HostConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            frame_interval_ms: AtomicU64::new(host.frame_interval_ms),
            max_frames: host.max_frames,
        }
    }

    /// Check whether the session is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the session. The frame loop sleeps until resumed.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the session and wake the frame loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Sleep while paused. A stop request also ends the wait.
    async fn wait_if_paused(&self) {
        while self.paused.load(Ordering::Acquire) && !self.stop_requested.load(Ordering::Acquire) {
            self.resume_notify.notified().await;
        }
    }

    /// Request a clean stop before the next frame.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Real-time milliseconds between frames.
    pub fn frame_interval_ms(&self) -> u64 {
        self.frame_interval_ms.load(Ordering::Acquire)
    }

    /// Change the frame interval. Returns the previous value.
    pub fn set_frame_interval_ms(&self, ms: u64) -> u64 {
        self.frame_interval_ms.swap(ms, Ordering::AcqRel)
    }

    /// The configured frame limit (0 = unlimited).
    pub const fn max_frames(&self) -> u64 {
        self.max_frames
    }

    /// Whether `frame` is the last frame allowed.
    pub const fn frame_limit_reached(&self, frame: u64) -> bool {
        self.max_frames > 0 && frame >= self.max_frames
    }
}

/// Result of the session run.
#[derive(Debug)]
pub struct SessionResult {
    /// The reason the session ended.
    pub end_reason: SessionEndReason,
    /// The last frame summary, if any frame completed.
    pub final_summary: Option<FrameSummary>,
    /// Total number of frames executed.
    pub total_frames: u64,
    /// Raid totals logged at raid end.
    pub raid: RaidSummary,
}

/// Run frames until a termination condition is met.
///
/// `brains` holds one brain per agent already in the raid; the runner adds
/// and drops brains as the host reports spawns and removals. The raid is
/// ended (counters totalled, shared memory cleared) before this returns.
pub async fn run_session(
    session: &RaidSession,
    host: &mut dyn FrameHost,
    brains: &mut Vec<BotBrain>,
    control: &SessionControl,
    callback: &mut dyn FrameCallback,
) -> Result<SessionResult, RunnerError> {
    let seed = session.config().host.seed;
    let mut clock = FrameClock::new(session.config().host.frame_secs)?;
    let mut last_summary: Option<FrameSummary> = None;
    let mut total_frames: u64 = 0;

    info!(
        max_frames = control.max_frames(),
        frame_interval_ms = control.frame_interval_ms(),
        frame_secs = clock.frame_secs(),
        agents = brains.len(),
        "Session starting"
    );

    let end_reason = loop {
        if control.is_paused() {
            info!("Session paused, waiting for resume...");
            control.wait_if_paused().await;
            info!("Session resumed");
        }

        if control.is_stop_requested() {
            info!("Stop requested");
            break SessionEndReason::StopRequested;
        }

        let frame = clock.advance()?;
        let input = host.begin_frame(frame, clock.now(), session);
        let summary = tick::run_frame(session, brains, &input, host.collaborators(), seed);
        let changes = host.apply(&summary, session);
        apply_changes(session, brains, changes)?;

        total_frames = total_frames.saturating_add(1);
        callback.on_frame(&summary, session);

        if control.frame_limit_reached(frame) {
            info!(frame, max_frames = control.max_frames(), "Frame limit reached");
            last_summary = Some(summary);
            break SessionEndReason::MaxFramesReached;
        }
        last_summary = Some(summary);

        let interval_ms = control.frame_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    };

    let raid = session.end_raid(brains);
    Ok(SessionResult {
        end_reason,
        final_summary: last_summary,
        total_frames,
        raid,
    })
}

fn apply_changes(session: &RaidSession, brains: &mut Vec<BotBrain>, changes: HostChanges) -> Result<(), RunnerError> {
    if !changes.removed.is_empty() {
        brains.retain_mut(|brain| {
            if changes.removed.contains(&brain.agent_id()) {
                debug!(agent_id = %brain.agent_id(), "Dropping brain");
                brain.stop();
                false
            } else {
                true
            }
        });
    }
    for agent_id in changes.spawned {
        if brains.iter().any(|brain| brain.agent_id() == agent_id) {
            warn!(%agent_id, "Agent already has a brain, ignoring spawn");
            continue;
        }
        let brain = session
            .new_brain(agent_id)
            .map_err(|source| RunnerError::Brain { agent_id, source })?;
        debug!(%agent_id, "Brain created");
        brains.push(brain);
    }
    Ok(())
}

/// Log the session end sequence.
pub fn log_session_end(result: &SessionResult) {
    info!(
        reason = ?result.end_reason,
        total_frames = result.total_frames,
        final_frame = result.final_summary.as_ref().map(|s| s.frame),
        final_agents = result.final_summary.as_ref().map(|s| s.results.len()),
        "Session ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            frame = summary.frame,
            now = summary.now,
            team_state = ?summary.team.state,
            effective_max = summary.budget.effective_max,
            "Final frame summary"
        );
    } else {
        warn!("Session ended with no frames executed");
    }
}
