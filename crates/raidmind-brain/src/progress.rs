//! Stuck and timeout detection for navigation-bound actions.
//!
//! A [`ProgressTracker`] supervises one action at a time. The owner starts
//! it with the initial distance to the goal and reports the current distance
//! every tick. A tick that closes more than [`PROGRESS_THRESHOLD`] units
//! resets the no-progress counter; any other tick increments it. The action
//! is aborted once the counter reaches [`MAX_NO_PROGRESS_TICKS`] or the
//! elapsed time exceeds the action kind's overall timeout.
//!
//! The abort is reported exactly once per action. Later ticks return
//! [`ProgressVerdict::Inactive`] until the next [`ProgressTracker::start`].

use tracing::debug;

/// Minimum distance reduction per tick that counts as progress.
pub const PROGRESS_THRESHOLD: f64 = 0.3;

/// Consecutive ticks without progress that abort the action.
pub const MAX_NO_PROGRESS_TICKS: u32 = 5;

/// The kinds of navigation-bound actions a tracker can supervise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedAction {
    /// Walking to a loot target.
    LootApproach,
    /// Walking to a quest objective.
    ObjectiveApproach,
    /// Support team walking to the player.
    TeamApproach,
}

impl TrackedAction {
    /// Timeout of a single move operation, in seconds.
    pub const fn move_timeout_secs(self) -> f64 {
        match self {
            Self::LootApproach => 20.0,
            Self::ObjectiveApproach => 45.0,
            Self::TeamApproach => 30.0,
        }
    }

    /// Overall timeout for the whole action, in seconds.
    ///
    /// Always strictly greater than [`move_timeout_secs`](Self::move_timeout_secs).
    pub const fn overall_timeout_secs(self) -> f64 {
        match self {
            Self::LootApproach => 30.0,
            Self::ObjectiveApproach => 60.0,
            Self::TeamApproach => 45.0,
        }
    }
}

/// Why an action was aborted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbortReason {
    /// Too many ticks in a row without closing distance.
    NoProgress {
        /// Consecutive ticks without progress.
        ticks: u32,
    },
    /// The overall timeout elapsed.
    Timeout {
        /// Seconds since the action started.
        elapsed_secs: f64,
    },
}

/// Outcome of reporting one tick to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressVerdict {
    /// The last tick closed distance.
    Progressing,
    /// The last tick did not close enough distance.
    Stalled {
        /// Consecutive ticks without progress so far.
        ticks: u32,
    },
    /// The action must be aborted. Reported once per action.
    Abort(AbortReason),
    /// No action is being supervised (never started, completed, or already aborted).
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ProgressState {
    last_distance: f64,
    no_progress_count: u32,
    start_time: f64,
}

/// Per-action stuck detector.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    action: Option<TrackedAction>,
    state: Option<ProgressState>,
}

impl ProgressTracker {
    /// Create an idle tracker.
    pub const fn new() -> Self {
        Self {
            action: None,
            state: None,
        }
    }

    /// Begin supervising a new action instance, discarding any previous one.
    pub const fn start(&mut self, action: TrackedAction, initial_distance: f64, now: f64) {
        self.action = Some(action);
        self.state = Some(ProgressState {
            last_distance: initial_distance,
            no_progress_count: 0,
            start_time: now,
        });
    }

    /// Report the distance to the goal for this tick.
    pub fn observe(&mut self, current_distance: f64, now: f64) -> ProgressVerdict {
        let (Some(action), Some(state)) = (self.action, self.state.as_mut()) else {
            return ProgressVerdict::Inactive;
        };

        if current_distance < state.last_distance - PROGRESS_THRESHOLD {
            state.no_progress_count = 0;
        } else {
            state.no_progress_count = state.no_progress_count.saturating_add(1);
        }
        state.last_distance = current_distance;

        let ticks = state.no_progress_count;
        let elapsed_secs = now - state.start_time;

        let reason = if ticks >= MAX_NO_PROGRESS_TICKS {
            Some(AbortReason::NoProgress { ticks })
        } else if elapsed_secs > action.overall_timeout_secs() {
            Some(AbortReason::Timeout { elapsed_secs })
        } else {
            None
        };

        if let Some(reason) = reason {
            debug!(?action, ?reason, "Tracked action aborted");
            self.state = None;
            return ProgressVerdict::Abort(reason);
        }

        if ticks == 0 {
            ProgressVerdict::Progressing
        } else {
            ProgressVerdict::Stalled { ticks }
        }
    }

    /// Mark the current action as finished successfully.
    pub const fn complete(&mut self) {
        self.state = None;
    }

    /// Drop all state, as if never started.
    pub const fn reset(&mut self) {
        self.action = None;
        self.state = None;
    }

    /// Whether an action is being supervised.
    pub const fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Consecutive ticks without progress for the current action.
    pub fn no_progress_count(&self) -> u32 {
        self.state.map_or(0, |s| s.no_progress_count)
    }
}
