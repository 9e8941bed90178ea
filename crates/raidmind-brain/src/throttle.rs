//! Time-based throttles that gate layer activation.
//!
//! All three throttles keep explicit elapsed-time bookkeeping against the
//! host's game clock (seconds). Boundaries resolve to the lower state: a
//! cooldown is still running at exactly its duration, a scan is not yet due
//! at exactly its interval, and a session window has not yet rolled over at
//! exactly its length.

use rand::Rng;
use serde::Deserialize;

use crate::error::BrainError;

/// A post-action cooldown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cooldown {
    started_at: Option<f64>,
    duration: f64,
}

impl Cooldown {
    /// An expired cooldown.
    pub const fn new() -> Self {
        Self {
            started_at: None,
            duration: 0.0,
        }
    }

    /// Start (or restart) the cooldown at `now` for `duration` seconds.
    pub const fn start(&mut self, now: f64, duration: f64) {
        self.started_at = Some(now);
        self.duration = duration;
    }

    /// Whether the cooldown is still running at `now`.
    pub fn is_running(&self, now: f64) -> bool {
        self.started_at
            .is_some_and(|started| now - started <= self.duration)
    }

    /// Seconds left, or 0 when expired.
    pub fn remaining(&self, now: f64) -> f64 {
        self.started_at
            .map_or(0.0, |started| (self.duration - (now - started)).max(0.0))
    }

    /// Expire the cooldown immediately.
    pub const fn clear(&mut self) {
        self.started_at = None;
    }
}

/// Inclusive range from which a cooldown duration is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CooldownRange {
    /// Shortest cooldown in seconds.
    pub min_secs: f64,
    /// Longest cooldown in seconds.
    pub max_secs: f64,
}

impl CooldownRange {
    /// Create a range.
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Check that the range is ordered and lies within `[lower, upper]`.
    pub fn validate(&self, field: &'static str, lower: f64, upper: f64) -> Result<(), BrainError> {
        for value in [self.min_secs, self.max_secs] {
            if !(lower..=upper).contains(&value) {
                return Err(BrainError::OutOfRange {
                    field,
                    value,
                    min: lower,
                    max: upper,
                });
            }
        }
        if self.min_secs > self.max_secs {
            return Err(BrainError::InvalidThresholds {
                reason: format!(
                    "{field}: min {} is greater than max {}",
                    self.min_secs, self.max_secs
                ),
            });
        }
        Ok(())
    }

    /// Draw a duration uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.random();
        (self.max_secs - self.min_secs).mul_add(u, self.min_secs)
    }
}

/// Bounds how often the world is re-queried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanTimer {
    interval: f64,
    last_scan: Option<f64>,
}

impl ScanTimer {
    /// A timer that is due immediately.
    pub const fn new(interval: f64) -> Self {
        Self {
            interval,
            last_scan: None,
        }
    }

    /// Whether a scan may run at `now`.
    pub fn is_due(&self, now: f64) -> bool {
        self.last_scan.is_none_or(|last| now - last > self.interval)
    }

    /// Record that a scan ran at `now`.
    pub const fn mark(&mut self, now: f64) {
        self.last_scan = Some(now);
    }

    /// Make the next check due immediately.
    pub const fn reset(&mut self) {
        self.last_scan = None;
    }
}

/// Caps consecutive activations within a rolling session window.
///
/// Once `max_activations` have been recorded, [`can_activate`] stays false
/// until the window that began with the first activation has elapsed; the
/// counter then resets.
///
/// [`can_activate`]: SessionLimiter::can_activate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionLimiter {
    max_activations: u32,
    window: f64,
    count: u32,
    window_start: Option<f64>,
}

impl SessionLimiter {
    /// Create a limiter allowing `max_activations` per `window` seconds.
    pub const fn new(max_activations: u32, window: f64) -> Self {
        Self {
            max_activations,
            window,
            count: 0,
            window_start: None,
        }
    }

    fn roll_window(&mut self, now: f64) {
        let expired = self
            .window_start
            .is_some_and(|start| now - start > self.window);
        if expired {
            self.count = 0;
            self.window_start = None;
        }
    }

    /// Whether another activation is allowed at `now`.
    pub fn can_activate(&mut self, now: f64) -> bool {
        self.roll_window(now);
        self.count < self.max_activations
    }

    /// Record an activation at `now`.
    pub fn record(&mut self, now: f64) {
        self.roll_window(now);
        if self.window_start.is_none() {
            self.window_start = Some(now);
        }
        self.count = self.count.saturating_add(1);
    }

    /// Activations recorded in the current window.
    pub const fn count(&self) -> u32 {
        self.count
    }
}
