//! Frame clock for the raid.
//!
//! The clock is the single source of game time for the behavior core. It
//! counts frames and accumulates game seconds; every cooldown, scan timer
//! and phase duration downstream measures against [`FrameClock::now`].
//! The frame counter uses checked arithmetic.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Frame counter would overflow.
    #[error("frame counter overflow: cannot advance beyond u64::MAX")]
    FrameOverflow,

    /// The frame length is zero, negative, or not finite.
    #[error("invalid frame length: {frame_secs}")]
    InvalidFrameLength {
        /// The configured frame length in seconds.
        frame_secs: f64,
    },
}

/// Counts frames and game seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameClock {
    /// Frames completed so far.
    frame: u64,
    /// Game seconds per frame.
    frame_secs: f64,
    /// Game seconds elapsed since the raid started.
    now: f64,
}

impl FrameClock {
    /// Create a clock at frame 0, time 0.
    pub fn new(frame_secs: f64) -> Result<Self, ClockError> {
        if !(frame_secs.is_finite() && frame_secs > 0.0) {
            return Err(ClockError::InvalidFrameLength { frame_secs });
        }
        Ok(Self {
            frame: 0,
            frame_secs,
            now: 0.0,
        })
    }

    /// Advance one frame and return the new frame number.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.frame = self.frame.checked_add(1).ok_or(ClockError::FrameOverflow)?;
        self.now += self.frame_secs;
        Ok(self.frame)
    }

    /// The current frame number.
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Game seconds since the raid started.
    pub const fn now(&self) -> f64 {
        self.now
    }

    /// Game seconds per frame.
    pub const fn frame_secs(&self) -> f64 {
        self.frame_secs
    }
}
