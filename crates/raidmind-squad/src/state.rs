//! Atomic lifecycle cell for the support team.
//!
//! The state lives in a single [`AtomicU8`] holding the
//! [`SupportTeamState`] discriminant. Forward transitions go through
//! [`TeamStateCell::try_transition`], a compare-exchange: when several
//! threads race to leave the same state, exactly one succeeds. Abort paths
//! use [`TeamStateCell::force`], an unconditional swap.

use std::sync::atomic::{AtomicU8, Ordering};

use raidmind_types::SupportTeamState;
use tracing::{debug, info};

/// Linearizable support team state.
#[derive(Debug)]
pub struct TeamStateCell {
    raw: AtomicU8,
}

impl TeamStateCell {
    /// A cell in the `Idle` state.
    pub const fn new() -> Self {
        Self {
            raw: AtomicU8::new(SupportTeamState::Idle.as_u8()),
        }
    }

    /// The current state.
    pub fn load(&self) -> SupportTeamState {
        decode(self.raw.load(Ordering::Acquire))
    }

    /// Move to `next` only if the current state is `expected`.
    pub fn try_transition(&self, expected: SupportTeamState, next: SupportTeamState) -> bool {
        let swapped = self
            .raw
            .compare_exchange(expected.as_u8(), next.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if swapped {
            info!(from = ?expected, to = ?next, "Support team state changed");
        } else {
            debug!(expected = ?expected, next = ?next, "Support team transition lost");
        }
        swapped
    }

    /// Set `next` unconditionally and return the previous state.
    pub fn force(&self, next: SupportTeamState) -> SupportTeamState {
        let previous = decode(self.raw.swap(next.as_u8(), Ordering::AcqRel));
        info!(from = ?previous, to = ?next, "Support team state forced");
        previous
    }
}

impl Default for TeamStateCell {
    fn default() -> Self {
        Self::new()
    }
}

// Only valid discriminants are ever stored.
fn decode(raw: u8) -> SupportTeamState {
    SupportTeamState::from_u8(raw).unwrap_or_default()
}
