//! Spawn capacity reservation.
//!
//! The host caps ordinary agents at a configured ceiling. While the support
//! team feature is on, `team_size` slots of that ceiling are held back so a
//! summon never finds the population full. During the team's own spawn the
//! reservation is lifted, otherwise the team could starve itself.
//!
//! A ceiling of 0 (or less) means "use the host default": the budget
//! reports 0 and the gate admits everything.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use tracing::debug;

/// How many ordinary agents may exist, and how many slots are held back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityBudget {
    /// Maximum ordinary agents right now; 0 defers to the host default.
    pub effective_max: i32,
    /// Slots held back for the support team.
    pub reserved_slots: i32,
}

/// Compute the ordinary-agent budget.
///
/// Unless clamped, `effective_max + reserved_slots == ceiling`. When the
/// ceiling is smaller than the team, `effective_max` floors at 1.
pub fn compute_budget(ceiling: i32, team_size: i32, feature_enabled: bool, is_spawning: bool) -> CapacityBudget {
    let reserved_slots = if feature_enabled && ceiling > 0 { team_size } else { 0 };
    let effective_max = if ceiling <= 0 {
        0
    } else if is_spawning {
        ceiling
    } else {
        ceiling.saturating_sub(reserved_slots).max(1)
    };
    CapacityBudget {
        effective_max,
        reserved_slots,
    }
}

/// Shared spawn gate consulted by the host before creating an ordinary agent.
#[derive(Debug)]
pub struct CapacityGate {
    ceiling: i32,
    team_size: i32,
    feature_enabled: bool,
    team_spawning: AtomicBool,
    ordinary: AtomicI32,
}

impl CapacityGate {
    /// Create a gate with no ordinary agents admitted.
    pub const fn new(ceiling: i32, team_size: i32, feature_enabled: bool) -> Self {
        Self {
            ceiling,
            team_size,
            feature_enabled,
            team_spawning: AtomicBool::new(false),
            ordinary: AtomicI32::new(0),
        }
    }

    /// Record whether the support team is spawning.
    pub fn set_team_spawning(&self, spawning: bool) {
        let previous = self.team_spawning.swap(spawning, Ordering::AcqRel);
        if previous != spawning {
            debug!(spawning, "Capacity reservation {}", if spawning { "lifted" } else { "restored" });
        }
    }

    /// The budget as of now.
    pub fn budget(&self) -> CapacityBudget {
        compute_budget(
            self.ceiling,
            self.team_size,
            self.feature_enabled,
            self.team_spawning.load(Ordering::Acquire),
        )
    }

    /// Admit one ordinary agent if the budget allows it.
    pub fn try_admit(&self) -> bool {
        let max = self.budget().effective_max;
        let admitted = self
            .ordinary
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                if max > 0 && count >= max {
                    None
                } else {
                    count.checked_add(1)
                }
            })
            .is_ok();
        if !admitted {
            debug!(max, "Ordinary agent refused, capacity reached");
        }
        admitted
    }

    /// Give back one admitted slot (an ordinary agent died or despawned).
    pub fn release(&self) {
        // Never below zero, even on a stray release.
        let _ = self
            .ordinary
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count > 0).then(|| count.saturating_sub(1))
            });
    }

    /// Ordinary agents currently admitted.
    pub fn ordinary(&self) -> i32 {
        self.ordinary.load(Ordering::Acquire)
    }
}
