//! The behavior-layer activation contract.
//!
//! The host's scheduler asks every layer, in priority order, whether it
//! wants control of an agent this tick ([`BehaviorLayer::is_active`]). The
//! first layer that says yes is asked for an action
//! ([`BehaviorLayer::next_action`]). A layer that loses control is stopped,
//! which must drop every per-action counter so nothing carries over into the
//! next activation.
//!
//! Per-tick inputs arrive in a [`LayerContext`]; state shared by every agent
//! of a raid lives in [`RaidMemory`], which layers hold by `Arc`.

use rand::RngCore;
use raidmind_types::{ActionToken, AgentSnapshot, LayerKind, TargetId};
use serde::Serialize;

use crate::combat::CombatAwareness;
use crate::dedup::{DEFAULT_MAX_ENTRIES, DedupGuard};
use crate::error::BrainError;
use crate::world::{Navigation, QuestSource, WorldQuery};

/// Everything a layer may consult during one tick for one agent.
pub struct LayerContext<'a> {
    /// The agent being evaluated.
    pub agent: &'a AgentSnapshot,
    /// Game time in seconds.
    pub now: f64,
    /// Nearby-object scans.
    pub world: &'a dyn WorldQuery,
    /// Path queries.
    pub navigation: &'a dyn Navigation,
    /// Quest data.
    pub quests: &'a dyn QuestSource,
    /// Combat awareness resolved at raid start.
    pub combat: &'a CombatAwareness,
    /// Seconds without a threat before an agent counts as calm.
    pub calm_period_secs: f64,
    /// Randomness for cooldown jitter and item picks.
    pub rng: &'a mut dyn RngCore,
}

impl LayerContext<'_> {
    /// Whether the agent is in danger and every layer should yield.
    pub fn in_danger(&self) -> bool {
        self.combat.is_in_danger(self.agent, self.calm_period_secs)
    }
}

/// Raid-wide memory shared by every agent's layers.
#[derive(Debug)]
pub struct RaidMemory {
    /// Targets no agent should select again this raid.
    pub loot_blacklist: DedupGuard<TargetId>,
    /// Targets some agent is currently heading for or has looted.
    pub loot_claimed: DedupGuard<TargetId>,
}

impl RaidMemory {
    /// Create empty memory whose guards hold at most `max_entries` each.
    pub fn new(max_entries: usize) -> Self {
        Self {
            loot_blacklist: DedupGuard::new("loot_blacklist", max_entries),
            loot_claimed: DedupGuard::new("loot_claimed", max_entries),
        }
    }

    /// Forget everything. Called at raid end.
    pub fn clear(&self) {
        self.loot_blacklist.clear();
        self.loot_claimed.clear();
    }
}

impl Default for RaidMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

/// Counters kept by every layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayerStats {
    /// Times the layer picked a new target or objective.
    pub activations: u64,
    /// Actions that finished successfully.
    pub completions: u64,
    /// Actions abandoned (unreachable, stuck, timed out).
    pub aborts: u64,
}

impl LayerStats {
    /// Count an activation.
    pub const fn record_activation(&mut self) {
        self.activations = self.activations.saturating_add(1);
    }

    /// Count a completion.
    pub const fn record_completion(&mut self) {
        self.completions = self.completions.saturating_add(1);
    }

    /// Count an abort.
    pub const fn record_abort(&mut self) {
        self.aborts = self.aborts.saturating_add(1);
    }

    /// Add another set of counters into this one.
    pub const fn merge(&mut self, other: &Self) {
        self.activations = self.activations.saturating_add(other.activations);
        self.completions = self.completions.saturating_add(other.completions);
        self.aborts = self.aborts.saturating_add(other.aborts);
    }
}

/// One behavior kind competing for control of an agent.
pub trait BehaviorLayer: Send {
    /// Which behavior this is.
    fn kind(&self) -> LayerKind;

    /// Whether the layer wants control this tick.
    ///
    /// Returns `false` when the agent cannot act, the layer is disabled, or
    /// the agent is in danger. Returns `true` while a post-action cooldown
    /// runs, so the host default does not take over mid-cooldown.
    fn is_active(&mut self, ctx: &mut LayerContext<'_>) -> bool;

    /// The action to run this tick. Only called after `is_active` returned
    /// `true` on the same tick.
    fn next_action(&mut self, ctx: &mut LayerContext<'_>) -> Result<ActionToken, BrainError>;

    /// Whether the action returned by the last `next_action` finishes it.
    fn is_current_action_ending(&self) -> bool;

    /// Drop the current target and every per-action counter.
    fn stop(&mut self);

    /// Counters accumulated since the layer was built.
    fn stats(&self) -> LayerStats;
}
