//! Raid session: the explicitly owned context shared by every agent.
//!
//! One [`RaidSession`] exists per raid. It owns the validated configuration,
//! the raid-wide loot memory, the support team, the capacity gate, and the
//! combat capability resolved at raid start. Brains and the frame loop
//! borrow it; nothing in the core reaches for a global.

use std::sync::Arc;

use raidmind_brain::{
    BehaviorLayer, BrainError, CombatAwareness, CombatOracle, LayerStats, LootingLayer, QuestingLayer, RaidMemory,
};
use raidmind_squad::{CapacityGate, SupportTeam};
use raidmind_types::{AgentId, LayerKind};
use serde::Serialize;
use tracing::info;

use crate::brain::BotBrain;
use crate::config::{ConfigError, RaidMindConfig};

/// Totals logged when a raid ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RaidSummary {
    /// Brains evaluated during the raid.
    pub agents: usize,
    /// Looting layer totals.
    pub looting: LayerStats,
    /// Questing layer totals.
    pub questing: LayerStats,
    /// Targets on the blacklist at raid end.
    pub blacklisted: usize,
    /// Panics caught across all brains.
    pub panics: u64,
}

/// Shared state for one raid.
#[derive(Debug)]
pub struct RaidSession {
    config: Arc<RaidMindConfig>,
    memory: Arc<RaidMemory>,
    team: Arc<SupportTeam>,
    gate: Arc<CapacityGate>,
    combat: CombatAwareness,
}

impl RaidSession {
    /// Start a raid.
    ///
    /// `oracle` is the host's combat oracle, if it has one; availability is
    /// resolved here once and never probed again.
    pub fn new(config: RaidMindConfig, oracle: Option<Arc<dyn CombatOracle>>) -> Result<Self, ConfigError> {
        config.validate()?;
        let memory = Arc::new(RaidMemory::new(config.host.dedup_capacity));
        let team = Arc::new(SupportTeam::new(config.support_team.clone(), config.host.raid_type)?);
        let gate = Arc::new(CapacityGate::new(
            config.capacity.max_agents,
            config.team_size_i32(),
            config.support_team.enabled,
        ));
        let combat = CombatAwareness::resolve(oracle);
        info!(
            raid_type = ?config.host.raid_type,
            seed = config.host.seed,
            max_agents = config.capacity.max_agents,
            reserved = gate.budget().reserved_slots,
            "Raid session started"
        );
        Ok(Self {
            config: Arc::new(config),
            memory,
            team,
            gate,
            combat,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &RaidMindConfig {
        &self.config
    }

    /// Raid-wide loot memory.
    pub const fn memory(&self) -> &Arc<RaidMemory> {
        &self.memory
    }

    /// The support team.
    pub const fn team(&self) -> &Arc<SupportTeam> {
        &self.team
    }

    /// The spawn gate for ordinary agents.
    pub const fn gate(&self) -> &Arc<CapacityGate> {
        &self.gate
    }

    /// Combat awareness resolved at raid start.
    pub const fn combat(&self) -> &CombatAwareness {
        &self.combat
    }

    /// Build a brain for `agent`: looting first, then questing.
    pub fn new_brain(&self, agent: AgentId) -> Result<BotBrain, BrainError> {
        let looting = LootingLayer::new(self.config.looting.clone(), self.config.movement, Arc::clone(&self.memory))?;
        let questing = QuestingLayer::new(self.config.questing.clone(), self.config.movement)?;
        let layers: Vec<Box<dyn BehaviorLayer>> = vec![Box::new(looting), Box::new(questing)];
        Ok(BotBrain::new(agent, layers))
    }

    /// End the raid: total the brains' counters, log them, and clear shared
    /// memory.
    pub fn end_raid(&self, brains: &[BotBrain]) -> RaidSummary {
        let mut summary = RaidSummary {
            agents: brains.len(),
            blacklisted: self.memory.loot_blacklist.len(),
            ..RaidSummary::default()
        };
        for brain in brains {
            summary.panics = summary.panics.saturating_add(brain.panics());
            for (kind, stats) in brain.layer_stats() {
                match kind {
                    LayerKind::Looting => summary.looting.merge(&stats),
                    LayerKind::Questing => summary.questing.merge(&stats),
                }
            }
        }
        info!(
            agents = summary.agents,
            loot_activations = summary.looting.activations,
            loot_completions = summary.looting.completions,
            loot_aborts = summary.looting.aborts,
            quest_activations = summary.questing.activations,
            quest_completions = summary.questing.completions,
            quest_aborts = summary.questing.aborts,
            blacklisted = summary.blacklisted,
            panics = summary.panics,
            "Raid ended"
        );
        self.memory.clear();
        summary
    }
}
