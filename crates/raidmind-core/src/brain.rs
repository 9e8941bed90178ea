//! Per-agent decision entry point.
//!
//! A [`BotBrain`] owns one agent's behavior layers in priority order and
//! runs the activation contract once per tick: the first layer that wants
//! control is asked for an action, and a layer that loses control is
//! stopped. [`BotBrain::tick`] never fails. Layer errors and panics are
//! logged, the offending layer is reset, and the tick yields the idle
//! result, so one bad tick cannot disable an agent for the rest of the raid.

use std::panic::{AssertUnwindSafe, catch_unwind};

use rand::RngCore;
use raidmind_brain::world::FailureLatch;
use raidmind_brain::{BehaviorLayer, LayerContext, LayerStats, Navigation, QuestSource, WorldQuery};
use raidmind_types::{ActionResult, ActionToken, AgentId, AgentSnapshot, LayerKind};
use tracing::{debug, error, warn};

use crate::session::RaidSession;

/// Host collaborators handed to every tick.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Nearby-object scans.
    pub world: &'a dyn WorldQuery,
    /// Path queries and movement execution.
    pub navigation: &'a dyn Navigation,
    /// Quest data.
    pub quests: &'a dyn QuestSource,
}

/// One agent's layered decision maker.
pub struct BotBrain {
    agent_id: AgentId,
    layers: Vec<Box<dyn BehaviorLayer>>,
    /// Index of the layer that had control last tick.
    active: Option<usize>,
    move_latch: FailureLatch,
    panics: u64,
}

impl core::fmt::Debug for BotBrain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BotBrain")
            .field("agent_id", &self.agent_id)
            .field("layers", &self.layers.iter().map(|l| l.kind()).collect::<Vec<_>>())
            .field("active", &self.active)
            .field("panics", &self.panics)
            .finish()
    }
}

impl BotBrain {
    /// Create a brain evaluating `layers` in order, highest priority first.
    pub fn new(agent_id: AgentId, layers: Vec<Box<dyn BehaviorLayer>>) -> Self {
        Self {
            agent_id,
            layers,
            active: None,
            move_latch: FailureLatch::new(),
            panics: 0,
        }
    }

    /// The agent this brain decides for.
    pub const fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    /// The layer that had control on the last tick.
    pub fn active_layer(&self) -> Option<LayerKind> {
        self.active.and_then(|index| self.layers.get(index)).map(|l| l.kind())
    }

    /// Panics caught so far.
    pub const fn panics(&self) -> u64 {
        self.panics
    }

    /// Counters of every layer.
    pub fn layer_stats(&self) -> Vec<(LayerKind, LayerStats)> {
        self.layers.iter().map(|l| (l.kind(), l.stats())).collect()
    }

    /// Stop every layer, as the host does when it takes the agent over.
    pub fn stop(&mut self) {
        for layer in &mut self.layers {
            layer.stop();
        }
        self.active = None;
    }

    /// Decide what the agent does this tick.
    pub fn tick(
        &mut self,
        session: &RaidSession,
        collaborators: Collaborators<'_>,
        snapshot: &AgentSnapshot,
        now: f64,
        rng: &mut dyn RngCore,
    ) -> ActionResult {
        if snapshot.id != self.agent_id {
            warn!(agent_id = %self.agent_id, snapshot = %snapshot.id, "Snapshot for another agent, idling");
            return ActionResult::idle(self.agent_id);
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.evaluate(session, collaborators, snapshot, now, rng)
        }));
        match outcome {
            Ok(result) => result,
            Err(_) => {
                self.panics = self.panics.saturating_add(1);
                error!(agent_id = %self.agent_id, "Behavior layer panicked, resetting brain");
                self.stop();
                ActionResult::idle(self.agent_id)
            }
        }
    }

    fn evaluate(
        &mut self,
        session: &RaidSession,
        collaborators: Collaborators<'_>,
        snapshot: &AgentSnapshot,
        now: f64,
        rng: &mut dyn RngCore,
    ) -> ActionResult {
        let mut ctx = LayerContext {
            agent: snapshot,
            now,
            world: collaborators.world,
            navigation: collaborators.navigation,
            quests: collaborators.quests,
            combat: session.combat(),
            calm_period_secs: session.config().combat.calm_period_secs,
            rng,
        };

        let chosen = self.layers.iter_mut().position(|layer| layer.is_active(&mut ctx));
        if self.active != chosen {
            if let Some(previous) = self.active.and_then(|index| self.layers.get_mut(index)) {
                debug!(agent_id = %self.agent_id, layer = %previous.kind(), "Layer lost control");
                previous.stop();
            }
            self.active = chosen;
        }

        let Some(layer) = chosen.and_then(|index| self.layers.get_mut(index)) else {
            return ActionResult::idle(self.agent_id);
        };
        let kind = layer.kind();

        let action = match layer.next_action(&mut ctx) {
            Ok(action) => action,
            Err(error) => {
                warn!(agent_id = %self.agent_id, layer = %kind, %error, "Layer failed, idling");
                layer.stop();
                self.active = None;
                return ActionResult::idle(self.agent_id);
            }
        };
        let ending = layer.is_current_action_ending();

        if let ActionToken::MoveTo { destination, speed } = &action {
            let moved = collaborators
                .navigation
                .move_towards(self.agent_id, destination, speed.factor());
            self.move_latch.observe(self.agent_id, "move_towards", moved);
        }

        ActionResult {
            agent_id: self.agent_id,
            layer: Some(kind),
            action,
            ending,
        }
    }
}
