//! The questing layer.
//!
//! Agents of the configured classes pursue objectives from the host's quest
//! data. The layer keeps its own copy of the agent's objectives so that
//! completion and priority decay survive a refresh. Regular objectives are
//! chosen by [`ObjectiveSelector::select_near`]; once all of them are
//! complete the layer falls back to the best `Extract` objective, and
//! deactivates when there is none.

use raidmind_types::{ActionToken, HoldReason, LayerKind, Objective, ObjectiveId, ObjectiveType, PathStatus};
use tracing::{debug, info};

use crate::config::QuestingConfig;
use crate::error::BrainError;
use crate::layer::{BehaviorLayer, LayerContext, LayerStats};
use crate::movement::MovementTiers;
use crate::objective::ObjectiveSelector;
use crate::progress::{ProgressTracker, ProgressVerdict, TrackedAction};
use crate::throttle::{Cooldown, ScanTimer, SessionLimiter};
use crate::world::FailureLatch;

/// Questing behavior for one agent.
#[derive(Debug)]
pub struct QuestingLayer {
    config: QuestingConfig,
    selector: ObjectiveSelector,
    tiers: MovementTiers,
    refresh: ScanTimer,
    cooldown: Cooldown,
    limiter: SessionLimiter,
    tracker: ProgressTracker,
    objectives: Vec<Objective>,
    active: Option<ObjectiveId>,
    quest_latch: FailureLatch,
    path_latch: FailureLatch,
    ending: bool,
    stats: LayerStats,
}

impl QuestingLayer {
    /// Build the layer after validating `config`.
    pub fn new(config: QuestingConfig, tiers: MovementTiers) -> Result<Self, BrainError> {
        config.validate()?;
        Ok(Self {
            selector: ObjectiveSelector::from_config(&config),
            tiers,
            refresh: ScanTimer::new(config.scan_interval_secs),
            cooldown: Cooldown::new(),
            limiter: SessionLimiter::new(config.max_activations_per_session, config.session_window_secs),
            tracker: ProgressTracker::new(),
            objectives: Vec::new(),
            active: None,
            quest_latch: FailureLatch::new(),
            path_latch: FailureLatch::new(),
            ending: false,
            stats: LayerStats::default(),
            config,
        })
    }

    /// The agent's objectives as last refreshed.
    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// The objective currently being pursued.
    pub fn active_objective(&self) -> Option<&Objective> {
        let id = self.active.as_ref()?;
        self.objectives.iter().find(|o| &o.id == id)
    }

    /// Pull fresh objectives, carrying over local completion and decay.
    fn refresh_objectives(&mut self, ctx: &LayerContext<'_>) {
        self.refresh.mark(ctx.now);
        let fetched = ctx.quests.objectives_for(ctx.agent);
        let Some(mut fresh) = self.quest_latch.observe(ctx.agent.id, "objectives_for", fetched) else {
            return;
        };
        for objective in &mut fresh {
            if let Some(known) = self.objectives.iter().find(|o| o.id == objective.id) {
                objective.is_complete |= known.is_complete;
                objective.priority = objective.priority.min(known.priority);
            }
        }
        self.objectives = fresh;

        let still_open = self
            .active
            .as_ref()
            .is_some_and(|id| self.objectives.iter().any(|o| &o.id == id && !o.is_complete));
        if self.active.is_some() && !still_open {
            debug!(agent_id = %ctx.agent.id, "Active objective vanished from quest data");
            self.active = None;
            self.tracker.reset();
        }
    }

    /// Index of the objective to pursue next.
    fn choose(&self, ctx: &LayerContext<'_>) -> Option<usize> {
        let agent = ctx.agent;
        let regular_open = self
            .objectives
            .iter()
            .any(|o| !o.is_complete && o.objective_type != ObjectiveType::Extract);
        if regular_open {
            return self.selector.select_near(&self.objectives, &agent.position, agent.class, |o| {
                o.objective_type != ObjectiveType::Extract
            });
        }
        ObjectiveSelector::best_index(&self.objectives, |o| o.objective_type == ObjectiveType::Extract)
    }

    fn start_cooldown(&mut self, ctx: &mut LayerContext<'_>) {
        let duration = self.config.cooldown.sample(&mut *ctx.rng);
        self.cooldown.start(ctx.now, duration);
    }

    /// Give up on the current objective and halve its priority.
    fn abort(&mut self, ctx: &mut LayerContext<'_>, why: &'static str) -> ActionToken {
        if let Some(id) = self.active.take() {
            if let Some(objective) = self.objectives.iter_mut().find(|o| o.id == id) {
                objective.priority = (objective.priority * 0.5).max(0.0);
                info!(
                    agent_id = %ctx.agent.id,
                    objective = %id,
                    priority = objective.priority,
                    reason = why,
                    "Objective abandoned"
                );
            }
        }
        self.tracker.reset();
        self.stats.record_abort();
        self.start_cooldown(ctx);
        self.ending = true;
        ActionToken::Idle
    }

    fn release(&mut self) {
        self.active = None;
        self.tracker.reset();
    }
}

impl BehaviorLayer for QuestingLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Questing
    }

    fn is_active(&mut self, ctx: &mut LayerContext<'_>) -> bool {
        let agent = ctx.agent;
        if !self.config.enabled || !agent.can_act() || !self.config.quests(agent.class) {
            self.release();
            return false;
        }
        if ctx.in_danger() {
            self.release();
            return false;
        }
        if self.cooldown.is_running(ctx.now) {
            return true;
        }
        if self.refresh.is_due(ctx.now) {
            self.refresh_objectives(ctx);
        }
        if self.active.is_some() {
            return true;
        }
        if !self.limiter.can_activate(ctx.now) {
            return false;
        }

        let Some(objective) = self.choose(ctx).and_then(|index| self.objectives.get(index)) else {
            return false;
        };
        let distance = agent.position.distance_to(&objective.position);
        info!(
            agent_id = %agent.id,
            objective = %objective.id,
            kind = ?objective.objective_type,
            priority = objective.priority,
            distance,
            "Objective selected"
        );
        self.active = Some(objective.id.clone());
        self.tracker.start(TrackedAction::ObjectiveApproach, distance, ctx.now);
        self.limiter.record(ctx.now);
        self.stats.record_activation();
        true
    }

    fn next_action(&mut self, ctx: &mut LayerContext<'_>) -> Result<ActionToken, BrainError> {
        self.ending = false;
        if self.cooldown.is_running(ctx.now) {
            return Ok(ActionToken::Hold {
                reason: HoldReason::Cooldown,
            });
        }

        let agent = ctx.agent;
        let Some(objective) = self.active_objective() else {
            return Err(BrainError::NoActiveTarget {
                layer: LayerKind::Questing,
            });
        };
        let id = objective.id.clone();
        let destination = objective.position;
        let distance = agent.position.distance_to(&destination);

        if objective.is_reached_from(&agent.position) {
            if let Some(done) = self.objectives.iter_mut().find(|o| o.id == id) {
                done.is_complete = true;
            }
            info!(agent_id = %agent.id, objective = %id, "Objective completed");
            self.active = None;
            self.tracker.complete();
            self.stats.record_completion();
            self.start_cooldown(ctx);
            self.ending = true;
            return Ok(ActionToken::CompleteObjective { objective: id });
        }

        let path = ctx.navigation.path_to(&agent.position, &destination);
        let route = self.path_latch.observe(agent.id, "path_to", path);
        if matches!(route, Some(PathStatus::Unreachable)) {
            return Ok(self.abort(ctx, "unreachable"));
        }

        // A failed path query still counts as a tick without progress.
        if let ProgressVerdict::Abort(reason) = self.tracker.observe(distance, ctx.now) {
            debug!(agent_id = %agent.id, ?reason, "Objective approach aborted");
            return Ok(self.abort(ctx, "no_progress"));
        }

        Ok(if route.is_some() {
            ActionToken::MoveTo {
                destination,
                speed: self.tiers.tier_for(distance),
            }
        } else {
            ActionToken::Idle
        })
    }

    fn is_current_action_ending(&self) -> bool {
        self.ending
    }

    fn stop(&mut self) {
        self.release();
        self.ending = false;
    }

    fn stats(&self) -> LayerStats {
        self.stats
    }
}
