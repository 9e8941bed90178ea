//! The looting layer.
//!
//! Each activation picks the nearby target with the best value-for-distance
//! score that nobody has claimed or blacklisted, claims it for the raid,
//! walks there and loots it. Inside a target the item is drawn with
//! [`weighted_pick`] over the items that fit the agent's free inventory.
//!
//! Targets the agent cannot reach (unreachable path, stuck, timed out) go on
//! the raid-wide blacklist. After every loot or abort a randomized cooldown
//! holds the layer in control, and the session limiter caps how many targets
//! an agent takes in a row.

use std::sync::Arc;

use raidmind_types::{ActionToken, HoldReason, LayerKind, LootItem, PathStatus, Target};
use tracing::{debug, info};

use crate::config::LootingConfig;
use crate::error::BrainError;
use crate::layer::{BehaviorLayer, LayerContext, LayerStats, RaidMemory};
use crate::movement::MovementTiers;
use crate::priority::{price_per_slot, score_target, weighted_pick};
use crate::progress::{ProgressTracker, ProgressVerdict, TrackedAction};
use crate::throttle::{Cooldown, ScanTimer, SessionLimiter};
use crate::world::{FailureLatch, ScanFilter};

/// Looting behavior for one agent.
#[derive(Debug)]
pub struct LootingLayer {
    config: LootingConfig,
    filter: ScanFilter,
    tiers: MovementTiers,
    memory: Arc<RaidMemory>,
    scan: ScanTimer,
    cooldown: Cooldown,
    limiter: SessionLimiter,
    tracker: ProgressTracker,
    active: Option<Target>,
    scan_latch: FailureLatch,
    path_latch: FailureLatch,
    ending: bool,
    stats: LayerStats,
}

impl LootingLayer {
    /// Build the layer after validating `config`.
    pub fn new(config: LootingConfig, tiers: MovementTiers, memory: Arc<RaidMemory>) -> Result<Self, BrainError> {
        config.validate()?;
        let filter = ScanFilter {
            categories: config.categories.enabled(),
            min_value: config.min_value,
        };
        Ok(Self {
            filter,
            tiers,
            memory,
            scan: ScanTimer::new(config.scan_interval_secs),
            cooldown: Cooldown::new(),
            limiter: SessionLimiter::new(config.max_activations_per_session, config.session_window_secs),
            tracker: ProgressTracker::new(),
            active: None,
            scan_latch: FailureLatch::new(),
            path_latch: FailureLatch::new(),
            ending: false,
            stats: LayerStats::default(),
            config,
        })
    }

    /// The target currently being approached.
    pub const fn active_target(&self) -> Option<&Target> {
        self.active.as_ref()
    }

    /// Seconds of cooldown left at `now`.
    pub fn cooldown_remaining(&self, now: f64) -> f64 {
        self.cooldown.remaining(now)
    }

    /// Drop the current target and give its claim back.
    fn release(&mut self) {
        if let Some(target) = self.active.take() {
            self.memory.loot_claimed.remove(&target.id);
            debug!(target = %target.id, "Loot target released");
        }
        self.tracker.reset();
    }

    /// Scan the surroundings and claim the best target. Returns whether one
    /// was claimed.
    fn acquire(&mut self, ctx: &LayerContext<'_>) -> bool {
        self.scan.mark(ctx.now);
        let agent = ctx.agent;
        let scanned = ctx
            .world
            .scan_nearby(&agent.position, self.config.search_radius, &self.filter);
        let Some(targets) = self.scan_latch.observe(agent.id, "scan_nearby", scanned) else {
            return false;
        };

        let mut candidates: Vec<(f64, Target)> = targets
            .into_iter()
            .filter(|t| self.filter.accepts(t))
            .filter(|t| !self.memory.loot_blacklist.contains(&t.id) && !self.memory.loot_claimed.contains(&t.id))
            .filter(|t| fits_inventory(t, agent.free_slots))
            .filter(|t| ctx.navigation.is_reachable(&t.position))
            .map(|t| (score_target(t.value, t.distance), t))
            .collect();
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

        // Another agent may claim the same target between `contains` and
        // `add`; the loser moves on to its next candidate.
        let Some((score, target)) = candidates
            .into_iter()
            .find(|(_, t)| self.memory.loot_claimed.add(t.id.clone()))
        else {
            return false;
        };

        let distance = agent.position.distance_to(&target.position);
        debug!(
            agent_id = %agent.id,
            target = %target.id,
            value = target.value,
            distance,
            score,
            "Loot target claimed"
        );
        self.tracker.start(TrackedAction::LootApproach, distance, ctx.now);
        self.limiter.record(ctx.now);
        self.stats.record_activation();
        self.active = Some(target);
        true
    }

    fn start_cooldown(&mut self, ctx: &mut LayerContext<'_>) {
        let duration = self.config.cooldown.sample(&mut *ctx.rng);
        self.cooldown.start(ctx.now, duration);
    }

    /// Give up on the current target for the rest of the raid.
    fn abort(&mut self, ctx: &mut LayerContext<'_>, why: &'static str) -> ActionToken {
        if let Some(target) = self.active.take() {
            self.memory.loot_blacklist.add(target.id.clone());
            self.memory.loot_claimed.remove(&target.id);
            info!(agent_id = %ctx.agent.id, target = %target.id, reason = why, "Loot target abandoned");
        }
        self.tracker.reset();
        self.stats.record_abort();
        self.start_cooldown(ctx);
        self.ending = true;
        ActionToken::Idle
    }
}

/// Whether at least one of the target's items fits in `free_slots`.
///
/// A target with no item list (unsearched container, corpse) always fits.
fn fits_inventory(target: &Target, free_slots: u32) -> bool {
    target.items.is_empty() || target.items.iter().any(|item| item.area() <= free_slots)
}

/// Draw the item to take, among those that fit.
fn pick_item(items: &[LootItem], free_slots: u32, ctx: &mut LayerContext<'_>) -> Option<usize> {
    let fitting: Vec<(usize, f64)> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.area() <= free_slots)
        .map(|(index, item)| (index, price_per_slot(item.price, item.width, item.height)))
        .collect();
    weighted_pick(&fitting, |(_, per_slot)| *per_slot, &mut *ctx.rng).map(|(_, (index, _))| *index)
}

impl BehaviorLayer for LootingLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Looting
    }

    fn is_active(&mut self, ctx: &mut LayerContext<'_>) -> bool {
        if !self.config.enabled || !ctx.agent.can_act() {
            self.release();
            return false;
        }
        if ctx.in_danger() {
            if self.active.is_some() {
                debug!(agent_id = %ctx.agent.id, "Agent in danger, dropping loot target");
                self.release();
            }
            return false;
        }
        if self.cooldown.is_running(ctx.now) || self.active.is_some() {
            return true;
        }
        if !self.limiter.can_activate(ctx.now) || !self.scan.is_due(ctx.now) {
            return false;
        }
        self.acquire(ctx)
    }

    fn next_action(&mut self, ctx: &mut LayerContext<'_>) -> Result<ActionToken, BrainError> {
        self.ending = false;
        if self.cooldown.is_running(ctx.now) {
            return Ok(ActionToken::Hold {
                reason: HoldReason::Cooldown,
            });
        }

        let Some(target) = self.active.as_ref() else {
            return Err(BrainError::NoActiveTarget {
                layer: LayerKind::Looting,
            });
        };
        let agent = ctx.agent;
        let destination = target.position;
        let distance = agent.position.distance_to(&destination);

        if distance <= self.config.interact_distance {
            let item = pick_item(&target.items, agent.free_slots, ctx);
            let target_id = target.id.clone();
            info!(agent_id = %agent.id, target = %target_id, ?item, "Looting target");
            self.active = None;
            self.tracker.complete();
            self.stats.record_completion();
            self.start_cooldown(ctx);
            self.ending = true;
            return Ok(ActionToken::Loot {
                target: target_id,
                item,
            });
        }

        let path = ctx.navigation.path_to(&agent.position, &destination);
        let route = self.path_latch.observe(agent.id, "path_to", path);
        if matches!(route, Some(PathStatus::Unreachable)) {
            return Ok(self.abort(ctx, "unreachable"));
        }

        // A failed path query still counts as a tick without progress.
        if let ProgressVerdict::Abort(reason) = self.tracker.observe(distance, ctx.now) {
            debug!(agent_id = %agent.id, ?reason, "Loot approach aborted");
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use raidmind_types::{AgentClass, AgentId, AgentSnapshot, LootCategory, Position, SpeedTier, TargetId};

    use super::*;
    use crate::combat::CombatAwareness;
    use crate::error::QueryError;
    use crate::throttle::CooldownRange;
    use crate::world::{Navigation, NoQuests, WorldQuery};

    struct World {
        targets: Vec<Target>,
    }

    impl WorldQuery for World {
        fn scan_nearby(&self, _origin: &Position, _radius: f64, _filter: &ScanFilter) -> Result<Vec<Target>, QueryError> {
            Ok(self.targets.clone())
        }
    }

    struct Nav {
        path: Mutex<Result<PathStatus, QueryError>>,
    }

    impl Navigation for Nav {
        fn is_reachable(&self, _point: &Position) -> bool {
            true
        }

        fn path_to(&self, _from: &Position, _to: &Position) -> Result<PathStatus, QueryError> {
            self.path.lock().unwrap().clone()
        }

        fn move_towards(&self, _agent: AgentId, _point: &Position, _speed_factor: f64) -> Result<(), QueryError> {
            Ok(())
        }
    }

    fn target(handle: u64, value: f64, x: f64) -> Target {
        Target {
            id: TargetId::from_handle("container", handle),
            category: LootCategory::Container,
            value,
            position: Position::new(x, 0.0, 0.0),
            distance: x,
            items: vec![LootItem {
                name: String::from("bolts"),
                price: value,
                width: 1,
                height: 1,
            }],
        }
    }

    fn config() -> LootingConfig {
        LootingConfig {
            min_value: 100.0,
            cooldown: CooldownRange::new(10.0, 10.0),
            ..LootingConfig::default()
        }
    }

    struct Fixture {
        world: World,
        nav: Nav,
        combat: CombatAwareness,
        rng: StdRng,
        agent: AgentSnapshot,
    }

    impl Fixture {
        fn new(targets: Vec<Target>) -> Self {
            let mut agent = AgentSnapshot::new(AgentId::new(), AgentClass::Scav, Position::default());
            agent.free_slots = 4;
            Self {
                world: World { targets },
                nav: Nav {
                    path: Mutex::new(Ok(PathStatus::Complete)),
                },
                combat: CombatAwareness::Unavailable,
                rng: StdRng::seed_from_u64(1),
                agent,
            }
        }

        fn ctx(&mut self, now: f64) -> LayerContext<'_> {
            LayerContext {
                agent: &self.agent,
                now,
                world: &self.world,
                navigation: &self.nav,
                quests: &NoQuests,
                combat: &self.combat,
                calm_period_secs: 15.0,
                rng: &mut self.rng,
            }
        }
    }

    fn layer(memory: &Arc<RaidMemory>) -> LootingLayer {
        LootingLayer::new(config(), MovementTiers::default(), Arc::clone(memory)).unwrap()
    }

    #[test]
    fn claims_best_scoring_target() {
        let memory = Arc::new(RaidMemory::default());
        let mut fx = Fixture::new(vec![target(1, 1_000.0, 5.0), target(2, 50_000.0, 20.0)]);
        let mut looting = layer(&memory);
        assert!(looting.is_active(&mut fx.ctx(0.0)));
        let claimed = looting.active_target().unwrap().id.clone();
        assert_eq!(claimed, TargetId::from_handle("container", 2));
        assert!(memory.loot_claimed.contains(&claimed));
        assert_eq!(looting.stats().activations, 1);
    }

    #[test]
    fn moves_then_loots_then_holds() {
        let memory = Arc::new(RaidMemory::default());
        let mut fx = Fixture::new(vec![target(1, 5_000.0, 20.0)]);
        let mut looting = layer(&memory);
        assert!(looting.is_active(&mut fx.ctx(0.0)));

        let action = looting.next_action(&mut fx.ctx(0.0)).unwrap();
        assert!(matches!(action, ActionToken::MoveTo { speed: SpeedTier::Jog, .. }));
        assert!(!looting.is_current_action_ending());

        fx.agent.position = Position::new(19.0, 0.0, 0.0);
        let action = looting.next_action(&mut fx.ctx(1.0)).unwrap();
        assert!(matches!(action, ActionToken::Loot { item: Some(0), .. }));
        assert!(looting.is_current_action_ending());
        assert_eq!(looting.stats().completions, 1);

        assert!(looting.is_active(&mut fx.ctx(5.0)));
        assert_eq!(
            looting.next_action(&mut fx.ctx(5.0)).unwrap(),
            ActionToken::Hold {
                reason: HoldReason::Cooldown
            }
        );
    }

    #[test]
    fn unreachable_path_blacklists_target() {
        let memory = Arc::new(RaidMemory::default());
        let mut fx = Fixture::new(vec![target(7, 5_000.0, 20.0)]);
        *fx.nav.path.lock().unwrap() = Ok(PathStatus::Unreachable);
        let mut looting = layer(&memory);
        assert!(looting.is_active(&mut fx.ctx(0.0)));
        assert_eq!(looting.next_action(&mut fx.ctx(0.0)).unwrap(), ActionToken::Idle);

        let id = TargetId::from_handle("container", 7);
        assert!(memory.loot_blacklist.contains(&id));
        assert!(!memory.loot_claimed.contains(&id));
        assert_eq!(looting.stats().aborts, 1);
        assert!(looting.active_target().is_none());
    }

    #[test]
    fn stuck_approach_aborts_after_five_ticks() {
        let memory = Arc::new(RaidMemory::default());
        let mut fx = Fixture::new(vec![target(3, 5_000.0, 20.0)]);
        let mut looting = layer(&memory);
        assert!(looting.is_active(&mut fx.ctx(0.0)));
        for tick in 1..=4 {
            let action = looting.next_action(&mut fx.ctx(f64::from(tick))).unwrap();
            assert!(matches!(action, ActionToken::MoveTo { .. }));
        }
        assert_eq!(looting.next_action(&mut fx.ctx(5.0)).unwrap(), ActionToken::Idle);
        assert!(memory.loot_blacklist.contains(&TargetId::from_handle("container", 3)));
    }

    #[test]
    fn failing_path_queries_still_abort() {
        let memory = Arc::new(RaidMemory::default());
        let mut fx = Fixture::new(vec![target(9, 5_000.0, 20.0)]);
        *fx.nav.path.lock().unwrap() = Err(QueryError::Failed(String::from("navmesh")));
        let mut looting = layer(&memory);
        assert!(looting.is_active(&mut fx.ctx(0.0)));
        for tick in 1..=4 {
            assert_eq!(looting.next_action(&mut fx.ctx(f64::from(tick))).unwrap(), ActionToken::Idle);
            assert!(looting.active_target().is_some());
        }
        assert_eq!(looting.next_action(&mut fx.ctx(5.0)).unwrap(), ActionToken::Idle);

        let id = TargetId::from_handle("container", 9);
        assert!(looting.active_target().is_none());
        assert!(memory.loot_blacklist.contains(&id));
        assert!(!memory.loot_claimed.contains(&id));
        assert_eq!(looting.stats().aborts, 1);

        for tick in 6..=600 {
            let now = f64::from(tick);
            if looting.is_active(&mut fx.ctx(now)) {
                looting.next_action(&mut fx.ctx(now)).unwrap();
            }
        }
        assert!(looting.active_target().is_none());
        assert!(memory.loot_claimed.is_empty());
        assert_eq!(looting.stats().aborts, 1);
    }

    #[test]
    fn claimed_and_blacklisted_targets_are_skipped() {
        let memory = Arc::new(RaidMemory::default());
        memory.loot_claimed.add(TargetId::from_handle("container", 1));
        memory.loot_blacklist.add(TargetId::from_handle("container", 2));
        let mut fx = Fixture::new(vec![target(1, 9_000.0, 5.0), target(2, 9_000.0, 5.0)]);
        let mut looting = layer(&memory);
        assert!(!looting.is_active(&mut fx.ctx(0.0)));
    }

    #[test]
    fn oversized_items_are_skipped() {
        let memory = Arc::new(RaidMemory::default());
        let mut big = target(1, 90_000.0, 5.0);
        if let Some(item) = big.items.first_mut() {
            item.width = 5;
            item.height = 2;
        }
        let mut fx = Fixture::new(vec![big]);
        let mut looting = layer(&memory);
        assert!(!looting.is_active(&mut fx.ctx(0.0)));
    }

    #[test]
    fn danger_releases_claim() {
        let memory = Arc::new(RaidMemory::default());
        let mut fx = Fixture::new(vec![target(1, 5_000.0, 20.0)]);
        let mut looting = layer(&memory);
        assert!(looting.is_active(&mut fx.ctx(0.0)));
        fx.agent.under_fire = true;
        assert!(!looting.is_active(&mut fx.ctx(1.0)));
        assert!(looting.active_target().is_none());
        assert!(memory.loot_claimed.is_empty());
    }

    #[test]
    fn disabled_layer_never_activates() {
        let memory = Arc::new(RaidMemory::default());
        let mut fx = Fixture::new(vec![target(1, 5_000.0, 5.0)]);
        let cfg = LootingConfig {
            enabled: false,
            ..config()
        };
        let mut looting = LootingLayer::new(cfg, MovementTiers::default(), memory).unwrap();
        assert!(!looting.is_active(&mut fx.ctx(0.0)));
    }

    #[test]
    fn scan_interval_throttles_rescans() {
        let memory = Arc::new(RaidMemory::default());
        let mut fx = Fixture::new(Vec::new());
        let mut looting = layer(&memory);
        assert!(!looting.is_active(&mut fx.ctx(0.0)));
        fx.world.targets.push(target(1, 5_000.0, 5.0));
        assert!(!looting.is_active(&mut fx.ctx(5.0)));
        assert!(looting.is_active(&mut fx.ctx(10.5)));
    }

    #[test]
    fn stop_resets_instance_state() {
        let memory = Arc::new(RaidMemory::default());
        let mut fx = Fixture::new(vec![target(1, 5_000.0, 20.0)]);
        let mut looting = layer(&memory);
        assert!(looting.is_active(&mut fx.ctx(0.0)));
        looting.stop();
        assert!(looting.active_target().is_none());
        assert!(memory.loot_claimed.is_empty());
        assert!(matches!(
            looting.next_action(&mut fx.ctx(1.0)),
            Err(BrainError::NoActiveTarget { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = LootingConfig {
            cooldown: CooldownRange::new(1.0, 2.0),
            ..config()
        };
        assert!(LootingLayer::new(cfg, MovementTiers::default(), Arc::new(RaidMemory::default())).is_err());
    }
}
