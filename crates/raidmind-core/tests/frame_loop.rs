//! Integration tests for brains, frames, and the session runner against a
//! scripted world.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use raidmind_brain::world::NoQuests;
use raidmind_brain::{CombatOracle, Navigation, QueryError, ScanFilter, WorldQuery};
use raidmind_core::{
    BotBrain, Collaborators, FrameCallback, FrameHost, FrameInput, FrameSummary, HostChanges, NoOpCallback,
    RaidMindConfig, RaidSession, SessionControl, SessionEndReason, run_frame, run_session,
};
use raidmind_squad::TeamSnapshot;
use raidmind_types::{
    ActionToken, AgentClass, AgentId, AgentSnapshot, LayerKind, LootCategory, LootItem, PathStatus, Position,
    SpeedTier, Target, TargetId,
};

/// Containers at fixed positions.
struct Field {
    targets: Vec<Target>,
}

impl WorldQuery for Field {
    fn scan_nearby(&self, origin: &Position, radius: f64, filter: &ScanFilter) -> Result<Vec<Target>, QueryError> {
        Ok(self
            .targets
            .iter()
            .filter(|t| filter.accepts(t))
            .map(|t| Target {
                distance: origin.distance_to(&t.position),
                ..t.clone()
            })
            .filter(|t| t.distance <= radius)
            .collect())
    }
}

/// A world whose scans blow up.
struct Haunted;

impl WorldQuery for Haunted {
    fn scan_nearby(&self, _origin: &Position, _radius: f64, _filter: &ScanFilter) -> Result<Vec<Target>, QueryError> {
        panic!("scan exploded");
    }
}

struct OpenField;

impl Navigation for OpenField {
    fn is_reachable(&self, _point: &Position) -> bool {
        true
    }

    fn path_to(&self, _from: &Position, _to: &Position) -> Result<PathStatus, QueryError> {
        Ok(PathStatus::Complete)
    }

    fn move_towards(&self, _agent: AgentId, _point: &Position, _speed_factor: f64) -> Result<(), QueryError> {
        Ok(())
    }
}

/// An oracle that reports every agent as fighting.
struct Firefight;

impl CombatOracle for Firefight {
    fn is_in_combat(&self, _agent: AgentId) -> bool {
        true
    }

    fn time_since_threat(&self, _agent: AgentId) -> f64 {
        0.0
    }
}

fn container(handle: u64, position: Position) -> Target {
    Target {
        id: TargetId::from_handle("container", handle),
        category: LootCategory::Container,
        value: 20_000.0,
        position,
        distance: 0.0,
        items: vec![LootItem {
            name: format!("ammo-{handle}"),
            price: 20_000.0,
            width: 1,
            height: 1,
        }],
    }
}

fn scav_at(position: Position) -> AgentSnapshot {
    let mut snapshot = AgentSnapshot::new(AgentId::new(), AgentClass::Scav, position);
    snapshot.free_slots = 4;
    snapshot
}

fn collaborators<'a>(world: &'a dyn WorldQuery, nav: &'a OpenField) -> Collaborators<'a> {
    Collaborators {
        world,
        navigation: nav,
        quests: &NoQuests,
    }
}

#[test]
fn approach_speed_follows_distance_tiers() {
    for (distance, expected) in [
        (40.0, SpeedTier::Sprint),
        (30.0, SpeedTier::Jog),
        (20.0, SpeedTier::Jog),
        (4.0, SpeedTier::Walk),
    ] {
        let session = RaidSession::new(RaidMindConfig::default(), None).unwrap();
        let field = Field {
            targets: vec![container(1, Position::new(distance, 0.0, 0.0))],
        };
        let agent = scav_at(Position::default());
        let mut brain = session.new_brain(agent.id).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let result = brain.tick(&session, collaborators(&field, &OpenField), &agent, 0.0, &mut rng);

        assert_eq!(result.layer, Some(LayerKind::Looting), "distance {distance}");
        match result.action {
            ActionToken::MoveTo { speed, .. } => assert_eq!(speed, expected, "distance {distance}"),
            other => panic!("expected a move at distance {distance}, got {other:?}"),
        }
    }
}

#[test]
fn loot_completes_then_holds_for_cooldown() {
    let session = RaidSession::new(RaidMindConfig::default(), None).unwrap();
    let field = Field {
        targets: vec![container(1, Position::new(1.0, 0.0, 0.0))],
    };
    let agent = scav_at(Position::default());
    let mut brain = session.new_brain(agent.id).unwrap();
    let mut rng = StdRng::seed_from_u64(5);

    let looted = brain.tick(&session, collaborators(&field, &OpenField), &agent, 0.0, &mut rng);
    assert!(matches!(looted.action, ActionToken::Loot { item: Some(0), .. }));
    assert!(looted.ending);

    let held = brain.tick(&session, collaborators(&field, &OpenField), &agent, 0.5, &mut rng);
    assert!(matches!(held.action, ActionToken::Hold { .. }));
    assert_eq!(held.layer, Some(LayerKind::Looting));
}

#[test]
fn danger_from_the_oracle_idles_the_agent() {
    let oracle: Arc<dyn CombatOracle> = Arc::new(Firefight);
    let session = RaidSession::new(RaidMindConfig::default(), Some(oracle)).unwrap();
    let field = Field {
        targets: vec![container(1, Position::new(10.0, 0.0, 0.0))],
    };
    let agent = scav_at(Position::default());
    let mut brain = session.new_brain(agent.id).unwrap();
    let mut rng = StdRng::seed_from_u64(5);

    let result = brain.tick(&session, collaborators(&field, &OpenField), &agent, 0.0, &mut rng);
    assert_eq!(result.layer, None);
    assert_eq!(result.action, ActionToken::Idle);
    assert!(session.memory().loot_claimed.is_empty());
}

#[test]
fn panicking_collaborator_yields_idle() {
    let session = RaidSession::new(RaidMindConfig::default(), None).unwrap();
    let agent = scav_at(Position::default());
    let mut brain = session.new_brain(agent.id).unwrap();
    let mut rng = StdRng::seed_from_u64(5);

    let result = brain.tick(&session, collaborators(&Haunted, &OpenField), &agent, 0.0, &mut rng);
    assert_eq!(result.action, ActionToken::Idle);
    assert_eq!(result.layer, None);
    assert_eq!(brain.panics(), 1);
    assert_eq!(brain.active_layer(), None);
}

#[test]
fn snapshot_for_another_agent_is_ignored() {
    let session = RaidSession::new(RaidMindConfig::default(), None).unwrap();
    let field = Field {
        targets: vec![container(1, Position::new(10.0, 0.0, 0.0))],
    };
    let mut brain = session.new_brain(AgentId::new()).unwrap();
    let stranger = scav_at(Position::default());
    let mut rng = StdRng::seed_from_u64(5);

    let result = brain.tick(&session, collaborators(&field, &OpenField), &stranger, 0.0, &mut rng);
    assert_eq!(result.agent_id, brain.agent_id());
    assert_eq!(result.action, ActionToken::Idle);
}

#[test]
fn multi_worker_frame_keeps_brain_order_and_unique_claims() {
    let mut config = RaidMindConfig::default();
    config.host.worker_threads = 4;
    let session = RaidSession::new(config, None).unwrap();

    // Each agent stands 200 apart with its own container 20 away.
    let agents: Vec<AgentSnapshot> = (0..10_u32)
        .map(|i| scav_at(Position::new(f64::from(i) * 200.0, 0.0, 0.0)))
        .collect();
    let field = Field {
        targets: (0..10_u32)
            .map(|i| container(u64::from(i), Position::new(f64::from(i) * 200.0 + 20.0, 0.0, 0.0)))
            .collect(),
    };
    let mut brains: Vec<BotBrain> = agents.iter().map(|a| session.new_brain(a.id).unwrap()).collect();
    let input = FrameInput {
        frame: 1,
        now: 0.5,
        agents,
        team: TeamSnapshot::default(),
    };

    let summary = run_frame(&session, &mut brains, &input, collaborators(&field, &OpenField), 42);

    assert_eq!(summary.results.len(), 10);
    for (brain, result) in brains.iter().zip(&summary.results) {
        assert_eq!(brain.agent_id(), result.agent_id);
        assert!(matches!(result.action, ActionToken::MoveTo { speed: SpeedTier::Jog, .. }));
    }
    assert_eq!(session.memory().loot_claimed.len(), 10);
    assert_eq!(summary.budget.effective_max, 27);
}

#[test]
fn brains_without_snapshots_are_skipped() {
    let session = RaidSession::new(RaidMindConfig::default(), None).unwrap();
    let field = Field { targets: Vec::new() };
    let present = scav_at(Position::default());
    let mut brains = vec![
        session.new_brain(present.id).unwrap(),
        session.new_brain(AgentId::new()).unwrap(),
    ];
    let input = FrameInput {
        frame: 1,
        now: 0.5,
        agents: vec![present.clone()],
        team: TeamSnapshot::default(),
    };

    let summary = run_frame(&session, &mut brains, &input, collaborators(&field, &OpenField), 1);
    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.results.first().unwrap().agent_id, present.id);
}

/// A host that replays fixed snapshots and spawns one agent on a given frame.
struct ScriptedHost {
    field: Field,
    nav: OpenField,
    quests: NoQuests,
    agents: Vec<AgentSnapshot>,
    spawn_on_frame: u64,
}

impl FrameHost for ScriptedHost {
    fn begin_frame(&mut self, frame: u64, now: f64, _session: &RaidSession) -> FrameInput {
        FrameInput {
            frame,
            now,
            agents: self.agents.clone(),
            team: TeamSnapshot::default(),
        }
    }

    fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            world: &self.field,
            navigation: &self.nav,
            quests: &self.quests,
        }
    }

    fn apply(&mut self, summary: &FrameSummary, _session: &RaidSession) -> HostChanges {
        if summary.frame != self.spawn_on_frame {
            return HostChanges::default();
        }
        let newcomer = scav_at(Position::new(500.0, 0.0, 0.0));
        let id = newcomer.id;
        self.agents.push(newcomer);
        HostChanges {
            spawned: vec![id],
            removed: Vec::new(),
        }
    }
}

struct FrameCounter {
    frames: Vec<u64>,
}

impl FrameCallback for FrameCounter {
    fn on_frame(&mut self, summary: &FrameSummary, _session: &RaidSession) {
        self.frames.push(summary.frame);
    }
}

fn runner_config() -> RaidMindConfig {
    let mut config = RaidMindConfig::default();
    config.host.max_frames = 3;
    config.host.frame_interval_ms = 0;
    config
}

#[tokio::test]
async fn runner_stops_at_frame_limit_and_builds_spawned_brains() {
    let session = RaidSession::new(runner_config(), None).unwrap();
    let agent = scav_at(Position::default());
    let mut brains = vec![session.new_brain(agent.id).unwrap()];
    let mut host = ScriptedHost {
        field: Field {
            targets: vec![container(1, Position::new(15.0, 0.0, 0.0))],
        },
        nav: OpenField,
        quests: NoQuests,
        agents: vec![agent],
        spawn_on_frame: 1,
    };
    let control = SessionControl::new(&session.config().host);
    let mut callback = FrameCounter { frames: Vec::new() };

    let result = run_session(&session, &mut host, &mut brains, &control, &mut callback)
        .await
        .unwrap();

    assert_eq!(result.end_reason, SessionEndReason::MaxFramesReached);
    assert_eq!(result.total_frames, 3);
    assert_eq!(callback.frames, [1, 2, 3]);
    assert_eq!(brains.len(), 2);
    assert_eq!(result.final_summary.as_ref().map(|s| s.results.len()), Some(2));
    assert_eq!(result.raid.agents, 2);
    assert_eq!(result.raid.looting.activations, 1);
    assert!(session.memory().loot_claimed.is_empty());
}

#[tokio::test]
async fn runner_honors_stop_before_the_first_frame() {
    let session = RaidSession::new(runner_config(), None).unwrap();
    let mut brains = Vec::new();
    let mut host = ScriptedHost {
        field: Field { targets: Vec::new() },
        nav: OpenField,
        quests: NoQuests,
        agents: Vec::new(),
        spawn_on_frame: 0,
    };
    let control = SessionControl::new(&session.config().host);
    control.request_stop();

    let result = run_session(&session, &mut host, &mut brains, &control, &mut NoOpCallback)
        .await
        .unwrap();

    assert_eq!(result.end_reason, SessionEndReason::StopRequested);
    assert_eq!(result.total_frames, 0);
    assert!(result.final_summary.is_none());
}

#[tokio::test]
async fn stop_while_paused_ends_the_session() {
    let session = RaidSession::new(runner_config(), None).unwrap();
    let mut brains = Vec::new();
    let mut host = ScriptedHost {
        field: Field { targets: Vec::new() },
        nav: OpenField,
        quests: NoQuests,
        agents: Vec::new(),
        spawn_on_frame: 0,
    };
    let control = SessionControl::new(&session.config().host);
    control.pause();

    let mut callback = NoOpCallback;
    let run = run_session(&session, &mut host, &mut brains, &control, &mut callback);
    let stopper = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        control.request_stop();
    };
    let (result, ()) = tokio::time::timeout(Duration::from_secs(5), async { tokio::join!(run, stopper) })
        .await
        .expect("paused session ignored the stop request");

    let result = result.unwrap();
    assert_eq!(result.end_reason, SessionEndReason::StopRequested);
    assert_eq!(result.total_frames, 0);
    assert!(control.is_paused());
}
