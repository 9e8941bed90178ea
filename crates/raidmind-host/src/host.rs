//! The sandbox side of the frame loop.
//!
//! [`SandboxHost`] owns the ordinary agents and the support team members,
//! plays the player's scripted events (summon, rally, injury, betrayal),
//! and carries out the decisions of each frame: movement, looting, deaths,
//! despawns, and top-ups through the capacity gate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use raidmind_core::{Collaborators, FrameCallback, FrameHost, FrameInput, FrameSummary, HostChanges, RaidSession};
use raidmind_squad::{MemberStatus, SquadError, TeamSnapshot};
use raidmind_types::{ActionToken, AgentClass, AgentId, AgentSnapshot, LayerKind, Position, SupportTeamState};
use tracing::{debug, info, warn};

use crate::sandbox::{Sandbox, SandboxConfig};

/// Free inventory cells of a fresh agent.
const STARTING_FREE_SLOTS: u32 = 12;

/// Seconds of healing the player needs after the injury.
const HEAL_SECS: f64 = 6.0;

/// How far east of the player support members appear.
const TEAM_SPAWN_OFFSET: f64 = 30.0;

#[derive(Debug, Clone, Copy)]
struct TeamMember {
    agent_id: AgentId,
    position: Position,
    is_alive: bool,
}

/// Counters reported at shutdown.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct HostTotals {
    /// Items taken from targets.
    pub items_looted: u64,
    /// Objectives completed.
    pub objectives_completed: u64,
    /// Ordinary agents that died.
    pub deaths: u64,
    /// Ordinary agents spawned, seed agents included.
    pub spawned: u64,
    /// Spawn attempts refused by the capacity gate.
    pub spawns_refused: u64,
}

/// Scripted host driving one raid.
#[derive(Debug)]
pub struct SandboxHost {
    config: SandboxConfig,
    world: Sandbox,
    rng: StdRng,
    frame_secs: f64,
    agents: Vec<AgentSnapshot>,
    team: Vec<TeamMember>,
    player: Position,
    healed_secs: f64,
    totals: HostTotals,
}

impl SandboxHost {
    /// Generate the world from `seed`.
    pub fn new(config: SandboxConfig, session: &RaidSession) -> Self {
        let mut rng = StdRng::seed_from_u64(session.config().host.seed);
        let world = Sandbox::generate(&config, &mut rng);
        info!(
            targets = world.targets_left(),
            map_size = config.map_size,
            "Sandbox world generated"
        );
        Self {
            config,
            world,
            rng,
            frame_secs: session.config().host.frame_secs,
            agents: Vec::new(),
            team: Vec::new(),
            player: Position::default(),
            healed_secs: 0.0,
            totals: HostTotals::default(),
        }
    }

    /// Spawn agents through the capacity gate until the configured
    /// population is reached or the gate refuses. Returns the new ids.
    pub fn top_up(&mut self, session: &RaidSession) -> Vec<AgentId> {
        let wanted = usize::try_from(self.config.agents).unwrap_or(usize::MAX);
        let mut spawned = Vec::new();
        while self.agents.len() < wanted {
            if !session.gate().try_admit() {
                self.totals.spawns_refused = self.totals.spawns_refused.saturating_add(1);
                debug!(alive = self.agents.len(), "Capacity gate refused a spawn");
                break;
            }
            let class = if self.rng.random::<f64>() < self.config.pmc_share {
                AgentClass::Pmc
            } else {
                AgentClass::Scav
            };
            let mut snapshot = AgentSnapshot::new(AgentId::new(), class, self.world.random_position(&mut self.rng));
            snapshot.free_slots = STARTING_FREE_SLOTS;
            debug!(agent_id = %snapshot.id, ?class, "Agent spawned");
            spawned.push(snapshot.id);
            self.agents.push(snapshot);
            self.totals.spawned = self.totals.spawned.saturating_add(1);
        }
        spawned
    }

    /// Counters so far.
    pub const fn totals(&self) -> HostTotals {
        self.totals
    }

    fn play_events(&mut self, frame: u64, now: f64, session: &RaidSession) {
        if frame == self.config.summon_frame {
            self.summon(now, session);
        }
        if frame == self.config.rally_frame {
            let point = self.world.random_position(&mut self.rng);
            if !session.team().rally(point) {
                debug!("Rally ignored, no team in the field");
            }
        }
    }

    fn summon(&mut self, now: f64, session: &RaidSession) {
        let request = match session.team().summon(self.player, now) {
            Ok(request) => request,
            Err(error @ (SquadError::SummonOnCooldown { .. } | SquadError::TeamActive { .. })) => {
                info!(%error, "Summon refused");
                return;
            }
            Err(error) => {
                warn!(%error, "Summon rejected");
                return;
            }
        };
        session.gate().set_team_spawning(true);
        for slot in &request.members {
            let member = TeamMember {
                agent_id: AgentId::new(),
                position: Position::new(
                    request.position.x + TEAM_SPAWN_OFFSET,
                    request.position.y,
                    request.position.z,
                ),
                is_alive: true,
            };
            match session.team().on_spawned(slot.slot, member.agent_id) {
                Ok(_) => self.team.push(member),
                Err(error) => warn!(slot = slot.slot, %error, "Support member spawn rejected"),
            }
        }
        info!(team_id = %request.team_id, members = self.team.len(), "Support team spawned");
    }

    fn roll_hazards(&mut self) {
        for agent in self.agents.iter_mut().filter(|a| a.is_alive) {
            agent.under_fire = self.rng.random::<f64>() < self.config.fire_chance;
            if self.rng.random::<f64>() < self.config.death_chance {
                agent.is_alive = false;
                info!(agent_id = %agent.id, "Agent killed");
            }
        }
        for member in self.team.iter_mut().filter(|m| m.is_alive) {
            if self.rng.random::<f64>() < self.config.death_chance {
                member.is_alive = false;
            }
        }
    }

    fn team_snapshot(&self, frame: u64) -> TeamSnapshot {
        let injured = frame >= self.config.injury_frame && self.healed_secs < HEAL_SECS;
        TeamSnapshot {
            player_position: self.player,
            player_needs_healing: injured,
            hostile: self.config.hostile_frame.is_some_and(|at| frame >= at),
            members: self
                .team
                .iter()
                .map(|m| MemberStatus {
                    agent_id: m.agent_id,
                    position: m.position,
                    is_alive: m.is_alive,
                })
                .collect(),
        }
    }

    fn apply_moves(&mut self) {
        let moves = self.world.drain_moves();
        let top_step = self.config.agent_speed * self.frame_secs;
        for agent in &mut self.agents {
            if let Some((destination, factor)) = moves.get(&agent.id) {
                agent.position = agent.position.step_towards(destination, top_step * factor);
            }
        }
    }

    fn apply_results(&mut self, summary: &FrameSummary) {
        for result in &summary.results {
            match &result.action {
                ActionToken::Loot { target, item } => {
                    let area = self.world.take(target, *item);
                    if let Some(agent) = self.agents.iter_mut().find(|a| a.id == result.agent_id) {
                        agent.free_slots = agent.free_slots.saturating_sub(area);
                    }
                    self.totals.items_looted = self.totals.items_looted.saturating_add(1);
                }
                ActionToken::CompleteObjective { objective } => {
                    debug!(agent_id = %result.agent_id, %objective, "Objective completed");
                    self.totals.objectives_completed = self.totals.objectives_completed.saturating_add(1);
                }
                ActionToken::Idle | ActionToken::Hold { .. } | ActionToken::MoveTo { .. } => {}
            }
        }
    }

    fn apply_team(&mut self, summary: &FrameSummary) {
        if summary.team.state == SupportTeamState::Healing {
            self.healed_secs += self.frame_secs;
        }
        if let Some(destination) = summary.team.destination {
            let step = self.config.agent_speed * self.frame_secs;
            for member in self.team.iter_mut().filter(|m| m.is_alive) {
                member.position = member.position.step_towards(&destination, step);
            }
        }
        if !summary.team.despawn.is_empty() {
            self.team.retain(|m| !summary.team.despawn.contains(&m.agent_id));
            info!(despawned = summary.team.despawn.len(), "Support team despawned");
        }
        if summary.team.state == SupportTeamState::Idle {
            self.team.clear();
        }
    }

    fn bury_dead(&mut self, session: &RaidSession) -> Vec<AgentId> {
        let dead: Vec<AgentId> = self.agents.iter().filter(|a| !a.is_alive).map(|a| a.id).collect();
        if !dead.is_empty() {
            self.agents.retain(|a| a.is_alive);
            for _ in &dead {
                session.gate().release();
            }
            self.totals.deaths = self.totals.deaths.saturating_add(u64::try_from(dead.len()).unwrap_or(u64::MAX));
        }
        dead
    }
}

impl FrameHost for SandboxHost {
    fn begin_frame(&mut self, frame: u64, now: f64, session: &RaidSession) -> FrameInput {
        self.play_events(frame, now, session);
        self.roll_hazards();
        FrameInput {
            frame,
            now,
            agents: self.agents.clone(),
            team: self.team_snapshot(frame),
        }
    }

    fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            world: &self.world,
            navigation: &self.world,
            quests: &self.world,
        }
    }

    fn apply(&mut self, summary: &FrameSummary, session: &RaidSession) -> HostChanges {
        self.apply_moves();
        self.apply_results(summary);
        self.apply_team(summary);
        let removed = self.bury_dead(session);
        let spawned = if summary.frame.checked_rem(self.config.respawn_every) == Some(0) {
            self.top_up(session)
        } else {
            Vec::new()
        };
        HostChanges { spawned, removed }
    }
}

/// Logs a progress line every `every` frames.
#[derive(Debug)]
pub struct ProgressLog {
    every: u64,
}

impl ProgressLog {
    /// Log every `every` frames (0 disables).
    pub const fn new(every: u64) -> Self {
        Self { every }
    }
}

impl FrameCallback for ProgressLog {
    fn on_frame(&mut self, summary: &FrameSummary, session: &RaidSession) {
        if summary.frame.checked_rem(self.every) != Some(0) {
            return;
        }
        let layer_count = |kind: LayerKind| summary.results.iter().filter(|r| r.layer == Some(kind)).count();
        info!(
            frame = summary.frame,
            now = summary.now,
            agents = summary.results.len(),
            looting = layer_count(LayerKind::Looting),
            questing = layer_count(LayerKind::Questing),
            team_state = ?summary.team.state,
            effective_max = summary.budget.effective_max,
            ordinary = session.gate().ordinary(),
            blacklisted = session.memory().loot_blacklist.len(),
            "Raid progress"
        );
    }
}
