//! The support team state machine.
//!
//! A summon moves the team from `Idle` to `Spawning` and asks the host to
//! spawn one agent per roster slot. From there [`SupportTeam::update`],
//! called once per frame, advances the cycle:
//!
//! | State | Leaves when | To |
//! |-------|-------------|----|
//! | `Spawning` | every slot spawned (via [`SupportTeam::on_spawned`]) | `MovingToPlayer` |
//! | `MovingToPlayer` | every living member within the arrival radius | `Defending` |
//! | `Defending` | the player needs healing, or the defend time is up | `Healing` |
//! | `Healing` | the player is healed, or the heal time is up | `Retreating` |
//! | `Retreating` | the retreat time is up | `Despawning` |
//! | `Despawning` | next update, after emitting the despawn list | `Idle` |
//!
//! Abort paths force `Retreating`: the medic dying (a guard is promoted),
//! the team turning hostile, or the approach stalling. A spawn that never
//! completes goes straight to `Despawning`; a team that is wiped out is
//! torn down within the same update.
//! Summons are refused until the cooldown since the last return to `Idle`
//! has elapsed.
//!
//! The state lives in a [`TeamStateCell`]; the roster and phase bookkeeping
//! sit behind one mutex.

use std::sync::{Mutex, MutexGuard, PoisonError};

use raidmind_brain::progress::{ProgressTracker, ProgressVerdict, TrackedAction};
use raidmind_types::{AgentId, Position, RaidType, SupportTeamState, TeamId, TeamRole};
use tracing::{info, warn};

use crate::config::SupportTeamConfig;
use crate::error::SquadError;
use crate::roster::Roster;
use crate::state::TeamStateCell;

/// One member the host should spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnSlot {
    /// Roster slot to report back in [`SupportTeam::on_spawned`].
    pub slot: usize,
    /// The member's role.
    pub role: TeamRole,
}

/// Request for the host to spawn a support team.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    /// The new team.
    pub team_id: TeamId,
    /// Where to spawn the members.
    pub position: Position,
    /// One entry per member.
    pub members: Vec<SpawnSlot>,
}

/// Host-reported status of one member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberStatus {
    /// The member.
    pub agent_id: AgentId,
    /// Where the member is.
    pub position: Position,
    /// Whether the member is alive.
    pub is_alive: bool,
}

/// Everything the team needs to know about the frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamSnapshot {
    /// Where the player is.
    pub player_position: Position,
    /// Whether the player is hurt.
    pub player_needs_healing: bool,
    /// Whether the team has turned hostile to the player.
    pub hostile: bool,
    /// Status of each spawned member.
    pub members: Vec<MemberStatus>,
}

/// What the host should do with the team after an update.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamUpdate {
    /// State after the update.
    pub state: SupportTeamState,
    /// Where living members should head, if anywhere.
    pub destination: Option<Position>,
    /// Members the host should despawn now.
    pub despawn: Vec<AgentId>,
}

impl TeamUpdate {
    const fn idle() -> Self {
        Self {
            state: SupportTeamState::Idle,
            destination: None,
            despawn: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct TeamInner {
    team_id: Option<TeamId>,
    roster: Roster,
    /// The state `phase_started` refers to.
    phase: SupportTeamState,
    phase_started: f64,
    last_teardown: Option<f64>,
    rally_point: Option<Position>,
    origin: Position,
    approach: ProgressTracker,
}

impl TeamInner {
    fn cooldown_remaining(&self, now: f64, cooldown: f64) -> Option<f64> {
        let elapsed = now - self.last_teardown?;
        (elapsed <= cooldown).then_some(cooldown - elapsed)
    }
}

/// A player-summoned support team, shared by reference across workers.
#[derive(Debug)]
pub struct SupportTeam {
    config: SupportTeamConfig,
    raid_type: RaidType,
    state: TeamStateCell,
    inner: Mutex<TeamInner>,
}

impl SupportTeam {
    /// Create an idle team for a raid of `raid_type`.
    pub fn new(config: SupportTeamConfig, raid_type: RaidType) -> Result<Self, SquadError> {
        config.validate()?;
        Ok(Self {
            config,
            raid_type,
            state: TeamStateCell::new(),
            inner: Mutex::new(TeamInner::default()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, TeamInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SupportTeamState {
        self.state.load()
    }

    /// Attempt a forward transition; see [`TeamStateCell::try_transition`].
    pub fn try_transition(&self, expected: SupportTeamState, next: SupportTeamState) -> bool {
        self.state.try_transition(expected, next)
    }

    /// Whether a spawn is in progress.
    pub fn is_spawning(&self) -> bool {
        self.state() == SupportTeamState::Spawning
    }

    /// The team configuration.
    pub const fn config(&self) -> &SupportTeamConfig {
        &self.config
    }

    /// The active team, if any.
    pub fn team_id(&self) -> Option<TeamId> {
        self.lock().team_id
    }

    /// A copy of the roster.
    pub fn roster(&self) -> Roster {
        self.lock().roster.clone()
    }

    /// The rally point, if the player set one for this team.
    pub fn rally_point(&self) -> Option<Position> {
        self.lock().rally_point
    }

    /// Seconds until a summon is allowed, or `None` when allowed now.
    pub fn summon_cooldown_remaining(&self, now: f64) -> Option<f64> {
        self.lock().cooldown_remaining(now, self.config.summon_cooldown_secs)
    }

    /// Handle the player's summon event.
    pub fn summon(&self, player_position: Position, now: f64) -> Result<SpawnRequest, SquadError> {
        if !self.config.enabled {
            return Err(SquadError::Disabled);
        }
        if !self.config.allows(self.raid_type) {
            return Err(SquadError::RaidTypeNotAllowed {
                raid_type: self.raid_type,
            });
        }

        let mut inner = self.lock();
        if let Some(remaining_secs) = inner.cooldown_remaining(now, self.config.summon_cooldown_secs) {
            return Err(SquadError::SummonOnCooldown { remaining_secs });
        }
        if !self.state.try_transition(SupportTeamState::Idle, SupportTeamState::Spawning) {
            return Err(SquadError::TeamActive { state: self.state.load() });
        }

        let team_id = TeamId::new();
        inner.team_id = Some(team_id);
        inner.roster = Roster::with_size(self.config.team_size);
        inner.phase = SupportTeamState::Spawning;
        inner.phase_started = now;
        inner.rally_point = None;
        inner.origin = player_position;
        inner.approach.reset();

        let members = inner
            .roster
            .slots()
            .iter()
            .enumerate()
            .map(|(slot, entry)| SpawnSlot { slot, role: entry.role })
            .collect();
        info!(team_id = %team_id, size = self.config.team_size, "Support team summoned");
        Ok(SpawnRequest {
            team_id,
            position: player_position,
            members,
        })
    }

    /// Record that the host spawned `agent` into `slot`.
    ///
    /// Returns `true` when this completed the team and it started moving.
    pub fn on_spawned(&self, slot: usize, agent: AgentId) -> Result<bool, SquadError> {
        let mut inner = self.lock();
        let state = self.state.load();
        if state != SupportTeamState::Spawning {
            return Err(SquadError::NotSpawning { state });
        }
        inner.roster.assign(slot, agent)?;
        if inner.roster.is_fully_spawned() {
            return Ok(self
                .state
                .try_transition(SupportTeamState::Spawning, SupportTeamState::MovingToPlayer));
        }
        Ok(false)
    }

    /// Handle the player's rally event. Returns whether the team took it.
    pub fn rally(&self, point: Position) -> bool {
        let mut inner = self.lock();
        let accepted = matches!(
            self.state.load(),
            SupportTeamState::Spawning
                | SupportTeamState::MovingToPlayer
                | SupportTeamState::Defending
                | SupportTeamState::Healing
        );
        if accepted {
            inner.rally_point = Some(point);
            info!(x = point.x, z = point.z, "Support team rally point set");
        }
        accepted
    }

    /// Force `Retreating` from any state that has not started leaving.
    fn abort(&self, reason: &'static str) {
        let current = self.state.load();
        if matches!(
            current,
            SupportTeamState::Spawning
                | SupportTeamState::MovingToPlayer
                | SupportTeamState::Defending
                | SupportTeamState::Healing
        ) {
            warn!(from = ?current, reason, "Support team aborting");
            self.state.force(SupportTeamState::Retreating);
        }
    }

    /// Advance the team by one frame.
    pub fn update(&self, now: f64, snapshot: &TeamSnapshot) -> TeamUpdate {
        let mut inner = self.lock();
        if self.state.load() == SupportTeamState::Idle {
            return TeamUpdate::idle();
        }

        for member in snapshot.members.iter().filter(|m| !m.is_alive) {
            let Some(role) = inner.roster.mark_dead(member.agent_id) else {
                continue;
            };
            info!(agent_id = %member.agent_id, ?role, "Support team member died");
            if role == TeamRole::Medic {
                let promoted = inner.roster.promote_medic();
                info!(promoted = ?promoted, "Medic down, promoting a guard");
                self.abort("medic_down");
            }
        }
        if inner.roster.is_wiped() && self.state.load() != SupportTeamState::Despawning {
            warn!("Support team wiped out");
            self.state.force(SupportTeamState::Despawning);
        }
        if snapshot.hostile {
            self.abort("hostile");
        }

        let state = self.state.load();
        if inner.phase != state {
            inner.phase = state;
            inner.phase_started = now;
            if state == SupportTeamState::MovingToPlayer {
                let gather = inner.rally_point.unwrap_or(snapshot.player_position);
                let distance = farthest_member(&inner.roster, snapshot, &gather).unwrap_or(0.0);
                inner.approach.start(TrackedAction::TeamApproach, distance, now);
            }
        }
        let elapsed = now - inner.phase_started;
        let gather = inner.rally_point.unwrap_or(snapshot.player_position);

        let mut despawn = Vec::new();
        let destination = match state {
            SupportTeamState::Idle => None,
            SupportTeamState::Spawning => {
                if elapsed > self.config.spawn_timeout_secs {
                    warn!(elapsed, "Support team spawn timed out");
                    self.state.force(SupportTeamState::Despawning);
                }
                None
            }
            SupportTeamState::MovingToPlayer => {
                if let Some(distance) = farthest_member(&inner.roster, snapshot, &gather) {
                    if distance <= self.config.arrival_radius {
                        inner.approach.complete();
                        self.state
                            .try_transition(SupportTeamState::MovingToPlayer, SupportTeamState::Defending);
                    } else if let ProgressVerdict::Abort(reason) = inner.approach.observe(distance, now) {
                        warn!(?reason, "Support team approach failed");
                        self.abort("approach_failed");
                    }
                }
                Some(gather)
            }
            SupportTeamState::Defending => {
                if snapshot.player_needs_healing || elapsed > self.config.defend_duration_secs {
                    self.state
                        .try_transition(SupportTeamState::Defending, SupportTeamState::Healing);
                }
                Some(gather)
            }
            SupportTeamState::Healing => {
                if !snapshot.player_needs_healing || elapsed > self.config.heal_duration_secs {
                    self.state
                        .try_transition(SupportTeamState::Healing, SupportTeamState::Retreating);
                }
                Some(snapshot.player_position)
            }
            SupportTeamState::Retreating => {
                if elapsed > self.config.retreat_duration_secs {
                    self.state
                        .try_transition(SupportTeamState::Retreating, SupportTeamState::Despawning);
                }
                Some(inner.origin)
            }
            SupportTeamState::Despawning => {
                despawn = inner.roster.living_ids();
                inner.roster = Roster::default();
                inner.team_id = None;
                inner.rally_point = None;
                inner.approach.reset();
                inner.last_teardown = Some(now);
                if self
                    .state
                    .try_transition(SupportTeamState::Despawning, SupportTeamState::Idle)
                {
                    inner.phase = SupportTeamState::Idle;
                    info!(despawned = despawn.len(), "Support team torn down");
                }
                None
            }
        };

        TeamUpdate {
            state: self.state.load(),
            destination,
            despawn,
        }
    }
}

/// Distance from `gather` to the farthest living member the host reported.
fn farthest_member(roster: &Roster, snapshot: &TeamSnapshot, gather: &Position) -> Option<f64> {
    snapshot
        .members
        .iter()
        .filter(|m| m.is_alive && roster.contains_living(m.agent_id))
        .map(|m| m.position.distance_to(gather))
        .reduce(f64::max)
}
