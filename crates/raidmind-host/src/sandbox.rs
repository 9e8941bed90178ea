//! Scripted raid world for the headless host.
//!
//! The [`Sandbox`] scatters containers, loose items and corpses over a
//! square map and answers the collaborator queries the behavior layers
//! make. A share of the containers sits behind walls: they are visible to
//! scans but `path_to` reports them unreachable. Scans fail now and then
//! to exercise the failure latches.
//!
//! Movement requests are only recorded here; the host applies them at the
//! end of the frame.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use raidmind_brain::{Navigation, QueryError, QuestSource, ScanFilter, WorldQuery};
use raidmind_types::{
    AgentId, AgentSnapshot, LootCategory, LootItem, Objective, ObjectiveType, PathStatus, Position, Target,
    TargetId,
};
use serde::Deserialize;

/// Objective kinds handed out before the extract.
const OBJECTIVE_KINDS: [ObjectiveType; 6] = [
    ObjectiveType::GoToLocation,
    ObjectiveType::FindItem,
    ObjectiveType::PlaceItem,
    ObjectiveType::Explore,
    ObjectiveType::Investigate,
    ObjectiveType::Patrol,
];

/// Item templates: name, price, width, height.
const ITEMS: [(&str, f64, u32, u32); 6] = [
    ("bolts", 6_000.0, 1, 1),
    ("gpu", 180_000.0, 1, 2),
    ("ammo_case", 40_000.0, 2, 2),
    ("rifle", 60_000.0, 5, 2),
    ("salewa", 9_000.0, 1, 1),
    ("ledx", 250_000.0, 1, 1),
];

/// Settings for the scripted world, read from the `sandbox` section of the
/// config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SandboxConfig {
    /// Ordinary agents the host tries to keep alive.
    #[serde(default = "default_agents")]
    pub agents: u32,

    /// Fraction of agents spawned as PMC bots; the rest are Scavs.
    #[serde(default = "default_pmc_share")]
    pub pmc_share: f64,

    /// Loot targets scattered at raid start.
    #[serde(default = "default_targets")]
    pub targets: u32,

    /// Quest objectives (plus one extract).
    #[serde(default = "default_objectives")]
    pub objectives: u32,

    /// Side length of the square map.
    #[serde(default = "default_map_size")]
    pub map_size: f64,

    /// Fraction of containers behind walls.
    #[serde(default = "default_blocked_share")]
    pub blocked_share: f64,

    /// Chance that a scan fails.
    #[serde(default = "default_flaky_scan_chance")]
    pub flaky_scan_chance: f64,

    /// Top speed of every agent, in units per second.
    #[serde(default = "default_agent_speed")]
    pub agent_speed: f64,

    /// Chance per frame that an agent dies.
    #[serde(default = "default_death_chance")]
    pub death_chance: f64,

    /// Chance per frame that an agent comes under fire.
    #[serde(default = "default_fire_chance")]
    pub fire_chance: f64,

    /// Frames between attempts to replace dead agents.
    #[serde(default = "default_respawn_every")]
    pub respawn_every: u64,

    /// Frame at which the player summons the support team.
    #[serde(default = "default_summon_frame")]
    pub summon_frame: u64,

    /// Frame at which the player sets a rally point.
    #[serde(default = "default_rally_frame")]
    pub rally_frame: u64,

    /// Frame at which the player gets hurt.
    #[serde(default = "default_injury_frame")]
    pub injury_frame: u64,

    /// Frame at which the team turns hostile, if ever.
    #[serde(default)]
    pub hostile_frame: Option<u64>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            agents: default_agents(),
            pmc_share: default_pmc_share(),
            targets: default_targets(),
            objectives: default_objectives(),
            map_size: default_map_size(),
            blocked_share: default_blocked_share(),
            flaky_scan_chance: default_flaky_scan_chance(),
            agent_speed: default_agent_speed(),
            death_chance: default_death_chance(),
            fire_chance: default_fire_chance(),
            respawn_every: default_respawn_every(),
            summon_frame: default_summon_frame(),
            rally_frame: default_rally_frame(),
            injury_frame: default_injury_frame(),
            hostile_frame: None,
        }
    }
}

const fn default_agents() -> u32 {
    12
}

const fn default_pmc_share() -> f64 {
    0.4
}

const fn default_targets() -> u32 {
    60
}

const fn default_objectives() -> u32 {
    6
}

const fn default_map_size() -> f64 {
    400.0
}

const fn default_blocked_share() -> f64 {
    0.1
}

const fn default_flaky_scan_chance() -> f64 {
    0.02
}

const fn default_agent_speed() -> f64 {
    6.0
}

const fn default_death_chance() -> f64 {
    0.001
}

const fn default_fire_chance() -> f64 {
    0.01
}

const fn default_respawn_every() -> u64 {
    50
}

const fn default_summon_frame() -> u64 {
    40
}

const fn default_rally_frame() -> u64 {
    120
}

const fn default_injury_frame() -> u64 {
    200
}

/// The scripted world.
#[derive(Debug)]
pub struct Sandbox {
    half_extent: f64,
    flaky_scan_chance: f64,
    targets: Vec<Target>,
    blocked: Vec<TargetId>,
    objectives: Vec<Objective>,
    moves: Mutex<HashMap<AgentId, (Position, f64)>>,
    noise: Mutex<StdRng>,
}

impl Sandbox {
    /// Generate a world from `config`.
    pub fn generate(config: &SandboxConfig, rng: &mut StdRng) -> Self {
        let half_extent = config.map_size / 2.0;
        let mut targets = Vec::new();
        let mut blocked = Vec::new();
        for handle in 0..u64::from(config.targets) {
            let target = random_target(handle, half_extent, rng);
            if target.category == LootCategory::Container && rng.random::<f64>() < config.blocked_share {
                blocked.push(target.id.clone());
            }
            targets.push(target);
        }

        let mut objectives: Vec<Objective> = (0..config.objectives)
            .zip(OBJECTIVE_KINDS.iter().cycle())
            .map(|(index, kind)| {
                Objective::new(
                    format!("objective_{index}"),
                    *kind,
                    random_position(half_extent, rng),
                    rng.random_range(10.0..100.0),
                )
            })
            .collect();
        objectives.push(Objective::new(
            "extract_north",
            ObjectiveType::Extract,
            Position::new(0.0, 0.0, half_extent),
            1.0,
        ));

        Self {
            half_extent,
            flaky_scan_chance: config.flaky_scan_chance,
            targets,
            blocked,
            objectives,
            moves: Mutex::new(HashMap::new()),
            noise: Mutex::new(StdRng::seed_from_u64(rng.random())),
        }
    }

    /// A random point on the map.
    pub fn random_position(&self, rng: &mut StdRng) -> Position {
        random_position(self.half_extent, rng)
    }

    /// Remove a looted item from a target. Returns the item's area.
    pub fn take(&mut self, target: &TargetId, item: Option<usize>) -> u32 {
        let Some(index) = self.targets.iter().position(|t| &t.id == target) else {
            return 0;
        };
        let Some(entry) = self.targets.get_mut(index) else {
            return 0;
        };
        let area = match item {
            Some(item) if item < entry.items.len() => {
                let taken = entry.items.remove(item);
                entry.value = (entry.value - taken.price).max(0.0);
                taken.area()
            }
            _ => 0,
        };
        if entry.items.is_empty() {
            self.targets.remove(index);
        }
        area
    }

    /// Movement requests recorded since the last call, by agent.
    pub fn drain_moves(&self) -> HashMap<AgentId, (Position, f64)> {
        std::mem::take(&mut *self.moves.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Loot targets still in the world.
    pub fn targets_left(&self) -> usize {
        self.targets.len()
    }
}

fn random_position(half_extent: f64, rng: &mut StdRng) -> Position {
    Position::new(
        rng.random_range(-half_extent..=half_extent),
        0.0,
        rng.random_range(-half_extent..=half_extent),
    )
}

fn random_target(handle: u64, half_extent: f64, rng: &mut StdRng) -> Target {
    let category = match rng.random_range(0..3_u8) {
        0 => LootCategory::LooseItem,
        1 => LootCategory::Container,
        _ => LootCategory::Corpse,
    };
    let count = if category == LootCategory::LooseItem {
        1
    } else {
        rng.random_range(1..=4_usize)
    };
    let items: Vec<LootItem> = (0..count)
        .filter_map(|_| {
            let &(name, price, width, height) = ITEMS.get(rng.random_range(0..ITEMS.len()))?;
            Some(LootItem {
                name: name.to_owned(),
                price,
                width,
                height,
            })
        })
        .collect();
    let kind = match category {
        LootCategory::LooseItem => "item",
        LootCategory::Container => "container",
        LootCategory::Corpse => "corpse",
    };
    Target {
        id: TargetId::from_handle(kind, handle),
        category,
        value: items.iter().map(|item| item.price).sum(),
        position: random_position(half_extent, rng),
        distance: 0.0,
        items,
    }
}

impl WorldQuery for Sandbox {
    fn scan_nearby(&self, origin: &Position, radius: f64, filter: &ScanFilter) -> Result<Vec<Target>, QueryError> {
        let roll: f64 = self.noise.lock().unwrap_or_else(PoisonError::into_inner).random();
        if roll < self.flaky_scan_chance {
            return Err(QueryError::Unavailable("loot index rebuilding".to_owned()));
        }
        Ok(self
            .targets
            .iter()
            .filter(|t| filter.accepts(t))
            .filter_map(|t| {
                let distance = origin.distance_to(&t.position);
                (distance <= radius).then(|| Target {
                    distance,
                    ..t.clone()
                })
            })
            .collect())
    }
}

impl Navigation for Sandbox {
    fn is_reachable(&self, point: &Position) -> bool {
        point.x.abs() <= self.half_extent && point.z.abs() <= self.half_extent
    }

    fn path_to(&self, _from: &Position, to: &Position) -> Result<PathStatus, QueryError> {
        let walled = self
            .targets
            .iter()
            .filter(|t| self.blocked.contains(&t.id))
            .any(|t| t.position.distance_to(to) < 0.01);
        Ok(if walled {
            PathStatus::Unreachable
        } else {
            PathStatus::Complete
        })
    }

    fn move_towards(&self, agent: AgentId, point: &Position, speed_factor: f64) -> Result<(), QueryError> {
        self.moves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(agent, (*point, speed_factor));
        Ok(())
    }
}

impl QuestSource for Sandbox {
    fn objectives_for(&self, _agent: &AgentSnapshot) -> Result<Vec<Objective>, QueryError> {
        Ok(self.objectives.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use raidmind_types::AgentClass;

    use super::*;

    fn world(blocked_share: f64) -> Sandbox {
        let config = SandboxConfig {
            targets: 30,
            blocked_share,
            flaky_scan_chance: 0.0,
            ..SandboxConfig::default()
        };
        Sandbox::generate(&config, &mut StdRng::seed_from_u64(9))
    }

    fn everything() -> ScanFilter {
        ScanFilter {
            categories: vec![LootCategory::LooseItem, LootCategory::Container, LootCategory::Corpse],
            min_value: 0.0,
        }
    }

    #[test]
    fn scan_respects_radius_and_sets_distance() {
        let sandbox = world(0.0);
        let origin = Position::default();
        let hits = sandbox.scan_nearby(&origin, 100.0, &everything()).unwrap();
        assert!(hits.iter().all(|t| t.distance <= 100.0));
        assert!(hits.iter().all(|t| (t.distance - origin.distance_to(&t.position)).abs() < 1e-9));
        let all = sandbox.scan_nearby(&origin, 1_000.0, &everything()).unwrap();
        assert_eq!(all.len(), 30);
    }

    #[test]
    fn walled_containers_are_unreachable() {
        let sandbox = world(1.0);
        let walled = sandbox
            .targets
            .iter()
            .find(|t| t.category == LootCategory::Container)
            .unwrap();
        let status = sandbox.path_to(&Position::default(), &walled.position).unwrap();
        assert_eq!(status, PathStatus::Unreachable);
        let open = sandbox.path_to(&Position::default(), &Position::new(1.0, 0.0, 1.0)).unwrap();
        assert_eq!(open, PathStatus::Complete);
    }

    #[test]
    fn taking_the_last_item_removes_the_target() {
        let mut sandbox = world(0.0);
        let target = sandbox.targets.iter().find(|t| t.items.len() == 1).unwrap().clone();
        let area = sandbox.take(&target.id, Some(0));
        assert_eq!(area, target.items.first().unwrap().area());
        assert!(!sandbox.targets.iter().any(|t| t.id == target.id));
        assert_eq!(sandbox.take(&target.id, Some(0)), 0);
    }

    #[test]
    fn moves_are_recorded_and_drained() {
        let sandbox = world(0.0);
        let agent = AgentId::new();
        sandbox.move_towards(agent, &Position::new(5.0, 0.0, 0.0), 0.6).unwrap();
        let moves = sandbox.drain_moves();
        assert_eq!(moves.get(&agent).map(|(_, speed)| *speed), Some(0.6));
        assert!(sandbox.drain_moves().is_empty());
    }

    #[test]
    fn quests_include_an_extract() {
        let sandbox = world(0.0);
        let agent = AgentSnapshot::new(AgentId::new(), AgentClass::Pmc, Position::default());
        let objectives = sandbox.objectives_for(&agent).unwrap();
        assert_eq!(objectives.len(), 7);
        assert!(objectives.iter().any(|o| o.objective_type == ObjectiveType::Extract));
    }

    #[test]
    fn sandbox_section_defaults() {
        let config: SandboxConfig = serde_yml::from_str("agents: 3").unwrap();
        assert_eq!(config.agents, 3);
        assert_eq!(config.summon_frame, 40);
        assert_eq!(config.hostile_frame, None);
    }
}
