//! Collaborator interfaces implemented by the host.
//!
//! World scans, navigation, and quest data are synchronous calls that answer
//! within the tick. Failures are transient: [`FailureLatch`] turns them into
//! "no candidate this tick" and logs each failure episode once.

use raidmind_types::{AgentId, AgentSnapshot, LootCategory, Objective, PathStatus, Position, Target};
use tracing::{debug, warn};

use crate::error::QueryError;

/// What a nearby-object scan should return.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFilter {
    /// Categories to include.
    pub categories: Vec<LootCategory>,
    /// Minimum target value.
    pub min_value: f64,
}

impl ScanFilter {
    /// Whether a target passes the filter.
    pub fn accepts(&self, target: &Target) -> bool {
        target.value >= self.min_value && self.categories.contains(&target.category)
    }
}

/// Nearby-object scans (loose loot, containers, corpses).
pub trait WorldQuery: Send + Sync {
    /// Targets within `radius` of `origin` that pass `filter`.
    fn scan_nearby(
        &self,
        origin: &Position,
        radius: f64,
        filter: &ScanFilter,
    ) -> Result<Vec<Target>, QueryError>;
}

/// Path queries and movement execution.
pub trait Navigation: Send + Sync {
    /// Whether `point` lies on the navigable surface.
    fn is_reachable(&self, point: &Position) -> bool;

    /// Path status from `from` to `to`.
    fn path_to(&self, from: &Position, to: &Position) -> Result<PathStatus, QueryError>;

    /// Move `agent` toward `point` at `speed_factor` of its top speed.
    fn move_towards(
        &self,
        agent: AgentId,
        point: &Position,
        speed_factor: f64,
    ) -> Result<(), QueryError>;
}

/// Source of quest objectives for an agent.
pub trait QuestSource: Send + Sync {
    /// Objectives currently available to `agent`.
    fn objectives_for(&self, agent: &AgentSnapshot) -> Result<Vec<Objective>, QueryError>;
}

/// A quest source that never has objectives.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQuests;

impl QuestSource for NoQuests {
    fn objectives_for(&self, _agent: &AgentSnapshot) -> Result<Vec<Objective>, QueryError> {
        Ok(Vec::new())
    }
}

/// Logs a collaborator failure once per episode.
///
/// The first failure after a success is logged at `warn`; repeats are
/// silent until a call succeeds again.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureLatch {
    failing: bool,
}

impl FailureLatch {
    /// Create a latch in the healthy state.
    pub const fn new() -> Self {
        Self { failing: false }
    }

    /// Pass a collaborator result through, logging new failures.
    pub fn observe<T>(
        &mut self,
        agent: AgentId,
        what: &'static str,
        result: Result<T, QueryError>,
    ) -> Option<T> {
        match result {
            Ok(value) => {
                if self.failing {
                    debug!(agent_id = %agent, query = what, "Collaborator recovered");
                }
                self.failing = false;
                Some(value)
            }
            Err(error) => {
                if !self.failing {
                    warn!(agent_id = %agent, query = what, %error, "Collaborator query failed");
                }
                self.failing = true;
                None
            }
        }
    }

    /// Whether the last observed call failed.
    pub const fn is_failing(&self) -> bool {
        self.failing
    }
}

#[cfg(test)]
mod tests {
    use raidmind_types::TargetId;

    use super::*;

    #[test]
    fn latch_tracks_failure_episodes() {
        let mut latch = FailureLatch::new();
        let agent = AgentId::new();
        assert_eq!(latch.observe(agent, "scan", Ok(3)), Some(3));
        assert!(!latch.is_failing());
        let failed: Result<u32, QueryError> = Err(QueryError::Failed("navmesh".to_owned()));
        assert_eq!(latch.observe(agent, "scan", failed.clone()), None);
        assert!(latch.is_failing());
        assert_eq!(latch.observe(agent, "scan", failed), None);
        assert_eq!(latch.observe(agent, "scan", Ok(1)), Some(1));
        assert!(!latch.is_failing());
    }

    #[test]
    fn scan_filter_checks_value_and_category() {
        let filter = ScanFilter {
            categories: vec![LootCategory::Container],
            min_value: 100.0,
        };
        let mut target = Target {
            id: TargetId::from_handle("container", 1),
            category: LootCategory::Container,
            value: 150.0,
            position: Position::default(),
            distance: 3.0,
            items: Vec::new(),
        };
        assert!(filter.accepts(&target));
        target.value = 50.0;
        assert!(!filter.accepts(&target));
        target.value = 150.0;
        target.category = LootCategory::Corpse;
        assert!(!filter.accepts(&target));
    }
}
