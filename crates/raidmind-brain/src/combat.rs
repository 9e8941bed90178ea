//! Optional combat-awareness capability.
//!
//! Some hosts ship a combat oracle that knows whether an agent is fighting
//! and how long ago it was last threatened. Availability is resolved once at
//! raid start into a [`CombatAwareness`] value; every call site matches on
//! the variant instead of probing again. Without an oracle the check falls
//! back to the agent snapshot: a hostile target or incoming fire counts as
//! combat.

use std::sync::Arc;

use raidmind_types::{AgentId, AgentSnapshot};
use tracing::info;

/// A host-provided source of combat state.
pub trait CombatOracle: Send + Sync {
    /// Whether the agent is currently fighting.
    fn is_in_combat(&self, agent: AgentId) -> bool;

    /// Seconds since the agent last perceived a threat.
    fn time_since_threat(&self, agent: AgentId) -> f64;
}

/// Combat awareness resolved once per raid.
#[derive(Clone)]
pub enum CombatAwareness {
    /// An oracle is installed.
    Available(Arc<dyn CombatOracle>),
    /// No oracle; use the snapshot fallback.
    Unavailable,
}

impl core::fmt::Debug for CombatAwareness {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Available(_) => f.write_str("CombatAwareness::Available"),
            Self::Unavailable => f.write_str("CombatAwareness::Unavailable"),
        }
    }
}

impl CombatAwareness {
    /// Resolve the capability from whatever the host offers.
    pub fn resolve(oracle: Option<Arc<dyn CombatOracle>>) -> Self {
        match oracle {
            Some(oracle) => {
                info!("Combat oracle detected, using it for danger checks");
                Self::Available(oracle)
            }
            None => {
                info!("No combat oracle, falling back to snapshot danger checks");
                Self::Unavailable
            }
        }
    }

    /// Whether the agent should be treated as in danger.
    ///
    /// With an oracle, danger means fighting or a threat seen within
    /// `calm_period_secs`. Without one, it means having a hostile target or
    /// being under fire.
    pub fn is_in_danger(&self, agent: &AgentSnapshot, calm_period_secs: f64) -> bool {
        match self {
            Self::Available(oracle) => {
                oracle.is_in_combat(agent.id) || oracle.time_since_threat(agent.id) < calm_period_secs
            }
            Self::Unavailable => agent.has_hostile_target || agent.under_fire,
        }
    }

    /// Whether an oracle is installed.
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

#[cfg(test)]
mod tests {
    use raidmind_types::{AgentClass, Position};

    use super::*;

    struct FixedOracle {
        in_combat: bool,
        since_threat: f64,
    }

    impl CombatOracle for FixedOracle {
        fn is_in_combat(&self, _agent: AgentId) -> bool {
            self.in_combat
        }

        fn time_since_threat(&self, _agent: AgentId) -> f64 {
            self.since_threat
        }
    }

    fn calm_agent() -> AgentSnapshot {
        AgentSnapshot::new(AgentId::new(), AgentClass::Pmc, Position::default())
    }

    #[test]
    fn fallback_uses_snapshot_flags() {
        let awareness = CombatAwareness::resolve(None);
        assert!(!awareness.is_available());
        let mut agent = calm_agent();
        assert!(!awareness.is_in_danger(&agent, 10.0));
        agent.under_fire = true;
        assert!(awareness.is_in_danger(&agent, 10.0));
        agent.under_fire = false;
        agent.has_hostile_target = true;
        assert!(awareness.is_in_danger(&agent, 10.0));
    }

    #[test]
    fn oracle_combat_flag_means_danger() {
        let awareness = CombatAwareness::resolve(Some(Arc::new(FixedOracle {
            in_combat: true,
            since_threat: 1000.0,
        })));
        assert!(awareness.is_in_danger(&calm_agent(), 10.0));
    }

    #[test]
    fn oracle_recent_threat_means_danger() {
        let awareness = CombatAwareness::resolve(Some(Arc::new(FixedOracle {
            in_combat: false,
            since_threat: 4.0,
        })));
        assert!(awareness.is_in_danger(&calm_agent(), 10.0));
        assert!(!awareness.is_in_danger(&calm_agent(), 4.0));
    }

    #[test]
    fn oracle_overrides_snapshot_flags() {
        let awareness = CombatAwareness::resolve(Some(Arc::new(FixedOracle {
            in_combat: false,
            since_threat: 1000.0,
        })));
        let mut agent = calm_agent();
        agent.has_hostile_target = true;
        assert!(!awareness.is_in_danger(&agent, 10.0));
    }
}
