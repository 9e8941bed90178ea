//! Action tokens returned to the host's behavior scheduler.

use serde::{Deserialize, Serialize};

use crate::enums::{LayerKind, SpeedTier};
use crate::geometry::Position;
use crate::ids::{AgentId, ObjectiveId, TargetId};

/// Why a layer holds the agent in place instead of acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldReason {
    /// A post-action cooldown is running.
    Cooldown,
}

/// The concrete behavior the host should execute for an agent this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionToken {
    /// Do nothing; the safe default for every failure path.
    Idle,
    /// Stay put, keeping the layer in control.
    Hold {
        /// Why the layer is holding.
        reason: HoldReason,
    },
    /// Move toward a point at the given pace.
    MoveTo {
        /// Where to go.
        destination: Position,
        /// How fast to go.
        speed: SpeedTier,
    },
    /// Loot a target that has been reached.
    Loot {
        /// The target being looted.
        target: TargetId,
        /// Index of the item to take, when the target holds several.
        item: Option<usize>,
    },
    /// Finish an objective that has been reached.
    CompleteObjective {
        /// The completed objective.
        objective: ObjectiveId,
    },
}

impl ActionToken {
    /// Whether this is the idle token.
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Result of evaluating one agent for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// The evaluated agent.
    pub agent_id: AgentId,
    /// The layer in control, or `None` when the host default should run.
    pub layer: Option<LayerKind>,
    /// What to do.
    pub action: ActionToken,
    /// Whether the current action finishes this tick.
    pub ending: bool,
}

impl ActionResult {
    /// The safe result: no layer, idle, nothing ending.
    pub const fn idle(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            layer: None,
            action: ActionToken::Idle,
            ending: false,
        }
    }
}
