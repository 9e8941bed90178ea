//! Core entity structs exchanged between the host and the behavior core.

use serde::{Deserialize, Serialize};

use crate::enums::{AgentClass, LootCategory, ObjectiveType};
use crate::geometry::Position;
use crate::ids::{AgentId, ObjectiveId, TargetId};

/// Default radius within which an objective counts as reached.
pub const DEFAULT_COMPLETION_RADIUS: f64 = 2.0;

/// A single item inside a loot target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootItem {
    /// Display name, for logs only.
    pub name: String,
    /// Market value of the item.
    pub price: f64,
    /// Width in inventory cells.
    pub width: u32,
    /// Height in inventory cells.
    pub height: u32,
}

impl LootItem {
    /// Inventory cells the item occupies, saturating on overflow.
    pub const fn area(&self) -> u32 {
        self.width.saturating_mul(self.height)
    }
}

/// A candidate loot or interaction target produced by a world scan.
///
/// Targets are rebuilt every scan cycle and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Stable identity derived from the world handle.
    pub id: TargetId,
    /// What kind of object this is.
    pub category: LootCategory,
    /// Total value of the target.
    pub value: f64,
    /// Where the target is.
    pub position: Position,
    /// Distance from the scanning agent at scan time.
    pub distance: f64,
    /// Items the target holds (a loose item holds itself).
    #[serde(default)]
    pub items: Vec<LootItem>,
}

/// A quest-like goal assigned to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Stable identity from the quest data.
    pub id: ObjectiveId,
    /// The kind of objective.
    pub objective_type: ObjectiveType,
    /// Where the objective is.
    pub position: Position,
    /// Selection priority; higher wins.
    pub priority: f64,
    /// Distance at which the objective counts as reached.
    #[serde(default = "default_completion_radius")]
    pub completion_radius: f64,
    /// Whether the objective has been completed.
    #[serde(default)]
    pub is_complete: bool,
}

const fn default_completion_radius() -> f64 {
    DEFAULT_COMPLETION_RADIUS
}

impl Objective {
    /// Create an incomplete objective with the default completion radius.
    pub fn new(
        id: impl Into<ObjectiveId>,
        objective_type: ObjectiveType,
        position: Position,
        priority: f64,
    ) -> Self {
        Self {
            id: id.into(),
            objective_type,
            position,
            priority,
            completion_radius: DEFAULT_COMPLETION_RADIUS,
            is_complete: false,
        }
    }

    /// Whether `position` lies within the completion radius.
    pub fn is_reached_from(&self, position: &Position) -> bool {
        self.position.distance_to(position) <= self.completion_radius
    }
}

/// Per-tick view of one agent supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// The agent.
    pub id: AgentId,
    /// The agent's class.
    pub class: AgentClass,
    /// Current position.
    pub position: Position,
    /// Whether the agent is alive.
    pub is_alive: bool,
    /// Whether the agent is downed, stunned, or otherwise unable to act.
    #[serde(default)]
    pub is_incapacitated: bool,
    /// Whether the agent currently has a hostile target.
    #[serde(default)]
    pub has_hostile_target: bool,
    /// Whether the agent is taking fire.
    #[serde(default)]
    pub under_fire: bool,
    /// Free inventory cells.
    #[serde(default)]
    pub free_slots: u32,
}

impl AgentSnapshot {
    /// A healthy, calm agent at `position`.
    pub const fn new(id: AgentId, class: AgentClass, position: Position) -> Self {
        Self {
            id,
            class,
            position,
            is_alive: true,
            is_incapacitated: false,
            has_hostile_target: false,
            under_fire: false,
            free_slots: 0,
        }
    }

    /// Whether the agent can take any decision this tick.
    pub const fn can_act(&self) -> bool {
        self.is_alive && !self.is_incapacitated
    }
}
