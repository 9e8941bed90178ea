//! Enumeration types for the raidmind behavior core.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Objectives
// ---------------------------------------------------------------------------

/// The kind of goal a quest objective asks an agent to pursue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveType {
    /// Walk to a marked location.
    GoToLocation,
    /// Find and pick up a quest item.
    FindItem,
    /// Place an item at a marked spot.
    PlaceItem,
    /// Wander through an area of interest.
    Explore,
    /// Leave the raid through an extraction point.
    Extract,
    /// Walk a patrol route.
    Patrol,
    /// Inspect a point of interest.
    Investigate,
}

// ---------------------------------------------------------------------------
// Support team
// ---------------------------------------------------------------------------

/// Lifecycle state of a player-summoned support team.
///
/// The cycle is `Idle → Spawning → MovingToPlayer → Defending → Healing →
/// Retreating → Despawning → Idle`. The discriminants are stable so the
/// state can live in an atomic cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SupportTeamState {
    /// No team exists; a summon may start the cycle.
    #[default]
    Idle = 0,
    /// Spawn requested, waiting for the host to create the members.
    Spawning = 1,
    /// Members are travelling to the player (or the rally point).
    MovingToPlayer = 2,
    /// Guards hold a perimeter around the player.
    Defending = 3,
    /// The medic is treating the player.
    Healing = 4,
    /// The team is leaving the player.
    Retreating = 5,
    /// Despawn requested; always returns to `Idle`.
    Despawning = 6,
}

impl SupportTeamState {
    /// Every state in cycle order.
    pub const ALL: [Self; 7] = [
        Self::Idle,
        Self::Spawning,
        Self::MovingToPlayer,
        Self::Defending,
        Self::Healing,
        Self::Retreating,
        Self::Despawning,
    ];

    /// The stable `u8` discriminant.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a discriminant produced by [`as_u8`](Self::as_u8).
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Idle),
            1 => Some(Self::Spawning),
            2 => Some(Self::MovingToPlayer),
            3 => Some(Self::Defending),
            4 => Some(Self::Healing),
            5 => Some(Self::Retreating),
            6 => Some(Self::Despawning),
            _ => None,
        }
    }

    /// The next state in the forward cycle.
    pub const fn next(self) -> Self {
        match self {
            Self::Idle => Self::Spawning,
            Self::Spawning => Self::MovingToPlayer,
            Self::MovingToPlayer => Self::Defending,
            Self::Defending => Self::Healing,
            Self::Healing => Self::Retreating,
            Self::Retreating => Self::Despawning,
            Self::Despawning => Self::Idle,
        }
    }

    /// Whether team members exist (or are being created) in this state.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Role of a support team member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamRole {
    /// Designated healer; exactly one per team while any member lives.
    Medic,
    /// Perimeter guard.
    Guard,
}

// ---------------------------------------------------------------------------
// Agents and raids
// ---------------------------------------------------------------------------

/// Broad class of an agent, used to gate which layers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentClass {
    /// Player-like operator bot.
    Pmc,
    /// Ordinary scavenger bot.
    Scav,
    /// Boss bot.
    Boss,
    /// Boss escort.
    Follower,
    /// Support team member summoned by the player.
    Support,
}

/// The kind of raid in progress; the support team can be restricted to some.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaidType {
    /// The player entered as their main character.
    Pmc,
    /// The player entered as a scavenger.
    Scav,
}

/// Behavior layer kinds evaluated by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    /// Loot nearby items, containers, and corpses.
    Looting,
    /// Pursue quest objectives.
    Questing,
}

impl core::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Looting => f.write_str("looting"),
            Self::Questing => f.write_str("questing"),
        }
    }
}

// ---------------------------------------------------------------------------
// Loot and navigation
// ---------------------------------------------------------------------------

/// Category of a loot target returned by a world scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LootCategory {
    /// An item lying in the world.
    LooseItem,
    /// A lootable container.
    Container,
    /// A dead agent's body.
    Corpse,
}

/// Result of a path computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathStatus {
    /// A full path to the point exists.
    Complete,
    /// Only a path to somewhere near the point exists.
    Partial,
    /// No path exists.
    Unreachable,
}

/// Movement pace chosen from the remaining distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedTier {
    /// Close to the goal.
    Walk,
    /// Medium distance.
    Jog,
    /// Far from the goal.
    Sprint,
}

impl SpeedTier {
    /// Fractional speed multiplier applied to the agent's top speed.
    pub const fn factor(self) -> f64 {
        match self {
            Self::Walk => 0.4,
            Self::Jog => 0.7,
            Self::Sprint => 1.0,
        }
    }
}
