//! Tunables for the behavior layers.
//!
//! Every struct deserializes with per-field defaults, so a config file only
//! needs to name what it changes. `validate` enforces the ranges the layers
//! rely on; layer constructors call it, so an invalid config never reaches
//! a tick.

use raidmind_types::{AgentClass, LootCategory};
use serde::Deserialize;

use crate::error::BrainError;
use crate::priority::{DistanceTier, DistanceTiers};
use crate::throttle::CooldownRange;

/// Allowed world re-query interval, in seconds.
pub const SCAN_INTERVAL_BOUNDS: (f64, f64) = (8.0, 30.0);

/// Allowed looting cooldown, in seconds.
pub const LOOT_COOLDOWN_BOUNDS: (f64, f64) = (5.0, 30.0);

/// Allowed questing cooldown, in seconds.
pub const QUEST_COOLDOWN_BOUNDS: (f64, f64) = (3.0, 10.0);

/// Per-category loot toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LootCategories {
    /// Pick up items lying in the world.
    pub loose_items: bool,
    /// Search containers.
    pub containers: bool,
    /// Search corpses.
    pub corpses: bool,
}

impl Default for LootCategories {
    fn default() -> Self {
        Self {
            loose_items: true,
            containers: true,
            corpses: true,
        }
    }
}

impl LootCategories {
    /// The enabled categories.
    pub fn enabled(&self) -> Vec<LootCategory> {
        [
            (self.loose_items, LootCategory::LooseItem),
            (self.containers, LootCategory::Container),
            (self.corpses, LootCategory::Corpse),
        ]
        .into_iter()
        .filter_map(|(on, category)| on.then_some(category))
        .collect()
    }
}

/// Looting layer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LootingConfig {
    /// Master toggle.
    pub enabled: bool,
    /// Scan radius around the agent.
    pub search_radius: f64,
    /// Targets worth less than this are ignored.
    pub min_value: f64,
    /// Which kinds of targets to consider.
    pub categories: LootCategories,
    /// Seconds between world scans.
    pub scan_interval_secs: f64,
    /// Cooldown after each loot or abort.
    pub cooldown: CooldownRange,
    /// Activations allowed per session window.
    pub max_activations_per_session: u32,
    /// Length of the session window, in seconds.
    pub session_window_secs: f64,
    /// Distance at which a target can be looted.
    pub interact_distance: f64,
}

impl Default for LootingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            search_radius: 40.0,
            min_value: 5_000.0,
            categories: LootCategories::default(),
            scan_interval_secs: 10.0,
            cooldown: CooldownRange::new(8.0, 20.0),
            max_activations_per_session: 3,
            session_window_secs: 120.0,
            interact_distance: 1.5,
        }
    }
}

impl LootingConfig {
    /// Check every range the looting layer depends on.
    pub fn validate(&self) -> Result<(), BrainError> {
        check_range("looting.scan_interval_secs", self.scan_interval_secs, SCAN_INTERVAL_BOUNDS)?;
        self.cooldown
            .validate("looting.cooldown", LOOT_COOLDOWN_BOUNDS.0, LOOT_COOLDOWN_BOUNDS.1)?;
        check_positive("looting.search_radius", self.search_radius)?;
        check_positive("looting.session_window_secs", self.session_window_secs)?;
        check_positive("looting.interact_distance", self.interact_distance)?;
        Ok(())
    }
}

/// Questing layer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuestingConfig {
    /// Master toggle.
    pub enabled: bool,
    /// Agent classes that quest.
    pub agent_classes: Vec<AgentClass>,
    /// Seconds between quest data refreshes.
    pub scan_interval_secs: f64,
    /// Cooldown after each objective.
    pub cooldown: CooldownRange,
    /// Activations allowed per session window.
    pub max_activations_per_session: u32,
    /// Length of the session window, in seconds.
    pub session_window_secs: f64,
    /// Objectives within this radius are preferred.
    pub preferred_radius: f64,
    /// Fallback tiers for PMC bots.
    pub pmc_fallback_tiers: DistanceTiers,
    /// Fallback tiers for every other class.
    pub default_fallback_tiers: DistanceTiers,
}

impl Default for QuestingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            agent_classes: vec![AgentClass::Pmc],
            scan_interval_secs: 15.0,
            cooldown: CooldownRange::new(3.0, 8.0),
            max_activations_per_session: 3,
            session_window_secs: 120.0,
            preferred_radius: 75.0,
            pmc_fallback_tiers: DistanceTiers::from_validated(vec![
                DistanceTier::new(150.0, 400.0),
                DistanceTier::new(60.0, 200.0),
                DistanceTier::new(0.0, 90.0),
            ]),
            default_fallback_tiers: DistanceTiers::from_validated(vec![
                DistanceTier::new(60.0, 200.0),
                DistanceTier::new(25.0, 100.0),
                DistanceTier::new(0.0, 50.0),
            ]),
        }
    }
}

impl QuestingConfig {
    /// Check every range the questing layer depends on.
    pub fn validate(&self) -> Result<(), BrainError> {
        check_range("questing.scan_interval_secs", self.scan_interval_secs, SCAN_INTERVAL_BOUNDS)?;
        self.cooldown
            .validate("questing.cooldown", QUEST_COOLDOWN_BOUNDS.0, QUEST_COOLDOWN_BOUNDS.1)?;
        check_positive("questing.preferred_radius", self.preferred_radius)?;
        check_positive("questing.session_window_secs", self.session_window_secs)?;
        Ok(())
    }

    /// Whether agents of `class` quest.
    pub fn quests(&self, class: AgentClass) -> bool {
        self.agent_classes.contains(&class)
    }
}

/// Combat-awareness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Seconds after the last threat before an agent counts as calm.
    pub calm_period_secs: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            calm_period_secs: 15.0,
        }
    }
}

fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), BrainError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(BrainError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), BrainError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(BrainError::OutOfRange {
            field,
            value,
            min: f64::MIN_POSITIVE,
            max: f64::MAX,
        })
    }
}
