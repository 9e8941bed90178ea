//! Objective ranking with graduated-distance fallback.
//!
//! Selection always takes the highest-priority incomplete objective; ties go
//! to the objective that came first in the input. Distance only narrows the
//! candidate set: objectives inside the preferred radius are considered
//! first, then each fallback tier in turn, farthest first.

use raidmind_types::{AgentClass, Objective, Position};

use crate::config::QuestingConfig;
use crate::priority::{DistanceTiers, graded_search};

/// Picks the objective an agent should pursue next.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveSelector {
    preferred_radius: f64,
    pmc_tiers: DistanceTiers,
    default_tiers: DistanceTiers,
}

impl ObjectiveSelector {
    /// Create a selector.
    pub const fn new(preferred_radius: f64, pmc_tiers: DistanceTiers, default_tiers: DistanceTiers) -> Self {
        Self {
            preferred_radius,
            pmc_tiers,
            default_tiers,
        }
    }

    /// Build a selector from the questing configuration.
    pub fn from_config(config: &QuestingConfig) -> Self {
        Self::new(
            config.preferred_radius,
            config.pmc_fallback_tiers.clone(),
            config.default_fallback_tiers.clone(),
        )
    }

    /// The highest-priority incomplete objective, first in input order on ties.
    pub fn select(objectives: &[Objective]) -> Option<&Objective> {
        Self::best_index(objectives, |_| true).and_then(|index| objectives.get(index))
    }

    /// Incomplete objectives ordered by descending priority.
    ///
    /// The sort is stable, so equal priorities keep their input order.
    pub fn rank(objectives: &[Objective]) -> Vec<&Objective> {
        let mut ranked: Vec<&Objective> = objectives.iter().filter(|o| !o.is_complete).collect();
        ranked.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        ranked
    }

    /// Index of the best incomplete objective accepted by `keep`.
    pub fn best_index(objectives: &[Objective], keep: impl Fn(&Objective) -> bool) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, objective) in objectives.iter().enumerate() {
            if objective.is_complete || !keep(objective) {
                continue;
            }
            match best {
                Some((_, priority)) if objective.priority <= priority => {}
                _ => best = Some((index, objective.priority)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// The fallback tiers used for `class`.
    pub fn tiers_for(&self, class: AgentClass) -> &DistanceTiers {
        match class {
            AgentClass::Pmc => &self.pmc_tiers,
            _ => &self.default_tiers,
        }
    }

    /// Index of the best objective accepted by `keep`, searched by distance.
    ///
    /// Objectives within the preferred radius of `origin` win outright. If
    /// there are none, the class's fallback tiers are probed farthest first.
    pub fn select_near(
        &self,
        objectives: &[Objective],
        origin: &Position,
        class: AgentClass,
        keep: impl Fn(&Objective) -> bool,
    ) -> Option<usize> {
        let preferred = Self::best_index(objectives, |o| {
            keep(o) && o.position.distance_to(origin) <= self.preferred_radius
        });
        if preferred.is_some() {
            return preferred;
        }

        graded_search(self.tiers_for(class), |tier| {
            Self::best_index(objectives, |o| keep(o) && tier.contains(o.position.distance_to(origin)))
        })
    }
}
