//! Support team and capacity configuration.

use raidmind_types::RaidType;
use serde::Deserialize;

use crate::error::SquadError;

/// Smallest allowed support team.
pub const MIN_TEAM_SIZE: usize = 2;

/// Largest allowed support team.
pub const MAX_TEAM_SIZE: usize = 6;

/// Support team configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SupportTeamConfig {
    /// Master toggle. Also decides whether capacity is reserved.
    pub enabled: bool,
    /// Members per team, in `[2, 6]`. One of them is the medic.
    pub team_size: usize,
    /// Minimum seconds between the last teardown and the next summon.
    pub summon_cooldown_secs: f64,
    /// Raid types in which the team may be summoned.
    pub allowed_raid_types: Vec<RaidType>,
    /// Seconds to wait for the host to spawn every member.
    pub spawn_timeout_secs: f64,
    /// Members within this distance of the gathering point have arrived.
    pub arrival_radius: f64,
    /// Seconds the team defends before moving on to healing.
    pub defend_duration_secs: f64,
    /// Longest time the medic spends healing.
    pub heal_duration_secs: f64,
    /// Seconds the team spends retreating before despawning.
    pub retreat_duration_secs: f64,
}

impl Default for SupportTeamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            team_size: 4,
            summon_cooldown_secs: 300.0,
            allowed_raid_types: vec![RaidType::Pmc],
            spawn_timeout_secs: 15.0,
            arrival_radius: 6.0,
            defend_duration_secs: 90.0,
            heal_duration_secs: 20.0,
            retreat_duration_secs: 15.0,
        }
    }
}

impl SupportTeamConfig {
    /// Check team size and phase durations.
    pub fn validate(&self) -> Result<(), SquadError> {
        if !(MIN_TEAM_SIZE..=MAX_TEAM_SIZE).contains(&self.team_size) {
            return Err(SquadError::InvalidTeamSize {
                size: self.team_size,
                min: MIN_TEAM_SIZE,
                max: MAX_TEAM_SIZE,
            });
        }
        for (field, value) in [
            ("support_team.spawn_timeout_secs", self.spawn_timeout_secs),
            ("support_team.arrival_radius", self.arrival_radius),
            ("support_team.defend_duration_secs", self.defend_duration_secs),
            ("support_team.heal_duration_secs", self.heal_duration_secs),
            ("support_team.retreat_duration_secs", self.retreat_duration_secs),
        ] {
            if value <= 0.0 {
                return Err(SquadError::InvalidDuration { field, value });
            }
        }
        if self.summon_cooldown_secs < 0.0 {
            return Err(SquadError::InvalidDuration {
                field: "support_team.summon_cooldown_secs",
                value: self.summon_cooldown_secs,
            });
        }
        Ok(())
    }

    /// Whether a team may be summoned in `raid_type`.
    pub fn allows(&self, raid_type: RaidType) -> bool {
        self.allowed_raid_types.contains(&raid_type)
    }
}

/// Population ceiling for ordinary agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    /// Maximum ordinary agents; 0 defers to the host default.
    pub max_agents: i32,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self { max_agents: 31 }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_validates() {
        assert!(SupportTeamConfig::default().validate().is_ok());
    }

    #[test]
    fn team_size_bounds() {
        for (size, ok) in [(1, false), (2, true), (6, true), (7, false)] {
            let cfg = SupportTeamConfig {
                team_size: size,
                ..SupportTeamConfig::default()
            };
            assert_eq!(cfg.validate().is_ok(), ok, "size {size}");
        }
    }

    #[test]
    fn zero_duration_is_rejected() {
        let cfg = SupportTeamConfig {
            heal_duration_secs: 0.0,
            ..SupportTeamConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SquadError::InvalidDuration { field: "support_team.heal_duration_secs", .. })
        ));
    }

    #[test]
    fn raid_type_restriction() {
        let cfg = SupportTeamConfig::default();
        assert!(cfg.allows(RaidType::Pmc));
        assert!(!cfg.allows(RaidType::Scav));
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let cfg: SupportTeamConfig =
            serde_json::from_str(r#"{"team_size": 3, "allowed_raid_types": ["pmc", "scav"]}"#).unwrap();
        assert_eq!(cfg.team_size, 3);
        assert!(cfg.allows(RaidType::Scav));
        assert_eq!(cfg.summon_cooldown_secs, 300.0);
        assert!(cfg.validate().is_ok());

        let capacity: CapacityConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(capacity, CapacityConfig::default());
    }
}
