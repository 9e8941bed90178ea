//! Configuration loading and typed config structures for raidmind.
//!
//! The canonical configuration lives in `raidmind-config.yaml` at the
//! project root. Every section is optional and every field has a default,
//! so an empty document is a valid configuration. Loading validates the
//! whole tree; an invalid file never produces a [`RaidMindConfig`].

use std::path::Path;

use raidmind_brain::{BrainError, CombatConfig, LootingConfig, MovementTiers, QuestingConfig};
use raidmind_squad::{CapacityConfig, SquadError, SupportTeamConfig};
use raidmind_types::RaidType;
use serde::Deserialize;
use tracing::warn;

/// Environment variable overriding `host.seed`.
pub const SEED_ENV: &str = "RAIDMIND_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A behavior layer setting is invalid.
    #[error("invalid behavior config: {source}")]
    Brain {
        /// The validation error.
        #[from]
        source: BrainError,
    },

    /// A support team setting is invalid.
    #[error("invalid support team config: {source}")]
    Squad {
        /// The validation error.
        #[from]
        source: SquadError,
    },

    /// A host setting is invalid.
    #[error("invalid host config: {reason}")]
    Host {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `raidmind-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RaidMindConfig {
    /// Frame loop and sandbox settings.
    #[serde(default)]
    pub host: HostConfig,

    /// Looting layer.
    #[serde(default)]
    pub looting: LootingConfig,

    /// Questing layer.
    #[serde(default)]
    pub questing: QuestingConfig,

    /// Distance thresholds for sprint, jog and walk.
    #[serde(default)]
    pub movement: MovementTiers,

    /// Player-summoned support team.
    #[serde(default)]
    pub support_team: SupportTeamConfig,

    /// Ordinary agent population ceiling.
    #[serde(default)]
    pub capacity: CapacityConfig,

    /// Combat awareness.
    #[serde(default)]
    pub combat: CombatConfig,
}

impl RaidMindConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// `RAIDMIND_SEED` overrides `host.seed` when set to an integer.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.host.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.looting.validate()?;
        self.questing.validate()?;
        self.support_team.validate()?;
        self.host.validate()
    }

    /// Team size as the signed count used by capacity arithmetic.
    pub fn team_size_i32(&self) -> i32 {
        i32::try_from(self.support_team.team_size).unwrap_or(i32::MAX)
    }
}

/// Frame loop and sandbox configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HostConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Game seconds that pass per frame.
    #[serde(default = "default_frame_secs")]
    pub frame_secs: f64,

    /// Real-time milliseconds between frames (0 = as fast as possible).
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Stop after this many frames (0 = unlimited).
    #[serde(default = "default_max_frames")]
    pub max_frames: u64,

    /// Threads used to evaluate agents within a frame.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// The kind of raid being played.
    #[serde(default = "default_raid_type")]
    pub raid_type: RaidType,

    /// Capacity of each raid-wide dedup guard.
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            frame_secs: default_frame_secs(),
            frame_interval_ms: default_frame_interval_ms(),
            max_frames: default_max_frames(),
            worker_threads: default_worker_threads(),
            raid_type: default_raid_type(),
            dedup_capacity: default_dedup_capacity(),
        }
    }
}

impl HostConfig {
    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(SEED_ENV) {
            match val.trim().parse::<u64>() {
                Ok(seed) => self.seed = seed,
                Err(_) => warn!(value = %val, "Ignoring non-numeric {SEED_ENV}"),
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.frame_secs.is_finite() && self.frame_secs > 0.0) {
            return Err(ConfigError::Host {
                reason: format!("frame_secs must be positive, got {}", self.frame_secs),
            });
        }
        if self.worker_threads == 0 {
            return Err(ConfigError::Host {
                reason: "worker_threads must be at least 1".to_owned(),
            });
        }
        if self.dedup_capacity == 0 {
            return Err(ConfigError::Host {
                reason: "dedup_capacity must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_frame_secs() -> f64 {
    0.5
}

const fn default_frame_interval_ms() -> u64 {
    50
}

const fn default_max_frames() -> u64 {
    1200
}

const fn default_worker_threads() -> usize {
    1
}

const fn default_raid_type() -> RaidType {
    RaidType::Pmc
}

const fn default_dedup_capacity() -> usize {
    raidmind_brain::dedup::DEFAULT_MAX_ENTRIES
}
