//! Error types for the host binary.
//!
//! [`HostError`] wraps every failure mode of startup and the session run so
//! `main` can propagate with `?`.

/// Top-level error for the host binary.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: raidmind_core::ConfigError,
    },

    /// A brain could not be built for a seed agent.
    #[error("brain error: {source}")]
    Brain {
        /// The underlying brain error.
        #[from]
        source: raidmind_brain::BrainError,
    },

    /// The session runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: raidmind_core::RunnerError,
    },

    /// The `sandbox` section could not be read.
    #[error("sandbox config error: {message}")]
    Sandbox {
        /// Description of the failure.
        message: String,
    },

    /// The raid report could not be serialized.
    #[error("report error: {source}")]
    Report {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
