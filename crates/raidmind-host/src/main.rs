//! Headless host for the raidmind behavior core.
//!
//! Runs one raid in a scripted sandbox world: ordinary agents loot and
//! quest under their brains, the player summons a support team partway
//! through, and the capacity gate holds back room for it.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `RAIDMIND_CONFIG` (default `raidmind-config.yaml`)
//! 3. Open the raid session
//! 4. Generate the sandbox world and spawn seed agents through the gate
//! 5. Install the Ctrl-C stop handler
//! 6. Run the session loop
//! 7. Log the result

mod error;
mod host;
mod sandbox;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use raidmind_core::{RaidMindConfig, RaidSession, SessionControl, log_session_end, run_session};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::HostError;
use crate::host::{ProgressLog, SandboxHost};
use crate::sandbox::SandboxConfig;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "RAIDMIND_CONFIG";

/// Config file used when `RAIDMIND_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "raidmind-config.yaml";

/// Frames between progress log lines.
const PROGRESS_EVERY: u64 = 100;

/// Application entry point for the sandbox host.
///
/// # Errors
///
/// Returns an error if configuration, brain construction, or the session
/// run fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("raidmind-host starting");

    // 2. Load configuration.
    let config_path = config_path();
    let config = load_config(&config_path)?;
    let sandbox_config = load_sandbox_config(&config_path)?;
    info!(
        path = %config_path.display(),
        seed = config.host.seed,
        max_frames = config.host.max_frames,
        worker_threads = config.host.worker_threads,
        raid_type = ?config.host.raid_type,
        "Configuration loaded"
    );

    // 3. Open the raid session.
    let session = RaidSession::new(config, None)?;

    // 4. Generate the world and spawn seed agents.
    let mut host = SandboxHost::new(sandbox_config, &session);
    let mut brains = host
        .top_up(&session)
        .into_iter()
        .map(|agent_id| session.new_brain(agent_id))
        .collect::<Result<Vec<_>, _>>()
        .map_err(HostError::from)?;
    info!(agents = brains.len(), "Seed agents spawned");

    // 5. Stop cleanly on Ctrl-C.
    let control = Arc::new(SessionControl::new(&session.config().host));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, stopping after the current frame");
                control.request_stop();
            }
        });
    }

    // 6. Run the session.
    let mut callback = ProgressLog::new(PROGRESS_EVERY);
    let result = run_session(&session, &mut host, &mut brains, &control, &mut callback)
        .await
        .map_err(HostError::from)?;

    // 7. Log results.
    log_session_end(&result);
    let raid = serde_json::to_string(&result.raid).map_err(HostError::from)?;
    let totals = serde_json::to_string(&host.totals()).map_err(HostError::from)?;
    info!(
        end_reason = ?result.end_reason,
        total_frames = result.total_frames,
        %raid,
        %totals,
        "raidmind-host shutdown complete"
    );

    Ok(())
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load the raid configuration, falling back to defaults when the file is
/// missing.
fn load_config(path: &Path) -> Result<RaidMindConfig, HostError> {
    if path.exists() {
        Ok(RaidMindConfig::from_file(path)?)
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
        Ok(RaidMindConfig::parse("{}")?)
    }
}

/// Load the `sandbox` section of the config file.
///
/// The raid configuration ignores this section; a missing file or section
/// yields the defaults.
fn load_sandbox_config(path: &Path) -> Result<SandboxConfig, HostError> {
    if !path.exists() {
        return Ok(SandboxConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| HostError::Sandbox {
        message: format!("failed to read config file: {e}"),
    })?;
    let raw: serde_yml::Value = serde_yml::from_str(&contents).map_err(|e| HostError::Sandbox {
        message: format!("failed to parse config YAML: {e}"),
    })?;
    match raw.get("sandbox") {
        Some(section) => serde_yml::from_value(section.clone()).map_err(|e| HostError::Sandbox {
            message: format!("failed to parse sandbox config: {e}"),
        }),
        None => Ok(SandboxConfig::default()),
    }
}
