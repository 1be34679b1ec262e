// SPDX-License-Identifier: MIT

//! Environment-resolved daemon configuration, mirroring the teacher's
//! `daemon/src/env.rs` state-directory resolution and `OJ_*` tunable
//! pattern.

use crate::error::DaemonError;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_QUEUE_POLL_MS: u64 = 1000;
const DEFAULT_MONITOR_TICK_MS: u64 = 5000;
const DEFAULT_MONITOR_TIMEOUT_SECS: u64 = 1800;
const DEFAULT_CRAWL_RENDER_DELAY_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub lock_path: PathBuf,
    pub queue_poll: Duration,
    pub monitor_tick: Duration,
    pub monitor_timeout: Duration,
    pub crawl_render_delay: Duration,
}

impl Config {
    /// Resolve the full configuration from the process environment:
    /// `GANTRY_STATE_DIR` > `XDG_STATE_HOME/gantry` > `~/.local/state/gantry`,
    /// plus the `GANTRY_*` tunables documented for the engine's components.
    pub fn from_env() -> Result<Self, DaemonError> {
        Ok(Self::from_state_dir(state_dir()?))
    }

    /// Build a config rooted at an explicit state directory, with every
    /// tunable still read from its `GANTRY_*` env var. Used by the `gantry`
    /// CLI's `--state-dir` override, which otherwise behaves exactly like
    /// `from_env`.
    pub fn from_state_dir(state_dir: PathBuf) -> Self {
        Self {
            wal_path: state_dir.join("jobs.wal"),
            snapshot_path: state_dir.join("jobs.snapshot"),
            lock_path: state_dir.join("gantryd.lock"),
            state_dir,
            queue_poll: env_millis("GANTRY_QUEUE_POLL_MS", DEFAULT_QUEUE_POLL_MS),
            monitor_tick: env_millis("GANTRY_MONITOR_TICK_MS", DEFAULT_MONITOR_TICK_MS),
            monitor_timeout: Duration::from_secs(env_u64(
                "GANTRY_MONITOR_TIMEOUT_SECS",
                DEFAULT_MONITOR_TIMEOUT_SECS,
            )),
            crawl_render_delay: env_millis("GANTRY_CRAWL_RENDER_DELAY_MS", DEFAULT_CRAWL_RENDER_DELAY_MS),
        }
    }
}

fn state_dir() -> Result<PathBuf, DaemonError> {
    if let Ok(dir) = std::env::var("GANTRY_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("gantry"));
    }
    dirs::home_dir().map(|home| home.join(".local/state/gantry")).ok_or(DaemonError::NoStateDir)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_millis(key: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(key, default_ms))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
