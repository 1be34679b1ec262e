// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gantry-daemon: wires the core crates into one running engine
//! and exposes the pieces the `gantryd` binary and the `gantry` CLI both
//! need — configuration resolution, the lock file, and `Engine::build`.
//! The CLI links this crate as a library rather than shelling out to the
//! binary, the same way the teacher's `oj` CLI links `oj-engine` directly.

pub mod config;
pub mod engine;
pub mod error;

pub use config::Config;
pub use engine::Engine;
pub use error::DaemonError;

use fs2::FileExt;
use std::io::Write;

/// Acquire the daemon's exclusive lock file, writing this process's pid.
/// Held for the lock-holding process's lifetime; dropped (and thus
/// released) on exit. Both `gantryd` and `gantry run` take this lock so
/// they never replay/append the same WAL concurrently.
pub fn acquire_lock(config: &Config) -> Result<std::fs::File, DaemonError> {
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(|err| DaemonError::LockFailed(config.lock_path.clone(), err))?;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    write!(lock_file, "{}", std::process::id())?;
    Ok(lock_file)
}
