// SPDX-License-Identifier: MIT

//! `gantry logs`: print a job's log entries in insertion order.

use anyhow::Context;
use gantry_daemon::Config;

pub fn execute(config: &Config, job_id_str: &str) -> anyhow::Result<()> {
    let job_id = gantry_core::JobId::from_string(job_id_str);
    let bus = gantry_bus::EventBus::new();
    let snapshot_path = config.snapshot_path.exists().then_some(config.snapshot_path.as_path());
    let store = gantry_store::JobStore::open(&config.wal_path, snapshot_path, bus)
        .with_context(|| format!("opening job store at {}", config.wal_path.display()))?;

    for entry in store.job_logs(&job_id) {
        println!("{} [{}] {}", entry.timestamp_ms, entry.level, entry.message);
    }
    Ok(())
}
