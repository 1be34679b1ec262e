// SPDX-License-Identifier: MIT

//! `gantry status`: print a job and its children's current state,
//! reading the store without taking the daemon's exclusive lock (spec
//! §4.B is read-only here — no mutation, so nothing races a live
//! `gantryd`).

use anyhow::Context;
use gantry_daemon::Config;

fn open_store(config: &Config) -> anyhow::Result<gantry_store::JobStore> {
    let bus = gantry_bus::EventBus::new();
    let snapshot_path = config.snapshot_path.exists().then_some(config.snapshot_path.as_path());
    gantry_store::JobStore::open(&config.wal_path, snapshot_path, bus)
        .with_context(|| format!("opening job store at {}", config.wal_path.display()))
}

pub fn execute(config: &Config, job_id_str: &str) -> anyhow::Result<()> {
    let job_id = gantry_core::JobId::from_string(job_id_str);
    let store = open_store(config)?;
    let job = store.get_job(&job_id).ok_or_else(|| anyhow::anyhow!("no such job: {job_id_str}"))?;
    let children = store.list_child_jobs(&job_id);
    crate::output::print_job_tree(&job, &children);
    Ok(())
}
