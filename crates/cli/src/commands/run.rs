// SPDX-License-Identifier: MIT

//! `gantry run`: submit a job definition and drive it to completion
//! in-process.

use anyhow::Context;
use gantry_daemon::{Config, Engine};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

pub async fn execute(config: &Config, definition_path: &Path, timeout_secs: Option<u64>) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.state_dir)
        .with_context(|| format!("creating state dir {}", config.state_dir.display()))?;
    let _lock = gantry_daemon::acquire_lock(config)
        .context("is gantryd (or another `gantry run`) already running against this state dir?")?;

    let raw = std::fs::read_to_string(definition_path)
        .with_context(|| format!("reading job definition {}", definition_path.display()))?;
    let definition: gantry_core::JobDefinition = serde_json::from_str(&raw)
        .with_context(|| format!("parsing job definition {}", definition_path.display()))?;

    let engine = Engine::build(config).context("building engine")?;

    let cancel = CancellationToken::new();
    let processor = engine.processor.clone();
    let processor_cancel = cancel.clone();
    let processor_task = tokio::spawn(async move { processor.run(processor_cancel).await });

    let root_id = engine.orchestrator.submit(&definition).await.context("orchestration failed")?;
    tracing::info!(job_id = %root_id, "submitted job definition");

    let deadline = timeout_secs.map(|secs| Instant::now() + Duration::from_secs(secs));
    loop {
        let terminal = engine.store.get_job(&root_id).map(|job| job.is_terminal()).unwrap_or(true);
        if terminal {
            break;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::warn!(job_id = %root_id, "gave up waiting for job to reach a terminal state");
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    cancel.cancel();
    if let Err(err) = processor_task.await {
        tracing::warn!(%err, "processor task panicked during shutdown");
    }
    engine.monitors.cancel_all();
    engine.monitors.join_all().await;

    let root = engine.store.get_job(&root_id).context("root job vanished from the store")?;
    let children = engine.store.list_child_jobs(&root_id);
    crate::output::print_job_tree(&root, &children);

    if root.status == gantry_core::JobStatus::Completed {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
