// SPDX-License-Identifier: MIT

//! The parent-job monitor: a background supervisor aggregating child-job
//! state into a parent's lifecycle.

use async_trait::async_trait;
use gantry_bus::{BusError, EventBus, Handler};
use gantry_core::{Event, JobId, JobStatus, LogLevel};
use gantry_managers::MonitorSpawner;
use gantry_store::JobStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Message shape used to wake the tick loop early; the payload is
/// irrelevant, only the wake-up matters.
type Wake = ();

struct JobStatusWatcher {
    store: JobStore,
    bus: EventBus,
    parent_id: JobId,
    wake: mpsc::Sender<Wake>,
}

#[async_trait]
impl Handler for JobStatusWatcher {
    async fn handle(&self, event: &Event) -> Result<(), BusError> {
        let Event::JobStatusChange { job_id, parent_id: Some(pid), status, .. } = event else {
            return Ok(());
        };
        if *pid != self.parent_id {
            return Ok(());
        }
        let stats = self.store.get_child_job_stats(&self.parent_id);
        let message = format!("child job {job_id} transitioned to {status}");
        if let Err(err) = self.store.add_job_log(self.parent_id, LogLevel::Info, message.clone()) {
            warn!(parent_id = %self.parent_id, %err, "failed to log child transition");
        }
        self.bus.publish(Event::ParentJobProgress {
            parent_job_id: self.parent_id,
            progress_current: stats.completed + stats.failed + stats.cancelled,
            progress_total: stats.total,
            message,
        });
        let _ = self.wake.try_send(());
        Ok(())
    }
}

struct DocumentSavedWatcher {
    store: JobStore,
    parent_id: JobId,
    wake: mpsc::Sender<Wake>,
}

#[async_trait]
impl Handler for DocumentSavedWatcher {
    async fn handle(&self, event: &Event) -> Result<(), BusError> {
        let Event::DocumentSaved { parent_job_id, .. } = event else {
            return Ok(());
        };
        if *parent_job_id != self.parent_id {
            return Ok(());
        }
        if let Err(err) = self.store.increment_document_count(self.parent_id) {
            warn!(parent_id = %self.parent_id, %err, "failed to increment document count");
        }
        let _ = self.wake.try_send(());
        Ok(())
    }
}

/// Per-parent background supervisor. One instance runs for
/// the lifetime of a single monitored parent job.
pub struct Monitor {
    store: JobStore,
    bus: EventBus,
    parent_id: JobId,
    tick_interval: Duration,
    timeout: Duration,
}

impl Monitor {
    pub fn new(store: JobStore, bus: EventBus, parent_id: JobId) -> Self {
        Self { store, bus, parent_id, tick_interval: DEFAULT_TICK_INTERVAL, timeout: DEFAULT_TIMEOUT }
    }

    pub fn with_intervals(mut self, tick_interval: Duration, timeout: Duration) -> Self {
        self.tick_interval = tick_interval;
        self.timeout = timeout;
        self
    }

    /// Run until the parent reaches a terminal state, the hard timeout
    /// elapses, or `cancel` fires. Subscriptions are established once, up
    /// front.
    pub async fn run(&self, cancel: CancellationToken) {
        let (wake_tx, mut wake_rx) = mpsc::channel(16);

        self.bus.subscribe(
            "job_status_change",
            Arc::new(JobStatusWatcher {
                store: self.store.clone(),
                bus: self.bus.clone(),
                parent_id: self.parent_id,
                wake: wake_tx.clone(),
            }),
        );
        self.bus.subscribe(
            "document_saved",
            Arc::new(DocumentSavedWatcher {
                store: self.store.clone(),
                parent_id: self.parent_id,
                wake: wake_tx.clone(),
            }),
        );

        let deadline = Instant::now() + self.timeout;
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = wake_rx.recv() => {}
                _ = cancel.cancelled() => {
                    self.finalize_cancelled();
                    return;
                }
            }

            if Instant::now() >= deadline {
                self.finalize_timeout();
                return;
            }

            if self.tick().await {
                return;
            }
        }
    }

    /// One evaluation of the child aggregate.
    /// Returns `true` once the parent has been finalized.
    async fn tick(&self) -> bool {
        let stats = self.store.get_child_job_stats(&self.parent_id);
        let message = format!(
            "children: {}/{} terminal (completed={}, failed={}, cancelled={}, running={}, pending={})",
            stats.completed + stats.failed + stats.cancelled,
            stats.total,
            stats.completed,
            stats.failed,
            stats.cancelled,
            stats.running,
            stats.pending
        );
        if let Err(err) = self.store.add_job_log(self.parent_id, LogLevel::Info, message) {
            warn!(parent_id = %self.parent_id, %err, "failed to log monitor tick");
        }
        self.bus.publish(Event::ChildJobStats {
            parent_job_id: self.parent_id,
            total: stats.total,
            pending: stats.pending,
            running: stats.running,
            completed: stats.completed,
            failed: stats.failed,
            cancelled: stats.cancelled,
        });

        // Safety: never finalize while a child is still
        // pending or running — `ChildJobStats::is_terminal` already
        // encodes that (`total > 0 && completed+failed+cancelled ==
        // total`).
        if !stats.is_terminal() {
            return false;
        }

        let status = stats.overall_status();
        info!(parent_id = %self.parent_id, %status, "parent job terminal");
        if let Err(err) = self.store.update_job_status(self.parent_id, status) {
            warn!(parent_id = %self.parent_id, %err, "failed to finalize parent status");
        }
        if let Err(err) = self.store.set_job_finished(self.parent_id) {
            warn!(parent_id = %self.parent_id, %err, "failed to set parent finished");
        }
        true
    }

    fn finalize_cancelled(&self) {
        if let Err(err) = self.store.update_job_status(self.parent_id, JobStatus::Cancelled) {
            warn!(parent_id = %self.parent_id, %err, "failed to mark parent cancelled");
        }
        if let Err(err) = self.store.set_job_finished(self.parent_id) {
            warn!(parent_id = %self.parent_id, %err, "failed to set parent finished");
        }
    }

    fn finalize_timeout(&self) {
        warn!(parent_id = %self.parent_id, "monitor hard timeout elapsed");
        if let Err(err) =
            self.store.set_job_error(self.parent_id, "Timed out waiting for child jobs to complete")
        {
            warn!(parent_id = %self.parent_id, %err, "failed to record monitor timeout");
        }
    }
}

/// Pool of running monitor tasks, one per monitored parent. Implements
/// [`MonitorSpawner`] so step managers and the orchestrator can start a
/// monitor without depending on this crate directly.
#[derive(Clone)]
pub struct MonitorPool {
    store: JobStore,
    bus: EventBus,
    tick_interval: Duration,
    timeout: Duration,
    handles: Arc<parking_lot::Mutex<HashMap<JobId, (CancellationToken, JoinHandle<()>)>>>,
}

impl MonitorPool {
    pub fn new(store: JobStore, bus: EventBus) -> Self {
        Self {
            store,
            bus,
            tick_interval: DEFAULT_TICK_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            handles: Arc::new(parking_lot::Mutex::new(HashMap::new())),
        }
    }

    pub fn with_intervals(mut self, tick_interval: Duration, timeout: Duration) -> Self {
        self.tick_interval = tick_interval;
        self.timeout = timeout;
        self
    }

    /// Cancel a single parent's monitor, if one is running.
    pub fn cancel(&self, parent_id: &JobId) {
        if let Some((cancel, _)) = self.handles.lock().get(parent_id) {
            cancel.cancel();
        }
    }

    /// Cancel every running monitor. Used on process shutdown.
    pub fn cancel_all(&self) {
        for (cancel, _) in self.handles.lock().values() {
            cancel.cancel();
        }
    }

    /// Await every currently tracked monitor task. New spawns that race
    /// with this call are not waited on.
    pub async fn join_all(&self) {
        let handles: Vec<JoinHandle<()>> =
            self.handles.lock().drain().map(|(_, (_, handle))| handle).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }
}

#[async_trait]
impl MonitorSpawner for MonitorPool {
    async fn spawn_monitor(&self, parent_id: JobId) {
        let monitor = Monitor::new(self.store.clone(), self.bus.clone(), parent_id)
            .with_intervals(self.tick_interval, self.timeout);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move { monitor.run(task_cancel).await });
        self.handles.lock().insert(parent_id, (cancel, handle));
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
