// SPDX-License-Identifier: MIT

//! The job processor: a single poll loop routing queue messages to
//! registered workers.

use gantry_core::{Job, JobStatus};
use gantry_queue::Queue;
use gantry_store::JobStore;
use gantry_workers::{Worker, WorkerContext, WorkerRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Dequeues one message at a time and drives it through validate/execute.
/// Run as many instances as desired for throughput — each owns its
/// message until it calls the delivery's delete handle.
#[derive(Clone)]
pub struct Processor {
    store: JobStore,
    queue: Queue,
    workers: Arc<WorkerRegistry>,
    poll_timeout: Duration,
}

impl Processor {
    pub fn new(store: JobStore, queue: Queue, workers: Arc<WorkerRegistry>, poll_timeout: Duration) -> Self {
        Self { store, queue, workers, poll_timeout }
    }

    /// Run until `cancel` fires. In-flight work finishes before returning;
    /// the processor never abandons a delivery mid-execute.
    pub async fn run(&self, cancel: CancellationToken) {
        loop {
            if cancel.is_cancelled() {
                return;
            }
            let Some(delivery) = self.queue.receive(self.poll_timeout, &cancel).await else {
                continue;
            };
            let ctx = WorkerContext::new(cancel.clone());
            self.process(&delivery.message.payload, &ctx).await;
            if let Err(err) = delivery.delete() {
                warn!(%err, "failed to delete processed queue message");
            }
        }
    }

    /// One iteration of the loop's body, split out
    /// so it can be driven directly in tests without a live queue.
    async fn process(&self, raw_payload: &serde_json::Value, ctx: &WorkerContext) {
        let job: Job = match serde_json::from_value(raw_payload.clone()) {
            Ok(job) => job,
            Err(err) => {
                warn!(%err, "queue message did not deserialize to a job, dropping");
                return;
            }
        };

        let worker = match self.workers.get(&job.job_type) {
            Some(worker) => worker,
            None => {
                self.fail_validation(&job, format!("no worker registered for type {:?}", job.job_type));
                return;
            }
        };

        if let Err(err) = worker.validate(&job) {
            self.fail_validation(&job, err.to_string());
            return;
        }

        info!(job_id = %job.id, job_type = %job.job_type, "executing job");
        if let Err(err) = worker.execute(ctx, &job).await {
            warn!(job_id = %job.id, job_type = %job.job_type, %err, "job execution failed");
            if let Err(err) = self.store.update_job_status(job.id, JobStatus::Failed) {
                error!(job_id = %job.id, %err, "failed to mark job failed");
            }
            if let Err(err) = self.store.set_job_finished(job.id) {
                error!(job_id = %job.id, %err, "failed to set job finished");
            }
            return;
        }

        // Parents are finalized by the monitor once their children settle
        //.
        if job.job_type != "parent" {
            if let Err(err) = self.store.update_job_status(job.id, JobStatus::Completed) {
                error!(job_id = %job.id, %err, "failed to mark job completed");
                return;
            }
            if let Err(err) = self.store.set_job_finished(job.id) {
                error!(job_id = %job.id, %err, "failed to set job finished");
            }
        }
    }

    /// Step 4/5 failure path: missing worker or a validation error. Both
    /// are fatal for the message, never redelivered.
    fn fail_validation(&self, job: &Job, message: String) {
        warn!(job_id = %job.id, job_type = %job.job_type, %message, "job failed validation");
        if let Err(err) = self.store.set_job_error(job.id, message) {
            error!(job_id = %job.id, %err, "failed to record job error");
        }
        if let Err(err) = self.store.update_job_status(job.id, JobStatus::Failed) {
            error!(job_id = %job.id, %err, "failed to mark job failed");
        }
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
