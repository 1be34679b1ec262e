// SPDX-License-Identifier: MIT

//! The `Worker` trait and its registry.

use crate::error::WorkerError;
use async_trait::async_trait;
use gantry_core::Job;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything a worker needs from outside its own config: cancellation,
/// mostly. Workers honor `cancel` and abort promptly when it fires (spec
/// §5 "Workers are free to perform I/O... they must honor the `ctx`").
#[derive(Clone)]
pub struct WorkerContext {
    pub cancel: CancellationToken,
}

impl WorkerContext {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

/// One unit of dequeued work. Implementors register under a
/// stable [`gantry_core::WorkerType`] string; duplicate registration is an
/// error.
#[async_trait]
pub trait Worker: Send + Sync {
    /// The type tag this worker handles, e.g. `"crawler_url"`.
    fn worker_type(&self) -> &str;

    /// Structural validation of `job`'s payload/config, run by the
    /// processor before `execute`.
    fn validate(&self, job: &Job) -> Result<(), WorkerError>;

    /// Perform the job's work. Implementations must not mark `job` itself
    /// `completed` in the store — the processor does that on `Ok` return
    /// for non-parent job types.
    async fn execute(&self, ctx: &WorkerContext, job: &Job) -> Result<(), WorkerError>;
}

/// Dispatch table from worker type to implementation.
#[derive(Default, Clone)]
pub struct WorkerRegistry {
    workers: HashMap<String, Arc<dyn Worker>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, worker: Arc<dyn Worker>) -> Result<(), WorkerError> {
        let key = worker.worker_type().to_string();
        if self.workers.contains_key(&key) {
            return Err(WorkerError::DuplicateWorkerType(key));
        }
        self.workers.insert(key, worker);
        Ok(())
    }

    pub fn get(&self, worker_type: &str) -> Option<Arc<dyn Worker>> {
        self.workers.get(worker_type).cloned()
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
