// SPDX-License-Identifier: MIT

//! The `database_maintenance_operation` worker: dispatches a single
//! maintenance primitive against the document store.

use crate::collaborators::MaintenanceStore;
use crate::error::WorkerError;
use crate::worker::{Worker, WorkerContext};
use async_trait::async_trait;
use gantry_core::{Job, JobStatus, LogLevel};
use gantry_store::JobStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceOperation {
    Vacuum,
    Analyze,
    Reindex,
    Optimize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenancePayload {
    pub operation: MaintenanceOperation,
}

pub struct DbMaintenanceWorker {
    store: JobStore,
    maintenance_store: Arc<dyn MaintenanceStore>,
}

impl DbMaintenanceWorker {
    pub fn new(store: JobStore, maintenance_store: Arc<dyn MaintenanceStore>) -> Self {
        Self { store, maintenance_store }
    }

    /// `reindex` enumerates user indexes and reindexes each; per-index
    /// failures are logged and skipped, never fatal for the job (spec
    /// §4.E.3).
    async fn reindex_all(&self, job: &Job) -> Result<(), WorkerError> {
        let indexes = self
            .maintenance_store
            .list_indexes()
            .await
            .map_err(|e| WorkerError::Maintenance(e.to_string()))?;
        for index_name in indexes {
            if let Err(err) = self.maintenance_store.reindex(&index_name).await {
                let _ = self.store.add_job_log(
                    job.id,
                    LogLevel::Warn,
                    format!("reindex failed for {index_name}: {err}"),
                );
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Worker for DbMaintenanceWorker {
    fn worker_type(&self) -> &str {
        "database_maintenance_operation"
    }

    fn validate(&self, job: &Job) -> Result<(), WorkerError> {
        serde_json::from_value::<MaintenancePayload>(job.payload.clone())
            .map_err(|e| WorkerError::InvalidConfig(job.id, "operation", e.to_string()))?;
        Ok(())
    }

    async fn execute(&self, _ctx: &WorkerContext, job: &Job) -> Result<(), WorkerError> {
        let payload: MaintenancePayload = serde_json::from_value(job.payload.clone())
            .map_err(|e| WorkerError::InvalidConfig(job.id, "operation", e.to_string()))?;

        self.store.update_job_status(job.id, JobStatus::Running)?;

        let result = match payload.operation {
            MaintenanceOperation::Vacuum => self.maintenance_store.vacuum().await,
            MaintenanceOperation::Analyze => self.maintenance_store.analyze().await,
            MaintenanceOperation::Optimize => self.maintenance_store.optimize().await,
            MaintenanceOperation::Reindex => return self.reindex_all(job).await,
        };

        result.map_err(|e| WorkerError::Maintenance(e.to_string()))
    }
}

#[cfg(test)]
#[path = "db_maintenance_tests.rs"]
mod tests;
