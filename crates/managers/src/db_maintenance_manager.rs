// SPDX-License-Identifier: MIT

//! Translates a `database_maintenance` step into a monitored
//! `database_maintenance_parent` job plus one `database_maintenance_operation`
//! child per operation.

use crate::error::ManagerError;
use crate::manager::{ManagerContext, StepManager};
use async_trait::async_trait;
use gantry_core::{Clock, Event, Job, JobDefinition, JobId, Step, SystemClock};
use gantry_queue::QueueMessage;
use gantry_workers::{MaintenanceOperation, MaintenancePayload};
use serde_json::Value;

pub struct DatabaseMaintenanceManager;

impl DatabaseMaintenanceManager {
    fn operations(step: &Step) -> Result<Vec<MaintenanceOperation>, ManagerError> {
        let raw = step
            .config
            .get("operations")
            .and_then(Value::as_array)
            .ok_or(ManagerError::MissingConfig(step.name.clone(), "operations"))?;
        raw.iter()
            .map(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| ManagerError::InvalidConfig(step.name.clone(), "operations", e.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl StepManager for DatabaseMaintenanceManager {
    fn manager_type(&self) -> &str {
        "database_maintenance"
    }

    fn returns_child_jobs(&self) -> bool {
        true
    }

    async fn create_parent_job(
        &self,
        ctx: &ManagerContext,
        step: &Step,
        _definition: &JobDefinition,
        orchestrator_parent_id: JobId,
    ) -> Result<Vec<JobId>, ManagerError> {
        let operations = Self::operations(step)?;
        let now_ms = SystemClock.epoch_ms();

        let parent = Job::new_child(
            JobId::new(),
            orchestrator_parent_id,
            "database_maintenance_parent",
            step.name.clone(),
            1,
            Value::Null,
            now_ms,
        );
        ctx.store.create_job_record(parent.clone())?;
        ctx.store.update_job_progress(parent.id, 0, operations.len() as u64)?;

        for operation in operations {
            let payload = MaintenancePayload { operation };
            let child = Job::new_child(
                JobId::new(),
                parent.id,
                "database_maintenance_operation",
                format!("{operation:?}"),
                parent.depth + 1,
                serde_json::to_value(&payload).unwrap_or(Value::Null),
                now_ms,
            );
            ctx.store.create_job_record(child.clone())?;
            ctx.queue.enqueue(QueueMessage::new(
                child.id,
                "database_maintenance_operation",
                serde_json::to_value(&child).unwrap_or(Value::Null),
            ));
            ctx.bus.publish(Event::JobSpawn {
                parent_job_id: parent.id,
                child_job_id: child.id,
                job_type: "database_maintenance_operation".to_string(),
                discovered_by: parent.id,
            });
        }

        ctx.monitor_spawner.spawn_monitor(parent.id).await;
        Ok(vec![parent.id])
    }
}

#[cfg(test)]
#[path = "db_maintenance_manager_tests.rs"]
mod tests;
