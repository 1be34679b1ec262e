// SPDX-License-Identifier: MIT

//! The job-definition orchestrator: the entry point that walks a
//! definition's steps, dispatches them to step managers, and decides the
//! root parent's post-dispatch lifecycle.

use crate::error::OrchestratorError;
use crate::monitor::MonitorPool;
use gantry_core::{
    Clock, ErrorTolerance, FailureAction, Job, JobDefinition, JobId, JobStatus, JsonMap, LogLevel,
    OnError, Step, SystemClock,
};
use gantry_managers::{ManagerContext, ManagerRegistry};
use gantry_queue::Queue;
use gantry_store::JobStore;
use serde_json::json;
use tracing::{info, warn};

/// Orchestrates one job definition into a root parent job plus however
/// many descendants its steps' managers spawn.
#[derive(Clone)]
pub struct Orchestrator {
    store: JobStore,
    queue: Queue,
    bus: gantry_bus::EventBus,
    managers: std::sync::Arc<ManagerRegistry>,
    monitors: std::sync::Arc<MonitorPool>,
}

impl Orchestrator {
    pub fn new(
        store: JobStore,
        queue: Queue,
        bus: gantry_bus::EventBus,
        managers: std::sync::Arc<ManagerRegistry>,
        monitors: std::sync::Arc<MonitorPool>,
    ) -> Self {
        Self { store, queue, bus, managers, monitors }
    }

    /// Submit `definition` for execution. Returns
    /// the root parent's id once dispatch has completed — the parent
    /// itself may still be `running` under the monitor when this
    /// returns.
    pub async fn submit(&self, definition: &JobDefinition) -> Result<JobId, OrchestratorError> {
        let root_id = JobId::new();
        let now_ms = SystemClock.epoch_ms();

        // Step 1: mint the root parent, pending, progress_total = step count.
        let mut parent = Job::new_root(root_id, "parent", definition.name.clone(), now_ms);
        parent.progress_total = definition.steps.len() as u64;
        self.store.create_job_record(parent)?;

        // Step 2: metadata before any child is enqueued so crawler auth
        // lookups never race.
        let mut metadata = JsonMap::new();
        if let Some(auth_id) = &definition.auth_id {
            metadata.insert("auth_id".to_string(), json!(auth_id));
        }
        metadata.insert("job_definition_id".to_string(), json!(definition.id.as_str()));
        metadata.insert("phase".to_string(), json!("execution"));
        self.store.update_job_metadata(root_id, metadata)?;

        // Step 3: config — step configs indexed by step number, plus
        // definition-level fields.
        let mut config = JsonMap::new();
        for (i, step) in definition.steps.iter().enumerate() {
            config.insert(format!("step_{i}"), json!(step.config));
        }
        config.insert("definition_type".to_string(), json!(definition.definition_type));
        if let Some(source_type) = &definition.source_type {
            config.insert("source_type".to_string(), json!(source_type));
        }
        if let Some(base_url) = &definition.base_url {
            config.insert("base_url".to_string(), json!(base_url));
        }
        self.store.update_job_config(root_id, config)?;

        // Step 4: transition to running.
        self.store.update_job_status(root_id, JobStatus::Running)?;

        let ctx = ManagerContext {
            store: self.store.clone(),
            queue: self.queue.clone(),
            bus: self.bus.clone(),
            monitor_spawner: self.monitors.clone(),
        };

        // Step 5: run steps in order.
        let mut has_child_jobs = false;
        let step_count = definition.steps.len() as u64;
        for (i, step) in definition.steps.iter().enumerate() {
            let Some(manager) = self.managers.get(&step.action) else {
                let message = format!("no manager registered for action {:?}", step.action);
                warn!(job_id = %root_id, step = %step.name, %message, "orchestration step failed");
                self.store.set_job_error(root_id, message)?;
                if step.on_error == OnError::Fail {
                    self.fail(root_id)?;
                    return Err(OrchestratorError::UnknownManager(
                        root_id,
                        step.name.clone(),
                        step.action.clone(),
                    ));
                }
                if self.tolerance_exceeded(definition, root_id, step)? {
                    self.fail(root_id)?;
                    return Err(OrchestratorError::ToleranceExceeded(root_id));
                }
                continue;
            };

            match manager.create_parent_job(&ctx, step, definition, root_id).await {
                Ok(_child_ids) => {
                    if manager.returns_child_jobs() {
                        has_child_jobs = true;
                    }
                    self.store.update_job_progress(root_id, i as u64 + 1, step_count)?;
                }
                Err(err) => {
                    let message = err.to_string();
                    warn!(job_id = %root_id, step = %step.name, %message, "orchestration step failed");
                    self.store.set_job_error(root_id, message.clone())?;
                    if step.on_error == OnError::Fail {
                        self.fail(root_id)?;
                        return Err(OrchestratorError::StepFailed(root_id, step.name.clone(), message));
                    }
                    if self.tolerance_exceeded(definition, root_id, step)? {
                        self.fail(root_id)?;
                        return Err(OrchestratorError::ToleranceExceeded(root_id));
                    }
                }
            }
        }

        // Step 6: hand off to the monitor, or finish immediately.
        if has_child_jobs {
            self.monitors.spawn_monitor(root_id).await;
        } else {
            info!(job_id = %root_id, "orchestration produced no child jobs, completing immediately");
            self.store.update_job_status(root_id, JobStatus::Completed)?;
            self.store.set_job_finished(root_id)?;
        }

        Ok(root_id)
    }

    fn fail(&self, root_id: JobId) -> Result<(), OrchestratorError> {
        self.store.update_job_status(root_id, JobStatus::Failed)?;
        self.store.set_job_finished(root_id)?;
        Ok(())
    }

    /// Error-tolerance evaluation: after any
    /// step-level error with a configured tolerance whose
    /// `max_child_failures > 0`, check the failed-child count against the
    /// threshold and apply `failure_action`. Returns `true` iff the
    /// orchestrator must abort with `failed`.
    fn tolerance_exceeded(
        &self,
        definition: &JobDefinition,
        root_id: JobId,
        step: &Step,
    ) -> Result<bool, OrchestratorError> {
        let Some(ErrorTolerance { max_child_failures, failure_action }) = definition.error_tolerance
        else {
            return Ok(false);
        };
        if max_child_failures == 0 {
            return Ok(false);
        }
        let failed = self.store.get_failed_child_count(&root_id);
        if failed < max_child_failures {
            return Ok(false);
        }
        match failure_action {
            FailureAction::StopAll => Ok(true),
            FailureAction::MarkWarning => {
                let message = format!(
                    "step {:?}: error tolerance threshold reached ({failed} >= {max_child_failures}), continuing with warning",
                    step.name
                );
                self.store.add_job_log(root_id, LogLevel::Warn, message)?;
                Ok(false)
            }
            FailureAction::Continue => Ok(false),
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
