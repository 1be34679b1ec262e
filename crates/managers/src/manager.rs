// SPDX-License-Identifier: MIT

//! The `StepManager` trait, its registry, and the collaborators every
//! manager is handed to do its work.

use crate::error::ManagerError;
use async_trait::async_trait;
use gantry_bus::EventBus;
use gantry_core::{JobDefinition, JobId, Step};
use gantry_queue::Queue;
use gantry_store::JobStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Starts background monitoring for a parent job that a manager created
/// beneath the orchestrating parent. Implemented by the orchestrator,
/// which owns the monitor task pool; managers only see this trait to
/// avoid a dependency cycle.
#[async_trait]
pub trait MonitorSpawner: Send + Sync {
    async fn spawn_monitor(&self, parent_id: JobId);
}

/// Everything a manager needs to create a step's job record(s).
#[derive(Clone)]
pub struct ManagerContext {
    pub store: JobStore,
    pub queue: Queue,
    pub bus: EventBus,
    pub monitor_spawner: Arc<dyn MonitorSpawner>,
}

/// One step action, e.g. `"crawl"` or `"database_maintenance"`. A
/// manager creates the step's job record(s), serializes their
/// payloads, and enqueues them; synchronous actions may run inline and
/// return `returns_child_jobs() == false`.
#[async_trait]
pub trait StepManager: Send + Sync {
    /// The `step.action` string this manager handles.
    fn manager_type(&self) -> &str;

    /// Whether the orchestrator must wait on a monitor after this call
    ///.
    fn returns_child_jobs(&self) -> bool;

    async fn create_parent_job(
        &self,
        ctx: &ManagerContext,
        step: &Step,
        definition: &JobDefinition,
        orchestrator_parent_id: JobId,
    ) -> Result<Vec<JobId>, ManagerError>;
}

/// Dispatch table from `step.action` to implementation. Duplicate registration is an
/// error, the same rule spec §4.E fixes for worker registration.
#[derive(Default, Clone)]
pub struct ManagerRegistry {
    managers: HashMap<String, Arc<dyn StepManager>>,
}

impl ManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, manager: Arc<dyn StepManager>) -> Result<(), ManagerError> {
        let key = manager.manager_type().to_string();
        if self.managers.contains_key(&key) {
            return Err(ManagerError::DuplicateManagerType(key));
        }
        self.managers.insert(key, manager);
        Ok(())
    }

    pub fn get(&self, action: &str) -> Option<Arc<dyn StepManager>> {
        self.managers.get(action).cloned()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
