// SPDX-License-Identifier: MIT

//! Wires the job store, bus, queue, worker/manager registries, monitor
//! pool, orchestrator, and processor into one running engine. External collaborators (browser, document store, auth store,
//! agent service, maintenance store) are out of scope for this system, so
//! the engine wires the in-memory fakes the same way the teacher's own
//! test harness does — they are the production implementation here, not
//! a test double standing in for one.

use crate::config::Config;
use crate::error::DaemonError;
use gantry_bus::EventBus;
use gantry_managers::ManagerRegistry;
use gantry_orchestrator::{MonitorPool, Orchestrator, Processor};
use gantry_queue::Queue;
use gantry_store::JobStore;
use gantry_workers::fakes::{
    FakeAgentService, FakeAuthStore, FakeBrowserFactory, FakeContentProcessor, FakeDocumentStore,
    FakeJobDefinitionStore, FakeMaintenanceStore,
};
use gantry_workers::{AgentWorker, CrawlerWorker, DbMaintenanceWorker, WorkerRegistry};
use std::sync::Arc;

pub struct Engine {
    pub store: JobStore,
    pub queue: Queue,
    pub bus: EventBus,
    pub monitors: Arc<MonitorPool>,
    pub orchestrator: Orchestrator,
    pub processor: Processor,
}

impl Engine {
    pub fn build(config: &Config) -> Result<Self, DaemonError> {
        std::fs::create_dir_all(&config.state_dir)?;

        let bus = EventBus::new();
        let snapshot_path =
            if config.snapshot_path.exists() { Some(config.snapshot_path.as_path()) } else { None };
        let store = JobStore::open(&config.wal_path, snapshot_path, bus.clone())?;
        let queue = Queue::default();

        let document_store = Arc::new(FakeDocumentStore::default());
        let auth_store = Arc::new(FakeAuthStore::default());
        let job_definition_store = Arc::new(FakeJobDefinitionStore::default());

        let mut workers = WorkerRegistry::new();
        workers.register(Arc::new(CrawlerWorker::new(
            store.clone(),
            queue.clone(),
            bus.clone(),
            Arc::new(FakeBrowserFactory::new(Default::default())),
            Arc::new(FakeContentProcessor),
            document_store.clone(),
            auth_store,
            job_definition_store,
            config.crawl_render_delay,
        )))?;
        workers.register(Arc::new(AgentWorker::new(
            store.clone(),
            bus.clone(),
            document_store,
            Arc::new(FakeAgentService),
        )))?;
        workers.register(Arc::new(DbMaintenanceWorker::new(
            store.clone(),
            Arc::new(FakeMaintenanceStore::default()),
        )))?;

        let mut managers = ManagerRegistry::new();
        managers.register(Arc::new(gantry_managers::CrawlerManager))?;
        managers.register(Arc::new(gantry_managers::DatabaseMaintenanceManager))?;

        let monitors = Arc::new(
            MonitorPool::new(store.clone(), bus.clone())
                .with_intervals(config.monitor_tick, config.monitor_timeout),
        );
        let orchestrator =
            Orchestrator::new(store.clone(), queue.clone(), bus.clone(), Arc::new(managers), monitors.clone());
        let processor = Processor::new(store.clone(), queue.clone(), Arc::new(workers), config.queue_poll);

        Ok(Self { store, queue, bus, monitors, orchestrator, processor })
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
