// SPDX-License-Identifier: MIT

//! The `agent` worker: runs an external agent service over a stored
//! document and merges the result into that document's metadata (spec
//! §4.E.2).

use crate::collaborators::{AgentService, DocumentStore};
use crate::error::WorkerError;
use crate::worker::{Worker, WorkerContext};
use async_trait::async_trait;
use gantry_bus::EventBus;
use gantry_core::{Job, JobStatus};
use gantry_store::JobStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPayload {
    pub document_id: String,
    pub agent_type: String,
    #[serde(default)]
    pub extra_params: Value,
}

pub struct AgentWorker {
    store: JobStore,
    bus: EventBus,
    document_store: Arc<dyn DocumentStore>,
    agent_service: Arc<dyn AgentService>,
}

impl AgentWorker {
    pub fn new(
        store: JobStore,
        bus: EventBus,
        document_store: Arc<dyn DocumentStore>,
        agent_service: Arc<dyn AgentService>,
    ) -> Self {
        Self { store, bus, document_store, agent_service }
    }
}

#[async_trait]
impl Worker for AgentWorker {
    fn worker_type(&self) -> &str {
        "agent"
    }

    fn validate(&self, job: &Job) -> Result<(), WorkerError> {
        let payload: AgentPayload = serde_json::from_value(job.payload.clone())
            .map_err(|e| WorkerError::InvalidConfig(job.id, "payload", e.to_string()))?;
        if payload.document_id.is_empty() {
            return Err(WorkerError::MissingConfig(job.id, "document_id"));
        }
        if payload.agent_type.is_empty() {
            return Err(WorkerError::MissingConfig(job.id, "agent_type"));
        }
        Ok(())
    }

    async fn execute(&self, _ctx: &WorkerContext, job: &Job) -> Result<(), WorkerError> {
        let payload: AgentPayload = serde_json::from_value(job.payload.clone())
            .map_err(|e| WorkerError::InvalidConfig(job.id, "payload", e.to_string()))?;

        self.store.update_job_status(job.id, JobStatus::Running)?;

        let mut document = self
            .document_store
            .get_document(&payload.document_id)
            .await
            .map_err(|e| WorkerError::DocumentStore(e.to_string()))?
            .ok_or_else(|| {
                WorkerError::InvalidConfig(job.id, "document_id", format!("no document {}", payload.document_id))
            })?;

        let result = self
            .agent_service
            .run(&payload.document_id, &document.content_markdown, &payload.extra_params)
            .await
            .map_err(|e| {
                let message = e.to_string();
                let _ = self.store.set_job_error(job.id, message.clone());
                WorkerError::AgentService(message)
            })?;

        document
            .metadata
            .insert(payload.agent_type.clone(), serde_json::to_value(result).unwrap_or(Value::Null));
        self.document_store
            .update_document(document)
            .await
            .map_err(|e| WorkerError::DocumentStore(e.to_string()))?;

        let root_parent_id = job.parent_id.unwrap_or(job.id);
        self.bus
            .publish_sync(gantry_core::Event::DocumentSaved {
                parent_job_id: root_parent_id,
                job_id: job.id,
                document_id: payload.document_id,
                source_type: payload.agent_type,
                timestamp_ms: gantry_core::Clock::epoch_ms(&gantry_core::SystemClock),
            })
            .await;

        Ok(())
    }
}

#[cfg(test)]
#[path = "agent_worker_tests.rs"]
mod tests;
