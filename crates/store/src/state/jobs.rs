// SPDX-License-Identifier: MIT

//! Applies [`StoreEvent`] variants to [`MaterializedState`].

use super::MaterializedState;
use crate::event::StoreEvent;
use gantry_core::{merge_json_map, JobStatus};

pub(crate) fn apply(state: &mut MaterializedState, event: &StoreEvent) {
    match event {
        StoreEvent::JobCreated { job } => {
            if state.jobs.contains_key(job.id.as_str()) {
                return;
            }
            if let Some(parent_id) = job.parent_id {
                state.children.entry(parent_id.as_str().to_string()).or_default().push(
                    job.id.as_str().to_string(),
                );
            }
            state.jobs.insert(job.id.as_str().to_string(), job.clone());
        }

        StoreEvent::StatusChanged { id, status, at_ms } => {
            if let Some(job) = state.jobs.get_mut(id.as_str()) {
                if job.status == *status {
                    return;
                }
                if *status == JobStatus::Running && job.started_at_ms.is_none() {
                    job.started_at_ms = Some(*at_ms);
                }
                if status.is_terminal() && job.finished_at_ms.is_none() {
                    job.finished_at_ms = Some(*at_ms);
                }
                job.status = *status;
            }
        }

        StoreEvent::ProgressUpdated { id, current, total } => {
            if let Some(job) = state.jobs.get_mut(id.as_str()) {
                job.progress_current = *current;
                job.progress_total = *total;
            }
        }

        StoreEvent::ErrorSet { id, message, at_ms } => {
            if let Some(job) = state.jobs.get_mut(id.as_str()) {
                job.status = JobStatus::Failed;
                job.error = Some(message.clone());
                if job.finished_at_ms.is_none() {
                    job.finished_at_ms = Some(*at_ms);
                }
            }
        }

        StoreEvent::Finished { id, at_ms } => {
            if let Some(job) = state.jobs.get_mut(id.as_str()) {
                if job.finished_at_ms.is_none() {
                    job.finished_at_ms = Some(*at_ms);
                }
            }
        }

        StoreEvent::ConfigUpdated { id, mapping } => {
            if let Some(job) = state.jobs.get_mut(id.as_str()) {
                merge_json_map(&mut job.config, mapping.clone());
            }
        }

        StoreEvent::MetadataUpdated { id, mapping } => {
            if let Some(job) = state.jobs.get_mut(id.as_str()) {
                merge_json_map(&mut job.metadata, mapping.clone());
            }
        }

        StoreEvent::LogAdded { entry } => {
            state.job_logs.entry(entry.job_id.as_str().to_string()).or_default().push(
                entry.clone(),
            );
        }

        StoreEvent::DocumentCountIncremented { parent_id, .. } => {
            if let Some(job) = state.jobs.get_mut(parent_id.as_str()) {
                let current =
                    job.metadata.get("document_count").and_then(|v| v.as_u64()).unwrap_or(0);
                job.metadata.insert(
                    "document_count".to_string(),
                    serde_json::Value::from(current + 1),
                );
            }
        }

        StoreEvent::UrlSeen { parent_id, url } => {
            state
                .job_seen_urls
                .entry(parent_id.as_str().to_string())
                .or_default()
                .insert(url.clone());
        }
    }
}
