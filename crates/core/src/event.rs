// SPDX-License-Identifier: MIT

//! Event types published on the event bus.
//!
//! Payload keys are part of the external contract and must be preserved verbatim — downstream UI/transformer
//! code matches on them.

use crate::job::JobId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typed event published on the [`crate`] event bus.
///
/// Serializes as `{"type": "event:name", ...fields}`; unknown type tags
/// deserialize to [`Event::Custom`] so downstream consumers added later
/// don't break older publishers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "job_status_change")]
    JobStatusChange {
        job_id: JobId,
        #[serde(default)]
        parent_id: Option<JobId>,
        status: String,
        job_type: String,
    },

    #[serde(rename = "parent_job_progress")]
    ParentJobProgress {
        parent_job_id: JobId,
        progress_current: u64,
        progress_total: u64,
        message: String,
    },

    #[serde(rename = "child_job_stats")]
    ChildJobStats {
        parent_job_id: JobId,
        total: u64,
        pending: u64,
        running: u64,
        completed: u64,
        failed: u64,
        cancelled: u64,
    },

    #[serde(rename = "crawler_job_log")]
    CrawlerJobLog { job_id: JobId, root_parent_id: JobId, level: String, message: String },

    #[serde(rename = "crawler_job_progress")]
    CrawlerJobProgress { job_id: JobId, pages_visited: u64, documents_saved: u64 },

    #[serde(rename = "job_spawn")]
    JobSpawn { parent_job_id: JobId, child_job_id: JobId, job_type: String, discovered_by: JobId },

    #[serde(rename = "document_saved")]
    DocumentSaved {
        parent_job_id: JobId,
        job_id: JobId,
        document_id: String,
        source_type: String,
        #[serde(rename = "timestamp")]
        timestamp_ms: u64,
    },

    #[serde(rename = "collection_triggered")]
    CollectionTriggered { parent_job_id: JobId, source_type: String, detail: Value },

    /// Catch-all for forward compatibility with event types this build
    /// doesn't know about.
    #[serde(other)]
    Custom,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::JobStatusChange { .. } => "job_status_change",
            Event::ParentJobProgress { .. } => "parent_job_progress",
            Event::ChildJobStats { .. } => "child_job_stats",
            Event::CrawlerJobLog { .. } => "crawler_job_log",
            Event::CrawlerJobProgress { .. } => "crawler_job_progress",
            Event::JobSpawn { .. } => "job_spawn",
            Event::DocumentSaved { .. } => "document_saved",
            Event::CollectionTriggered { .. } => "collection_triggered",
            Event::Custom => "custom",
        }
    }

    /// The job this event is primarily about, when it names one. Used to
    /// correlate log lines without a match at every call site.
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            Event::JobStatusChange { job_id, .. } => Some(*job_id),
            Event::CrawlerJobLog { job_id, .. } => Some(*job_id),
            Event::CrawlerJobProgress { job_id, .. } => Some(*job_id),
            Event::DocumentSaved { job_id, .. } => Some(*job_id),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
