// SPDX-License-Identifier: MIT

//! Materialized state rebuilt by replaying [`StoreEvent`]s from the WAL.

mod jobs;

use crate::event::StoreEvent;
use gantry_core::{ChildJobStats, Job, JobId, JobLogEntry};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// In-memory projection of every store mutation applied so far.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub(crate) jobs: HashMap<String, Job>,
    /// parent_id -> child job ids, in creation order.
    pub(crate) children: HashMap<String, Vec<String>>,
    pub(crate) job_logs: HashMap<String, Vec<JobLogEntry>>,
    pub(crate) job_seen_urls: HashMap<String, HashSet<String>>,
}

impl MaterializedState {
    pub fn get_job(&self, id: &JobId) -> Option<&Job> {
        self.jobs.get(id.as_str())
    }

    pub fn list_parent_jobs(&self, limit: usize, offset: usize) -> Vec<Job> {
        let mut parents: Vec<&Job> = self.jobs.values().filter(|j| j.is_root()).collect();
        parents.sort_by_key(|j| j.created_at_ms);
        parents.into_iter().skip(offset).take(limit).cloned().collect()
    }

    pub fn list_child_jobs(&self, parent_id: &JobId) -> Vec<Job> {
        self.children
            .get(parent_id.as_str())
            .into_iter()
            .flatten()
            .filter_map(|id| self.jobs.get(id.as_str()))
            .cloned()
            .collect()
    }

    pub fn child_job_stats(&self, parent_id: &JobId) -> ChildJobStats {
        use gantry_core::JobStatus::*;
        let mut stats = ChildJobStats::default();
        for job in self.list_child_jobs(parent_id) {
            stats.total += 1;
            match job.status {
                Pending => stats.pending += 1,
                Running => stats.running += 1,
                Completed => stats.completed += 1,
                Failed => stats.failed += 1,
                Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }

    pub fn failed_child_count(&self, parent_id: &JobId) -> u64 {
        self.child_job_stats(parent_id).failed
    }

    pub fn job_logs(&self, job_id: &JobId) -> Vec<JobLogEntry> {
        self.job_logs.get(job_id.as_str()).cloned().unwrap_or_default()
    }

    pub fn document_count(&self, parent_id: &JobId) -> u64 {
        self.jobs
            .get(parent_id.as_str())
            .and_then(|j| j.metadata.get("document_count"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    }

    /// Apply a single store mutation. Idempotent: replaying the same event
    /// twice must leave the state unchanged from applying it once, since
    /// WAL replay after a crash may re-deliver the tail of the log.
    pub fn apply(&mut self, event: &StoreEvent) {
        jobs::apply(self, event);
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
