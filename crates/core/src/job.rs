// SPDX-License-Identifier: MIT

//! Job identifier, status, and the persistent job record.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for a job instance.
    ///
    /// Root parents and their descendants all get one of these; a non-root
    /// job's [`Job::parent_id`] references an existing job's id.
    pub struct JobId("job-");
}

/// Status of a job in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// `true` for `completed`, `failed`, and `cancelled`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// Which layer of the system produced a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Execution,
    Core,
    Orchestration,
}

crate::simple_display! {
    JobPhase {
        Execution => "execution",
        Core => "core",
        Orchestration => "orchestration",
    }
}

/// Free-form mapping used for `config` and `metadata`. `IndexMap`
/// preserves the insertion order callers build it with, which matters when
/// a step's numeric-index config keys are displayed or logged.
pub type JsonMap = IndexMap<String, Value>;

/// Merge `incoming` into `base`, overwriting keys present in both — the
/// shape every `update_job_config`/`update_job_metadata` call needs.
pub fn merge_json_map(base: &mut JsonMap, incoming: JsonMap) {
    for (k, v) in incoming {
        base.insert(k, v);
    }
}

/// A job: the persistent record of one unit of work, whether a root
/// parent, a step manager's child, or a crawler worker's spawned child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub parent_id: Option<JobId>,
    /// Worker/manager type tag (e.g. `"crawler_url"`, `"parent"`, `"agent"`).
    pub job_type: String,
    pub name: String,
    pub phase: JobPhase,
    pub status: JobStatus,
    pub created_at_ms: u64,
    #[serde(default)]
    pub started_at_ms: Option<u64>,
    #[serde(default)]
    pub finished_at_ms: Option<u64>,
    #[serde(default)]
    pub progress_current: u64,
    #[serde(default)]
    pub progress_total: u64,
    /// Serialized worker input. Opaque to everything except the worker that
    /// knows how to decode it.
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    /// 0 for root jobs, parent's depth + 1 otherwise.
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub config: JsonMap,
    #[serde(default)]
    pub metadata: JsonMap,
}

impl Job {
    /// Build a new root parent job: no `parent_id`, depth 0, `pending`.
    pub fn new_root(
        id: JobId,
        job_type: impl Into<String>,
        name: impl Into<String>,
        created_at_ms: u64,
    ) -> Self {
        Self {
            id,
            parent_id: None,
            job_type: job_type.into(),
            name: name.into(),
            phase: JobPhase::Orchestration,
            status: JobStatus::Pending,
            created_at_ms,
            started_at_ms: None,
            finished_at_ms: None,
            progress_current: 0,
            progress_total: 0,
            payload: Value::Null,
            result: None,
            error: None,
            depth: 0,
            config: JsonMap::new(),
            metadata: JsonMap::new(),
        }
    }

    /// Build a new child job under `parent_id`.
    #[allow(clippy::too_many_arguments)]
    pub fn new_child(
        id: JobId,
        parent_id: JobId,
        job_type: impl Into<String>,
        name: impl Into<String>,
        depth: u32,
        payload: Value,
        created_at_ms: u64,
    ) -> Self {
        Self {
            id,
            parent_id: Some(parent_id),
            job_type: job_type.into(),
            name: name.into(),
            phase: JobPhase::Execution,
            status: JobStatus::Pending,
            created_at_ms,
            started_at_ms: None,
            finished_at_ms: None,
            progress_current: 0,
            progress_total: 0,
            payload,
            result: None,
            error: None,
            depth,
            config: JsonMap::new(),
            metadata: JsonMap::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// One append-only line of a job's log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLogEntry {
    pub job_id: JobId,
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

crate::simple_display! {
    LogLevel {
        Debug => "debug",
        Info => "info",
        Warn => "warn",
        Error => "error",
    }
}

/// Aggregate child-job counts for a parent.
/// Derived on every call, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildJobStats {
    pub total: u64,
    pub pending: u64,
    pub running: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
}

impl ChildJobStats {
    /// All children exist and have all reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.total > 0 && self.completed + self.failed + self.cancelled == self.total
    }

    /// Overall status to assign the parent once `is_terminal()` holds:
    /// failed if any child failed, cancelled if every child was
    /// cancelled, otherwise completed.
    pub fn overall_status(&self) -> JobStatus {
        if self.failed > 0 {
            JobStatus::Failed
        } else if self.cancelled == self.total {
            JobStatus::Cancelled
        } else {
            JobStatus::Completed
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
