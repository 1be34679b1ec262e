// SPDX-License-Identifier: MIT

//! `JobStore`: the durable, queryable record of every job.
//!
//! Wraps a [`Wal`] and a [`MaterializedState`] behind a single lock so every
//! mutation is atomic per row, and an [`EventBus`] so state transitions the
//! rest of the system cares about (`job_status_change`) go out the moment
//! they commit. The lock is never held across an `.await` — bus publishing
//! happens after it's released.

use crate::error::StoreError;
use crate::event::StoreEvent;
use crate::snapshot::{load_snapshot, save_snapshot};
use crate::state::MaterializedState;
use crate::wal::Wal;
use gantry_bus::EventBus;
use gantry_core::{ChildJobStats, Clock, Event, Job, JobId, JobLogEntry, JobStatus, JsonMap, LogLevel, SystemClock};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

struct Inner {
    wal: Wal,
    state: MaterializedState,
}

#[derive(Clone)]
pub struct JobStore<C: Clock = SystemClock> {
    inner: Arc<Mutex<Inner>>,
    bus: EventBus,
    clock: C,
}

impl JobStore<SystemClock> {
    /// Open (or create) the store at `wal_path`, loading `snapshot_path` and
    /// replaying the WAL tail after it if present.
    pub fn open(
        wal_path: impl AsRef<Path>,
        snapshot_path: Option<&Path>,
        bus: EventBus,
    ) -> Result<Self, StoreError> {
        Self::open_with_clock(wal_path, snapshot_path, bus, SystemClock)
    }
}

impl<C: Clock> JobStore<C> {
    pub fn open_with_clock(
        wal_path: impl AsRef<Path>,
        snapshot_path: Option<&Path>,
        bus: EventBus,
        clock: C,
    ) -> Result<Self, StoreError> {
        let (mut state, processed_seq) = match snapshot_path {
            Some(path) => match load_snapshot(path)? {
                Some(snapshot) => (snapshot.state, snapshot.seq),
                None => (MaterializedState::default(), 0),
            },
            None => (MaterializedState::default(), 0),
        };

        let mut wal = Wal::open(wal_path, processed_seq)?;
        for entry in wal.entries_after(processed_seq)? {
            state.apply(&entry.event);
        }
        wal.mark_processed(wal.write_seq());

        Ok(Self { inner: Arc::new(Mutex::new(Inner { wal, state })), bus, clock })
    }

    /// Write a zstd snapshot of the current state and truncate the WAL up to
    /// the sequence it was taken at.
    pub fn snapshot(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.wal.flush()?;
        let seq = inner.wal.write_seq();
        save_snapshot(path, seq, &inner.state)?;
        inner.wal.mark_processed(seq);
        inner.wal.truncate_before(seq + 1)?;
        Ok(())
    }

    fn persist(&self, inner: &mut Inner, event: StoreEvent) -> Result<(), StoreError> {
        inner.wal.append(&event)?;
        inner.state.apply(&event);
        if inner.wal.needs_flush() {
            inner.wal.flush()?;
        }
        Ok(())
    }

    pub fn create_job_record(&self, job: Job) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.state.get_job(&job.id).is_some() {
            return Err(StoreError::DuplicateJob(job.id));
        }
        self.persist(&mut inner, StoreEvent::JobCreated { job })
    }

    pub fn get_job(&self, id: &JobId) -> Option<Job> {
        self.inner.lock().state.get_job(id).cloned()
    }

    pub fn list_parent_jobs(&self, limit: usize, offset: usize) -> Vec<Job> {
        self.inner.lock().state.list_parent_jobs(limit, offset)
    }

    pub fn list_child_jobs(&self, parent_id: &JobId) -> Vec<Job> {
        self.inner.lock().state.list_child_jobs(parent_id)
    }

    /// Sets `started_at` on first transition to `running`, `finished_at` on
    /// any terminal status, then publishes `job_status_change`.
    pub fn update_job_status(&self, id: JobId, status: JobStatus) -> Result<(), StoreError> {
        let at_ms = self.clock.epoch_ms();
        let (parent_id, job_type) = {
            let mut inner = self.inner.lock();
            let job = inner.state.get_job(&id).ok_or(StoreError::JobNotFound(id))?;
            let snapshot = (job.parent_id, job.job_type.clone());
            self.persist(&mut inner, StoreEvent::StatusChanged { id, status, at_ms })?;
            snapshot
        };
        self.bus.publish(Event::JobStatusChange {
            job_id: id,
            parent_id,
            status: status.to_string(),
            job_type,
        });
        Ok(())
    }

    pub fn update_job_progress(&self, id: JobId, current: u64, total: u64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.state.get_job(&id).is_none() {
            return Err(StoreError::JobNotFound(id));
        }
        self.persist(&mut inner, StoreEvent::ProgressUpdated { id, current, total })
    }

    /// Atomically sets `status=failed`, `error`, and `finished_at`.
    pub fn set_job_error(&self, id: JobId, message: impl Into<String>) -> Result<(), StoreError> {
        let at_ms = self.clock.epoch_ms();
        let mut inner = self.inner.lock();
        if inner.state.get_job(&id).is_none() {
            return Err(StoreError::JobNotFound(id));
        }
        self.persist(&mut inner, StoreEvent::ErrorSet { id, message: message.into(), at_ms })
    }

    /// Sets `finished_at` without touching `status` — for monitored parents
    /// whose overall status the monitor assigns separately.
    pub fn set_job_finished(&self, id: JobId) -> Result<(), StoreError> {
        let at_ms = self.clock.epoch_ms();
        let mut inner = self.inner.lock();
        if inner.state.get_job(&id).is_none() {
            return Err(StoreError::JobNotFound(id));
        }
        self.persist(&mut inner, StoreEvent::Finished { id, at_ms })
    }

    pub fn update_job_config(&self, id: JobId, mapping: JsonMap) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.state.get_job(&id).is_none() {
            return Err(StoreError::JobNotFound(id));
        }
        self.persist(&mut inner, StoreEvent::ConfigUpdated { id, mapping })
    }

    pub fn update_job_metadata(&self, id: JobId, mapping: JsonMap) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.state.get_job(&id).is_none() {
            return Err(StoreError::JobNotFound(id));
        }
        self.persist(&mut inner, StoreEvent::MetadataUpdated { id, mapping })
    }

    pub fn add_job_log(
        &self,
        job_id: JobId,
        level: LogLevel,
        message: impl Into<String>,
    ) -> Result<(), StoreError> {
        let timestamp_ms = self.clock.epoch_ms();
        let entry = JobLogEntry { job_id, timestamp_ms, level, message: message.into() };
        let mut inner = self.inner.lock();
        self.persist(&mut inner, StoreEvent::LogAdded { entry })
    }

    pub fn job_logs(&self, job_id: &JobId) -> Vec<JobLogEntry> {
        self.inner.lock().state.job_logs(job_id)
    }

    pub fn get_child_job_stats(&self, parent_id: &JobId) -> ChildJobStats {
        self.inner.lock().state.child_job_stats(parent_id)
    }

    pub fn get_failed_child_count(&self, parent_id: &JobId) -> u64 {
        self.inner.lock().state.failed_child_count(parent_id)
    }

    pub fn increment_document_count(&self, parent_id: JobId) -> Result<u64, StoreError> {
        let at_ms = self.clock.epoch_ms();
        let mut inner = self.inner.lock();
        if inner.state.get_job(&parent_id).is_none() {
            return Err(StoreError::JobNotFound(parent_id));
        }
        self.persist(&mut inner, StoreEvent::DocumentCountIncremented { parent_id, at_ms })?;
        Ok(inner.state.document_count(&parent_id))
    }

    pub fn get_document_count(&self, parent_id: &JobId) -> u64 {
        self.inner.lock().state.document_count(parent_id)
    }

    /// Insert-if-absent. Returns `true` iff the URL was already marked seen
    /// for this parent job — used by the crawler worker for dedup.
    pub fn mark_url_seen(&self, parent_id: JobId, url: impl Into<String>) -> Result<bool, StoreError> {
        let url = url.into();
        let mut inner = self.inner.lock();
        if inner.state.get_job(&parent_id).is_none() {
            return Err(StoreError::JobNotFound(parent_id));
        }
        let already_seen = inner
            .state
            .job_seen_urls
            .get(parent_id.as_str())
            .is_some_and(|seen| seen.contains(&url));
        if already_seen {
            return Ok(true);
        }
        self.persist(&mut inner, StoreEvent::UrlSeen { parent_id, url })?;
        Ok(false)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
