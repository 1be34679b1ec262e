// SPDX-License-Identifier: MIT

//! The store's own write-ahead log operations.
//!
//! Distinct from [`gantry_core::Event`], which is the typed notification
//! published on the bus for external subscribers — `StoreEvent` is the
//! durable record of a single store mutation, replayed to rebuild
//! [`crate::state::MaterializedState`] after a restart.

use gantry_core::{JobId, JobLogEntry, JobStatus, JsonMap};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum StoreEvent {
    JobCreated { job: gantry_core::Job },
    StatusChanged { id: JobId, status: JobStatus, at_ms: u64 },
    ProgressUpdated { id: JobId, current: u64, total: u64 },
    ErrorSet { id: JobId, message: String, at_ms: u64 },
    Finished { id: JobId, at_ms: u64 },
    ConfigUpdated { id: JobId, mapping: JsonMap },
    MetadataUpdated { id: JobId, mapping: JsonMap },
    LogAdded { entry: JobLogEntry },
    DocumentCountIncremented { parent_id: JobId, at_ms: u64 },
    UrlSeen { parent_id: JobId, url: String },
}
