// SPDX-License-Identifier: MIT

use gantry_core::JobId;
use thiserror::Error;

/// Error surface for everything a worker's `validate`/`execute` can fail
/// with. The processor turns any of these into a
/// terminal `failed` status write.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("job {0}: missing required config field {1:?}")]
    MissingConfig(JobId, &'static str),

    #[error("job {0}: invalid config field {1:?}: {2}")]
    InvalidConfig(JobId, &'static str, String),

    #[error("no worker registered for type {0:?}")]
    UnknownWorkerType(String),

    #[error("worker type {0:?} is already registered")]
    DuplicateWorkerType(String),

    #[error("document store error: {0}")]
    DocumentStore(String),

    #[error("auth store error: {0}")]
    AuthStore(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("content processing error: {0}")]
    ContentProcessing(String),

    #[error("agent service error: {0}")]
    AgentService(String),

    #[error("maintenance store error: {0}")]
    Maintenance(String),

    #[error("store error: {0}")]
    Store(#[from] gantry_store::StoreError),
}
