// SPDX-License-Identifier: MIT

use gantry_core::JobId;
use thiserror::Error;

/// Error surface for `Orchestrator::submit`. Most variants
/// are recorded on the orchestrating parent via `set_job_error` before
/// being returned, so this is mainly a signal for the caller, not the
/// source of truth.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("job {0}: step {1:?} has no registered manager for action {2:?}")]
    UnknownManager(JobId, String, String),

    #[error("job {0}: step {1:?} failed: {2}")]
    StepFailed(JobId, String, String),

    #[error("job {0}: error tolerance exceeded, aborting orchestration")]
    ToleranceExceeded(JobId),

    #[error("manager error: {0}")]
    Manager(#[from] gantry_managers::ManagerError),

    #[error("store error: {0}")]
    Store(#[from] gantry_store::StoreError),
}
