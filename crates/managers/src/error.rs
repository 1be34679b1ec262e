// SPDX-License-Identifier: MIT

use gantry_core::JobId;
use thiserror::Error;

/// Error surface for `StepManager::create_parent_job`. The
/// orchestrator turns any of these into a `set_job_error` on the
/// orchestrating parent and consults the step's error tolerance.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("step {0:?}: missing required config field {1:?}")]
    MissingConfig(String, &'static str),

    #[error("step {0:?}: invalid config field {1:?}: {2}")]
    InvalidConfig(String, &'static str, String),

    #[error("no manager registered for action {0:?}")]
    UnknownManagerType(String),

    #[error("manager type {0:?} is already registered")]
    DuplicateManagerType(String),

    #[error("job {0}: queue error: {1}")]
    Queue(JobId, String),

    #[error("store error: {0}")]
    Store(#[from] gantry_store::StoreError),
}
