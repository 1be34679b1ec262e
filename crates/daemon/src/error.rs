// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("could not determine state directory (set GANTRY_STATE_DIR or HOME)")]
    NoStateDir,

    #[error("failed to acquire lock at {0}: daemon already running?")]
    LockFailed(PathBuf, #[source] std::io::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] gantry_store::StoreError),

    #[error("worker registration error: {0}")]
    Worker(#[from] gantry_workers::WorkerError),

    #[error("manager registration error: {0}")]
    Manager(#[from] gantry_managers::ManagerError),
}
