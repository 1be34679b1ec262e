// SPDX-License-Identifier: MIT

use gantry_core::JobId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job {0} already exists")]
    DuplicateJob(JobId),

    #[error("job {0} not found")]
    JobNotFound(JobId),

    #[error("wal error: {0}")]
    Wal(#[from] WalError),

    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] crate::snapshot::SnapshotError),
}

#[derive(Debug, Error)]
pub enum WalError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("snapshot version {0} is newer than the latest known version {1}")]
    TooNew(u32, u32),

    #[error("no migration path from version {0} to {1}")]
    NoPath(u32, u32),
}
