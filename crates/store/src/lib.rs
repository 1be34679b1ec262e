// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gantry-store: the durable job record. Every mutation is
//! appended to a write-ahead log before it's applied to the in-memory
//! [`MaterializedState`], and periodic zstd snapshots let recovery skip
//! replaying the full history.

mod error;
mod event;
mod migration;
mod snapshot;
mod state;
mod store;
mod wal;

pub use error::{MigrationError, SnapshotError, StoreError, WalError};
pub use event::StoreEvent;
pub use migration::{Migration, MigrationRegistry, CURRENT_SNAPSHOT_VERSION};
pub use snapshot::{load_snapshot, save_snapshot, Snapshot};
pub use state::MaterializedState;
pub use store::JobStore;
pub use wal::{Wal, WalEntry};
