// SPDX-License-Identifier: MIT

//! Periodic zstd-compressed snapshots of [`MaterializedState`], so restart
//! doesn't have to replay the entire WAL history.
//!
//! A snapshot records the WAL sequence number it was taken at; recovery loads
//! the snapshot (migrating it up to [`CURRENT_SNAPSHOT_VERSION`] if it's
//! older) and replays only the WAL entries after that sequence.

use crate::error::MigrationError;
use crate::migration::{MigrationRegistry, CURRENT_SNAPSHOT_VERSION};
use crate::state::MaterializedState;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    pub seq: u64,
    pub state: MaterializedState,
}

const MAX_BAK_FILES: u32 = 3;

/// Write `state` to `path` as a zstd-compressed snapshot, rotating any
/// existing snapshot into `.bak` / `.bak.2` / `.bak.3` first.
pub fn save_snapshot(
    path: impl AsRef<Path>,
    seq: u64,
    state: &MaterializedState,
) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    let snapshot = Snapshot { version: CURRENT_SNAPSHOT_VERSION, seq, state: state.clone() };
    let json = serde_json::to_vec(&snapshot)?;

    if path.exists() {
        rotate_bak_path(path);
    }

    let tmp_path = path.with_extension("tmp");
    let file = File::create(&tmp_path)?;
    let mut encoder = zstd::stream::Encoder::new(file, 3)?;
    encoder.write_all(&json)?;
    encoder.finish()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load and decompress the snapshot at `path`, migrating it up to
/// [`CURRENT_SNAPSHOT_VERSION`] if it's an older schema. Returns `None` if
/// no snapshot file exists yet.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Option<Snapshot>, SnapshotError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)?;
    let decoder = zstd::stream::Decoder::new(file)?;
    let raw: serde_json::Value = serde_json::from_reader(decoder)?;

    let registry = MigrationRegistry::new();
    let migrated = registry.migrate_to(raw, CURRENT_SNAPSHOT_VERSION)?;
    let snapshot: Snapshot = serde_json::from_value(migrated)?;
    Ok(Some(snapshot))
}

/// Rotate `path` to `.bak`, shifting existing backups up and dropping the
/// oldest once [`MAX_BAK_FILES`] is reached.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    let dest = bak(1);
    let _ = fs::rename(path, &dest);
    dest
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
