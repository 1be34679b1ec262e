// SPDX-License-Identifier: MIT

//! Snapshot schema migrations, applied on load when a snapshot's stored
//! version is older than [`CURRENT_SNAPSHOT_VERSION`].

use crate::error::MigrationError;
use serde_json::Value;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

pub trait Migration: Send + Sync {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError>;
}

#[derive(Default)]
pub struct MigrationRegistry {
    pub(crate) migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Migrate `snapshot` (expected shape `{"v": u32, ...}`) from its
    /// recorded version up to `target`, applying registered migrations in
    /// sequence.
    pub fn migrate_to(&self, mut snapshot: Value, target: u32) -> Result<Value, MigrationError> {
        let mut version = snapshot
            .get("v")
            .and_then(Value::as_u64)
            .map(|v| v as u32)
            .unwrap_or(CURRENT_SNAPSHOT_VERSION);

        if version == target {
            return Ok(snapshot);
        }
        if version > target {
            return Err(MigrationError::TooNew(version, target));
        }

        while version < target {
            let step = self
                .migrations
                .iter()
                .find(|m| m.source_version() == version)
                .ok_or(MigrationError::NoPath(version, target))?;
            step.migrate(&mut snapshot)?;
            version = step.target_version();
            if let Some(obj) = snapshot.as_object_mut() {
                obj.insert("v".to_string(), version.into());
            }
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
