// SPDX-License-Identifier: MIT

use super::*;
use serde_json::json;

#[test]
fn migrate_same_version_is_noop() {
    let v1 = json!({"v": 1, "seq": 1, "state": {}});
    let registry = MigrationRegistry::new();
    let result = registry.migrate_to(v1.clone(), 1).unwrap();
    assert_eq!(result, v1);
}

#[test]
fn migrating_to_an_older_version_errors() {
    let v99 = json!({"v": 99, "seq": 1, "state": {}});
    let registry = MigrationRegistry::new();
    assert_eq!(registry.migrate_to(v99, 1).unwrap_err(), MigrationError::TooNew(99, 1));
}

#[test]
fn missing_migration_path_errors() {
    let v1 = json!({"v": 1, "seq": 1, "state": {}});
    let registry = MigrationRegistry::new();
    assert_eq!(registry.migrate_to(v1, 2).unwrap_err(), MigrationError::NoPath(1, 2));
}

struct MockV1ToV2;

impl Migration for MockV1ToV2 {
    fn source_version(&self) -> u32 {
        1
    }
    fn target_version(&self) -> u32 {
        2
    }
    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError> {
        if let Some(obj) = snapshot.as_object_mut() {
            obj.insert("migrated".into(), true.into());
        }
        Ok(())
    }
}

#[test]
fn migration_chain_applies_in_order_and_preserves_other_fields() {
    let mut registry = MigrationRegistry::new();
    registry.migrations.push(Box::new(MockV1ToV2));

    let v1 = json!({"v": 1, "seq": 42, "state": {}});
    let result = registry.migrate_to(v1, 2).unwrap();

    assert_eq!(result["v"], 2);
    assert_eq!(result["seq"], 42);
    assert_eq!(result["migrated"], true);
}
