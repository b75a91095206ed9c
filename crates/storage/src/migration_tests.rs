// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

struct AddUpdatedAt;

impl Migration for AddUpdatedAt {
    fn source_version(&self) -> u32 {
        1
    }
    fn target_version(&self) -> u32 {
        2
    }
    fn migrate(&self, document: &mut Value) -> Result<(), MigrationError> {
        if let Some(obj) = document.as_object_mut() {
            obj.entry("updatedAt").or_insert_with(|| json!(0));
        }
        Ok(())
    }
}

#[test]
fn no_op_when_already_at_target() {
    let registry = MigrationRegistry::new();
    let document = json!({"version": 2, "jobs": {}});
    let out = registry.migrate_to(document.clone(), 2).unwrap();
    assert_eq!(out, document);
}

#[test]
fn missing_version_defaults_to_1() {
    let registry = MigrationRegistry::new().register(Box::new(AddUpdatedAt));
    let document = json!({"jobs": {}});
    let out = registry.migrate_to(document, 2).unwrap();
    assert_eq!(out["version"], 2);
    assert_eq!(out["updatedAt"], 0);
}

#[test]
fn preserves_unknown_fields() {
    let registry = MigrationRegistry::new().register(Box::new(AddUpdatedAt));
    let document = json!({"version": 1, "jobs": {}, "futureField": "kept"});
    let out = registry.migrate_to(document, 2).unwrap();
    assert_eq!(out["futureField"], "kept");
}

#[test]
fn too_new_is_rejected() {
    let registry = MigrationRegistry::new();
    let document = json!({"version": 5});
    let err = registry.migrate_to(document, 1).unwrap_err();
    assert!(matches!(err, MigrationError::TooNew(5, 1)));
}

#[test]
fn no_path_when_step_missing() {
    let registry = MigrationRegistry::new();
    let document = json!({"version": 1});
    let err = registry.migrate_to(document, 3).unwrap_err();
    assert!(matches!(err, MigrationError::NoPath(1, 3)));
}

#[test]
fn step_is_idempotent_on_already_migrated_field() {
    let registry = MigrationRegistry::new().register(Box::new(AddUpdatedAt));
    let document = json!({"version": 1, "updatedAt": 42});
    let out = registry.migrate_to(document, 2).unwrap();
    assert_eq!(out["updatedAt"], 42);
}
