// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store-document migration system for schema evolution.
//!
//! Migrations transform the on-disk document JSON from one version to the
//! next. The registry chains additive, idempotent steps to reach the current
//! version. Every step must preserve unknown fields verbatim.

use serde_json::Value;
use thiserror::Error;

/// Current on-disk document version this build writes and can load.
pub const CURRENT_STORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration v{from}->v{to} failed: {reason}")]
    Failed { from: u32, to: u32, reason: String },
    #[error("no migration path from v{0} to v{1}")]
    NoPath(u32, u32),
    #[error("store document version {0} is newer than supported ({1})")]
    TooNew(u32, u32),
}

/// A migration from one document version to the next.
pub trait Migration: Send + Sync {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, document: &mut Value) -> Result<(), MigrationError>;
}

/// Registry of migrations for upgrading store documents.
pub struct MigrationRegistry {
    migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    /// Registry with every migration this build knows about, in order.
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
        }
    }

    pub fn register(mut self, migration: Box<dyn Migration>) -> Self {
        self.migrations.push(migration);
        self
    }

    /// Migrate a document to `target`, reading its current version from the
    /// `version` field (absent ⇒ version 1).
    pub fn migrate_to(&self, mut document: Value, target: u32) -> Result<Value, MigrationError> {
        let current = document
            .get("version")
            .and_then(|v| v.as_u64())
            .unwrap_or(1) as u32;

        if current == target {
            return Ok(document);
        }
        if current > target {
            return Err(MigrationError::TooNew(current, target));
        }

        let mut version = current;
        while version < target {
            let migration = self
                .migrations
                .iter()
                .find(|m| m.source_version() == version)
                .ok_or(MigrationError::NoPath(version, target))?;

            migration.migrate(&mut document)?;
            version = migration.target_version();

            if let Some(obj) = document.as_object_mut() {
                obj.insert("version".into(), version.into());
            }
        }
        Ok(document)
    }
}

impl Default for MigrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
