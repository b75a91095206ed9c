// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable, mutex-serialized record store: the single source of truth for
//! cron job records, with in-memory secondary indexes and an atomic-write
//! on-disk document.

use crate::migration::{MigrationError, MigrationRegistry, CURRENT_STORE_VERSION};
use ch_core::{Cadence, ChannelId, CronId, CronRecordUpdate, CronRunRecord, MessageId, RunStatus, StoreDocument, ThreadId, TriggerType, WebhookSourceId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a record already owns webhook source {0}")]
    SourceIdConflict(String),
    #[error("a record already owns thread {0}")]
    ThreadIdConflict(String),
    #[error("no record with cronId {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
}

/// Indexes rebuilt from the loaded document and maintained on every mutation.
#[derive(Default)]
struct Indexes {
    by_thread: HashMap<ThreadId, CronId>,
    by_status_message: HashMap<MessageId, CronId>,
    by_source_id: HashMap<WebhookSourceId, CronId>,
}

/// The record store. All mutating operations go through `&mut self`; callers
/// are expected to hold this behind the serialized writer's own
/// synchronization (see `ch-engine`'s executor, which owns one store per
/// daemon instance behind a `tokio::sync::Mutex`).
pub struct RecordStore {
    path: PathBuf,
    document: StoreDocument,
    indexes: Indexes,
    migrations: MigrationRegistry,
}

impl RecordStore {
    /// Load from `path`. An absent or malformed file yields an empty store
    /// rather than raising — parse failures are never fatal at startup.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let migrations = MigrationRegistry::new();
        let document = Self::read_document(&path, &migrations).unwrap_or_else(|err| {
            warn!(error = %err, path = %path.display(), "record store load failed; starting empty");
            StoreDocument::default()
        });
        let mut store = RecordStore {
            path,
            document,
            indexes: Indexes::default(),
            migrations,
        };
        store.rebuild_indexes();
        store
    }

    fn read_document(path: &Path, migrations: &MigrationRegistry) -> Result<StoreDocument, StoreError> {
        if !path.exists() {
            return Ok(StoreDocument::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        let migrated = migrations.migrate_to(value, CURRENT_STORE_VERSION)?;
        Ok(serde_json::from_value(migrated)?)
    }

    fn rebuild_indexes(&mut self) {
        self.indexes = Indexes::default();
        for (id, record) in self.document.jobs.iter() {
            let cron_id = CronId::new(id.clone());
            self.indexes.by_thread.insert(record.thread_id.clone(), cron_id.clone());
            if let Some(mid) = &record.status_message_id {
                self.indexes.by_status_message.insert(mid.clone(), cron_id.clone());
            }
            if let Some(sid) = &record.webhook_source_id {
                self.indexes.by_source_id.insert(sid.clone(), cron_id.clone());
            }
        }
    }

    // --- O(1) reads, no I/O, no mutex ---

    pub fn get(&self, cron_id: &CronId) -> Option<&CronRunRecord> {
        self.document.jobs.get(cron_id.as_str())
    }

    pub fn get_by_thread_id(&self, thread_id: &ThreadId) -> Option<&CronRunRecord> {
        let cron_id = self.indexes.by_thread.get(thread_id)?;
        self.get(cron_id)
    }

    pub fn get_by_status_message_id(&self, message_id: &MessageId) -> Option<&CronRunRecord> {
        let cron_id = self.indexes.by_status_message.get(message_id)?;
        self.get(cron_id)
    }

    pub fn get_by_source_id(&self, source_id: &WebhookSourceId) -> Option<&CronRunRecord> {
        let cron_id = self.indexes.by_source_id.get(source_id)?;
        self.get(cron_id)
    }

    pub fn list(&self) -> impl Iterator<Item = &CronRunRecord> {
        self.document.jobs.values()
    }

    // --- mutators; each flushes before returning ---

    /// Insert a brand-new record (e.g. `createCron`). Fails atomically if
    /// `webhookSourceId` conflicts with an existing record.
    pub fn insert_record(&mut self, record: CronRunRecord) -> Result<(), StoreError> {
        if let Some(sid) = &record.webhook_source_id {
            if let Some(existing) = self.indexes.by_source_id.get(sid) {
                if existing != &record.cron_id {
                    return Err(StoreError::SourceIdConflict(sid.as_str().to_string()));
                }
            }
        }
        let cron_id = record.cron_id.clone();
        self.index_insert(&cron_id, &record);
        self.document.jobs.insert(cron_id.as_str().to_string(), record);
        self.touch_and_flush()
    }

    /// Merge `update` onto the existing record for `cron_id`, validating
    /// uniqueness of any changed index fields first. No partial state change
    /// on failure.
    pub fn upsert_record(
        &mut self,
        cron_id: &CronId,
        update: CronRecordUpdate,
    ) -> Result<(), StoreError> {
        let existing = self
            .document
            .jobs
            .get(cron_id.as_str())
            .ok_or_else(|| StoreError::NotFound(cron_id.as_str().to_string()))?;

        if let Some(Some(sid)) = &update.webhook_source_id {
            if let Some(owner) = self.indexes.by_source_id.get(sid) {
                if owner != cron_id {
                    return Err(StoreError::SourceIdConflict(sid.as_str().to_string()));
                }
            }
        }

        let mut next = existing.clone();
        self.index_remove(cron_id, &next);
        update.apply(&mut next);
        self.index_insert(cron_id, &next);
        self.document.jobs.insert(cron_id.as_str().to_string(), next);
        self.touch_and_flush()
    }

    /// Record the outcome of a finished run: increments `runCount`, sets
    /// `lastRunAt`, and sets/clears `lastErrorMessage` (truncated to 200
    /// chars).
    pub fn record_run(
        &mut self,
        cron_id: &CronId,
        status: RunStatus,
        message: Option<String>,
    ) -> Result<(), StoreError> {
        let record = self
            .document
            .jobs
            .get_mut(cron_id.as_str())
            .ok_or_else(|| StoreError::NotFound(cron_id.as_str().to_string()))?;
        record.run_count += 1;
        record.last_run_at = Some(chrono::Utc::now());
        record.last_run_status = Some(status);
        record.set_last_error_message(message);
        self.touch_and_flush()
    }

    /// Mark a record as the run having just started.
    pub fn record_run_start(&mut self, cron_id: &CronId) -> Result<(), StoreError> {
        let record = self
            .document
            .jobs
            .get_mut(cron_id.as_str())
            .ok_or_else(|| StoreError::NotFound(cron_id.as_str().to_string()))?;
        record.last_run_status = Some(RunStatus::Running);
        record.started_at = Some(chrono::Utc::now());
        self.touch_and_flush()
    }

    /// Rewrite any `running` status left over from a crash to `interrupted`.
    /// Called once at load time. Returns the affected cronIds.
    pub fn sweep_interrupted(&mut self) -> Result<Vec<CronId>, StoreError> {
        let mut affected = Vec::new();
        for (id, record) in self.document.jobs.iter_mut() {
            if record.last_run_status == Some(RunStatus::Running) {
                record.last_run_status = Some(RunStatus::Interrupted);
                affected.push(CronId::new(id.clone()));
            }
        }
        if !affected.is_empty() {
            info!(count = affected.len(), "swept interrupted cron runs");
            self.touch_and_flush()?;
        }
        Ok(affected)
    }

    pub fn remove_record(&mut self, cron_id: &CronId) -> Result<Option<CronRunRecord>, StoreError> {
        if let Some(record) = self.document.jobs.remove(cron_id.as_str()) {
            self.index_remove(cron_id, &record);
            self.touch_and_flush()?;
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    pub fn remove_by_thread_id(&mut self, thread_id: &ThreadId) -> Result<Option<CronRunRecord>, StoreError> {
        let Some(cron_id) = self.indexes.by_thread.get(thread_id).cloned() else {
            return Ok(None);
        };
        self.remove_record(&cron_id)
    }

    fn index_insert(&mut self, cron_id: &CronId, record: &CronRunRecord) {
        self.indexes.by_thread.insert(record.thread_id.clone(), cron_id.clone());
        if let Some(mid) = &record.status_message_id {
            self.indexes.by_status_message.insert(mid.clone(), cron_id.clone());
        }
        if let Some(sid) = &record.webhook_source_id {
            self.indexes.by_source_id.insert(sid.clone(), cron_id.clone());
        }
    }

    fn index_remove(&mut self, cron_id: &CronId, record: &CronRunRecord) {
        if self.indexes.by_thread.get(&record.thread_id) == Some(cron_id) {
            self.indexes.by_thread.remove(&record.thread_id);
        }
        if let Some(mid) = &record.status_message_id {
            if self.indexes.by_status_message.get(mid) == Some(cron_id) {
                self.indexes.by_status_message.remove(mid);
            }
        }
        if let Some(sid) = &record.webhook_source_id {
            if self.indexes.by_source_id.get(sid) == Some(cron_id) {
                self.indexes.by_source_id.remove(sid);
            }
        }
    }

    fn touch_and_flush(&mut self) -> Result<(), StoreError> {
        self.document.updated_at = chrono::Utc::now().timestamp_millis();
        self.document.version = CURRENT_STORE_VERSION;
        self.flush()
    }

    /// Write `<path>.tmp.<pid>` then atomically rename to `path`. Only one
    /// write is ever in flight because callers serialize through a single
    /// `RecordStore` owner.
    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension(format!("tmp.{}", std::process::id()));
        let bytes = serde_json::to_vec_pretty(&self.document)?;
        std::fs::write(&tmp_path, bytes)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// Derives the display cadence emoji/tag for `record`, or `None` when the
/// record has no classified cadence.
pub fn record_cadence(record: &CronRunRecord) -> Option<Cadence> {
    record.cadence
}

pub fn record_is_webhook(record: &CronRunRecord) -> bool {
    record.trigger_type == TriggerType::Webhook
}

pub fn record_channel_id(record: &CronRunRecord) -> ChannelId {
    ChannelId::new(record.channel.clone())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
