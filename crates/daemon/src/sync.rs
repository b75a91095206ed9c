// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forum sync engine: reconciles in-memory cron records against live forum
//! state in independently-throttled phases. A failure within a phase is
//! logged and counted but never aborts the sync, grounded in the teacher's
//! `daemon/src/lifecycle/reconcile.rs` per-item try/catch-and-count idiom.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use ch_core::{Cadence, CronId, CronRecordUpdate, ThreadId};
use ch_engine::thread_name::build_thread_name;
use ch_engine::CronSchedule;
use ch_storage::RecordStore;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use tracing::warn;

use crate::classifier::PurposeClassifier;
use crate::forum::{ForumChannel, ForumThread};
use crate::status::compose_status_summary;

/// Maximum number of tags (purpose tags + cadence tag) applied to a thread.
const MAX_APPLIED_TAGS: usize = 5;

/// Outcome of one reconciliation phase: every item is attempted regardless
/// of earlier failures, and every failure is recorded rather than raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub errors: Vec<String>,
}

impl PhaseReport {
    fn record(&mut self, result: Result<(), String>) {
        self.attempted += 1;
        match result {
            Ok(()) => self.succeeded += 1,
            Err(e) => self.errors.push(e),
        }
    }
}

/// Bucket a cron schedule's firing interval into a `Cadence`. The exact
/// thresholds are not specified; chosen conservatively and recorded in
/// DESIGN.md.
pub fn derive_cadence(schedule: &CronSchedule, now: DateTime<Utc>) -> Option<Cadence> {
    let first = schedule.next_after(now)?;
    let second = schedule.next_after(first)?;
    let interval = second - first;
    Some(if interval < chrono::Duration::minutes(30) {
        Cadence::Frequent
    } else if interval < chrono::Duration::hours(2) {
        Cadence::Hourly
    } else if interval < chrono::Duration::days(2) {
        Cadence::Daily
    } else if interval < chrono::Duration::days(10) {
        Cadence::Weekly
    } else if interval < chrono::Duration::days(60) {
        Cadence::Monthly
    } else {
        Cadence::Yearly
    })
}

pub struct SyncEngine {
    store: Arc<Mutex<RecordStore>>,
    forum: Arc<dyn ForumChannel>,
    classifier: Arc<dyn PurposeClassifier>,
    tag_map: Arc<Mutex<HashMap<String, String>>>,
    throttle: Duration,
}

impl SyncEngine {
    pub fn new(
        store: Arc<Mutex<RecordStore>>,
        forum: Arc<dyn ForumChannel>,
        classifier: Arc<dyn PurposeClassifier>,
        tag_map: Arc<Mutex<HashMap<String, String>>>,
    ) -> Self {
        Self {
            store,
            forum,
            classifier,
            tag_map,
            throttle: Duration::from_millis(250),
        }
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    async fn fetch_threads_by_thread_id(&self) -> HashMap<String, Arc<dyn ForumThread>> {
        let mut by_id = HashMap::new();
        if let Ok(threads) = self.forum.fetch_active_threads().await {
            for t in threads {
                by_id.insert(t.id(), t);
            }
        }
        if let Ok(threads) = self.forum.fetch_archived_threads().await {
            for t in threads {
                by_id.insert(t.id(), t);
            }
        }
        by_id
    }

    async fn throttle(&self) {
        tokio::time::sleep(self.throttle).await;
    }

    /// Phase 1 — tag and model classification.
    pub async fn run_phase1(&self, now: DateTime<Utc>) -> PhaseReport {
        let mut report = PhaseReport::default();
        let threads = self.fetch_threads_by_thread_id().await;

        let cron_ids: Vec<CronId> = {
            let store = self.store.lock();
            store.list().map(|r| r.cron_id.clone()).collect()
        };

        for cron_id in cron_ids {
            let result = self.classify_one(&cron_id, now, &threads).await;
            report.record(result);
            self.throttle().await;
        }
        report
    }

    async fn classify_one(
        &self,
        cron_id: &CronId,
        now: DateTime<Utc>,
        threads: &HashMap<String, Arc<dyn ForumThread>>,
    ) -> Result<(), String> {
        let (needs_classification, schedule, timezone, thread_id, prompt, cadence, purpose_tags) = {
            let store = self.store.lock();
            let record = store.get(cron_id).ok_or_else(|| "record disappeared".to_string())?;
            let needs = record.cadence.is_none() || record.purpose_tags.is_empty() || record.model.is_none();
            (
                needs,
                record.schedule.clone(),
                record.timezone.clone(),
                record.thread_id.clone(),
                record.prompt.clone(),
                record.cadence,
                record.purpose_tags.clone(),
            )
        };

        let mut cadence = cadence;
        let mut purpose_tags = purpose_tags;
        let mut model_update = None;

        if needs_classification {
            if cadence.is_none() {
                if let Some(expr) = &schedule {
                    let tz: Tz = timezone.parse().unwrap_or(chrono_tz::UTC);
                    if let Ok(parsed) = CronSchedule::parse(expr, tz) {
                        cadence = derive_cadence(&parsed, now);
                    }
                }
            }
            let classification = self.classifier.classify(&prompt, cadence).await;
            if purpose_tags.is_empty() {
                purpose_tags = classification.purpose_tags;
            }
            if classification.model.is_some() {
                model_update = classification.model;
            }

            let mut store = self.store.lock();
            store
                .upsert_record(
                    cron_id,
                    CronRecordUpdate {
                        cadence: Some(cadence),
                        purpose_tags: Some(purpose_tags.clone()),
                        model: model_update.map(Some),
                        ..Default::default()
                    },
                )
                .map_err(|e| e.to_string())?;
        }

        let Some(thread) = threads.get(thread_id.as_str()) else {
            return Ok(());
        };

        let mut desired: Vec<String> = purpose_tags.clone();
        if let Some(c) = cadence {
            desired.push(c.tag_name().to_string());
        }
        desired.truncate(MAX_APPLIED_TAGS);

        let tag_map = self.tag_map.lock().clone();
        let mut desired_ids: Vec<String> = Vec::new();
        for name in &desired {
            match tag_map.get(name) {
                Some(id) => desired_ids.push(id.clone()),
                None => warn!(tag = %name, "no tag-map entry for purpose/cadence tag"),
            }
        }

        let current: HashSet<String> = thread.applied_tags().into_iter().collect();
        let wanted: HashSet<String> = desired_ids.iter().cloned().collect();
        if current != wanted {
            thread.edit(desired_ids).await.map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    /// Phase 2 — thread name.
    pub async fn run_phase2(&self) -> PhaseReport {
        let mut report = PhaseReport::default();
        let threads = self.fetch_threads_by_thread_id().await;

        let records: Vec<(ThreadId, Option<Cadence>)> = {
            let store = self.store.lock();
            store.list().map(|r| (r.thread_id.clone(), r.cadence)).collect()
        };

        for (thread_id, cadence) in records {
            let Some(thread) = threads.get(thread_id.as_str()) else {
                continue;
            };
            let result = async {
                let expected = build_thread_name(&thread.name(), cadence);
                if expected != thread.name() {
                    thread.set_name(&expected).await.map_err(|e| e.to_string())?;
                }
                Ok(())
            }
            .await;
            report.record(result);
            self.throttle().await;
        }
        report
    }

    /// Phase 3 — pinned status message, and phase 3.5 — prompt backfill.
    pub async fn run_phase3(&self, now: DateTime<Utc>) -> PhaseReport {
        let mut report = PhaseReport::default();
        let threads = self.fetch_threads_by_thread_id().await;

        let cron_ids: Vec<CronId> = {
            let store = self.store.lock();
            store.list().map(|r| r.cron_id.clone()).collect()
        };

        for cron_id in cron_ids {
            let result = self.sync_status_message(&cron_id, now, &threads).await;
            report.record(result);
            self.throttle().await;
        }
        report
    }

    async fn sync_status_message(
        &self,
        cron_id: &CronId,
        now: DateTime<Utc>,
        threads: &HashMap<String, Arc<dyn ForumThread>>,
    ) -> Result<(), String> {
        let record = {
            let store = self.store.lock();
            store.get(cron_id).ok_or_else(|| "record disappeared".to_string())?.clone()
        };
        let Some(thread) = threads.get(record.thread_id.as_str()) else {
            return Ok(());
        };

        let summary = compose_status_summary(&record, now);
        match thread.fetch_pinned().await.map_err(|e| e.to_string())? {
            Some((message_id, _)) => {
                thread.edit_message(&message_id, &summary).await.map_err(|e| e.to_string())?;
            }
            None => {
                let message_id = thread.send(&summary).await.map_err(|e| e.to_string())?;
                thread.pin(&message_id).await.map_err(|e| e.to_string())?;
                let mut store = self.store.lock();
                store
                    .upsert_record(
                        cron_id,
                        CronRecordUpdate {
                            status_message_id: Some(Some(message_id)),
                            ..Default::default()
                        },
                    )
                    .map_err(|e| e.to_string())?;
            }
        }

        if !record.prompt.is_empty() && record.prompt_message_id.is_none() {
            let message_id = thread.send(&record.prompt).await.map_err(|e| e.to_string())?;
            let mut store = self.store.lock();
            store
                .upsert_record(
                    cron_id,
                    CronRecordUpdate {
                        prompt_message_id: Some(Some(message_id)),
                        ..Default::default()
                    },
                )
                .map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    /// Phase 4 — orphan detection. Warning-only; no destructive action.
    pub async fn run_phase4(&self) -> PhaseReport {
        let mut report = PhaseReport::default();
        let known_thread_ids: HashSet<String> = {
            let store = self.store.lock();
            store.list().map(|r| r.thread_id.as_str().to_string()).collect()
        };

        let forum_id = self.forum.id();
        let mut orphans = Vec::new();
        if let Ok(active) = self.forum.fetch_active_threads().await {
            orphans.extend(active);
        }
        if let Ok(archived) = self.forum.fetch_archived_threads().await {
            orphans.extend(archived);
        }

        for thread in orphans {
            report.attempted += 1;
            if thread.parent_id() != forum_id {
                report.succeeded += 1;
                continue;
            }
            if known_thread_ids.contains(&thread.id()) {
                report.succeeded += 1;
            } else {
                warn!(thread_id = %thread.id(), name = %thread.name(), "orphaned thread has no registered cron job");
                report.succeeded += 1;
            }
        }
        report
    }
}

/// A planned phase-5 (task-sync variant) operation: pure output of
/// [`plan_task_sync`], applied by the caller against the real forum thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSyncOp {
    Archive(String),
    Unarchive(String),
    DeferClose(String),
    CollisionDetected(Vec<String>),
}

/// Snapshot of one task thread for phase 5 planning.
#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    pub id: String,
    pub short_id: String,
    pub closed: bool,
    pub thread_archived: bool,
}

/// Reconcile open/closed task state against live archived status. Pure
/// function from a snapshot, per spec.md §4.5 phase 5: closed tasks whose
/// thread is not archived are archived (unless an in-flight reply defers the
/// close); tasks reopened after an over-eager archive are unarchived;
/// short-ID collisions are reported but not resolved automatically.
pub fn plan_task_sync(tasks: &[TaskSnapshot], in_flight: &HashSet<String>) -> Vec<TaskSyncOp> {
    let mut ops = Vec::new();

    let mut by_short: HashMap<&str, Vec<&str>> = HashMap::new();
    for task in tasks {
        by_short.entry(task.short_id.as_str()).or_default().push(task.id.as_str());
    }
    for (_, ids) in by_short {
        if ids.len() > 1 {
            ops.push(TaskSyncOp::CollisionDetected(ids.into_iter().map(String::from).collect()));
        }
    }

    for task in tasks {
        if task.closed && !task.thread_archived {
            if in_flight.contains(&task.id) {
                ops.push(TaskSyncOp::DeferClose(task.id.clone()));
            } else {
                ops.push(TaskSyncOp::Archive(task.id.clone()));
            }
        } else if !task.closed && task.thread_archived {
            ops.push(TaskSyncOp::Unarchive(task.id.clone()));
        }
    }

    ops
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
