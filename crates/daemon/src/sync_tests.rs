// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::classifier::FakeClassifier;
use crate::forum::{FakeForumChannel, FakeForumThread};
use ch_core::{CronId, MessageId, ThreadId};
use chrono::TimeZone;
use tempfile::TempDir;

fn store_with(records: Vec<ch_core::CronRunRecord>) -> (Arc<Mutex<RecordStore>>, TempDir) {
    let tmp = TempDir::new().unwrap();
    let mut store = RecordStore::load(tmp.path().join("crons.json"));
    for record in records {
        store.insert_record(record).unwrap();
    }
    (Arc::new(Mutex::new(store)), tmp)
}

fn record(cron_id: &str, thread_id: &str) -> ch_core::CronRunRecord {
    ch_core::CronRunRecord::new(CronId::new(cron_id), ThreadId::new(thread_id), "general")
}

#[test]
fn derive_cadence_buckets_hourly_schedule() {
    let schedule = CronSchedule::parse("0 * * * *", chrono_tz::UTC).unwrap();
    let now = chrono::Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(derive_cadence(&schedule, now), Some(Cadence::Hourly));
}

#[test]
fn derive_cadence_buckets_daily_schedule() {
    let schedule = CronSchedule::parse("0 9 * * *", chrono_tz::UTC).unwrap();
    let now = chrono::Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(derive_cadence(&schedule, now), Some(Cadence::Daily));
}

#[test]
fn derive_cadence_buckets_weekly_schedule() {
    let schedule = CronSchedule::parse("0 9 * * 1", chrono_tz::UTC).unwrap();
    let now = chrono::Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(derive_cadence(&schedule, now), Some(Cadence::Weekly));
}

#[tokio::test]
async fn phase1_classifies_unclassified_job_and_applies_tags() {
    let mut r = record("cron-a", "thread-a");
    r.schedule = Some("0 9 * * *".to_string());
    let (store, _tmp) = store_with(vec![r]);

    let thread = FakeForumThread::new("thread-a", "forum-1", "My Job");
    let forum = Arc::new(FakeForumChannel::new("forum-1").with_thread(thread));

    let classifier = Arc::new(FakeClassifier(crate::classifier::Classification {
        purpose_tags: vec!["reminders".to_string()],
        model: Some("claude".to_string()),
    }));

    let mut tag_map = HashMap::new();
    tag_map.insert("reminders".to_string(), "tag-reminders".to_string());
    tag_map.insert("daily".to_string(), "tag-daily".to_string());
    let tag_map = Arc::new(Mutex::new(tag_map));

    let engine = SyncEngine::new(Arc::clone(&store), forum, classifier, tag_map)
        .with_throttle(Duration::from_millis(0));
    let now = chrono::Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let report = engine.run_phase1(now).await;

    assert_eq!(report.attempted, 1);
    assert_eq!(report.succeeded, 1);
    assert!(report.errors.is_empty());

    let store = store.lock();
    let updated = store.get(&CronId::new("cron-a")).unwrap();
    assert_eq!(updated.cadence, Some(Cadence::Daily));
    assert_eq!(updated.purpose_tags, vec!["reminders".to_string()]);
    assert_eq!(updated.model.as_deref(), Some("claude"));
}

#[tokio::test]
async fn phase1_skips_already_classified_job() {
    let mut r = record("cron-a", "thread-a");
    r.cadence = Some(Cadence::Daily);
    r.purpose_tags = vec!["reminders".to_string()];
    r.model = Some("claude".to_string());
    let (store, _tmp) = store_with(vec![r]);

    let forum = Arc::new(FakeForumChannel::new("forum-1"));
    let classifier = Arc::new(FakeClassifier(crate::classifier::Classification::default()));
    let engine = SyncEngine::new(store, forum, classifier, Arc::new(Mutex::new(HashMap::new())))
        .with_throttle(Duration::from_millis(0));

    let report = engine.run_phase1(Utc::now()).await;
    assert_eq!(report.attempted, 1);
    assert_eq!(report.succeeded, 1);
}

#[tokio::test]
async fn phase2_renames_thread_with_cadence_prefix() {
    let mut r = record("cron-a", "thread-a");
    r.cadence = Some(Cadence::Daily);
    let (store, _tmp) = store_with(vec![r]);

    let thread = FakeForumThread::new("thread-a", "forum-1", "My Job");
    let forum = Arc::new(FakeForumChannel::new("forum-1").with_thread(thread));
    let classifier = Arc::new(FakeClassifier(crate::classifier::Classification::default()));
    let engine = SyncEngine::new(store, forum.clone(), classifier, Arc::new(Mutex::new(HashMap::new())))
        .with_throttle(Duration::from_millis(0));

    let report = engine.run_phase2().await;
    assert_eq!(report.succeeded, 1);

    let threads = forum.fetch_active_threads().await.unwrap();
    assert_eq!(threads[0].name(), "🌅 My Job");
}

#[tokio::test]
async fn phase2_is_idempotent_once_named() {
    let mut r = record("cron-a", "thread-a");
    r.cadence = Some(Cadence::Daily);
    let (store, _tmp) = store_with(vec![r]);

    let thread = FakeForumThread::new("thread-a", "forum-1", "🌅 My Job");
    let forum = Arc::new(FakeForumChannel::new("forum-1").with_thread(thread));
    let classifier = Arc::new(FakeClassifier(crate::classifier::Classification::default()));
    let engine = SyncEngine::new(store, forum, classifier, Arc::new(Mutex::new(HashMap::new())))
        .with_throttle(Duration::from_millis(0));

    let report = engine.run_phase2().await;
    assert_eq!(report.succeeded, 1);
}

#[tokio::test]
async fn phase3_sends_and_pins_a_new_status_message_when_none_exists() {
    let r = record("cron-a", "thread-a");
    let (store, _tmp) = store_with(vec![r]);

    let thread = FakeForumThread::new("thread-a", "forum-1", "My Job");
    let forum = Arc::new(FakeForumChannel::new("forum-1").with_thread(thread));
    let classifier = Arc::new(FakeClassifier(crate::classifier::Classification::default()));
    let engine = SyncEngine::new(Arc::clone(&store), forum.clone(), classifier, Arc::new(Mutex::new(HashMap::new())))
        .with_throttle(Duration::from_millis(0));

    let report = engine.run_phase3(Utc::now()).await;
    assert_eq!(report.succeeded, 1);

    let store = store.lock();
    let updated = store.get(&CronId::new("cron-a")).unwrap();
    assert!(updated.status_message_id.is_some());
}

#[tokio::test]
async fn phase3_edits_existing_pinned_status_message() {
    let r = record("cron-a", "thread-a");
    let (store, _tmp) = store_with(vec![r]);

    let thread = FakeForumThread::new("thread-a", "forum-1", "My Job")
        .with_pinned(MessageId::new("pinned-1"), "old summary");
    let forum = Arc::new(FakeForumChannel::new("forum-1").with_thread(thread));
    let classifier = Arc::new(FakeClassifier(crate::classifier::Classification::default()));
    let engine = SyncEngine::new(Arc::clone(&store), forum.clone(), classifier, Arc::new(Mutex::new(HashMap::new())))
        .with_throttle(Duration::from_millis(0));

    engine.run_phase3(Utc::now()).await;

    let store = store.lock();
    let updated = store.get(&CronId::new("cron-a")).unwrap();
    // Editing an existing pin must not mint a new message id.
    assert_eq!(updated.status_message_id, None);
}

#[tokio::test]
async fn phase3_backfills_prompt_message_once() {
    let mut r = record("cron-a", "thread-a");
    r.prompt = "do the thing".to_string();
    let (store, _tmp) = store_with(vec![r]);

    let thread = FakeForumThread::new("thread-a", "forum-1", "My Job");
    let forum = Arc::new(FakeForumChannel::new("forum-1").with_thread(thread));
    let classifier = Arc::new(FakeClassifier(crate::classifier::Classification::default()));
    let engine = SyncEngine::new(Arc::clone(&store), forum, classifier, Arc::new(Mutex::new(HashMap::new())))
        .with_throttle(Duration::from_millis(0));

    engine.run_phase3(Utc::now()).await;

    let store = store.lock();
    let updated = store.get(&CronId::new("cron-a")).unwrap();
    assert!(updated.prompt_message_id.is_some());
}

#[tokio::test]
async fn phase4_logs_orphans_without_error() {
    let r = record("cron-a", "thread-a");
    let (store, _tmp) = store_with(vec![r]);

    let known = FakeForumThread::new("thread-a", "forum-1", "Known");
    let orphan = FakeForumThread::new("thread-b", "forum-1", "Orphan");
    let forum = Arc::new(FakeForumChannel::new("forum-1").with_thread(known).with_thread(orphan));
    let classifier = Arc::new(FakeClassifier(crate::classifier::Classification::default()));
    let engine = SyncEngine::new(store, forum, classifier, Arc::new(Mutex::new(HashMap::new())))
        .with_throttle(Duration::from_millis(0));

    let report = engine.run_phase4().await;
    assert_eq!(report.attempted, 2);
    assert_eq!(report.succeeded, 2);
    assert!(report.errors.is_empty());
}

#[test]
fn plan_task_sync_archives_closed_threads() {
    let tasks = vec![TaskSnapshot {
        id: "task-1".to_string(),
        short_id: "t1".to_string(),
        closed: true,
        thread_archived: false,
    }];
    let ops = plan_task_sync(&tasks, &HashSet::new());
    assert_eq!(ops, vec![TaskSyncOp::Archive("task-1".to_string())]);
}

#[test]
fn plan_task_sync_defers_close_when_reply_in_flight() {
    let tasks = vec![TaskSnapshot {
        id: "task-1".to_string(),
        short_id: "t1".to_string(),
        closed: true,
        thread_archived: false,
    }];
    let mut in_flight = HashSet::new();
    in_flight.insert("task-1".to_string());
    let ops = plan_task_sync(&tasks, &in_flight);
    assert_eq!(ops, vec![TaskSyncOp::DeferClose("task-1".to_string())]);
}

#[test]
fn plan_task_sync_unarchives_stale_closed_threads() {
    let tasks = vec![TaskSnapshot {
        id: "task-1".to_string(),
        short_id: "t1".to_string(),
        closed: false,
        thread_archived: true,
    }];
    let ops = plan_task_sync(&tasks, &HashSet::new());
    assert_eq!(ops, vec![TaskSyncOp::Unarchive("task-1".to_string())]);
}

#[test]
fn plan_task_sync_detects_short_id_collisions() {
    let tasks = vec![
        TaskSnapshot { id: "task-1".to_string(), short_id: "ab12".to_string(), closed: false, thread_archived: false },
        TaskSnapshot { id: "task-2".to_string(), short_id: "ab12".to_string(), closed: false, thread_archived: false },
    ];
    let ops = plan_task_sync(&tasks, &HashSet::new());
    assert!(ops.iter().any(|op| matches!(op, TaskSyncOp::CollisionDetected(ids) if ids.len() == 2)));
}
