// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ch_core::{generate_cron_id, ThreadId, WebhookSourceId};
use tempfile::tempdir;

fn record(thread: &str) -> CronRunRecord {
    CronRunRecord::new(generate_cron_id(), ThreadId::new(thread), "general")
}

#[test]
fn load_missing_file_yields_empty_store() {
    let dir = tempdir().unwrap();
    let store = RecordStore::load(dir.path().join("missing.json"));
    assert_eq!(store.list().count(), 0);
}

#[test]
fn load_malformed_file_yields_empty_store_not_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "not json").unwrap();
    let store = RecordStore::load(&path);
    assert_eq!(store.list().count(), 0);
}

#[test]
fn insert_then_get_by_thread_id_returns_same_record() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::load(dir.path().join("store.json"));
    let r = record("thread-1");
    let cron_id = r.cron_id.clone();
    store.insert_record(r).unwrap();
    let found = store.get_by_thread_id(&ThreadId::new("thread-1")).unwrap();
    assert_eq!(found.cron_id, cron_id);
}

#[test]
fn conflicting_webhook_source_id_fails_atomically() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::load(dir.path().join("store.json"));
    let mut a = record("thread-a");
    a.webhook_source_id = Some(WebhookSourceId::new("src-1"));
    store.insert_record(a).unwrap();

    let mut b = record("thread-b");
    b.webhook_source_id = Some(WebhookSourceId::new("src-1"));
    let cron_id_b = b.cron_id.clone();
    let err = store.insert_record(b).unwrap_err();
    assert!(matches!(err, StoreError::SourceIdConflict(_)));
    assert!(store.get(&cron_id_b).is_none());
}

#[test]
fn record_run_increments_count_and_truncates_error() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::load(dir.path().join("store.json"));
    let r = record("thread-1");
    let cron_id = r.cron_id.clone();
    store.insert_record(r).unwrap();

    let long_error = "x".repeat(500);
    store.record_run(&cron_id, RunStatus::Error, Some(long_error)).unwrap();
    let updated = store.get(&cron_id).unwrap();
    assert_eq!(updated.run_count, 1);
    assert_eq!(updated.last_run_status, Some(RunStatus::Error));
    assert_eq!(updated.last_error_message.as_ref().unwrap().chars().count(), 200);
}

#[test]
fn sweep_interrupted_rewrites_running_status() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    {
        let mut store = RecordStore::load(&path);
        let r = record("thread-1");
        let cron_id = r.cron_id.clone();
        store.insert_record(r).unwrap();
        store.record_run_start(&cron_id).unwrap();
    }
    let mut reloaded = RecordStore::load(&path);
    let affected = reloaded.sweep_interrupted().unwrap();
    assert_eq!(affected.len(), 1);
    let record = reloaded.get(&affected[0]).unwrap();
    assert_eq!(record.last_run_status, Some(RunStatus::Interrupted));
}

#[test]
fn flush_round_trips_through_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let cron_id;
    {
        let mut store = RecordStore::load(&path);
        let r = record("thread-1");
        cron_id = r.cron_id.clone();
        store.insert_record(r).unwrap();
    }
    let reloaded = RecordStore::load(&path);
    assert!(reloaded.get(&cron_id).is_some());
    assert!(!dir.path().join(format!("store.json.tmp.{}", std::process::id())).exists());
}

#[test]
fn remove_record_clears_thread_index() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::load(dir.path().join("store.json"));
    let r = record("thread-1");
    let cron_id = r.cron_id.clone();
    store.insert_record(r).unwrap();
    store.remove_record(&cron_id).unwrap();
    assert!(store.get_by_thread_id(&ThreadId::new("thread-1")).is_none());
}

#[test]
fn upsert_update_changes_only_patched_fields() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::load(dir.path().join("store.json"));
    let mut r = record("thread-1");
    r.prompt = "original".to_string();
    let cron_id = r.cron_id.clone();
    store.insert_record(r).unwrap();

    let update = CronRecordUpdate {
        silent: Some(true),
        ..Default::default()
    };
    store.upsert_record(&cron_id, update).unwrap();
    let updated = store.get(&cron_id).unwrap();
    assert!(updated.silent);
    assert_eq!(updated.prompt, "original");
}
