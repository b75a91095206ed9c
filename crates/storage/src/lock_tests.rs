// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ch_core::CronId;
use tempfile::tempdir;

#[test]
fn acquires_when_free() {
    let dir = tempdir().unwrap();
    let cron_id = CronId::new("cron-aaaaaaaa");
    let lock = RunLock::try_acquire(dir.path(), &cron_id).unwrap();
    assert!(lock.is_some());
}

#[test]
fn second_acquire_is_quiet_skip_not_error() {
    let dir = tempdir().unwrap();
    let cron_id = CronId::new("cron-bbbbbbbb");
    let first = RunLock::try_acquire(dir.path(), &cron_id).unwrap();
    assert!(first.is_some());
    let second = RunLock::try_acquire(dir.path(), &cron_id).unwrap();
    assert!(second.is_none());
}

#[test]
fn drop_releases_and_allows_reacquire() {
    let dir = tempdir().unwrap();
    let cron_id = CronId::new("cron-cccccccc");
    {
        let _lock = RunLock::try_acquire(dir.path(), &cron_id).unwrap();
    }
    let reacquired = RunLock::try_acquire(dir.path(), &cron_id).unwrap();
    assert!(reacquired.is_some());
}

#[test]
fn creates_lock_directory_if_missing() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("nested").join("locks");
    let cron_id = CronId::new("cron-dddddddd");
    let lock = RunLock::try_acquire(&nested, &cron_id).unwrap();
    assert!(lock.is_some());
    assert!(nested.exists());
}
