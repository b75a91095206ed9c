// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tokio::process::Command;

fn spawn_sleeper() -> Child {
    Command::new("sh")
        .arg("-c")
        .arg("sleep 5")
        .kill_on_drop(true)
        .spawn()
        .unwrap()
}

#[tokio::test]
async fn put_then_take_round_trips() {
    let pool = ProcessPool::new(Duration::from_secs(60));
    pool.put("session-1".to_string(), spawn_sleeper());
    assert_eq!(pool.len(), 1);
    let mut child = pool.take("session-1").unwrap();
    assert!(pool.is_empty());
    let _ = child.kill().await;
}

#[tokio::test]
async fn take_missing_session_is_none() {
    let pool = ProcessPool::new(Duration::from_secs(60));
    assert!(pool.take("missing").is_none());
}

#[tokio::test]
async fn idle_sessions_reports_past_budget() {
    let pool = ProcessPool::new(Duration::from_millis(10));
    pool.put("session-1".to_string(), spawn_sleeper());
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(pool.idle_sessions(), vec!["session-1".to_string()]);
}

#[tokio::test]
async fn touch_resets_idle_clock() {
    let pool = ProcessPool::new(Duration::from_millis(30));
    pool.put("session-1".to_string(), spawn_sleeper());
    tokio::time::sleep(Duration::from_millis(15)).await;
    pool.touch("session-1");
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(pool.idle_sessions().is_empty());
}

#[tokio::test]
async fn kill_all_empties_pool() {
    let pool = ProcessPool::new(Duration::from_secs(60));
    pool.put("session-1".to_string(), spawn_sleeper());
    pool.put("session-2".to_string(), spawn_sleeper());
    pool.kill_all().await;
    assert!(pool.is_empty());
}
