// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ch_core::{Cadence, CronId, ThreadId};
use chrono::Duration as ChronoDuration;

fn sample_record() -> CronRunRecord {
    let mut record = CronRunRecord::new(CronId::new("cron-a"), ThreadId::new("thread-a"), "general");
    record.cadence = Some(Cadence::Daily);
    record.purpose_tags = vec!["reminders".to_string()];
    record.model = Some("claude".to_string());
    record
}

#[test]
fn never_run_shows_pending_emoji_and_never() {
    let record = sample_record();
    let summary = compose_status_summary(&record, Utc::now());
    assert!(summary.starts_with("⏳"));
    assert!(summary.contains("never"));
}

#[test]
fn successful_run_shows_check_and_elapsed() {
    let mut record = sample_record();
    record.run_count = 3;
    record.last_run_status = Some(RunStatus::Success);
    let now = Utc::now();
    record.last_run_at = Some(now - ChronoDuration::minutes(5));
    let summary = compose_status_summary(&record, now);
    assert!(summary.starts_with("✅"));
    assert!(summary.contains("runs: 3"));
    assert!(summary.contains("cadence: 🌅 daily"));
    assert!(summary.contains("tags: reminders"));
}

#[test]
fn error_status_includes_last_error_message() {
    let mut record = sample_record();
    record.last_run_status = Some(RunStatus::Error);
    record.set_last_error_message(Some("boom".to_string()));
    let summary = compose_status_summary(&record, Utc::now());
    assert!(summary.starts_with("❌"));
    assert!(summary.contains("last error: boom"));
}

#[test]
fn render_status_block_is_fenced_and_lists_crons() {
    let snapshot = StatusSnapshot {
        uptime_ms: 90_000,
        last_message_at: None,
        crons: vec![CronSummary {
            cron_id: "cron-a".to_string(),
            next_run_human: "in 5m".to_string(),
            last_run_status: Some(RunStatus::Success),
            trigger_type: TriggerType::Schedule,
        }],
        open_task_count: 2,
        durable_item_count: 7,
        rolling_summary_chars: 512,
        probe_results: vec![ProbeResult {
            name: "chat-api".to_string(),
            ok: true,
            elapsed_ms: 42,
        }],
        workspace_checks: vec![WorkspaceCheck {
            path: "/workspace/README.md".to_string(),
            exists: true,
        }],
    };
    let rendered = render_status_block(&snapshot);
    assert!(rendered.starts_with("```\n"));
    assert!(rendered.ends_with("```"));
    assert!(rendered.contains("uptime: 1m"));
    assert!(rendered.contains("cron-a [ok] next: in 5m"));
    assert!(rendered.contains("chat-api: ok (42ms)"));
    assert!(rendered.contains("/workspace/README.md: present"));
}

#[test]
fn render_status_block_marks_empty_cron_list() {
    let snapshot = StatusSnapshot {
        uptime_ms: 0,
        last_message_at: None,
        crons: Vec::new(),
        open_task_count: 0,
        durable_item_count: 0,
        rolling_summary_chars: 0,
        probe_results: Vec::new(),
        workspace_checks: Vec::new(),
    };
    let rendered = render_status_block(&snapshot);
    assert!(rendered.contains("(none registered)"));
}
