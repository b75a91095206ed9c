// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status snapshot assembly and rendering, shared by the forum sync engine's
//! pinned-message phase (3) and the `cronhost status` CLI subcommand.
//!
//! Grounded in the teacher's `cli/src/commands/status.rs` +
//! `cli/src/table.rs` column-layout and elapsed-time rendering helpers,
//! retargeted from job/worker/queue counts to cron-job counts.

use ch_core::cron::{RunStatus, TriggerType};
use ch_core::{format_elapsed_ms, CronRunRecord};
use ch_storage::RecordStore;
use chrono::{DateTime, Utc};

/// One pinned-per-thread status line: the deterministic summary described in
/// spec.md §4.5 phase 3.
pub fn compose_status_summary(record: &CronRunRecord, now: DateTime<Utc>) -> String {
    let status_emoji = match record.last_run_status {
        Some(RunStatus::Success) => "✅",
        Some(RunStatus::Error) => "❌",
        Some(RunStatus::Running) => "🔄",
        Some(RunStatus::Interrupted) => "⚠️",
        None => "⏳",
    };

    let last_run = match record.last_run_at {
        Some(at) => format!("{} ago", format_elapsed_ms((now - at).num_milliseconds().max(0) as u64)),
        None => "never".to_string(),
    };

    let mut lines = vec![format!(
        "{status_emoji} last run: {last_run} · runs: {} · model: {}",
        record.run_count,
        record.effective_model().unwrap_or("(unclassified)"),
    )];

    if let Some(cadence) = record.cadence {
        lines.push(format!("cadence: {} {}", cadence.emoji(), cadence.tag_name()));
    }
    if !record.purpose_tags.is_empty() {
        lines.push(format!("tags: {}", record.purpose_tags.join(", ")));
    }
    if let Some(err) = &record.last_error_message {
        lines.push(format!("last error: {err}"));
    }

    lines.join("\n")
}

/// Daemon-wide snapshot collected for `!status` / `cronhost status`.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub uptime_ms: u64,
    pub last_message_at: Option<DateTime<Utc>>,
    pub crons: Vec<CronSummary>,
    pub open_task_count: usize,
    pub durable_item_count: usize,
    pub rolling_summary_chars: usize,
    pub probe_results: Vec<ProbeResult>,
    pub workspace_checks: Vec<WorkspaceCheck>,
}

#[derive(Debug, Clone)]
pub struct CronSummary {
    pub cron_id: String,
    pub next_run_human: String,
    pub last_run_status: Option<RunStatus>,
    pub trigger_type: TriggerType,
}

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub name: String,
    pub ok: bool,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct WorkspaceCheck {
    pub path: String,
    pub exists: bool,
}

impl StatusSnapshot {
    /// Collect the cron portion of a snapshot from the record store; the
    /// caller fills in the remaining fields (probes, uptime, message
    /// timestamps) from whatever owns that state.
    pub fn collect_crons(store: &RecordStore, next_run_human: impl Fn(&CronRunRecord) -> String) -> Vec<CronSummary> {
        store
            .list()
            .map(|record| CronSummary {
                cron_id: record.cron_id.as_str().to_string(),
                next_run_human: next_run_human(record),
                last_run_status: record.last_run_status,
                trigger_type: record.trigger_type,
            })
            .collect()
    }
}

/// Render a snapshot as the fenced plain-text block described in spec.md §6.
pub fn render_status_block(snapshot: &StatusSnapshot) -> String {
    let mut out = String::from("```\n");
    out.push_str(&format!("uptime: {}\n", format_elapsed_ms(snapshot.uptime_ms)));
    match snapshot.last_message_at {
        Some(at) => out.push_str(&format!("last message: {}\n", at.to_rfc3339())),
        None => out.push_str("last message: (none)\n"),
    }
    out.push_str(&format!("open tasks: {}\n", snapshot.open_task_count));
    out.push_str(&format!("durable items: {}\n", snapshot.durable_item_count));
    out.push_str(&format!("rolling summary: {} chars\n", snapshot.rolling_summary_chars));

    out.push_str("\ncrons:\n");
    if snapshot.crons.is_empty() {
        out.push_str("  (none registered)\n");
    }
    for cron in &snapshot.crons {
        let status = match cron.last_run_status {
            Some(RunStatus::Success) => "ok",
            Some(RunStatus::Error) => "error",
            Some(RunStatus::Running) => "running",
            Some(RunStatus::Interrupted) => "interrupted",
            None => "never run",
        };
        out.push_str(&format!(
            "  {} [{status}] next: {}\n",
            cron.cron_id, cron.next_run_human
        ));
    }

    out.push_str("\nprobes:\n");
    for probe in &snapshot.probe_results {
        let mark = if probe.ok { "ok" } else { "FAIL" };
        out.push_str(&format!("  {}: {mark} ({}ms)\n", probe.name, probe.elapsed_ms));
    }

    out.push_str("\nworkspace files:\n");
    for check in &snapshot.workspace_checks {
        let mark = if check.exists { "present" } else { "MISSING" };
        out.push_str(&format!("  {}: {mark}\n", check.path));
    }

    out.push_str("```");
    out
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
