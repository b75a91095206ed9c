// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cronhost status` — a one-shot (or `--watch`) render of the same snapshot
//! the forum's `!status` command composes, read directly from the on-disk
//! record store rather than through a live daemon connection (`cronhostd`
//! exposes no query socket; see DESIGN.md). Uptime, last-message time, and
//! the durable-memory counters are therefore always reported as unavailable
//! here — they only exist inside a running chat session.

use std::io::Write as _;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;

use ch_daemon::config::Config;
use ch_daemon::status::{render_status_block, StatusSnapshot, WorkspaceCheck};
use ch_engine::CronSchedule;
use ch_storage::RecordStore;

#[derive(clap::Args)]
pub struct StatusArgs {
    /// Re-render on an interval until interrupted.
    #[arg(long)]
    pub watch: bool,
    /// Refresh interval in seconds for `--watch`.
    #[arg(long, default_value_t = 5)]
    pub interval_secs: u64,
}

pub async fn handle(args: StatusArgs) -> Result<()> {
    if !args.watch {
        println!("{}", render_once()?);
        return Ok(());
    }
    if args.interval_secs == 0 {
        anyhow::bail!("--interval-secs must be > 0");
    }
    loop {
        print!("\x1B[H\x1B[J{}\n", render_once()?);
        std::io::stdout().flush()?;
        tokio::time::sleep(Duration::from_secs(args.interval_secs)).await;
    }
}

fn render_once() -> Result<String> {
    let config = Config::load()?;
    let store = RecordStore::load(&config.store_path);
    let now = Utc::now();

    let crons = StatusSnapshot::collect_crons(&store, |record| {
        let next = record.schedule.as_ref().and_then(|expr| {
            let tz: chrono_tz::Tz = record.timezone.parse().unwrap_or(chrono_tz::UTC);
            CronSchedule::parse(expr, tz).ok().and_then(|s| s.next_after(now))
        });
        match next {
            Some(at) => format!("in {}", ch_core::format_elapsed_ms((at - now).num_milliseconds().max(0) as u64)),
            None => "(no schedule)".to_string(),
        }
    });

    let workspace_checks = vec![
        WorkspaceCheck { path: config.store_path.display().to_string(), exists: config.store_path.exists() },
        WorkspaceCheck { path: config.tag_map_path.display().to_string(), exists: config.tag_map_path.exists() },
        WorkspaceCheck { path: config.lock_dir.display().to_string(), exists: config.lock_dir.exists() },
    ];

    let snapshot = StatusSnapshot {
        uptime_ms: 0,
        last_message_at: None,
        crons,
        open_task_count: 0,
        durable_item_count: 0,
        rolling_summary_chars: 0,
        probe_results: Vec::new(),
        workspace_checks,
    };

    Ok(render_status_block(&snapshot))
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
