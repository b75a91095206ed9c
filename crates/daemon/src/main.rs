// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! cronhostd: the long-running automation host.
//!
//! Owns one event loop per process: a timer tick fires scheduled jobs
//! through the executor, and a debounced tag-map file change (or the same
//! timer, as a coarse fallback) drives the forum sync engine's phases.

use std::path::Path;
use std::sync::Arc;

use ch_adapters::{kill_all, ClaudeStrategy};
use ch_core::CronId;
use ch_daemon::{
    config::{self, Config, ConfigError},
    platform::{UnconfiguredChatClient, UnconfiguredForumChannel},
    tag_watcher::{load_tag_map, TagMapWatcher},
    NullClassifier, SyncEngine,
};
use ch_engine::{CronJob, CronSchedule, Executor, RunControl, Scheduler};
use ch_storage::{RecordStore, RunLock};
use parking_lot::Mutex;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("cronhostd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("cronhostd {}", env!("CARGO_PKG_VERSION"));
                println!("The forum automation host. Started by `cronhost`; not meant to be");
                println!("invoked directly in normal use.");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("usage: cronhostd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    rotate_log_if_needed(&config.log_path);
    write_startup_marker(&config)?;
    let _log_guard = setup_logging(&config)?;

    info!("starting cronhostd");

    let daemon_lock_id = CronId::new("__daemon__");
    let _run_lock = match RunLock::try_acquire(&config.lock_dir, &daemon_lock_id) {
        Ok(Some(lock)) => lock,
        Ok(None) => {
            eprintln!("cronhostd is already running (lock held under {})", config.lock_dir.display());
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "failed to acquire daemon lock");
            return Err(e.into());
        }
    };

    let store = Arc::new(Mutex::new(RecordStore::load(&config.store_path)));
    let interrupted = store.lock().sweep_interrupted()?;
    if !interrupted.is_empty() {
        warn!(count = interrupted.len(), "marked runs interrupted by a previous crash");
    }

    let guild_id = std::env::var("CRONHOST_GUILD_ID").unwrap_or_default();
    let default_model = std::env::var("CRONHOST_DEFAULT_MODEL").unwrap_or_else(|_| "sonnet".to_string());

    let scheduler = Arc::new(Mutex::new(Scheduler::new()));
    seed_scheduler(&store, &scheduler, &guild_id);

    let run_control = Arc::new(RunControl::new());
    let strategy = Arc::new(ClaudeStrategy::new());
    let chat = Arc::new(UnconfiguredChatClient);
    let executor = Arc::new(Executor::new(
        guild_id.clone(),
        strategy,
        default_model,
        chat,
        Arc::clone(&store),
        Arc::clone(&scheduler),
        run_control,
        config.lock_dir.clone(),
    ));

    let forum = Arc::new(UnconfiguredForumChannel::new(guild_id.clone()));
    let classifier = Arc::new(NullClassifier);
    let tag_map = Arc::new(Mutex::new(load_tag_map(&config.tag_map_path)));
    let sync_engine = Arc::new(SyncEngine::new(Arc::clone(&store), forum, classifier, Arc::clone(&tag_map)));

    let mut tag_map_changed = TagMapWatcher::new(&config.tag_map_path).spawn();

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut timer_check = tokio::time::interval(config::timer_check_interval());

    info!("cronhostd ready");
    println!("READY");

    loop {
        tokio::select! {
            _ = timer_check.tick() => {
                let now = chrono::Utc::now();
                let fired = scheduler.lock().fired_jobs(now);
                for cron_id in fired {
                    let executor = Arc::clone(&executor);
                    tokio::spawn(async move {
                        if let Err(e) = executor.execute_cron_job(&cron_id, 0).await {
                            error!(cron_id = %cron_id.as_str(), error = %e, "cron job could not be run");
                        }
                    });
                }
            }

            Some(()) = tag_map_changed.recv() => {
                info!("tag map changed; reloading and reconciling forum state");
                *tag_map.lock() = load_tag_map(&config.tag_map_path);
                run_sync_once(&sync_engine).await;
            }

            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                executor.process_pool().kill_all().await;
                kill_all();
                break;
            }

            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                executor.process_pool().kill_all().await;
                kill_all();
                break;
            }
        }
    }

    info!("cronhostd stopped");
    Ok(())
}

fn seed_scheduler(store: &Arc<Mutex<RecordStore>>, scheduler: &Arc<Mutex<Scheduler>>, guild_id: &str) {
    let now = chrono::Utc::now();
    for record in store.lock().list() {
        let schedule = record.schedule.as_ref().and_then(|expr| {
            let tz: chrono_tz::Tz = record.timezone.parse().unwrap_or(chrono_tz::UTC);
            CronSchedule::parse(expr, tz).ok()
        });
        let job = CronJob::new(record.cron_id.clone(), schedule, guild_id, record.channel.clone(), now);
        scheduler.lock().register(job);
    }
}

/// Run all four forum sync phases back to back, logging each report. Never
/// fails the daemon: every phase already swallows its own per-item errors.
async fn run_sync_once(engine: &Arc<SyncEngine>) {
    let now = chrono::Utc::now();
    let phase1 = engine.run_phase1(now).await;
    info!(attempted = phase1.attempted, succeeded = phase1.succeeded, errors = phase1.errors.len(), "sync phase 1 (classification) complete");
    let phase2 = engine.run_phase2().await;
    info!(attempted = phase2.attempted, succeeded = phase2.succeeded, errors = phase2.errors.len(), "sync phase 2 (thread names) complete");
    let phase3 = engine.run_phase3(now).await;
    info!(attempted = phase3.attempted, succeeded = phase3.succeeded, errors = phase3.errors.len(), "sync phase 3 (status messages) complete");
    let phase4 = engine.run_phase4().await;
    info!(attempted = phase4.attempted, succeeded = phase4.succeeded, "sync phase 4 (orphan detection) complete");
}

/// Maximum log file size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Rotate `daemon.log` to `daemon.log.1` once it exceeds [`MAX_LOG_SIZE`].
/// Best-effort: rotation failures are silently ignored so the daemon still
/// starts.
fn rotate_log_if_needed(log_path: &Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }
    let _ = std::fs::rename(log_path, format!("{}.1", log_path.display()));
}

const STARTUP_MARKER_PREFIX: &str = "--- cronhostd: starting (pid: ";

fn write_startup_marker(config: &Config) -> Result<(), ConfigError> {
    use std::io::Write;
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

fn setup_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard, ConfigError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = config.log_path.file_name().ok_or(ConfigError::NoStateDir)?;
    let parent = config.log_path.parent().ok_or(ConfigError::NoStateDir)?;
    let file_appender = tracing_appender::rolling::never(parent, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
