// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access and path layout for the daemon.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not resolve a state directory ($HOME/$CRONHOST_STATE_DIR unset)")]
    NoStateDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve the state directory: `CRONHOST_STATE_DIR` > `XDG_STATE_HOME/cronhost` >
/// `~/.local/state/cronhost`.
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("CRONHOST_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("cronhost"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/cronhost"))
}

/// Daemon path layout, all rooted under `state_dir()`.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub store_path: PathBuf,
    pub lock_dir: PathBuf,
    pub tag_map_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = state_dir()?;
        Ok(Self {
            store_path: state_dir.join("crons.json"),
            lock_dir: state_dir.join("locks"),
            tag_map_path: state_dir.join("tag-map.json"),
            log_path: state_dir.join("daemon.log"),
            state_dir,
        })
    }
}

/// Scheduler tick resolution, configurable via `CRONHOST_TIMER_CHECK_MS` (default 1000ms).
pub fn timer_check_interval() -> Duration {
    env_ms("CRONHOST_TIMER_CHECK_MS").unwrap_or(Duration::from_secs(1))
}

/// Inter-operation throttle within one sync phase (default 250ms), per spec.md §4.5.
pub fn sync_throttle() -> Duration {
    env_ms("CRONHOST_SYNC_THROTTLE_MS").unwrap_or(Duration::from_millis(250))
}

/// Debounce window after a tag-map file change before re-running sync (default 2s).
pub fn tag_map_debounce() -> Duration {
    env_ms("CRONHOST_TAG_MAP_DEBOUNCE_MS").unwrap_or(Duration::from_secs(2))
}

/// Poll-fallback interval once the tag-map's parent directory exists (default 30s).
pub fn tag_map_poll_interval() -> Duration {
    env_ms("CRONHOST_TAG_MAP_POLL_MS").unwrap_or(Duration::from_secs(30))
}

/// Coarser poll interval while the tag-map's parent directory does not yet
/// exist (default 30s, same floor as the regular poll fallback).
pub fn tag_map_absent_dir_poll_interval() -> Duration {
    env_ms("CRONHOST_TAG_MAP_ABSENT_POLL_MS").unwrap_or(Duration::from_secs(30))
}

fn env_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
