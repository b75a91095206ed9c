// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tag-map file watcher: notify-driven with a stat-poll fallback, since some
//! platforms miss atomic-rename replacements (the usual way a config file is
//! rewritten). The poller is keyed by `mtime` and seeded before the watcher
//! is armed, so starting the daemon never fires a spurious first reload.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Load the tag-map document: semantic tag name → platform tag ID. A missing
/// or malformed file yields an empty map; the sync engine then simply warns
/// on every tag it cannot resolve rather than failing to start.
pub fn load_tag_map(path: &Path) -> HashMap<String, String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return HashMap::new(),
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        warn!(error = %err, path = %path.display(), "tag map is not valid JSON; ignoring");
        HashMap::new()
    })
}

fn stat_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok()?.modified().ok()
}

fn arm_watcher(path: &Path, tx: mpsc::UnboundedSender<()>) -> Option<RecommendedWatcher> {
    let root = path.parent().filter(|p| p.exists())?;
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if res.is_ok() {
            let _ = tx.send(());
        }
    })
    .ok()?;
    watcher.watch(root, RecursiveMode::NonRecursive).ok()?;
    Some(watcher)
}

/// Watches one tag-map file and emits a `()` each time its content has
/// genuinely changed (by `mtime`), debounced so a burst of filesystem events
/// collapses into a single reload signal.
pub struct TagMapWatcher {
    path: PathBuf,
    debounce: std::time::Duration,
    poll_interval: std::time::Duration,
    absent_dir_poll_interval: std::time::Duration,
}

impl TagMapWatcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            debounce: crate::config::tag_map_debounce(),
            poll_interval: crate::config::tag_map_poll_interval(),
            absent_dir_poll_interval: crate::config::tag_map_absent_dir_poll_interval(),
        }
    }

    #[cfg(test)]
    fn with_intervals(
        mut self,
        debounce: std::time::Duration,
        poll_interval: std::time::Duration,
        absent_dir_poll_interval: std::time::Duration,
    ) -> Self {
        self.debounce = debounce;
        self.poll_interval = poll_interval;
        self.absent_dir_poll_interval = absent_dir_poll_interval;
        self
    }

    /// Spawn the watch/poll loop on the current Tokio runtime. The returned
    /// channel has capacity 1: a consumer that is mid-sync when a second
    /// change lands just re-syncs once more instead of queueing reloads.
    pub fn spawn(self) -> mpsc::Receiver<()> {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(self.run(tx));
        rx
    }

    async fn run(self, tx: mpsc::Sender<()>) {
        let mut last_mtime = stat_mtime(&self.path);

        let (watch_tx, mut watch_rx) = mpsc::unbounded_channel();
        let mut watcher = arm_watcher(&self.path, watch_tx.clone());
        if watcher.is_none() {
            debug!(path = %self.path.display(), "tag map parent directory absent; polling until it appears");
        }

        loop {
            let parent_exists = self.path.parent().map(Path::exists).unwrap_or(true);
            let poll_after = if parent_exists { self.poll_interval } else { self.absent_dir_poll_interval };

            tokio::select! {
                Some(()) = watch_rx.recv() => {
                    tokio::time::sleep(self.debounce).await;
                    while watch_rx.try_recv().is_ok() {}
                    if !self.maybe_notify(&mut last_mtime, &tx).await {
                        return;
                    }
                }
                _ = tokio::time::sleep(poll_after) => {
                    if watcher.is_none() && parent_exists {
                        watcher = arm_watcher(&self.path, watch_tx.clone());
                    }
                    if !self.maybe_notify(&mut last_mtime, &tx).await {
                        return;
                    }
                }
            }
        }
    }

    /// Returns `false` once the receiving end has been dropped, so the
    /// caller can stop looping instead of spinning against a dead channel.
    async fn maybe_notify(&self, last_mtime: &mut Option<SystemTime>, tx: &mpsc::Sender<()>) -> bool {
        let mtime = stat_mtime(&self.path);
        if mtime == *last_mtime {
            return true;
        }
        *last_mtime = mtime;
        tx.send(()).await.is_ok()
    }
}

#[cfg(test)]
#[path = "tag_watcher_tests.rs"]
mod tests;
