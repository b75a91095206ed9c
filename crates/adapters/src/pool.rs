// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Long-lived process pool for strategies whose `multi_turn_mode` is
//! `ProcessPool`. Owned by the adapter; exposes `kill_all()` and evicts
//! entries that have been idle past a budget.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::process::Child;

struct PooledProcess {
    child: Child,
    last_used: Instant,
}

/// Keyed by session ID so a strategy can resume the same long-lived process
/// across turns of one conversation.
pub struct ProcessPool {
    entries: Mutex<HashMap<String, PooledProcess>>,
    idle_eviction: Duration,
}

impl ProcessPool {
    pub fn new(idle_eviction: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            idle_eviction,
        }
    }

    /// Hand a live process into the pool under `session_id`, replacing and
    /// killing any prior occupant.
    pub fn put(&self, session_id: String, child: Child) {
        let mut entries = self.entries.lock();
        entries.insert(
            session_id,
            PooledProcess { child, last_used: Instant::now() },
        );
    }

    /// Remove and return the process for `session_id`, if present and not
    /// evicted.
    pub fn take(&self, session_id: &str) -> Option<Child> {
        let mut entries = self.entries.lock();
        entries.remove(session_id).map(|p| p.child)
    }

    pub fn touch(&self, session_id: &str) {
        if let Some(entry) = self.entries.lock().get_mut(session_id) {
            entry.last_used = Instant::now();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Session IDs idle past the eviction budget; the caller should
    /// `take()` and kill each one.
    pub fn idle_sessions(&self) -> Vec<String> {
        let now = Instant::now();
        self.entries
            .lock()
            .iter()
            .filter(|(_, p)| now.duration_since(p.last_used) >= self.idle_eviction)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Kill every pooled process. Called on host shutdown.
    pub async fn kill_all(&self) {
        let mut drained: Vec<PooledProcess> = {
            let mut entries = self.entries.lock();
            entries.drain().map(|(_, p)| p).collect()
        };
        for pooled in drained.iter_mut() {
            let _ = pooled.child.kill().await;
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
