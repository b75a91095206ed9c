// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job cancellation hooks, injected into the executor so a `cancelRun`
//! action directive can interrupt an in-progress run by ID without the
//! registry needing a reference back into the executor.

use ch_core::CronId;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::oneshot;

#[derive(Default)]
pub struct RunControl {
    hooks: Mutex<HashMap<CronId, oneshot::Sender<()>>>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cancel hook for a job about to run. Any previous hook for
    /// the same job is dropped (its receiver observes a closed channel).
    pub fn register(&self, cron_id: CronId, cancel: oneshot::Sender<()>) {
        self.hooks.lock().insert(cron_id, cancel);
    }

    /// Clear a job's hook once the run has finished, successfully or not.
    pub fn clear(&self, cron_id: &CronId) {
        self.hooks.lock().remove(cron_id);
    }

    /// Request cancellation of an in-progress run. Returns `true` if a hook
    /// was present and notified; `false` if the job was not running.
    pub fn cancel(&self, cron_id: &CronId) -> bool {
        if let Some(hook) = self.hooks.lock().remove(cron_id) {
            let _ = hook.send(());
            true
        } else {
            false
        }
    }

    pub fn is_running(&self, cron_id: &CronId) -> bool {
        self.hooks.lock().contains_key(cron_id)
    }
}

#[cfg(test)]
#[path = "run_control_tests.rs"]
mod tests;
