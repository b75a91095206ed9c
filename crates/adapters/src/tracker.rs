// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-global subprocess tracker. Every spawned invocation registers its
//! PID here; on host SIGTERM the daemon calls [`kill_all`] to guarantee no
//! orphaned model-CLI subprocess survives the parent.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn registry() -> &'static Mutex<HashSet<u32>> {
    static REGISTRY: OnceLock<Mutex<HashSet<u32>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashSet::new()))
}

/// RAII guard: registers `pid` on construction, deregisters on drop.
pub struct TrackedPid(u32);

impl TrackedPid {
    pub fn new(pid: u32) -> Self {
        registry().lock().insert(pid);
        TrackedPid(pid)
    }
}

impl Drop for TrackedPid {
    fn drop(&mut self) {
        registry().lock().remove(&self.0);
    }
}

/// Currently tracked PIDs, for diagnostics/tests.
pub fn tracked_pids() -> Vec<u32> {
    registry().lock().iter().copied().collect()
}

/// SIGKILL every currently tracked subprocess. Called once, at shutdown.
/// Shells out to `kill -9` rather than a raw syscall to keep this crate
/// free of `unsafe` (forbidden workspace-wide).
pub fn kill_all() {
    let pids: Vec<u32> = registry().lock().iter().copied().collect();
    for pid in pids {
        let _ = std::process::Command::new("kill")
            .arg("-9")
            .arg(pid.to_string())
            .status();
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
