// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-global session-ID store for `MultiTurnMode::SessionResume`
//! strategies. Keyed by a caller-chosen session key (e.g. a cron ID), not by
//! the runtime-assigned session ID itself, so the caller never has to track
//! the mapping on its own side.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn store() -> &'static Mutex<HashMap<String, String>> {
    static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
    STORE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// The session ID last recorded for `key`, if any.
pub fn lookup(key: &str) -> Option<String> {
    store().lock().get(key).cloned()
}

/// Record (or overwrite) the session ID for `key`.
pub fn record(key: &str, session_id: String) {
    store().lock().insert(key.to_string(), session_id);
}

/// Forget the session ID for `key`, so the next invocation starts fresh.
pub fn clear(key: &str) {
    store().lock().remove(key);
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
