// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Override the default binary path for a runtime, e.g. `CLAUDE_BIN`.
pub fn runtime_bin_override(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.is_empty())
}

/// Stream-stall detector budget: no bytes observed at all (default: 30s).
pub fn stream_stall_timeout() -> Duration {
    parse_duration_ms("STREAM_STALL_TIMEOUT_MS").unwrap_or(Duration::from_secs(30))
}

/// Progress-stall detector budget: no new *meaningful* progress, distinct
/// from raw byte activity (default: 120s).
pub fn progress_stall_timeout() -> Duration {
    parse_duration_ms("PROGRESS_STALL_TIMEOUT_MS").unwrap_or(Duration::from_secs(120))
}

/// `SMOKE_TEST_TIMEOUT_MS` — positive integer; other values are a
/// configuration error the caller should surface.
pub fn smoke_test_timeout_ms() -> Result<Option<u64>, String> {
    match std::env::var("SMOKE_TEST_TIMEOUT_MS") {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|v| *v > 0)
            .map(Some)
            .ok_or_else(|| format!("SMOKE_TEST_TIMEOUT_MS must be a positive integer, got {raw:?}")),
    }
}

/// Comma-separated tier names for a smoke-test env var, e.g.
/// `SMOKE_TEST_TIERS`, `GEMINI_SMOKE_TEST_TIERS`.
pub fn smoke_test_tiers(var: &str) -> Vec<String> {
    std::env::var(var)
        .ok()
        .map(|s| {
            s.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
