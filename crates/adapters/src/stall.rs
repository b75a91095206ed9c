// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dual stall detectors for a streaming invocation: a *stream* stall (no
//! bytes at all) and a *progress* stall (bytes arriving but no meaningful
//! forward movement, e.g. a tool loop emitting only heartbeats).

use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallKind {
    Stream,
    Progress,
}

/// Tracks two independent "last observed" clocks against their own budgets.
pub struct StallTracker {
    stream_timeout: Duration,
    progress_timeout: Duration,
    last_byte: Instant,
    last_progress: Instant,
}

impl StallTracker {
    pub fn new(stream_timeout: Duration, progress_timeout: Duration) -> Self {
        let now = Instant::now();
        Self {
            stream_timeout,
            progress_timeout,
            last_byte: now,
            last_progress: now,
        }
    }

    /// Call on every byte observed from the subprocess, regardless of
    /// whether it constitutes progress.
    pub fn note_activity(&mut self) {
        self.last_byte = Instant::now();
    }

    /// Call on a meaningful delta (text, tool event) — resets both clocks.
    pub fn note_progress(&mut self) {
        let now = Instant::now();
        self.last_byte = now;
        self.last_progress = now;
    }

    /// The stalled kind, if either budget has been exceeded. Stream stall is
    /// checked first since it implies progress stall too.
    pub fn check(&self) -> Option<StallKind> {
        let now = Instant::now();
        if now.duration_since(self.last_byte) >= self.stream_timeout {
            Some(StallKind::Stream)
        } else if now.duration_since(self.last_progress) >= self.progress_timeout {
            Some(StallKind::Progress)
        } else {
            None
        }
    }

    /// Duration until the next check could plausibly fire something, for
    /// sizing a `tokio::time::sleep` in the invocation loop.
    pub fn next_deadline(&self) -> Instant {
        std::cmp::min(
            self.last_byte + self.stream_timeout,
            self.last_progress + self.progress_timeout,
        )
    }
}

#[cfg(test)]
#[path = "stall_tests.rs"]
mod tests;
