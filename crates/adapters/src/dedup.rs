// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Invocation-scoped image-event dedup. A single runtime invocation may emit
//! the same image bytes more than once (e.g. a tool echoing back its own
//! output); dedup keys on a content hash and drops repeats and anything past
//! the per-invocation cap.

use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Excess images after the cap are dropped, not queued.
pub const MAX_IMAGES_PER_INVOCATION: usize = 8;

pub struct ImageDedup {
    seen: HashSet<String>,
    accepted: usize,
    cap: usize,
}

impl ImageDedup {
    pub fn new() -> Self {
        Self::with_cap(MAX_IMAGES_PER_INVOCATION)
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            seen: HashSet::new(),
            accepted: 0,
            cap,
        }
    }

    /// Content hash used as the dedup key: SHA-256 over the raw image bytes.
    pub fn content_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    /// Returns `true` if `data` should be emitted: not a duplicate within
    /// this invocation, and under the per-invocation cap.
    pub fn accept(&mut self, data: &[u8]) -> Option<String> {
        if self.accepted >= self.cap {
            return None;
        }
        let hash = Self::content_hash(data);
        if self.seen.contains(&hash) {
            return None;
        }
        self.seen.insert(hash.clone());
        self.accepted += 1;
        Some(hash)
    }
}

impl Default for ImageDedup {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "dedup_tests.rs"]
mod tests;
