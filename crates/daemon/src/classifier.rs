// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Purpose-tag and model classification for phase 1 of the sync engine.
//! Classification itself (calling out to an AI) is an external concern, not
//! specified by the wire shapes this crate owns; `PurposeClassifier` is the
//! seam `SyncEngine` calls through, grounded in the same trait-at-the-seam
//! pattern as `ch_engine::chat::ChatClient`.

use async_trait::async_trait;
use ch_core::Cadence;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub purpose_tags: Vec<String>,
    pub model: Option<String>,
}

#[async_trait]
pub trait PurposeClassifier: Send + Sync {
    async fn classify(&self, prompt: &str, cadence: Option<Cadence>) -> Classification;
}

/// A classifier that declines to classify. Used when no concrete classifier
/// is configured; phase 1 then leaves `purposeTags`/`model` untouched and
/// only derives cadence, which needs no external call.
pub struct NullClassifier;

#[async_trait]
impl PurposeClassifier for NullClassifier {
    async fn classify(&self, _prompt: &str, _cadence: Option<Cadence>) -> Classification {
        Classification::default()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeClassifier;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;

    /// Always returns the same canned classification, regardless of input.
    pub struct FakeClassifier(pub Classification);

    #[async_trait]
    impl PurposeClassifier for FakeClassifier {
        async fn classify(&self, _prompt: &str, _cadence: Option<Cadence>) -> Classification {
            self.0.clone()
        }
    }
}
