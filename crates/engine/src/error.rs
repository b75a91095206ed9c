// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the cron scheduler and executor.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("storage error: {0}")]
    Storage(#[from] ch_storage::StoreError),
    #[error("channel not found: {0}")]
    ChannelNotFound(String),
    #[error("channel not allowed: {0}")]
    ChannelNotAllowed(String),
    #[error("invalid cron schedule {expr:?}: {reason}")]
    InvalidSchedule { expr: String, reason: String },
    #[error("chain depth limit reached")]
    ChainDepthExceeded,
    #[error("no scheduled job for cronId {0}")]
    JobNotRegistered(String),
}
