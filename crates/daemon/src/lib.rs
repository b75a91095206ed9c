// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cronhostd`: the long-running automation host that fires scheduled jobs
//! and keeps the forum's threads, tags, and pinned status messages in sync
//! with the in-process record store. This crate is a library plus the
//! `cronhostd` binary (`src/main.rs`); the `cronhost` CLI talks to the same
//! on-disk state rather than to this crate directly.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod classifier;
pub mod config;
pub mod forum;
pub mod platform;
pub mod status;
pub mod sync;
pub mod tag_watcher;

pub use classifier::{Classification, NullClassifier, PurposeClassifier};
pub use config::{Config, ConfigError};
pub use forum::{ForumChannel, ForumThread};
pub use platform::{UnconfiguredChatClient, UnconfiguredForumChannel};
pub use status::{render_status_block, CronSummary, ProbeResult, StatusSnapshot, WorkspaceCheck};
pub use sync::{derive_cadence, plan_task_sync, PhaseReport, SyncEngine, TaskSnapshot, TaskSyncOp};
pub use tag_watcher::{load_tag_map, TagMapWatcher};
