// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Runtime adapters: the subprocess-based framework that drives model CLIs
//! (Claude Code, Codex, Gemini) behind one uniform invoke contract.

mod dedup;
mod env;
mod invoke;
mod pool;
mod session;
mod stall;
pub mod strategy;
pub mod subprocess;
mod tracker;

pub use dedup::{ImageDedup, MAX_IMAGES_PER_INVOCATION};
pub use env::{progress_stall_timeout, runtime_bin_override, smoke_test_tiers, smoke_test_timeout_ms, stream_stall_timeout};
pub use invoke::{invoke, InvokeHandle, STDIN_THRESHOLD};
pub use pool::ProcessPool;
pub use stall::{StallKind, StallTracker};
pub use strategy::{
    claude::ClaudeStrategy, codex::CodexStrategy, gemini::GeminiStrategy, InvokeContext, InvokeOptions, MultiTurnMode,
    OutputMode, ParsedLine, RuntimeStrategy, StrategyIdentity,
};
pub use tracker::{kill_all, tracked_pids, TrackedPid};
