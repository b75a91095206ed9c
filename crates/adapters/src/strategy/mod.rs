// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pluggable per-runtime strategy surface. A strategy knows how to build
//! a command line for one model CLI; the framework in `invoke` supplies
//! everything else (subprocess lifecycle, timeouts, stall detection, event
//! queue, sanitization).

use async_trait::async_trait;
use std::time::Duration;

pub mod claude;
pub mod codex;
pub mod gemini;

/// How a strategy's subprocess emits output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Plain text on stdout; the framework treats each flush as a delta.
    Text,
    /// One JSON object per line on stdout.
    Jsonl,
}

/// How a multi-turn conversation is continued across invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiTurnMode {
    /// Every invocation is a fresh process; no continuation.
    #[default]
    None,
    /// A long-lived process from the pool is reused and fed new turns.
    ProcessPool,
    /// Each invocation is a new process, passed a session ID to resume.
    SessionResume,
}

/// Invocation-scoped context passed to every strategy hook.
#[derive(Debug, Clone)]
pub struct InvokeContext {
    pub model: Option<String>,
    pub session_id: Option<String>,
    /// Lookup key into the session store (`crate::session`); distinct from
    /// `session_id`, which is the resolved ID a strategy actually passes on
    /// its command line. Set by the caller, resolved by the framework.
    pub session_key: Option<String>,
    pub tool_tier: Option<String>,
    pub workspace_dir: Option<std::path::PathBuf>,
}

/// Caller-supplied invocation options.
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    pub prompt: String,
    pub timeout: Option<Duration>,
    /// The full tool catalog available to this invocation, before the
    /// tool-tier filter narrows it. Empty means "no tool list is passed".
    pub tools: Vec<String>,
}

/// What a strategy extracted from one output line or event.
#[derive(Debug, Clone, Default)]
pub struct ParsedLine {
    pub text: Option<String>,
    pub result_text: Option<String>,
    pub image_base64: Option<String>,
    pub image_mime_type: Option<String>,
    pub activity: Option<String>,
    pub in_tool_use: bool,
    /// A runtime-assigned session/conversation ID, captured so the
    /// `SessionResume` lifecycle can store it for the next turn.
    pub session_id: Option<String>,
}

/// Minimum tier a tool requires. Tools not listed here carry no minimum and
/// always pass the filter, regardless of tier.
fn tool_min_tier(tool: &str) -> Option<&'static str> {
    const STANDARD_TIER_TOOLS: &[&str] = &["web_search", "web_fetch", "bash", "code_execution"];
    const FULL_TIER_TOOLS: &[&str] = &["computer_use", "file_write", "mcp"];
    if FULL_TIER_TOOLS.contains(&tool) {
        Some("full")
    } else if STANDARD_TIER_TOOLS.contains(&tool) {
        Some("standard")
    } else {
        None
    }
}

fn tier_rank(tier: &str) -> u8 {
    match tier {
        "basic" => 0,
        "standard" => 1,
        "full" => 2,
        _ => 2,
    }
}

/// Drop tools whose minimum tier exceeds `tier`. A tool with no recognized
/// minimum (including an unrecognized tool name) always passes through.
/// `tier: None` is treated as the most permissive tier (`full`), since a
/// strategy invoked without a resolved tier has nothing to filter against.
pub fn filter_tools(tier: Option<&str>, tools: &[String]) -> Vec<String> {
    let rank = tier.map(tier_rank).unwrap_or(tier_rank("full"));
    tools
        .iter()
        .filter(|tool| tool_min_tier(tool).map(|min| tier_rank(min) <= rank).unwrap_or(true))
        .cloned()
        .collect()
}

/// Render a filtered tool list as `--tool <name>` repeated flags, the
/// convention every strategy's `build_args` appends ahead of the option
/// terminator.
pub fn tool_args(tier: Option<&str>, tools: &[String]) -> Vec<String> {
    filter_tools(tier, tools)
        .into_iter()
        .flat_map(|tool| vec!["--tool".to_string(), tool])
        .collect()
}

/// Identity and capability metadata for one runtime.
#[derive(Debug, Clone)]
pub struct StrategyIdentity {
    pub id: &'static str,
    pub default_binary: String,
    pub default_model: &'static str,
    pub multi_turn_mode: MultiTurnMode,
}

/// A pluggable per-runtime strategy. Implementations live under
/// `strategy::claude`, `strategy::codex`, `strategy::gemini`.
#[async_trait]
pub trait RuntimeStrategy: Send + Sync {
    fn identity(&self) -> StrategyIdentity;

    /// Full command-line arguments, including an option terminator (`--`)
    /// ahead of any argument derived from user content.
    fn build_args(&self, ctx: &InvokeContext, opts: &InvokeOptions) -> Vec<String>;

    fn output_mode(&self, ctx: &InvokeContext) -> OutputMode;

    /// Large prompts or image content blocks go over stdin instead of argv;
    /// `None` means "use argv only".
    fn build_stdin_payload(&self, _ctx: &InvokeContext, _opts: &InvokeOptions) -> Option<Vec<u8>> {
        None
    }

    /// Interpret one output line (text mode) or event (JSONL mode).
    fn parse_line(&self, _raw: &str, _ctx: &InvokeContext) -> ParsedLine {
        ParsedLine::default()
    }

    /// Turn a raw spawn-time OS error into a user-safe message.
    fn handle_spawn_error(&self, error: &std::io::Error) -> String {
        if error.kind() == std::io::ErrorKind::NotFound {
            format!("{} binary not found", self.identity().id)
        } else {
            format!("{} process failed unexpectedly", self.identity().id)
        }
    }

    /// Turn a non-zero exit code (plus sanitized stderr tail) into a
    /// user-safe message.
    fn handle_exit_error(&self, code: i32, sanitized_stderr: Option<&str>) -> String {
        match sanitized_stderr {
            Some(tail) => tail.to_string(),
            None => format!("{} process exited with code {code}", self.identity().id),
        }
    }

    /// Lines a strategy knows are noise and should be skipped when hunting
    /// for the first diagnostic stderr line.
    fn is_noise_line(&self, _line: &str) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
