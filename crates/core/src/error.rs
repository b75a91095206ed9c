// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical error taxonomy shared by the adapter framework, executor, and
//! record store, plus the sanitized user-facing message mapping.

use serde::{Deserialize, Serialize};

/// Maximum length of a sanitized stderr diagnostic line surfaced to users.
pub const SANITIZED_MESSAGE_CAP: usize = 200;

/// Canonical error kind. Carries no free-form payload by design: the
/// sanitization rules in the error-handling design forbid echoing a
/// prompt or command line, so every variant either has no data or a
/// pre-sanitized field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuntimeErrorKind {
    /// Caller requested cancellation.
    Aborted,
    /// Outer wall-clock timeout fired.
    Timeout { runtime: String, timeout_ms: u64 },
    /// No output observed for the stream-stall budget.
    StreamStall { timeout_ms: u64 },
    /// No progress observed for the progress-stall budget.
    ProgressStall { timeout_ms: u64 },
    /// Binary missing, EACCES, or similar spawn-time failure.
    SpawnFailure {
        runtime: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<i32>,
    },
    /// Subprocess exited non-zero; `detail` is already sanitized.
    ExitNonzero {
        code: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// `upsertRecord` rejected due to a conflicting `webhookSourceId`.
    SourceIdConflict,
    /// JSON router fell back to the default channel.
    RoutingFailure,
    /// Chat platform returned a 403.
    PermissionDenied,
}

impl RuntimeErrorKind {
    /// Fixed, sanitized message for this kind, per the error-handling
    /// design's surface column. Never includes a prompt or command line.
    pub fn fixed_message(&self) -> String {
        match self {
            RuntimeErrorKind::Aborted => "aborted".to_string(),
            RuntimeErrorKind::Timeout { runtime, timeout_ms } => {
                format!("{runtime} timed out after {timeout_ms}ms")
            }
            RuntimeErrorKind::StreamStall { timeout_ms } => {
                format!("stream stall: no output for {timeout_ms}ms")
            }
            RuntimeErrorKind::ProgressStall { timeout_ms } => {
                format!("progress stall: no progress for {timeout_ms}ms")
            }
            RuntimeErrorKind::SpawnFailure { runtime, code: None } => {
                format!("{runtime} binary not found")
            }
            RuntimeErrorKind::SpawnFailure { runtime, code: Some(code) } => {
                format!("{runtime} process failed unexpectedly ({code})")
            }
            RuntimeErrorKind::ExitNonzero { detail: Some(detail), .. } => detail.clone(),
            RuntimeErrorKind::ExitNonzero { code, detail: None } => {
                format!("process exited with code {code}")
            }
            RuntimeErrorKind::SourceIdConflict => "a record already owns this webhook source".to_string(),
            RuntimeErrorKind::RoutingFailure => "routing failed; used the default channel".to_string(),
            RuntimeErrorKind::PermissionDenied => "permission denied".to_string(),
        }
    }
}

/// Clamp a diagnostic line to [`SANITIZED_MESSAGE_CAP`] chars, taking the
/// first non-noise line per a strategy-provided noise filter.
pub fn sanitize_stderr_tail(stderr: &str, is_noise: impl Fn(&str) -> bool) -> Option<String> {
    let line = stderr
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !is_noise(line))?;
    Some(crate::cron::truncate_chars(line, SANITIZED_MESSAGE_CAP))
}

/// `mapRuntimeErrorToUserMessage`: curated canonical-kind → short
/// human-readable message. Unknown/unrepresented kinds fall through to a
/// generic line — there are none here since the enum is closed, but callers
/// working from a string kind should use this as the fallback.
pub fn map_runtime_error_to_user_message(kind: &RuntimeErrorKind) -> String {
    kind.fixed_message()
}

/// Fallback message for error kinds this host does not recognize.
pub const GENERIC_ERROR_MESSAGE: &str = "The model encountered an error.";

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
