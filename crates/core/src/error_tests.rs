// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn timeout_message_names_runtime_and_budget() {
    let kind = RuntimeErrorKind::Timeout {
        runtime: "claude".to_string(),
        timeout_ms: 30_000,
    };
    assert_eq!(kind.fixed_message(), "claude timed out after 30000ms");
}

#[test]
fn spawn_failure_without_code_names_binary_not_found() {
    let kind = RuntimeErrorKind::SpawnFailure {
        runtime: "codex".to_string(),
        code: None,
    };
    assert_eq!(kind.fixed_message(), "codex binary not found");
}

#[test]
fn spawn_failure_with_code_includes_it() {
    let kind = RuntimeErrorKind::SpawnFailure {
        runtime: "codex".to_string(),
        code: Some(127),
    };
    assert_eq!(kind.fixed_message(), "codex process failed unexpectedly (127)");
}

#[test]
fn exit_nonzero_prefers_provided_detail() {
    let kind = RuntimeErrorKind::ExitNonzero {
        code: 1,
        detail: Some("disk full".to_string()),
    };
    assert_eq!(kind.fixed_message(), "disk full");
}

#[test]
fn sanitize_stderr_tail_skips_noise_and_caps_length() {
    let stderr = "warning: deprecated flag\nreal error: something broke\nmore context";
    let out = sanitize_stderr_tail(stderr, |line| line.starts_with("warning:"));
    assert_eq!(out.as_deref(), Some("real error: something broke"));
}

#[test]
fn sanitize_stderr_tail_caps_at_200_chars() {
    let long = "x".repeat(500);
    let out = sanitize_stderr_tail(&long, |_| false).unwrap();
    assert_eq!(out.chars().count(), SANITIZED_MESSAGE_CAP);
}

#[test]
fn sanitize_stderr_tail_none_when_all_noise() {
    let stderr = "warning: a\nwarning: b";
    assert!(sanitize_stderr_tail(stderr, |line| line.starts_with("warning:")).is_none());
}

#[test]
fn map_runtime_error_to_user_message_matches_fixed_message() {
    let kind = RuntimeErrorKind::PermissionDenied;
    assert_eq!(map_runtime_error_to_user_message(&kind), kind.fixed_message());
}

#[test]
fn error_kind_serializes_with_kind_tag() {
    let value = serde_json::to_value(RuntimeErrorKind::SourceIdConflict).unwrap();
    assert_eq!(value["kind"], "source_id_conflict");
}
