// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn smoke_test_timeout_ms_absent_is_none() {
    std::env::remove_var("SMOKE_TEST_TIMEOUT_MS");
    assert_eq!(smoke_test_timeout_ms().unwrap(), None);
}

#[test]
#[serial]
fn smoke_test_timeout_ms_rejects_zero() {
    std::env::set_var("SMOKE_TEST_TIMEOUT_MS", "0");
    assert!(smoke_test_timeout_ms().is_err());
    std::env::remove_var("SMOKE_TEST_TIMEOUT_MS");
}

#[test]
#[serial]
fn smoke_test_timeout_ms_rejects_non_numeric() {
    std::env::set_var("SMOKE_TEST_TIMEOUT_MS", "soon");
    assert!(smoke_test_timeout_ms().is_err());
    std::env::remove_var("SMOKE_TEST_TIMEOUT_MS");
}

#[test]
#[serial]
fn smoke_test_tiers_splits_and_trims() {
    std::env::set_var("SMOKE_TEST_TIERS", "basic, standard ,full");
    assert_eq!(smoke_test_tiers("SMOKE_TEST_TIERS"), vec!["basic", "standard", "full"]);
    std::env::remove_var("SMOKE_TEST_TIERS");
}

#[test]
#[serial]
fn smoke_test_tiers_absent_is_empty() {
    std::env::remove_var("NONEXISTENT_TIERS_VAR");
    assert!(smoke_test_tiers("NONEXISTENT_TIERS_VAR").is_empty());
}

#[test]
#[serial]
fn runtime_bin_override_empty_string_is_none() {
    std::env::set_var("CLAUDE_BIN", "");
    assert_eq!(runtime_bin_override("CLAUDE_BIN"), None);
    std::env::remove_var("CLAUDE_BIN");
}
