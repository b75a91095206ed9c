// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn basic_tier_drops_standard_and_full_tools() {
    let tools = vec!["web_search".to_string(), "read_file".to_string(), "computer_use".to_string()];
    let kept = filter_tools(Some("basic"), &tools);
    assert_eq!(kept, vec!["read_file".to_string()]);
}

#[test]
fn standard_tier_keeps_standard_drops_full() {
    let tools = vec!["web_search".to_string(), "computer_use".to_string()];
    let kept = filter_tools(Some("standard"), &tools);
    assert_eq!(kept, vec!["web_search".to_string()]);
}

#[test]
fn full_tier_keeps_everything() {
    let tools = vec!["web_search".to_string(), "computer_use".to_string(), "read_file".to_string()];
    let kept = filter_tools(Some("full"), &tools);
    assert_eq!(kept, tools);
}

#[test]
fn unknown_tool_names_always_pass_through() {
    let tools = vec!["some_future_tool".to_string()];
    assert_eq!(filter_tools(Some("basic"), &tools), tools);
}

#[test]
fn unresolved_tier_behaves_like_full() {
    let tools = vec!["computer_use".to_string()];
    assert_eq!(filter_tools(None, &tools), tools);
}

#[test]
fn tool_args_renders_repeated_flags() {
    let tools = vec!["read_file".to_string(), "write_file".to_string()];
    let args = tool_args(Some("full"), &tools);
    assert_eq!(args, vec!["--tool", "read_file", "--tool", "write_file"]);
}

#[test]
fn tool_args_is_empty_for_an_empty_catalog() {
    assert!(tool_args(Some("full"), &[]).is_empty());
}
