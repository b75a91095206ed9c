// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ids::ThreadId;

#[test]
fn category_groups_messaging_directives() {
    let directive = ActionDirective::SendMessage {
        channel: "general".to_string(),
        content: "hi".to_string(),
    };
    assert_eq!(directive.category(), ActionCategory::Messaging);
    assert_eq!(directive.type_name(), "sendMessage");
}

#[test]
fn category_groups_cron_crud_directives() {
    let directive = ActionDirective::DeleteCron {
        cron_id: CronId::new("cron-deadbeef"),
    };
    assert_eq!(directive.category(), ActionCategory::CronCrud);
}

#[test]
fn category_groups_spawn_and_defer() {
    assert_eq!(
        ActionDirective::SpawnAgent { prompt: "go".to_string(), recursion_depth: 0 }.category(),
        ActionCategory::Spawn
    );
    assert_eq!(
        ActionDirective::DeferUntil {
            run_at: chrono::Utc::now(),
            prompt: "later".to_string(),
        }
        .category(),
        ActionCategory::Defer
    );
}

#[test]
fn reply_in_thread_round_trips_through_json() {
    let directive = ActionDirective::ReplyInThread {
        thread_id: ThreadId::new("thread-1"),
        content: "hello".to_string(),
    };
    let value = serde_json::to_value(&directive).unwrap();
    assert_eq!(value["type"], "replyInThread");
    let back: ActionDirective = serde_json::from_value(value).unwrap();
    assert_eq!(back, directive);
}

#[test]
fn action_result_ok_has_no_error_field() {
    let result = ActionResult::ok("done");
    assert!(result.is_ok());
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["ok"], true);
    assert!(value.get("error").is_none());
}

#[test]
fn action_result_err_has_no_summary_field() {
    let result = ActionResult::err("nope");
    assert!(!result.is_ok());
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["ok"], false);
    assert!(value.get("summary").is_none());
}

#[test]
fn validate_message_content_rejects_empty() {
    assert!(validate_message_content("").is_err());
}

#[test]
fn validate_message_content_rejects_over_cap() {
    let long = "a".repeat(MAX_MESSAGE_CONTENT_CHARS + 1);
    assert!(validate_message_content(&long).is_err());
}

#[test]
fn validate_message_content_accepts_exactly_cap() {
    let exact = "a".repeat(MAX_MESSAGE_CONTENT_CHARS);
    assert!(validate_message_content(&exact).is_ok());
}

#[test]
fn validate_bulk_delete_count_rejects_out_of_range() {
    assert!(validate_bulk_delete_count(1).is_err());
    assert!(validate_bulk_delete_count(101).is_err());
}

#[test]
fn validate_bulk_delete_count_accepts_boundaries() {
    assert!(validate_bulk_delete_count(2).is_ok());
    assert!(validate_bulk_delete_count(100).is_ok());
}

#[test]
fn parsed_actions_default_is_empty() {
    let parsed = ParsedActions::default();
    assert!(parsed.actions.is_empty());
    assert_eq!(parsed.parse_failures, 0);
}
