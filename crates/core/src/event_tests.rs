// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn delta(s: &str) -> RuntimeEvent {
    RuntimeEvent::TextDelta { text: s.to_string() }
}

#[test]
fn accepts_well_formed_stream() {
    let events = vec![delta("hi"), delta(" there"), RuntimeEvent::Done];
    assert!(validate_event_stream(&events).is_ok());
}

#[test]
fn accepts_error_immediately_followed_by_done() {
    let events = vec![delta("hi"), RuntimeEvent::error("boom"), RuntimeEvent::Done];
    assert!(validate_event_stream(&events).is_ok());
}

#[test]
fn rejects_missing_done() {
    let events = vec![delta("hi")];
    assert!(validate_event_stream(&events).is_err());
}

#[test]
fn rejects_multiple_done() {
    let events = vec![delta("hi"), RuntimeEvent::Done, RuntimeEvent::Done];
    assert!(validate_event_stream(&events).is_err());
}

#[test]
fn rejects_error_not_followed_by_done() {
    let events = vec![RuntimeEvent::error("boom"), delta("oops"), RuntimeEvent::Done];
    assert!(validate_event_stream(&events).is_err());
}

#[test]
fn rejects_multiple_text_final() {
    let events = vec![
        RuntimeEvent::TextFinal { text: "a".to_string() },
        RuntimeEvent::TextFinal { text: "b".to_string() },
        RuntimeEvent::Done,
    ];
    assert!(validate_event_stream(&events).is_err());
}

#[test]
fn error_event_is_error_and_not_done() {
    let e = RuntimeEvent::error("x");
    assert!(e.is_error());
    assert!(!e.is_done());
}

#[test]
fn event_tag_serializes_as_snake_case_type_field() {
    let value = serde_json::to_value(RuntimeEvent::ToolEnd {
        name: "search".to_string(),
        ok: true,
    })
    .unwrap();
    assert_eq!(value["type"], "tool_end");
    assert_eq!(value["name"], "search");
    assert_eq!(value["ok"], true);
}
