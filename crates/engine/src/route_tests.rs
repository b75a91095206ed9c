// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[test]
fn s1_mixed_success_parses_all_three_entries() {
    let raw = r#"[{"channel":"alpha","content":"A"},{"channel":"beta","content":"B"},{"channel":"ghost","content":"C"}]"#;
    let entries = parse_json_route_entries(raw).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0], RouteEntry { channel: "alpha".into(), content: "A".into() });
}

#[test]
fn strips_surrounding_code_fence() {
    let raw = "```json\n[{\"channel\":\"alpha\",\"content\":\"A\"}]\n```";
    let entries = parse_json_route_entries(raw).unwrap();
    assert_eq!(entries.len(), 1);
}

#[test]
fn non_array_top_level_yields_none() {
    assert!(parse_json_route_entries(r#"{"channel":"a","content":"b"}"#).is_none());
}

#[test]
fn malformed_json_yields_none() {
    assert!(parse_json_route_entries("not json at all").is_none());
}

#[test]
fn entries_missing_a_field_are_dropped_not_fatal() {
    let raw = r#"[{"channel":"alpha"},{"channel":"beta","content":"B"}]"#;
    let entries = parse_json_route_entries(raw).unwrap();
    assert_eq!(entries, vec![RouteEntry { channel: "beta".into(), content: "B".into() }]);
}

#[test]
fn entries_with_empty_strings_are_dropped() {
    let raw = r#"[{"channel":"","content":"B"},{"channel":"beta","content":""}]"#;
    let entries = parse_json_route_entries(raw).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn empty_array_is_empty_not_none() {
    let entries = parse_json_route_entries("[]").unwrap();
    assert!(entries.is_empty());
}

proptest! {
    #[test]
    fn property_entries_always_non_empty_fields_or_none(raw in "\\PC{0,80}") {
        if let Some(entries) = parse_json_route_entries(&raw) {
            for entry in entries {
                prop_assert!(!entry.channel.is_empty());
                prop_assert!(!entry.content.is_empty());
            }
        }
    }
}

#[test]
fn short_text_is_a_single_chunk() {
    let chunks = split_into_chunks("hello", 2000);
    assert_eq!(chunks, vec!["hello".to_string()]);
}

#[test]
fn long_text_splits_on_line_boundaries() {
    let line = "x".repeat(100) + "\n";
    let text = line.repeat(30);
    let chunks = split_into_chunks(&text, 1000);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= 1000);
    }
}

#[test]
fn unclosed_fence_is_closed_and_reopened_across_a_split() {
    let mut text = String::from("```rust\n");
    text.push_str(&"let x = 1;\n".repeat(200));
    let chunks = split_into_chunks(&text, 1000);
    assert!(chunks.len() > 1);
    assert!(chunks[0].trim_end().ends_with("```"));
    assert!(chunks[1].starts_with("```"));
}

#[test]
fn send_chunks_attaches_images_only_to_last_chunk() {
    let images: Vec<Vec<u8>> = (0..3).map(|i| vec![i]).collect();
    let messages = send_chunks("short text", &images);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].images.len(), 3);
}

#[test]
fn send_chunks_caps_images_at_ten_per_message() {
    let images: Vec<Vec<u8>> = (0..15).map(|i| vec![i]).collect();
    let messages = send_chunks("short text", &images);
    assert_eq!(messages.last().unwrap().images.len(), MAX_IMAGES_PER_MESSAGE);
}
