// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[test]
fn cadence_prefix_idempotence_example() {
    let name = build_thread_name("🌅 🌅 🌅 My Job", Some(Cadence::Daily));
    assert_eq!(name, "🌅 My Job");
}

#[test]
fn no_cadence_yields_bare_title() {
    assert_eq!(build_thread_name("My Job", None), "My Job");
}

#[test]
fn strip_cadence_prefix_is_a_no_op_on_bare_title() {
    assert_eq!(strip_cadence_prefix("My Job"), "My Job");
}

#[test]
fn truncates_long_titles_to_100_chars_with_ellipsis() {
    let long_name = "x".repeat(200);
    let name = build_thread_name(&long_name, Some(Cadence::Weekly));
    assert_eq!(name.chars().count(), 100);
    assert!(name.ends_with('…'));
}

proptest! {
    #[test]
    fn property_length_and_prefix_bounds(title in "[a-zA-Z0-9 ]{0,150}", has_cadence in any::<bool>()) {
        let cadence = if has_cadence { Some(Cadence::Hourly) } else { None };
        let name = build_thread_name(&title, cadence);
        prop_assert!(name.chars().count() <= 100);
        if has_cadence {
            prop_assert!(name.starts_with(&format!("{} ", Cadence::Hourly.emoji())));
        }
    }

    #[test]
    fn property_idempotent_under_same_cadence(title in "[a-zA-Z0-9 ]{1,40}") {
        let once = build_thread_name(&title, Some(Cadence::Monthly));
        let twice = build_thread_name(&once, Some(Cadence::Monthly));
        prop_assert_eq!(once, twice);
    }
}
