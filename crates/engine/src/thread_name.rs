// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cadence-prefixed forum thread names, and the inverse strip operation
//! used before re-deriving a name so repeated sync passes stay idempotent.

use ch_core::Cadence;

const MAX_THREAD_NAME_CHARS: usize = 100;
const ALL_CADENCE_EMOJIS: &[&str] = &["🗓️", "⚡", "⏰", "🌅", "📆", "🌕"];

/// Strip any accumulated cadence-emoji prefixes (and their trailing space)
/// from a thread name, repeatedly, leaving the bare title.
pub fn strip_cadence_prefix(name: &str) -> &str {
    let mut rest = name.trim_start();
    loop {
        let stripped = ALL_CADENCE_EMOJIS
            .iter()
            .find_map(|emoji| rest.strip_prefix(emoji).map(str::trim_start));
        match stripped {
            Some(next) => rest = next,
            None => break,
        }
    }
    rest
}

/// Build the expected forum thread name: cadence emoji + space + bare
/// title, truncated to 100 chars with an ellipsis. Any cadence prefix
/// already present in `name` is stripped first, so this is idempotent
/// under repeated application with the same cadence.
pub fn build_thread_name(name: &str, cadence: Option<Cadence>) -> String {
    let bare = strip_cadence_prefix(name);
    let full = match cadence {
        Some(c) => format!("{} {bare}", c.emoji()),
        None => bare.to_string(),
    };
    truncate_with_ellipsis(&full, MAX_THREAD_NAME_CHARS)
}

fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{truncated}…")
}

#[cfg(test)]
#[path = "thread_name_tests.rs"]
mod tests;
