// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON fan-out route parsing and default-mode chunking/fence-closing for
//! outbound messages.

pub const MAX_CHUNK_CHARS: usize = 2_000;
pub const MAX_IMAGES_PER_MESSAGE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub channel: String,
    pub content: String,
}

/// Tolerant parse of a model's JSON fan-out output: strips a surrounding
/// triple-backtick fence, then requires a top-level array of
/// `{channel, content}` objects. Non-array or unparseable input yields
/// `None`; individual entries missing either field (or carrying an empty
/// one) are silently dropped rather than failing the whole parse.
pub fn parse_json_route_entries(raw: &str) -> Option<Vec<RouteEntry>> {
    let unfenced = strip_code_fence(raw);
    let value: serde_json::Value = serde_json::from_str(unfenced.trim()).ok()?;
    let array = value.as_array()?;
    let entries = array
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let channel = obj.get("channel")?.as_str()?;
            let content = obj.get("content")?.as_str()?;
            if channel.is_empty() || content.is_empty() {
                return None;
            }
            Some(RouteEntry { channel: channel.to_string(), content: content.to_string() })
        })
        .collect();
    Some(entries)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.split_once('\n') {
        Some((_lang, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Debug, Clone, Default)]
pub struct ChunkedMessage {
    pub content: String,
    pub images: Vec<Vec<u8>>,
}

/// Split `text` into pieces of at most `max_chars`, preferring line
/// boundaries; any triple-backtick fence left open by a split is closed at
/// the end of its chunk and reopened at the start of the next one.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut fence_open = false;
    for line in text.split_inclusive('\n') {
        if !current.is_empty() && current.chars().count() + line.chars().count() > max_chars {
            close_and_push(&mut current, &mut chunks, &mut fence_open);
        }
        current.push_str(line);
        if toggles_fence(line) {
            fence_open = !fence_open;
        }
    }
    if !current.is_empty() {
        close_and_push(&mut current, &mut chunks, &mut fence_open);
    }
    chunks
}

fn toggles_fence(line: &str) -> bool {
    line.matches("```").count() % 2 == 1
}

fn close_and_push(current: &mut String, chunks: &mut Vec<String>, fence_open: &mut bool) {
    if *fence_open {
        current.push_str("\n```");
    }
    chunks.push(std::mem::take(current));
    if *fence_open {
        current.push_str("```\n");
    }
}

/// Build the message batch for default-mode routing: text split into
/// chunks, with up to `MAX_IMAGES_PER_MESSAGE` images attached to the last
/// chunk.
pub fn send_chunks(text: &str, images: &[Vec<u8>]) -> Vec<ChunkedMessage> {
    let mut messages: Vec<ChunkedMessage> = split_into_chunks(text, MAX_CHUNK_CHARS)
        .into_iter()
        .map(|content| ChunkedMessage { content, images: Vec::new() })
        .collect();
    if messages.is_empty() {
        messages.push(ChunkedMessage::default());
    }
    if !images.is_empty() {
        if let Some(last) = messages.last_mut() {
            last.images = images.iter().take(MAX_IMAGES_PER_MESSAGE).cloned().collect();
        }
    }
    messages
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
