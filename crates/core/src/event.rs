// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Streaming events yielded by a runtime adapter's `invoke` call.
//!
//! Every invocation terminates with exactly one [`RuntimeEvent::Done`]; an
//! [`RuntimeEvent::Error`] is always immediately followed by `Done`. See
//! `ch-adapters` for the producers and `ch-engine` for the consumer side.

use serde::{Deserialize, Serialize};

/// One event in the stream an adapter yields while a model runtime runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    /// Incremental text chunk, in production order.
    TextDelta { text: String },
    /// The full final text, when the strategy can produce one distinct from
    /// the accumulated deltas.
    TextFinal { text: String },
    /// A generated or attached image, base64 or strategy-defined encoding.
    ImageData { image: ImagePayload },
    /// A tool invocation started.
    ToolStart {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input: Option<serde_json::Value>,
    },
    /// A tool invocation finished.
    ToolEnd { name: String, ok: bool },
    /// A raw subprocess log line, tagged by stream.
    LogLine { stream: LogStream, line: String },
    /// A sanitized, user-safe error. Always followed by `Done`.
    Error { message: String },
    /// Terminal marker. Exactly one per invocation.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub data: String,
    pub mime_type: String,
    /// Content hash used for invocation-scoped dedup (see `ch-adapters`).
    pub content_hash: String,
}

impl RuntimeEvent {
    pub fn is_done(&self) -> bool {
        matches!(self, RuntimeEvent::Done)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RuntimeEvent::Error { .. })
    }

    /// Error event with a fixed, sanitized message.
    pub fn error(message: impl Into<String>) -> Self {
        RuntimeEvent::Error {
            message: message.into(),
        }
    }
}

/// Validates the universal event-stream invariants from §8 property 1:
/// exactly one `done`, at most one `text_final`, and `error` always
/// immediately followed by `done`.
pub fn validate_event_stream(events: &[RuntimeEvent]) -> Result<(), String> {
    let mut done_count = 0usize;
    let mut text_final_count = 0usize;
    for (i, event) in events.iter().enumerate() {
        match event {
            RuntimeEvent::Done => done_count += 1,
            RuntimeEvent::TextFinal { .. } => text_final_count += 1,
            RuntimeEvent::Error { .. } => {
                let next = events.get(i + 1);
                if !matches!(next, Some(RuntimeEvent::Done)) {
                    return Err(format!("error event at index {i} not immediately followed by done"));
                }
            }
            _ => {}
        }
    }
    if done_count != 1 {
        return Err(format!("expected exactly one done event, found {done_count}"));
    }
    if text_final_count > 1 {
        return Err(format!("expected at most one text_final event, found {text_final_count}"));
    }
    if !matches!(events.last(), Some(RuntimeEvent::Done)) {
        return Err("last event must be done".to_string());
    }
    Ok(())
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
