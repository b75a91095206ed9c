// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action directives: the tagged union parsed out of model output by
//! `ch-engine`'s parser and executed by its dispatcher. Types only — parsing
//! and dispatch live in `ch-engine` since they need the chat-platform and
//! record-store handles this crate must not depend on.

use crate::ids::{ChannelId, CronId, MessageId, ThreadId};
use serde::{Deserialize, Serialize};

/// Category flag gating a directive's availability. The flag table mapping
/// category → enabled is owned by the host configuration, not this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Messaging,
    ChannelOps,
    ForumModeration,
    TaskCrud,
    CronCrud,
    Memory,
    Polls,
    Plan,
    Spawn,
    Defer,
}

/// Maximum chars for a `sendMessage`/`replyInThread` content body.
pub const MAX_MESSAGE_CONTENT_CHARS: usize = 2_000;
/// Inclusive range for a `bulkDelete` count.
pub const BULK_DELETE_RANGE: std::ops::RangeInclusive<u32> = 2..=100;
/// Spawned agents may not spawn further agents; this is the rejected depth.
pub const MAX_SPAWN_RECURSION_DEPTH: u32 = 1;

/// One parsed `<discord-action>{...}</discord-action>` directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActionDirective {
    // --- messaging ---
    SendMessage { channel: String, content: String },
    ReplyInThread { thread_id: ThreadId, content: String },
    EditMessage { message_id: MessageId, content: String },
    DeleteMessage { message_id: MessageId },

    // --- channel ops ---
    CreateChannel { name: String },
    SetThreadName { thread_id: ThreadId, name: String },
    ArchiveThread { thread_id: ThreadId },
    UnarchiveThread { thread_id: ThreadId },
    BulkDelete { channel_id: ChannelId, count: u32 },

    // --- forum moderation ---
    PinMessage { message_id: MessageId },
    UnpinMessage { message_id: MessageId },
    AddTag { thread_id: ThreadId, tag: String },
    RemoveTag { thread_id: ThreadId, tag: String },

    // --- task CRUD ---
    CreateTask { title: String, #[serde(default)] notes: Option<String> },
    UpdateTask { task_id: String, #[serde(default)] title: Option<String>, #[serde(default)] notes: Option<String> },
    CompleteTask { task_id: String },
    DeleteTask { task_id: String },

    // --- cron CRUD ---
    CreateCron { schedule: String, timezone: String, channel: String, prompt: String },
    UpdateCron { cron_id: CronId, #[serde(default)] schedule: Option<String>, #[serde(default)] prompt: Option<String> },
    DeleteCron { cron_id: CronId },
    CancelRun { cron_id: CronId },

    // --- memory ---
    RememberFact { key: String, value: String },
    ForgetFact { key: String },

    // --- polls ---
    CreatePoll { question: String, options: Vec<String> },

    // --- plan ---
    SetPlan { steps: Vec<String> },

    // --- spawn ---
    SpawnAgent { prompt: String, #[serde(default)] recursion_depth: u32 },

    // --- defer ---
    DeferUntil { run_at: chrono::DateTime<chrono::Utc>, prompt: String },
}

impl ActionDirective {
    pub fn category(&self) -> ActionCategory {
        use ActionDirective::*;
        match self {
            SendMessage { .. } | ReplyInThread { .. } | EditMessage { .. } | DeleteMessage { .. } => {
                ActionCategory::Messaging
            }
            CreateChannel { .. } | SetThreadName { .. } | ArchiveThread { .. } | UnarchiveThread { .. }
            | BulkDelete { .. } => ActionCategory::ChannelOps,
            PinMessage { .. } | UnpinMessage { .. } | AddTag { .. } | RemoveTag { .. } => {
                ActionCategory::ForumModeration
            }
            CreateTask { .. } | UpdateTask { .. } | CompleteTask { .. } | DeleteTask { .. } => {
                ActionCategory::TaskCrud
            }
            CreateCron { .. } | UpdateCron { .. } | DeleteCron { .. } | CancelRun { .. } => {
                ActionCategory::CronCrud
            }
            RememberFact { .. } | ForgetFact { .. } => ActionCategory::Memory,
            CreatePoll { .. } => ActionCategory::Polls,
            SetPlan { .. } => ActionCategory::Plan,
            SpawnAgent { .. } => ActionCategory::Spawn,
            DeferUntil { .. } => ActionCategory::Defer,
        }
    }

    /// Directive type string as it appears in the discriminant `type` field;
    /// used by the parser to record stripped/unrecognized types.
    pub fn type_name(&self) -> &'static str {
        use ActionDirective::*;
        match self {
            SendMessage { .. } => "sendMessage",
            ReplyInThread { .. } => "replyInThread",
            EditMessage { .. } => "editMessage",
            DeleteMessage { .. } => "deleteMessage",
            CreateChannel { .. } => "createChannel",
            SetThreadName { .. } => "setThreadName",
            ArchiveThread { .. } => "archiveThread",
            UnarchiveThread { .. } => "unarchiveThread",
            BulkDelete { .. } => "bulkDelete",
            PinMessage { .. } => "pinMessage",
            UnpinMessage { .. } => "unpinMessage",
            AddTag { .. } => "addTag",
            RemoveTag { .. } => "removeTag",
            CreateTask { .. } => "createTask",
            UpdateTask { .. } => "updateTask",
            CompleteTask { .. } => "completeTask",
            DeleteTask { .. } => "deleteTask",
            CreateCron { .. } => "createCron",
            UpdateCron { .. } => "updateCron",
            DeleteCron { .. } => "deleteCron",
            CancelRun { .. } => "cancelRun",
            RememberFact { .. } => "rememberFact",
            ForgetFact { .. } => "forgetFact",
            CreatePoll { .. } => "createPoll",
            SetPlan { .. } => "setPlan",
            SpawnAgent { .. } => "spawnAgent",
            DeferUntil { .. } => "deferUntil",
        }
    }

    /// True for directives that only read state and thus are skipped by the
    /// "first non-query failure" retry-placeholder rule in §4.6.
    pub fn is_query(&self) -> bool {
        false
    }
}

/// Outcome of executing a single directive: `{ok: true, summary}` or
/// `{ok: false, error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok(summary: impl Into<String>) -> Self {
        ActionResult {
            ok: true,
            summary: Some(summary.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        ActionResult {
            ok: false,
            summary: None,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }
}

/// Output of the directive parser: `{cleanText, actions, strippedUnrecognizedTypes, parseFailures}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedActions {
    pub clean_text: String,
    pub actions: Vec<ActionDirective>,
    pub stripped_unrecognized_types: Vec<String>,
    pub parse_failures: u32,
}

/// Validates the messaging-content length invariant from §8 boundaries:
/// non-empty and at most [`MAX_MESSAGE_CONTENT_CHARS`] chars.
pub fn validate_message_content(content: &str) -> Result<(), String> {
    if content.is_empty() {
        return Err("message content must not be empty".to_string());
    }
    if content.chars().count() > MAX_MESSAGE_CONTENT_CHARS {
        return Err(format!("message content exceeds {MAX_MESSAGE_CONTENT_CHARS} chars"));
    }
    Ok(())
}

/// Validates the `bulkDelete` count invariant from §8 boundaries:
/// `count ∈ [2, 100]`.
pub fn validate_bulk_delete_count(count: u32) -> Result<(), String> {
    if BULK_DELETE_RANGE.contains(&count) {
        Ok(())
    } else {
        Err(format!("bulkDelete count {count} out of range [2, 100]"))
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
