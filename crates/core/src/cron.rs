// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cron job record: the durable unit of work the scheduler fires and the
//! executor runs. See `ch-storage` for the store that owns these records.

use crate::ids::{CronId, MessageId, ThreadId, WebhookSourceId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Maximum length of a persisted `lastErrorMessage`, in chars.
pub const LAST_ERROR_MESSAGE_CAP: usize = 200;

/// Bucketed firing frequency, derived from the cron schedule. Drives tag and
/// emoji presentation in the forum sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Yearly,
    Frequent,
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Cadence {
    /// Emoji shown in thread names and status lines.
    pub fn emoji(self) -> &'static str {
        match self {
            Cadence::Yearly => "🗓️",
            Cadence::Frequent => "⚡",
            Cadence::Hourly => "⏰",
            Cadence::Daily => "🌅",
            Cadence::Weekly => "📆",
            Cadence::Monthly => "🌕",
        }
    }

    pub fn tag_name(self) -> &'static str {
        match self {
            Cadence::Yearly => "yearly",
            Cadence::Frequent => "frequent",
            Cadence::Hourly => "hourly",
            Cadence::Daily => "daily",
            Cadence::Weekly => "weekly",
            Cadence::Monthly => "monthly",
        }
    }
}

/// How a run was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Schedule,
    Webhook,
    Manual,
}

/// Outcome of the most recent run, or `None` if the job has never run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Error,
    Running,
    Interrupted,
}

/// How executor output is routed to channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    #[default]
    Default,
    Json,
}

/// Durable record of one cron job. Identified by [`CronId`]; see module docs
/// and `spec.md` §3 for the full invariant list (unique `threadId`, unique
/// `webhookSourceId`, `running` only while truly in flight, monotonic
/// version).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronRunRecord {
    pub cron_id: CronId,
    pub thread_id: ThreadId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_source_id: Option<WebhookSourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,

    #[serde(default)]
    pub run_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_status: Option<RunStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<Cadence>,
    #[serde(default)]
    pub purpose_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_override: Option<String>,
    pub trigger_type: TriggerType,

    #[serde(default)]
    pub silent: bool,
    #[serde(default)]
    pub routing_mode: RoutingMode,
    #[serde(default)]
    pub chain: Vec<CronId>,
    #[serde(default)]
    pub state: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub timezone: String,
    pub channel: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_message_id: Option<MessageId>,
}

impl CronRunRecord {
    /// Construct a record with only the required fields populated; everything
    /// else takes its spec-mandated default.
    pub fn new(cron_id: CronId, thread_id: ThreadId, channel: impl Into<String>) -> Self {
        Self {
            cron_id,
            thread_id,
            status_message_id: None,
            webhook_source_id: None,
            webhook_secret: None,
            run_count: 0,
            last_run_at: None,
            last_run_status: None,
            started_at: None,
            last_error_message: None,
            cadence: None,
            purpose_tags: Vec::new(),
            model: None,
            model_override: None,
            trigger_type: TriggerType::Schedule,
            silent: false,
            routing_mode: RoutingMode::default(),
            chain: Vec::new(),
            state: Value::Object(Default::default()),
            schedule: None,
            timezone: "UTC".to_string(),
            channel: channel.into(),
            prompt: String::new(),
            author_id: None,
            prompt_message_id: None,
        }
    }

    /// Truncate and store an error message, clamped to
    /// [`LAST_ERROR_MESSAGE_CAP`] chars (char-boundary safe).
    pub fn set_last_error_message(&mut self, message: Option<String>) {
        self.last_error_message = message.map(|m| truncate_chars(&m, LAST_ERROR_MESSAGE_CAP));
    }

    /// Effective model for invocation: override beats classified model.
    pub fn effective_model(&self) -> Option<&str> {
        self.model_override
            .as_deref()
            .or(self.model.as_deref())
    }
}

/// Truncate a string to at most `n` chars (not bytes), respecting UTF-8
/// boundaries.
pub fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Patch describing the fields an `upsertRecord` call may change. `None`
/// means "leave unchanged"; this mirrors a JSON `PATCH`-style partial update.
#[derive(Debug, Clone, Default)]
pub struct CronRecordUpdate {
    pub status_message_id: Option<Option<MessageId>>,
    pub webhook_source_id: Option<Option<WebhookSourceId>>,
    pub webhook_secret: Option<Option<String>>,
    pub cadence: Option<Option<Cadence>>,
    pub purpose_tags: Option<Vec<String>>,
    pub model: Option<Option<String>>,
    pub model_override: Option<Option<String>>,
    pub trigger_type: Option<TriggerType>,
    pub silent: Option<bool>,
    pub routing_mode: Option<RoutingMode>,
    pub chain: Option<Vec<CronId>>,
    pub state: Option<Value>,
    pub schedule: Option<Option<String>>,
    pub timezone: Option<String>,
    pub channel: Option<String>,
    pub prompt: Option<String>,
    pub author_id: Option<Option<String>>,
    pub prompt_message_id: Option<Option<MessageId>>,
}

impl CronRecordUpdate {
    /// Apply this patch onto `record` in place.
    pub fn apply(self, record: &mut CronRunRecord) {
        if let Some(v) = self.status_message_id {
            record.status_message_id = v;
        }
        if let Some(v) = self.webhook_source_id {
            record.webhook_source_id = v;
        }
        if let Some(v) = self.webhook_secret {
            record.webhook_secret = v;
        }
        if let Some(v) = self.cadence {
            record.cadence = v;
        }
        if let Some(v) = self.purpose_tags {
            record.purpose_tags = v;
        }
        if let Some(v) = self.model {
            record.model = v;
        }
        if let Some(v) = self.model_override {
            record.model_override = v;
        }
        if let Some(v) = self.trigger_type {
            record.trigger_type = v;
        }
        if let Some(v) = self.silent {
            record.silent = v;
        }
        if let Some(v) = self.routing_mode {
            record.routing_mode = v;
        }
        if let Some(v) = self.chain {
            record.chain = v;
        }
        if let Some(v) = self.state {
            record.state = v;
        }
        if let Some(v) = self.schedule {
            record.schedule = v;
        }
        if let Some(v) = self.timezone {
            record.timezone = v;
        }
        if let Some(v) = self.channel {
            record.channel = v;
        }
        if let Some(v) = self.prompt {
            record.prompt = v;
        }
        if let Some(v) = self.author_id {
            record.author_id = v;
        }
        if let Some(v) = self.prompt_message_id {
            record.prompt_message_id = v;
        }
    }
}

/// On-disk store document: `{ version, updatedAt, jobs }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    pub version: u32,
    pub updated_at: i64,
    pub jobs: HashMap<String, CronRunRecord>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: 1,
            updated_at: 0,
            jobs: HashMap::new(),
        }
    }
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
