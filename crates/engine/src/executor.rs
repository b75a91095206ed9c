// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs one cron job end to end: overlap guard, cross-process lock, prompt
//! assembly, runtime invocation, action dispatch, routing, and chained
//! downstream firing. See `scheduler.rs` for what decides *when* a job runs;
//! this module is only concerned with *what happens* once it fires.

use crate::action::{build_display_lines, build_unavailable_notice, dispatch_actions, parse_actions, ActionExecutor};
use crate::chat::{ChannelRef, ChatClient, SendOptions};
use crate::env::{self, ToolTier};
use crate::error::ExecutorError;
use crate::prompt_builder::{assemble_full_prompt, build_cron_prompt_body, CronPromptInput, HEARTBEAT_SENTINEL};
use crate::route;
use crate::run_control::RunControl;
use crate::scheduler::Scheduler;
use ch_adapters::strategy::{InvokeContext, InvokeOptions, RuntimeStrategy};
use ch_adapters::ProcessPool;
use ch_core::action::ActionCategory;
use ch_core::{CronId, CronRecordUpdate, CronRunRecord, RoutingMode, RunStatus, RuntimeEvent};
use ch_storage::RecordStore;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// A downstream chain is never followed past this many hops, guarding
/// against an accidental cycle among chained jobs.
pub const MAX_CHAIN_DEPTH: u32 = 10;

/// Idle budget before a pooled `ProcessPool` entry is eligible for
/// eviction. No shipped strategy currently requests `ProcessPool` mode, so
/// this governs nothing yet beyond the pool's own idle-session bookkeeping.
const PROCESS_POOL_IDLE_EVICTION: Duration = Duration::from_secs(600);

/// Everything the executor needs beyond what's passed per call: the
/// runtime strategy to invoke, the chat platform to post to, the shared
/// record store and scheduler, and per-host policy (allow-listed channels,
/// tool tier overrides, which action categories are enabled).
pub struct Executor {
    guild_id: String,
    strategy: Arc<dyn RuntimeStrategy>,
    default_model: String,
    chat: Arc<dyn ChatClient>,
    store: Arc<Mutex<RecordStore>>,
    scheduler: Arc<Mutex<Scheduler>>,
    run_control: Arc<RunControl>,
    lock_dir: PathBuf,
    channel_allow_list: Option<Vec<String>>,
    available_channels: Vec<String>,
    context_files: Vec<String>,
    tool_tier_overrides: HashMap<String, ToolTier>,
    action_flags: HashMap<ActionCategory, bool>,
    action_executor: Option<Arc<dyn ActionExecutor>>,
    invoke_timeout: Option<Duration>,
    tool_catalog: Vec<String>,
    process_pool: Arc<ProcessPool>,
}

impl Executor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        guild_id: impl Into<String>,
        strategy: Arc<dyn RuntimeStrategy>,
        default_model: impl Into<String>,
        chat: Arc<dyn ChatClient>,
        store: Arc<Mutex<RecordStore>>,
        scheduler: Arc<Mutex<Scheduler>>,
        run_control: Arc<RunControl>,
        lock_dir: PathBuf,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            strategy,
            default_model: default_model.into(),
            chat,
            store,
            scheduler,
            run_control,
            lock_dir,
            channel_allow_list: None,
            available_channels: Vec::new(),
            context_files: Vec::new(),
            tool_tier_overrides: HashMap::new(),
            action_flags: HashMap::new(),
            action_executor: None,
            invoke_timeout: None,
            tool_catalog: Vec::new(),
            process_pool: Arc::new(ProcessPool::new(PROCESS_POOL_IDLE_EVICTION)),
        }
    }

    pub fn with_channel_allow_list(mut self, channels: Vec<String>) -> Self {
        self.channel_allow_list = Some(channels);
        self
    }

    pub fn with_available_channels(mut self, channels: Vec<String>) -> Self {
        self.available_channels = channels;
        self
    }

    pub fn with_context_files(mut self, files: Vec<String>) -> Self {
        self.context_files = files;
        self
    }

    pub fn with_tool_tier_overrides(mut self, overrides: HashMap<String, ToolTier>) -> Self {
        self.tool_tier_overrides = overrides;
        self
    }

    pub fn with_action_flags(mut self, flags: HashMap<ActionCategory, bool>) -> Self {
        self.action_flags = flags;
        self
    }

    pub fn with_action_executor(mut self, executor: Arc<dyn ActionExecutor>) -> Self {
        self.action_executor = Some(executor);
        self
    }

    pub fn with_invoke_timeout(mut self, timeout: Duration) -> Self {
        self.invoke_timeout = Some(timeout);
        self
    }

    pub fn with_tool_catalog(mut self, tools: Vec<String>) -> Self {
        self.tool_catalog = tools;
        self
    }

    /// The pool of long-lived subprocesses for `ProcessPool`-mode
    /// strategies. Exposed so the daemon can drain it on shutdown.
    pub fn process_pool(&self) -> &Arc<ProcessPool> {
        &self.process_pool
    }

    /// Run `cron_id` to completion. Never returns an error for an in-band
    /// run failure (those are recorded to the store and this returns
    /// `Ok(())`); an `Err` here means the job itself couldn't be run at all
    /// (not registered with the scheduler, or the chain depth guard tripped).
    pub async fn execute_cron_job(self: &Arc<Self>, cron_id: &CronId, chain_depth: u32) -> Result<(), ExecutorError> {
        if chain_depth >= MAX_CHAIN_DEPTH {
            return Err(ExecutorError::ChainDepthExceeded);
        }

        let in_flight = {
            let scheduler = self.scheduler.lock();
            match scheduler.get_job(cron_id) {
                Some(job) => job.in_flight_handle(),
                None => return Err(ExecutorError::JobNotRegistered(cron_id.as_str().to_string())),
            }
        };

        // Overlap guard: firing never waits for a prior run, it just skips.
        if in_flight.swap(true, Ordering::SeqCst) {
            tracing::info!(cron_id = %cron_id.as_str(), "run already in flight, skipping this fire");
            return Ok(());
        }

        let result = self.run_locked(cron_id, chain_depth).await;
        in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn run_locked(self: &Arc<Self>, cron_id: &CronId, chain_depth: u32) -> Result<(), ExecutorError> {
        let lock = ch_storage::RunLock::try_acquire(&self.lock_dir, cron_id).map_err(|e| ExecutorError::Storage(e.into()))?;
        let Some(_lock) = lock else {
            tracing::info!(cron_id = %cron_id.as_str(), "another process holds the run lock, skipping");
            return Ok(());
        };

        {
            let mut store = self.store.lock();
            if let Err(e) = store.record_run_start(cron_id) {
                tracing::warn!(cron_id = %cron_id.as_str(), error = %e, "failed to record run start");
            }
        }

        self.run_body(cron_id, chain_depth).await
    }

    async fn run_body(self: &Arc<Self>, cron_id: &CronId, chain_depth: u32) -> Result<(), ExecutorError> {
        let record = {
            let store = self.store.lock();
            match store.get(cron_id) {
                Some(record) => record.clone(),
                None => return Err(ExecutorError::JobNotRegistered(cron_id.as_str().to_string())),
            }
        };

        // Step 5: resolve the target channel, honoring the allow-list.
        if let Some(allow_list) = &self.channel_allow_list {
            if !allow_list.iter().any(|c| c == &record.channel) {
                self.record_error(cron_id, &ExecutorError::ChannelNotAllowed(record.channel.clone()).to_string());
                return Ok(());
            }
        }
        let Some(channel_ref) = self.chat.resolve_channel(&self.guild_id, &record.channel).await else {
            self.record_error(cron_id, &ExecutorError::ChannelNotFound(record.channel.clone()).to_string());
            return Ok(());
        };

        // Step 6: assemble the prompt (security preamble + context files +
        // the cron-specific body).
        let job_name = record.purpose_tags.first().cloned().unwrap_or_else(|| cron_id.as_str().to_string());
        let channel_id = channel_ref.id();
        let body = build_cron_prompt_body(CronPromptInput {
            job_name: &job_name,
            prompt_template: &record.prompt,
            channel: &record.channel,
            channel_id: Some(&channel_id),
            silent: record.silent,
            routing_mode: record.routing_mode,
            available_channels: &self.available_channels,
            state: Some(&record.state),
        });
        let full_prompt = assemble_full_prompt(&self.context_files, &body);

        // Step 7: resolve the model and its tool tier.
        let model = record.effective_model().map(str::to_string).unwrap_or_else(|| self.default_model.clone());
        let tool_tier = env::tool_tier_for(&model, &self.tool_tier_overrides);

        // Step 8: invoke the runtime adapter and drain its event stream.
        let ctx = InvokeContext {
            model: Some(model),
            session_id: None,
            session_key: Some(cron_id.as_str().to_string()),
            tool_tier: Some(tool_tier.as_str().to_string()),
            workspace_dir: None,
        };
        let opts = InvokeOptions { prompt: full_prompt, timeout: self.invoke_timeout, tools: self.tool_catalog.clone() };
        let handle = ch_adapters::invoke(Arc::clone(&self.strategy), ctx, opts);
        self.run_control.register(cron_id.clone(), handle.cancel);

        let mut delta_text = String::new();
        let mut final_text: Option<String> = None;
        let mut images: Vec<Vec<u8>> = Vec::new();
        let mut run_error: Option<String> = None;
        let mut events = handle.events;
        while let Some(event) = events.recv().await {
            match event {
                RuntimeEvent::TextDelta { text } => delta_text.push_str(&text),
                RuntimeEvent::TextFinal { text } => final_text = Some(text),
                // Images travel the pipeline as opaque bytes end to end: the
                // host never decodes them, only forwards them to the chat
                // platform's media upload, so the base64 transport encoding
                // is simply carried as the byte payload.
                RuntimeEvent::ImageData { image } => images.push(image.data.into_bytes()),
                RuntimeEvent::Error { message } => run_error = Some(message),
                RuntimeEvent::Done => break,
                RuntimeEvent::ToolStart { .. } | RuntimeEvent::ToolEnd { .. } | RuntimeEvent::LogLine { .. } => {}
            }
        }
        self.run_control.clear(cron_id);

        if let Some(message) = run_error {
            self.record_error(cron_id, &message);
            return Ok(());
        }

        // Step 9: nothing came back at all.
        let mut output = final_text.unwrap_or(delta_text).trim().to_string();
        if output.is_empty() && images.is_empty() {
            self.record_success(cron_id);
            return Ok(());
        }

        // Steps 10/11: action dispatch, then an unavailable-types/parse-
        // failure footer appended to whatever text remains.
        if let Some(action_executor) = self.action_executor.clone() {
            let parsed = parse_actions(&output, &self.action_flags);
            let results = dispatch_actions(action_executor, &parsed.actions, 0).await;
            let display_lines = build_display_lines(&parsed.actions, &results);
            let mut rebuilt = parsed.clean_text;
            if !display_lines.is_empty() {
                rebuilt.push_str("\n\n");
                rebuilt.push_str(&display_lines.join("\n"));
            }
            if let Some(notice) = build_unavailable_notice(&parsed.stripped_unrecognized_types, parsed.parse_failures) {
                rebuilt.push_str("\n\n");
                rebuilt.push_str(&notice);
            }
            output = rebuilt.trim().to_string();
        }

        // Step 12: sentinel suppression.
        let collapsed = collapse_whitespace(&output);
        if images.is_empty() && (collapsed == HEARTBEAT_SENTINEL || collapsed == "(no output)") {
            self.record_success(cron_id);
            return Ok(());
        }

        // Step 13: silent-mode suppression of short, default-routed replies.
        if record.silent && record.routing_mode == RoutingMode::Default && images.is_empty() && collapsed.chars().count() <= 80 {
            self.record_success(cron_id);
            return Ok(());
        }

        // Step 14: route the output.
        match self.route_output(&record, &channel_ref, &output, &images).await {
            Ok(()) => self.record_success(cron_id), // step 15
            Err(message) => self.record_error(cron_id, &message),
        }

        // Step 17: best-effort pinned status message refresh.
        self.update_status_message(cron_id).await;

        // Step 18: fire any chained downstream jobs.
        let chain = record.chain.clone();
        let upstream_state = record.state.clone();
        self.fire_chain(cron_id, &upstream_state, &chain, chain_depth).await;

        Ok(())
    }

    async fn route_output(
        &self,
        record: &CronRunRecord,
        default_channel: &Arc<dyn ChannelRef>,
        text: &str,
        images: &[Vec<u8>],
    ) -> Result<(), String> {
        match record.routing_mode {
            RoutingMode::Default => self.send_chunked(default_channel, text, images).await,
            RoutingMode::Json => {
                let mut any_sent = false;
                if let Some(entries) = route::parse_json_route_entries(text) {
                    for entry in &entries {
                        if let Some(channel) = self.chat.resolve_channel(&self.guild_id, &entry.channel).await {
                            if channel.send(&entry.content, SendOptions::default()).await.is_ok() {
                                any_sent = true;
                            }
                        }
                    }
                }
                if any_sent {
                    Ok(())
                } else {
                    // Every JSON entry failed (or none parsed): fall back to
                    // the job's own channel rather than dropping the output.
                    self.send_chunked(default_channel, text, images).await
                }
            }
        }
    }

    async fn send_chunked(&self, channel: &Arc<dyn ChannelRef>, text: &str, images: &[Vec<u8>]) -> Result<(), String> {
        for chunk in route::send_chunks(text, images) {
            channel.send(&chunk.content, SendOptions { images: chunk.images }).await?;
        }
        Ok(())
    }

    fn record_success(&self, cron_id: &CronId) {
        if let Err(e) = self.store.lock().record_run(cron_id, RunStatus::Success, None) {
            tracing::warn!(cron_id = %cron_id.as_str(), error = %e, "failed to record successful run");
        }
    }

    fn record_error(&self, cron_id: &CronId, message: &str) {
        tracing::warn!(cron_id = %cron_id.as_str(), error = message, "cron run failed");
        if let Err(e) = self.store.lock().record_run(cron_id, RunStatus::Error, Some(message.to_string())) {
            tracing::warn!(cron_id = %cron_id.as_str(), error = %e, "failed to record failed run");
        }
    }

    async fn update_status_message(&self, cron_id: &CronId) {
        let (status_message_id, channel_name, summary) = {
            let store = self.store.lock();
            match store.get(cron_id) {
                Some(record) => (record.status_message_id.clone(), record.channel.clone(), compose_status_summary(record)),
                None => return,
            }
        };
        let Some(message_id) = status_message_id else { return };
        let Some(channel_ref) = self.chat.resolve_channel(&self.guild_id, &channel_name).await else { return };
        if let Err(e) = channel_ref.edit(&message_id, &summary).await {
            tracing::warn!(cron_id = %cron_id.as_str(), error = %e, "failed to update pinned status message");
        }
    }

    /// Forward upstream state into each downstream job's `state.__upstream`
    /// and fire it. A chain entry that no longer exists in the store is
    /// silently skipped rather than failing the whole chain.
    async fn fire_chain(self: &Arc<Self>, upstream_id: &CronId, upstream_state: &Value, chain: &[CronId], chain_depth: u32) {
        if chain.is_empty() {
            return;
        }
        if chain_depth + 1 >= MAX_CHAIN_DEPTH {
            tracing::warn!(cron_id = %upstream_id.as_str(), "chain depth limit reached, not firing downstream jobs");
            return;
        }
        for downstream_id in chain {
            let forwarded = {
                let mut store = self.store.lock();
                match store.get(downstream_id) {
                    Some(existing) => {
                        let mut state = existing.state.clone();
                        let upstream_entry = serde_json::json!({
                            "fromCronId": upstream_id.as_str(),
                            "state": upstream_state,
                        });
                        if let Value::Object(map) = &mut state {
                            map.insert("__upstream".to_string(), upstream_entry);
                        } else {
                            state = serde_json::json!({ "__upstream": upstream_entry });
                        }
                        let update = CronRecordUpdate { state: Some(state), ..Default::default() };
                        store.upsert_record(downstream_id, update).is_ok()
                    }
                    None => false,
                }
            };
            if !forwarded {
                continue;
            }
            if let Err(e) = Box::pin(self.execute_cron_job(downstream_id, chain_depth + 1)).await {
                tracing::warn!(cron_id = %downstream_id.as_str(), error = %e, "chained run failed to start");
            }
        }
    }
}

fn compose_status_summary(record: &CronRunRecord) -> String {
    let status = record.last_run_status.map(|s| format!("{s:?}").to_lowercase()).unwrap_or_else(|| "never run".to_string());
    format!("Last run: {status} (run #{})", record.run_count)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
