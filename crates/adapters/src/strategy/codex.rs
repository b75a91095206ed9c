// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strategy for the Codex CLI: JSONL streaming via `exec --json`, one
//! process per invocation (no session resume).

use super::{tool_args, InvokeContext, InvokeOptions, MultiTurnMode, OutputMode, ParsedLine, RuntimeStrategy, StrategyIdentity};
use async_trait::async_trait;

pub struct CodexStrategy {
    binary: String,
}

impl CodexStrategy {
    pub fn new() -> Self {
        Self {
            binary: crate::env::runtime_bin_override("CODEX_BIN").unwrap_or_else(|| "codex".to_string()),
        }
    }
}

impl Default for CodexStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeStrategy for CodexStrategy {
    fn identity(&self) -> StrategyIdentity {
        StrategyIdentity {
            id: "codex",
            default_binary: self.binary.clone(),
            default_model: "gpt-5-codex",
            multi_turn_mode: MultiTurnMode::None,
        }
    }

    fn build_args(&self, ctx: &InvokeContext, opts: &InvokeOptions) -> Vec<String> {
        let mut args = vec!["exec".to_string(), "--json".to_string()];
        if let Some(model) = &ctx.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        args.extend(tool_args(ctx.tool_tier.as_deref(), &opts.tools));
        args.push("--".to_string());
        args.push(opts.prompt.clone());
        args
    }

    fn output_mode(&self, _ctx: &InvokeContext) -> OutputMode {
        OutputMode::Jsonl
    }

    fn parse_line(&self, raw: &str, _ctx: &InvokeContext) -> ParsedLine {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
            return ParsedLine::default();
        };
        match value.get("msg").and_then(|m| m.get("type")).and_then(|t| t.as_str()) {
            Some("agent_message") => ParsedLine {
                text: value
                    .pointer("/msg/message")
                    .and_then(|t| t.as_str())
                    .map(str::to_string),
                ..Default::default()
            },
            Some("task_complete") => ParsedLine {
                result_text: value
                    .pointer("/msg/last_agent_message")
                    .and_then(|t| t.as_str())
                    .map(str::to_string),
                ..Default::default()
            },
            _ => ParsedLine::default(),
        }
    }
}

#[cfg(test)]
#[path = "codex_tests.rs"]
mod tests;
