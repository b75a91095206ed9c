// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strategy for the Claude Code CLI: JSONL streaming, `-p` one-shot prompt
//! mode, session resume via `--resume <id>`.

use super::{tool_args, InvokeContext, InvokeOptions, MultiTurnMode, OutputMode, ParsedLine, RuntimeStrategy, StrategyIdentity};
use async_trait::async_trait;

pub struct ClaudeStrategy {
    binary: String,
}

impl ClaudeStrategy {
    pub fn new() -> Self {
        Self {
            binary: crate::env::runtime_bin_override("CLAUDE_BIN").unwrap_or_else(|| "claude".to_string()),
        }
    }
}

impl Default for ClaudeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeStrategy for ClaudeStrategy {
    fn identity(&self) -> StrategyIdentity {
        StrategyIdentity {
            id: "claude",
            default_binary: self.binary.clone(),
            default_model: "sonnet",
            multi_turn_mode: MultiTurnMode::SessionResume,
        }
    }

    fn build_args(&self, ctx: &InvokeContext, opts: &InvokeOptions) -> Vec<String> {
        let mut args = vec!["-p".to_string(), "--output-format".to_string(), "stream-json".to_string()];
        if let Some(model) = &ctx.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        if let Some(session_id) = &ctx.session_id {
            args.push("--resume".to_string());
            args.push(session_id.clone());
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
        match value.get("type").and_then(|t| t.as_str()) {
            Some("assistant") => ParsedLine {
                text: value
                    .pointer("/message/content/0/text")
                    .and_then(|t| t.as_str())
                    .map(str::to_string),
                ..Default::default()
            },
            Some("result") => ParsedLine {
                result_text: value.get("result").and_then(|t| t.as_str()).map(str::to_string),
                session_id: value.get("session_id").and_then(|t| t.as_str()).map(str::to_string),
                ..Default::default()
            },
            Some("tool_use") => ParsedLine {
                activity: value.get("name").and_then(|t| t.as_str()).map(str::to_string),
                in_tool_use: true,
                ..Default::default()
            },
            _ => ParsedLine::default(),
        }
    }

    fn is_noise_line(&self, line: &str) -> bool {
        line.starts_with("npm warn") || line.contains("ExperimentalWarning")
    }
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
