// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strategy for the Gemini CLI: plain text on stdout, one process per
//! invocation, prompt delivered over stdin to avoid argv length limits.

use super::{tool_args, InvokeContext, InvokeOptions, MultiTurnMode, OutputMode, ParsedLine, RuntimeStrategy, StrategyIdentity};
use async_trait::async_trait;

pub struct GeminiStrategy {
    binary: String,
}

impl GeminiStrategy {
    pub fn new() -> Self {
        Self {
            binary: crate::env::runtime_bin_override("GEMINI_BIN").unwrap_or_else(|| "gemini".to_string()),
        }
    }
}

impl Default for GeminiStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeStrategy for GeminiStrategy {
    fn identity(&self) -> StrategyIdentity {
        StrategyIdentity {
            id: "gemini",
            default_binary: self.binary.clone(),
            default_model: "gemini-2.5-pro",
            multi_turn_mode: MultiTurnMode::None,
        }
    }

    fn build_args(&self, ctx: &InvokeContext, opts: &InvokeOptions) -> Vec<String> {
        let mut args = vec!["--prompt-interactive=false".to_string()];
        if let Some(model) = &ctx.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        args.extend(tool_args(ctx.tool_tier.as_deref(), &opts.tools));
        args
    }

    fn output_mode(&self, _ctx: &InvokeContext) -> OutputMode {
        OutputMode::Text
    }

    fn build_stdin_payload(&self, _ctx: &InvokeContext, opts: &InvokeOptions) -> Option<Vec<u8>> {
        Some(opts.prompt.clone().into_bytes())
    }

    fn parse_line(&self, raw: &str, _ctx: &InvokeContext) -> ParsedLine {
        if raw.trim().is_empty() {
            return ParsedLine::default();
        }
        ParsedLine {
            text: Some(raw.to_string()),
            ..Default::default()
        }
    }

    fn is_noise_line(&self, line: &str) -> bool {
        line.starts_with("Loaded cached credentials")
    }
}

#[cfg(test)]
#[path = "gemini_tests.rs"]
mod tests;
