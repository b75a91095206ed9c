// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action directive parsing and dispatch: scans model output for
//! `<discord-action>{...}</discord-action>` blocks, gates each recognized
//! directive by its category flag, and executes the survivors — sequentially,
//! except `spawnAgent` which batches with bounded parallelism.

use async_trait::async_trait;
use ch_core::action::{ActionCategory, ActionDirective, ActionResult, ParsedActions, MAX_SPAWN_RECURSION_DEPTH};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

const OPEN_TAG: &str = "<discord-action>";
const CLOSE_TAG: &str = "</discord-action>";

/// `spawnAgent` directives run concurrently, capped at this many in flight.
pub const SPAWN_PARALLELISM: usize = 4;

/// Scan `text` for action blocks. Recognized directives whose category flag
/// is enabled are kept; disabled categories and unrecognized `type` values
/// are both stripped with their type name recorded (so the formatter can
/// report them); malformed JSON increments `parseFailures` instead.
pub fn parse_actions(text: &str, flags: &HashMap<ActionCategory, bool>) -> ParsedActions {
    let mut clean = String::new();
    let mut actions = Vec::new();
    let mut stripped = Vec::new();
    let mut parse_failures = 0u32;
    let mut rest = text;

    loop {
        let Some(open_at) = rest.find(OPEN_TAG) else {
            clean.push_str(rest);
            break;
        };
        clean.push_str(&rest[..open_at]);
        let after_open = &rest[open_at + OPEN_TAG.len()..];
        let Some(close_at) = after_open.find(CLOSE_TAG) else {
            // Unterminated block: not a recognizable action, keep verbatim.
            clean.push_str(&rest[open_at..]);
            break;
        };
        let body = after_open[..close_at].trim();
        rest = &after_open[close_at + CLOSE_TAG.len()..];

        match serde_json::from_str::<ActionDirective>(body) {
            Ok(directive) => {
                let enabled = flags.get(&directive.category()).copied().unwrap_or(false);
                if enabled {
                    actions.push(directive);
                } else {
                    stripped.push(directive.type_name().to_string());
                }
            }
            Err(_) => match serde_json::from_str::<serde_json::Value>(body) {
                Ok(value) => match value.get("type").and_then(|v| v.as_str()) {
                    Some(type_name) => stripped.push(type_name.to_string()),
                    None => parse_failures += 1,
                },
                Err(_) => parse_failures += 1,
            },
        }
    }

    ParsedActions {
        clean_text: clean.trim().to_string(),
        actions,
        stripped_unrecognized_types: stripped,
        parse_failures,
    }
}

/// "Unavailable action types" / "N blocks failed to parse" footer, or `None`
/// if neither condition applies.
pub fn build_unavailable_notice(stripped_unrecognized_types: &[String], parse_failures: u32) -> Option<String> {
    if stripped_unrecognized_types.is_empty() && parse_failures == 0 {
        return None;
    }
    let mut lines = Vec::new();
    if !stripped_unrecognized_types.is_empty() {
        let mut sorted = stripped_unrecognized_types.to_vec();
        sorted.sort();
        sorted.dedup();
        lines.push(format!("_Unavailable action types: {}_", sorted.join(", ")));
    }
    if parse_failures > 0 {
        let plural = if parse_failures == 1 { "" } else { "s" };
        lines.push(format!("_{parse_failures} block{plural} failed to parse_"));
    }
    Some(lines.join("\n"))
}

/// Executes a single action directive. The concrete implementation (backed
/// by the chat client and record store) lives with the executor; this crate
/// only needs the seam to orchestrate dispatch.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, directive: &ActionDirective) -> ActionResult;
}

/// Run every action through `executor`, producing a result list parallel to
/// `actions`. Non-spawn actions execute sequentially in order; `spawnAgent`
/// actions form a separate batch executed with bounded parallelism. A
/// `recursion_depth` at or past [`MAX_SPAWN_RECURSION_DEPTH`] rejects every
/// spawn action without running it (spawned agents cannot spawn further
/// agents).
pub async fn dispatch_actions(
    executor: Arc<dyn ActionExecutor>,
    actions: &[ActionDirective],
    recursion_depth: u32,
) -> Vec<ActionResult> {
    let mut results: Vec<Option<ActionResult>> = vec![None; actions.len()];
    let mut spawn_items = Vec::new();

    for (i, directive) in actions.iter().enumerate() {
        if matches!(directive, ActionDirective::SpawnAgent { .. }) {
            spawn_items.push((i, directive.clone()));
        } else {
            results[i] = Some(executor.execute(directive).await);
        }
    }

    if !spawn_items.is_empty() {
        for (idx, result) in execute_spawn_batch(Arc::clone(&executor), spawn_items, recursion_depth).await {
            results[idx] = Some(result);
        }
    }

    results
        .into_iter()
        .map(|r| r.unwrap_or_else(|| ActionResult::err("spawn task did not complete")))
        .collect()
}

async fn execute_spawn_batch(
    executor: Arc<dyn ActionExecutor>,
    items: Vec<(usize, ActionDirective)>,
    recursion_depth: u32,
) -> Vec<(usize, ActionResult)> {
    if recursion_depth >= MAX_SPAWN_RECURSION_DEPTH {
        return items
            .into_iter()
            .map(|(idx, directive)| {
                (idx, ActionResult::err(format!("{} rejected: max spawn recursion depth reached", directive.type_name())))
            })
            .collect();
    }

    let semaphore = Arc::new(Semaphore::new(SPAWN_PARALLELISM));
    let mut set = tokio::task::JoinSet::new();
    for (idx, directive) in items {
        let executor = Arc::clone(&executor);
        let semaphore = Arc::clone(&semaphore);
        set.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => executor.execute(&directive).await,
                Err(_) => ActionResult::err("spawn semaphore closed"),
            };
            (idx, result)
        });
    }

    let mut out = Vec::new();
    while let Some(joined) = set.join_next().await {
        if let Ok(pair) = joined {
            out.push(pair);
        }
    }
    out
}

/// One formatted line per result, in input order.
pub fn build_display_lines(actions: &[ActionDirective], results: &[ActionResult]) -> Vec<String> {
    actions
        .iter()
        .zip(results.iter())
        .map(|(directive, result)| {
            if result.is_ok() {
                format!("✅ {}: {}", directive.type_name(), result.summary.as_deref().unwrap_or("done"))
            } else {
                format!("❌ {}: {}", directive.type_name(), result.error.as_deref().unwrap_or("failed"))
            }
        })
        .collect()
}

/// For the first non-query failure, a retry message for the follow-up
/// invocation; `None` if every action succeeded (or all failures were
/// queries).
pub fn build_retry_placeholder(actions: &[ActionDirective], results: &[ActionResult]) -> Option<String> {
    actions
        .iter()
        .zip(results.iter())
        .find(|(directive, result)| !result.is_ok() && !directive.is_query())
        .map(|(directive, result)| {
            let reason = result.error.as_deref().unwrap_or("unknown error");
            format!("Action failed (`{}`: {reason}). Retrying…", directive.type_name())
        })
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
