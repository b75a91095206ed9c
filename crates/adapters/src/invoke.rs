// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The universal `invoke(params) -> lazy stream of events` entry point.
//! Strategies only describe how to build a command line and parse output;
//! everything else — subprocess lifecycle, stdin/argv routing, timeouts,
//! stall detection, image dedup, sanitized errors — lives here, shared
//! across every runtime.

use crate::dedup::ImageDedup;
use crate::session;
use crate::stall::{StallKind, StallTracker};
use crate::strategy::{InvokeContext, InvokeOptions, MultiTurnMode, OutputMode, RuntimeStrategy, StrategyIdentity};
use crate::subprocess::{INVOCATION_DEFAULT_TIMEOUT, SIGTERM_GRACE};
use crate::tracker::TrackedPid;
use ch_core::event::{ImagePayload, LogStream};
use ch_core::RuntimeEvent;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{info_span, warn, Instrument};

/// Prompts at or under this size go over argv; larger prompts go over
/// stdin.
pub const STDIN_THRESHOLD: usize = 100_000;

/// Handle to a running invocation: an event queue plus a cancel switch.
pub struct InvokeHandle {
    pub events: mpsc::Receiver<RuntimeEvent>,
    pub cancel: oneshot::Sender<()>,
}

/// Start a runtime invocation. Returns immediately; the subprocess and event
/// pump run on a spawned task.
pub fn invoke(
    strategy: Arc<dyn RuntimeStrategy>,
    ctx: InvokeContext,
    opts: InvokeOptions,
) -> InvokeHandle {
    let (tx, rx) = mpsc::channel(256);
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let identity = strategy.identity();
    let span = info_span!("runtime.invoke", runtime = identity.id);
    tokio::spawn(run_invocation(strategy, ctx, opts, tx, cancel_rx).instrument(span));
    InvokeHandle { events: rx, cancel: cancel_tx }
}

async fn run_invocation(
    strategy: Arc<dyn RuntimeStrategy>,
    ctx: InvokeContext,
    opts: InvokeOptions,
    tx: mpsc::Sender<RuntimeEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    if let Err(message) = run_invocation_inner(&strategy, &ctx, &opts, &tx, &mut cancel_rx).await {
        let _ = tx.send(RuntimeEvent::error(message)).await;
    }
    let _ = tx.send(RuntimeEvent::Done).await;
}

async fn run_invocation_inner(
    strategy: &Arc<dyn RuntimeStrategy>,
    ctx: &InvokeContext,
    opts: &InvokeOptions,
    tx: &mpsc::Sender<RuntimeEvent>,
    cancel_rx: &mut oneshot::Receiver<()>,
) -> Result<(), String> {
    // Step 1: an already-cancelled invocation never spawns a subprocess.
    if cancel_rx.try_recv().is_ok() {
        return Err("aborted".to_string());
    }

    let identity = strategy.identity();
    let resolved_ctx = resolve_session_context(ctx, &identity);
    let ctx = &resolved_ctx;
    let args = strategy.build_args(ctx, opts);
    let stdin_payload = if opts.prompt.len() > STDIN_THRESHOLD {
        strategy
            .build_stdin_payload(ctx, opts)
            .or_else(|| Some(opts.prompt.clone().into_bytes()))
    } else {
        strategy.build_stdin_payload(ctx, opts)
    };

    let mut cmd = Command::new(identity.default_binary);
    cmd.args(&args)
        .env("NO_COLOR", "1")
        .env("FORCE_COLOR", "0")
        .env("TERM", "dumb")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if stdin_payload.is_some() { Stdio::piped() } else { Stdio::null() })
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| strategy.handle_spawn_error(&e))?;
    let _tracked = child.id().map(TrackedPid::new);

    if let Some(payload) = stdin_payload {
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(&payload).await;
            let _ = stdin.shutdown().await;
        }
    }

    let stdout = child.stdout.take().expect("piped stdout");
    let stderr = child.stderr.take().expect("piped stderr");
    let mut stdout_lines = BufReader::new(stdout).lines();
    let mut stderr_lines = BufReader::new(stderr).lines();

    let timeout = opts.timeout.unwrap_or(INVOCATION_DEFAULT_TIMEOUT);
    let deadline = tokio::time::Instant::now() + timeout;
    let mut stall = StallTracker::new(
        crate::env::stream_stall_timeout(),
        crate::env::progress_stall_timeout(),
    );
    let mut dedup = ImageDedup::new();
    let mut stderr_tail: Vec<String> = Vec::new();
    let mut accumulated_text = String::new();
    let mut captured_session_id: Option<String> = None;

    loop {
        tokio::select! {
            _ = &mut *cancel_rx => {
                let _ = child.kill().await;
                return Err("aborted".to_string());
            }
            _ = tokio::time::sleep_until(deadline) => {
                terminate_with_grace(&mut child).await;
                return Err(format!("{} timed out after {}ms", identity.id, timeout.as_millis()));
            }
            _ = tokio::time::sleep_until(stall.next_deadline()) => {
                if let Some(kind) = stall.check() {
                    terminate_with_grace(&mut child).await;
                    let timeout_ms = match kind {
                        StallKind::Stream => crate::env::stream_stall_timeout().as_millis(),
                        StallKind::Progress => crate::env::progress_stall_timeout().as_millis(),
                    };
                    let label = match kind {
                        StallKind::Stream => "stream stall",
                        StallKind::Progress => "progress stall",
                    };
                    return Err(format!("{label}: no output for {timeout_ms}ms"));
                }
            }
            line = stdout_lines.next_line() => {
                match line {
                    Ok(Some(raw)) => {
                        stall.note_activity();
                        let outcome = emit_parsed_line(strategy, ctx, &raw, &mut dedup, tx).await;
                        if outcome.progressed {
                            stall.note_progress();
                        }
                        if let Some(text) = outcome.delta_text {
                            accumulated_text.push_str(&text);
                        }
                        if outcome.session_id.is_some() {
                            captured_session_id = outcome.session_id;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => return Err(format!("{} stdout read failed: {e}", identity.id)),
                }
            }
            line = stderr_lines.next_line() => {
                if let Ok(Some(raw)) = line {
                    stall.note_activity();
                    if !strategy.is_noise_line(&raw) && stderr_tail.len() < 8 {
                        stderr_tail.push(raw.clone());
                    }
                    let _ = tx.send(RuntimeEvent::LogLine { stream: LogStream::Stderr, line: raw }).await;
                }
            }
        }
    }

    let status = child.wait().await.map_err(|e| format!("{} wait failed: {e}", identity.id))?;
    if !status.success() {
        if identity.multi_turn_mode == MultiTurnMode::SessionResume {
            if let Some(key) = &ctx.session_key {
                session::clear(key);
            }
        }
        let code = status.code().unwrap_or(-1);
        let sanitized = ch_core::error::sanitize_stderr_tail(&stderr_tail.join("\n"), |l| strategy.is_noise_line(l));
        return Err(strategy.handle_exit_error(code, sanitized.as_deref()));
    }

    if identity.multi_turn_mode == MultiTurnMode::SessionResume {
        if let (Some(key), Some(id)) = (&ctx.session_key, &captured_session_id) {
            session::record(key, id.clone());
        }
    }

    if strategy.output_mode(ctx) == OutputMode::Text {
        let _ = tx.send(RuntimeEvent::TextFinal { text: accumulated_text.trim().to_string() }).await;
    }

    Ok(())
}

/// Resolve the `SessionResume` session ID from the store, keyed by
/// `ctx.session_key`, unless the caller already supplied one explicitly.
fn resolve_session_context(ctx: &InvokeContext, identity: &StrategyIdentity) -> InvokeContext {
    let mut resolved = ctx.clone();
    if identity.multi_turn_mode == MultiTurnMode::SessionResume && resolved.session_id.is_none() {
        if let Some(key) = &resolved.session_key {
            resolved.session_id = session::lookup(key);
        }
    }
    resolved
}

struct EmitOutcome {
    progressed: bool,
    delta_text: Option<String>,
    session_id: Option<String>,
}

async fn emit_parsed_line(
    strategy: &Arc<dyn RuntimeStrategy>,
    ctx: &InvokeContext,
    raw: &str,
    dedup: &mut ImageDedup,
    tx: &mpsc::Sender<RuntimeEvent>,
) -> EmitOutcome {
    let parsed = strategy.parse_line(raw, ctx);
    let mut progressed = false;
    let mut delta_text = None;
    if let Some(text) = parsed.text {
        progressed = true;
        delta_text = Some(text.clone());
        let _ = tx.send(RuntimeEvent::TextDelta { text }).await;
    }
    if let Some(text) = parsed.result_text {
        progressed = true;
        let _ = tx.send(RuntimeEvent::TextFinal { text }).await;
    }
    if let Some(image) = parsed.image_base64 {
        if let Some(hash) = dedup.accept(image.as_bytes()) {
            progressed = true;
            let _ = tx
                .send(RuntimeEvent::ImageData {
                    image: ImagePayload {
                        data: image,
                        mime_type: parsed.image_mime_type.unwrap_or_else(|| "image/png".to_string()),
                        content_hash: hash,
                    },
                })
                .await;
        }
    }
    if let Some(name) = parsed.activity {
        progressed = true;
        if parsed.in_tool_use {
            let _ = tx.send(RuntimeEvent::ToolStart { name, input: None }).await;
        } else {
            let _ = tx.send(RuntimeEvent::ToolEnd { name, ok: true }).await;
        }
    }
    if parsed.session_id.is_some() {
        progressed = true;
    }
    EmitOutcome { progressed, delta_text, session_id: parsed.session_id }
}

/// Strategy's `getOutputMode` informs JSONL vs text parsing convention, but
/// both paths reuse `parse_line`; kept as a standalone helper for callers
/// (e.g. tests) that want to assert on the declared mode without invoking a
/// subprocess.
pub fn declared_output_mode(strategy: &dyn RuntimeStrategy, ctx: &InvokeContext) -> OutputMode {
    strategy.output_mode(ctx)
}

async fn terminate_with_grace(child: &mut tokio::process::Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        let _ = std::process::Command::new("kill").arg(pid.to_string()).status();
        if tokio::time::timeout(SIGTERM_GRACE, child.wait()).await.is_ok() {
            return;
        }
    }
    let _ = child.kill().await;
}

#[cfg(test)]
#[path = "invoke_tests.rs"]
mod tests;
