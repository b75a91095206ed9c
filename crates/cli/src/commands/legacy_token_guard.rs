// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cronhost legacy-token-guard` — fails the build if a residual token from
//! this host's previous incarnation (the `oj` job-queue CLI this crate was
//! renamed from) leaks into the tree: an `OJ_*` environment variable, an
//! `oj_*` crate path, or the old `ojd`/`oj-daemon` binary name.

use std::path::{Path, PathBuf};

use anyhow::Result;
use regex::Regex;

struct Rule {
    id: &'static str,
    pattern: Regex,
    message: &'static str,
}

fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "legacy-env-prefix",
            pattern: Regex::new(r"\bOJ_[A-Z0-9_]+\b").expect("static pattern"),
            message: "legacy OJ_* environment variable; use the CRONHOST_* equivalent",
        },
        Rule {
            id: "legacy-crate-path",
            pattern: Regex::new(r"\boj(_core|_storage|_adapters|_engine|_daemon|_runbook|_cli)\b")
                .expect("static pattern"),
            message: "legacy oj_* crate path; use the ch_* / cronhost equivalent",
        },
        Rule {
            id: "legacy-binary-name",
            pattern: Regex::new(r"\b(ojd|oj-daemon)\b").expect("static pattern"),
            message: "legacy daemon binary name; use cronhostd",
        },
    ]
}

/// A directory never scanned: read-only reference material, report output,
/// and build artifacts.
fn is_excluded_dir(name: &str) -> bool {
    matches!(name, "examples" | "target" | ".git" | "docs")
}

fn collect_rs_files(root: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    if !root.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if is_excluded_dir(&name) {
                continue;
            }
            collect_rs_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
    Ok(())
}

struct Violation {
    path: PathBuf,
    line: usize,
    col: usize,
    rule_id: &'static str,
    message: &'static str,
    snippet: String,
}

/// Scan every `.rs` file under `root` and return one violation per match,
/// in file-then-line order.
fn scan(root: &Path) -> Result<Vec<Violation>> {
    let rules = rules();
    let mut files = Vec::new();
    collect_rs_files(root, &mut files)?;
    files.sort();

    let mut violations = Vec::new();
    for path in files {
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => continue,
        };
        for (line_idx, line) in content.lines().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("//") {
                continue;
            }
            for rule in &rules {
                if let Some(m) = rule.pattern.find(line) {
                    violations.push(Violation {
                        path: path.clone(),
                        line: line_idx + 1,
                        col: m.start() + 1,
                        rule_id: rule.id,
                        message: rule.message,
                        snippet: line.trim().to_string(),
                    });
                }
            }
        }
    }
    Ok(violations)
}

pub fn handle() -> Result<()> {
    let root = std::env::current_dir()?;
    let violations = scan(&root)?;

    if violations.is_empty() {
        println!("legacy-token-guard: clean, no legacy tokens found");
        return Ok(());
    }

    for v in &violations {
        println!(
            "{}:{}:{} [{}] {}",
            v.path.display(),
            v.line,
            v.col,
            v.rule_id,
            v.message
        );
        println!("    {}", v.snippet);
    }
    anyhow::bail!("legacy-token-guard: {} violation(s) found", violations.len());
}

#[cfg(test)]
#[path = "legacy_token_guard_tests.rs"]
mod tests;
