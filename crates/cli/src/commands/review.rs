// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cronhost review` — a static review pass over one or more crate sections,
//! reported as Markdown + JSON under `docs/code-review/`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

#[derive(clap::Args)]
pub struct ReviewArgs {
    #[command(subcommand)]
    pub command: ReviewCommand,
}

#[derive(clap::Subcommand)]
pub enum ReviewCommand {
    /// Run the static review pass and write a report.
    Run(RunArgs),
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Comma-separated section names to review (default: all sections).
    #[arg(long, value_delimiter = ',')]
    pub section: Vec<String>,
    /// Also scan `..._tests.rs` sibling files.
    #[arg(long)]
    pub include_tests: bool,
    /// Also run per-crate quality-gate checks (e.g. workspace lints wired up).
    #[arg(long)]
    pub with_gates: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    P1,
    P2,
    P3,
}

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub section: String,
    pub severity: Severity,
    pub path: String,
    pub line: usize,
    pub rule: &'static str,
    pub message: String,
}

/// A named slice of the workspace reviewable on its own.
struct Section {
    name: &'static str,
    root: &'static str,
}

fn sections() -> Vec<Section> {
    vec![
        Section { name: "core", root: "crates/core/src" },
        Section { name: "storage", root: "crates/storage/src" },
        Section { name: "adapters", root: "crates/adapters/src" },
        Section { name: "engine", root: "crates/engine/src" },
        Section { name: "daemon", root: "crates/daemon/src" },
        Section { name: "cli", root: "crates/cli/src" },
    ]
}

fn is_test_file(path: &Path) -> bool {
    path.file_stem().and_then(|s| s.to_str()).is_some_and(|s| s.ends_with("_tests"))
        || path.components().any(|c| c.as_os_str() == "tests")
}

fn collect_rs_files(root: &Path, include_tests: bool, out: &mut Vec<PathBuf>) -> Result<()> {
    if !root.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_rs_files(&path, include_tests, out)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            if !include_tests && is_test_file(&path) {
                continue;
            }
            out.push(path);
        }
    }
    Ok(())
}

struct LineRule {
    rule: &'static str,
    severity: Severity,
    pattern: Regex,
    message: &'static str,
}

fn line_rules() -> Vec<LineRule> {
    vec![
        LineRule {
            rule: "unwrap-outside-tests",
            severity: Severity::P1,
            pattern: Regex::new(r"\.unwrap\(\)|\.expect\(|panic!\(").expect("static pattern"),
            message: "panicking call in non-test code",
        },
        LineRule {
            rule: "todo-marker",
            severity: Severity::P2,
            pattern: Regex::new(r"\b(TODO|FIXME)\b").expect("static pattern"),
            message: "unresolved TODO/FIXME marker",
        },
    ]
}

const MAX_LINE_LEN: usize = 120;

fn scan_section(section: &Section, workspace_root: &Path, include_tests: bool) -> Result<Vec<Finding>> {
    let root = workspace_root.join(section.root);
    let mut files = Vec::new();
    collect_rs_files(&root, include_tests, &mut files)?;
    files.sort();

    let rules = line_rules();
    let mut findings = Vec::new();
    for path in &files {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("//") {
                continue;
            }
            if line.len() > MAX_LINE_LEN {
                findings.push(Finding {
                    section: section.name.to_string(),
                    severity: Severity::P3,
                    path: display_path(path, workspace_root),
                    line: idx + 1,
                    rule: "long-line",
                    message: format!("line exceeds {MAX_LINE_LEN} characters ({} found)", line.len()),
                });
            }
            for rule in &rules {
                if rule.pattern.is_match(line) {
                    findings.push(Finding {
                        section: section.name.to_string(),
                        severity: rule.severity,
                        path: display_path(path, workspace_root),
                        line: idx + 1,
                        rule: rule.rule,
                        message: rule.message.to_string(),
                    });
                }
            }
        }
    }
    Ok(findings)
}

fn display_path(path: &Path, workspace_root: &Path) -> String {
    path.strip_prefix(workspace_root).unwrap_or(path).display().to_string()
}

/// Per-crate quality gate: the crate's `Cargo.toml` opts into the workspace
/// lint table (`unsafe_code = "forbid"`, `clippy::unwrap_used = "deny"`, ...).
fn gate_findings(workspace_root: &Path, selected: &[&Section]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for section in selected {
        let crate_dir = workspace_root.join(section.root).parent().map(Path::to_path_buf);
        let Some(crate_dir) = crate_dir else { continue };
        let manifest = crate_dir.join("Cargo.toml");
        let Ok(text) = std::fs::read_to_string(&manifest) else { continue };
        if !text.contains("[lints]") || !text.contains("workspace = true") {
            findings.push(Finding {
                section: section.name.to_string(),
                severity: Severity::P2,
                path: display_path(&manifest, workspace_root),
                line: 1,
                rule: "missing-lint-gate",
                message: "crate does not opt into [lints] workspace = true".to_string(),
            });
        }
    }
    findings
}

#[derive(Serialize)]
struct Report {
    generated_at: DateTime<Utc>,
    sections: Vec<String>,
    findings: Vec<Finding>,
    counts: BTreeMap<String, usize>,
}

fn render_markdown(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Section review — {}\n\n", report.generated_at.to_rfc3339()));
    out.push_str(&format!("Sections: {}\n\n", report.sections.join(", ")));
    out.push_str(&format!(
        "P1: {} · P2: {} · P3: {}\n\n",
        report.counts.get("P1").copied().unwrap_or(0),
        report.counts.get("P2").copied().unwrap_or(0),
        report.counts.get("P3").copied().unwrap_or(0),
    ));
    if report.findings.is_empty() {
        out.push_str("No findings.\n");
        return out;
    }
    out.push_str("| Severity | Section | Location | Rule | Message |\n");
    out.push_str("|---|---|---|---|---|\n");
    for f in &report.findings {
        out.push_str(&format!(
            "| {:?} | {} | {}:{} | {} | {} |\n",
            f.severity, f.section, f.path, f.line, f.rule, f.message
        ));
    }
    out
}

pub async fn handle(args: ReviewArgs) -> Result<()> {
    match args.command {
        ReviewCommand::Run(run_args) => run(run_args).await,
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let workspace_root = std::env::current_dir()?;
    let all_sections = sections();
    let selected: Vec<&Section> = if args.section.is_empty() {
        all_sections.iter().collect()
    } else {
        all_sections
            .iter()
            .filter(|s| args.section.iter().any(|wanted| wanted == s.name))
            .collect()
    };

    let mut findings = Vec::new();
    for section in &selected {
        findings.extend(scan_section(section, &workspace_root, args.include_tests)?);
    }
    if args.with_gates {
        findings.extend(gate_findings(&workspace_root, &selected));
    }
    findings.sort_by(|a, b| (a.severity, &a.path, a.line).cmp(&(b.severity, &b.path, b.line)));

    let mut counts = BTreeMap::new();
    for f in &findings {
        *counts.entry(format!("{:?}", f.severity)).or_insert(0) += 1;
    }

    let report = Report {
        generated_at: Utc::now(),
        sections: selected.iter().map(|s| s.name.to_string()).collect(),
        findings,
        counts,
    };

    let out_dir = workspace_root.join("docs/code-review");
    std::fs::create_dir_all(&out_dir)?;
    let date = report.generated_at.format("%Y-%m-%d");
    let suffix = if args.section.is_empty() { String::new() } else { format!("-{}", args.section.join("-")) };
    let stem = format!("section-review-{date}{suffix}");

    let md_path = out_dir.join(format!("{stem}.md"));
    std::fs::write(&md_path, render_markdown(&report))?;

    let json_path = out_dir.join(format!("{stem}.json"));
    std::fs::write(&json_path, serde_json::to_string_pretty(&report)?)?;

    println!(
        "review: {} finding(s) — P1={} P2={} P3={} ({})",
        report.findings.len(),
        report.counts.get("P1").copied().unwrap_or(0),
        report.counts.get("P2").copied().unwrap_or(0),
        report.counts.get("P3").copied().unwrap_or(0),
        md_path.display(),
    );
    Ok(())
}

#[cfg(test)]
#[path = "review_tests.rs"]
mod tests;
