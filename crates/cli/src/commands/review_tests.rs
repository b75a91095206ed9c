// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn write_file(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn test_section() -> Section {
    Section { name: "core", root: "crates/core/src" }
}

#[test]
fn scan_section_finds_unwrap_as_p1() {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "crates/core/src/lib.rs", "let x = maybe.unwrap();\n");
    let findings = scan_section(&test_section(), tmp.path(), false).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::P1);
    assert_eq!(findings[0].rule, "unwrap-outside-tests");
}

#[test]
fn scan_section_finds_todo_as_p2() {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "crates/core/src/lib.rs", "// TODO: revisit this once the schema settles\nfn f() {}\n");
    let findings = scan_section(&test_section(), tmp.path(), false).unwrap();
    // the TODO line is a comment line and is skipped, matching the unwrap-guard's
    // "skip comment lines" convention
    assert!(findings.is_empty());
}

#[test]
fn scan_section_finds_todo_in_code_as_p2() {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "crates/core/src/lib.rs", "let x = 1; // TODO not a real comment line\n");
    let findings = scan_section(&test_section(), tmp.path(), false).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::P2);
}

#[test]
fn scan_section_flags_long_lines_as_p3() {
    let tmp = TempDir::new().unwrap();
    let long_line = format!("let x = \"{}\";\n", "a".repeat(150));
    write_file(tmp.path(), "crates/core/src/lib.rs", &long_line);
    let findings = scan_section(&test_section(), tmp.path(), false).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, "long-line");
    assert_eq!(findings[0].severity, Severity::P3);
}

#[test]
fn scan_section_skips_test_files_unless_include_tests() {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "crates/core/src/lib_tests.rs", "let x = maybe.unwrap();\n");

    let without_tests = scan_section(&test_section(), tmp.path(), false).unwrap();
    assert!(without_tests.is_empty());

    let with_tests = scan_section(&test_section(), tmp.path(), true).unwrap();
    assert_eq!(with_tests.len(), 1);
}

#[test]
fn gate_findings_flags_missing_lints_table() {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "crates/core/Cargo.toml", "[package]\nname = \"ch-core\"\n");
    let section = test_section();
    let findings = gate_findings(tmp.path(), &[&section]);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, "missing-lint-gate");
}

#[test]
fn gate_findings_passes_when_lints_table_present() {
    let tmp = TempDir::new().unwrap();
    write_file(
        tmp.path(),
        "crates/core/Cargo.toml",
        "[package]\nname = \"ch-core\"\n\n[lints]\nworkspace = true\n",
    );
    let section = test_section();
    let findings = gate_findings(tmp.path(), &[&section]);
    assert!(findings.is_empty());
}
