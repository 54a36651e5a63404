//! Integration tests for the CLI
//!
//! Tests the command-line interface for apply, check, and list commands

use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// Helper to create a test tree plus a rules file next to it
fn setup_workspace() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();

    let src = dir.path().join("web/src");
    fs::create_dir_all(&src).unwrap();
    fs::write(
        src.join("VerifyEmail.tsx"),
        "disabled={!userEmail || status === 'loading'}\n",
    )
    .unwrap();
    fs::write(src.join("notes.md"), "status === 'loading'\n").unwrap();

    let rules = dir.path().join("fixes.toml");
    fs::write(
        &rules,
        r#"[meta]
name = "verify-email-fixes"

[[sets]]
name = "status-rewrites"

[[sets.rules]]
pattern = "status === 'loading'"
replacement = "status !== 'waiting'"
"#,
    )
    .unwrap();

    (dir, rules)
}

fn bulkpatch(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_apply_help() {
    let output = bulkpatch(&["apply", "--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Apply a rules file"));
}

#[test]
fn test_apply_basic() {
    let (dir, rules) = setup_workspace();
    let root = dir.path().join("web");

    let output = bulkpatch(&[
        "apply",
        root.to_str().unwrap(),
        rules.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Fixed:"));
    assert!(stdout.contains("Summary:"));
    assert!(stdout.contains("1 patched"));

    let patched = fs::read_to_string(dir.path().join("web/src/VerifyEmail.tsx")).unwrap();
    assert_eq!(patched, "disabled={!userEmail || status !== 'waiting'}\n");

    // Ineligible extension stays untouched even though the pattern matches.
    let notes = fs::read_to_string(dir.path().join("web/src/notes.md")).unwrap();
    assert_eq!(notes, "status === 'loading'\n");
}

#[test]
fn test_apply_is_idempotent_for_stable_rules() {
    let (dir, rules) = setup_workspace();
    let root = dir.path().join("web");

    let first = bulkpatch(&["apply", root.to_str().unwrap(), rules.to_str().unwrap()]);
    assert!(first.status.success());

    let second = bulkpatch(&["apply", root.to_str().unwrap(), rules.to_str().unwrap()]);
    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("0 patched"));
}

#[test]
fn test_check_reports_without_writing() {
    let (dir, rules) = setup_workspace();
    let root = dir.path().join("web");

    let output = bulkpatch(&["check", root.to_str().unwrap(), rules.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DRY RUN"));
    assert!(stdout.contains("Would fix:"));

    let content = fs::read_to_string(dir.path().join("web/src/VerifyEmail.tsx")).unwrap();
    assert_eq!(content, "disabled={!userEmail || status === 'loading'}\n");
}

#[test]
fn test_missing_root_exits_nonzero() {
    let (dir, rules) = setup_workspace();
    let missing = dir.path().join("does-not-exist");

    let output = bulkpatch(&["apply", missing.to_str().unwrap(), rules.to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_bad_pattern_aborts_before_any_write() {
    let (dir, _) = setup_workspace();
    let root = dir.path().join("web");

    let rules = dir.path().join("broken.toml");
    fs::write(
        &rules,
        r#"[meta]
name = "broken"

[[sets]]
name = "bad"

[[sets.rules]]
pattern = "status === 'loading'"
replacement = "status !== 'waiting'"

[[sets.rules]]
pattern = "unclosed ("
replacement = ""
"#,
    )
    .unwrap();

    let output = bulkpatch(&["apply", root.to_str().unwrap(), rules.to_str().unwrap()]);

    assert!(!output.status.success());

    // Fail-fast: the valid first rule must not have been applied either.
    let content = fs::read_to_string(dir.path().join("web/src/VerifyEmail.tsx")).unwrap();
    assert_eq!(content, "disabled={!userEmail || status === 'loading'}\n");
}

#[test]
fn test_list_shows_rule_sets() {
    let (dir, _) = setup_workspace();

    let rules = dir.path().join("mixed.toml");
    fs::write(
        &rules,
        r#"[meta]
name = "mixed"
description = "one live set, one parked"

[[sets]]
name = "live"

[[sets.rules]]
pattern = "a"
replacement = "b"

[[sets]]
name = "parked"
enabled = false
file = "src/pages/Perfil.tsx"

[[sets.rules]]
pattern = "c"
replacement = "d"
"#,
    )
    .unwrap();

    let output = bulkpatch(&["list", rules.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mixed"));
    assert!(stdout.contains("live"));
    assert!(stdout.contains("parked"));
    assert!(stdout.contains("disabled"));
    assert!(stdout.contains("src/pages/Perfil.tsx"));
}
