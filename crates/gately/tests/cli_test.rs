//! Integration tests for the `gately` CLI binary.
//!
//! These tests validate argument parsing, help output, shell
//! completions, and error handling — all without door hardware.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `gately` binary with env isolation.
///
/// Clears all `GATELY_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn gately_cmd() -> Command {
    let mut cmd = Command::cargo_bin("gately").unwrap();
    cmd.env("HOME", "/tmp/gately-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/gately-cli-test-nonexistent")
        .env_remove("GATELY_CONFIG")
        .env_remove("GATELY_TERMINAL")
        .env_remove("GATELY_OUTPUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// A definitions file with a one-hour class and a day-pass range.
fn definitions_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[definition]]
id = "hour"
name = "One hour"
selector = "0304*"
duration_minutes = 60
price = 100
price_per_extra_minute = 5

[[definition]]
id = "day"
name = "Full day"
selector = "10000000-19999999"
duration_minutes = 600
price = 350
price_per_extra_minute = 2
"#
    )
    .unwrap();
    file
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = gately_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    gately_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("access")
            .and(predicate::str::contains("run"))
            .and(predicate::str::contains("definitions"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    gately_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gately"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    gately_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    gately_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    gately_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = gately_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_run_without_config() {
    gately_cmd().arg("run").assert().failure().stderr(
        predicate::str::contains("terminal").or(predicate::str::contains("Terminal")),
    );
}

#[test]
fn test_run_unknown_terminal() {
    let output = gately_cmd()
        .args(["--terminal", "entry-9", "run"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4), "Expected NOT_FOUND exit code");
    let text = combined_output(&output);
    assert!(text.contains("entry-9"), "Expected terminal name:\n{text}");
}

#[test]
fn test_scan_without_definitions() {
    let output = gately_cmd().args(["scan", "03041000"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected USAGE exit code");
    let text = combined_output(&output);
    assert!(
        text.contains("definitions"),
        "Expected definitions hint:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = gately_cmd()
        .args(["--output", "invalid", "scan", "03041000"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    // `config show` uses load_config_or_default() so it succeeds even
    // when no config file exists — it just renders the default config.
    gately_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("defaults"));
}

#[test]
fn test_config_path() {
    gately_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_and_show() {
    let dir = tempfile::tempdir().unwrap();
    let config_file = dir.path().join("config.toml");

    gately_cmd()
        .env("GATELY_CONFIG", &config_file)
        .args(["config", "init"])
        .assert()
        .success();

    assert!(config_file.exists());

    // A second init without --force must refuse.
    gately_cmd()
        .env("GATELY_CONFIG", &config_file)
        .args(["config", "init"])
        .assert()
        .failure();

    gately_cmd()
        .env("GATELY_CONFIG", &config_file)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("entry-1"));
}

// ── Definitions and scan resolution ─────────────────────────────────

#[test]
fn test_definitions_list() {
    let defs = definitions_file();
    gately_cmd()
        .args(["definitions", "list", "--definitions"])
        .arg(defs.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("hour").and(predicate::str::contains("day")));
}

#[test]
fn test_definitions_check_match() {
    let defs = definitions_file();
    gately_cmd()
        .args(["definitions", "check", "15000001", "--definitions"])
        .arg(defs.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("day"));
}

#[test]
fn test_definitions_check_no_match() {
    let defs = definitions_file();
    let output = gately_cmd()
        .args(["definitions", "check", "99999999", "--definitions"])
        .arg(defs.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4), "Expected NOT_FOUND exit code");
}

#[test]
fn test_scan_pads_dropped_leading_zero() {
    let defs = definitions_file();
    gately_cmd()
        .args(["--output", "json", "scan", "3041000", "--definitions"])
        .arg(defs.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("03041000").and(predicate::str::contains("hour")));
}

#[test]
fn test_scan_rejects_short_code() {
    let defs = definitions_file();
    let output = gately_cmd()
        .args(["scan", "123", "--definitions"])
        .arg(defs.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected USAGE exit code");
}

// ── Kiosk loop (stdin-driven) ───────────────────────────────────────

#[test]
fn test_run_processes_scans_from_stdin() {
    let defs = definitions_file();
    let dir = tempfile::tempdir().unwrap();
    let config_file = dir.path().join("config.toml");
    std::fs::write(
        &config_file,
        format!(
            r#"
default_terminal = "entry-1"

[defaults]
definitions = "{}"

[terminals.entry-1]
mode = "entry"
"#,
            defs.path().display()
        ),
    )
    .unwrap();

    gately_cmd()
        .env("GATELY_CONFIG", &config_file)
        .arg("run")
        .write_stdin("3041000\n99999999\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("03041000")
                .and(predicate::str::contains("admitted"))
                .and(predicate::str::contains("unknown code")),
        );
}
