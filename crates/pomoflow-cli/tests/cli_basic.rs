//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a scratch HOME so the
//! real configuration is never touched.

use std::path::Path;
use std::process::Command;

/// Run a CLI command under `home` and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "pomoflow-cli", "--quiet", "--"])
        .args(args)
        .env("HOME", home)
        .env("POMOFLOW_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn config_show_prints_defaults() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(home.path(), &["config", "show"]);
    assert_eq!(code, 0, "config show failed: {stderr}");
    assert!(stdout.contains("long_break_interval = 3"), "{stdout}");
    assert!(stdout.contains("pomodoro = 25"), "{stdout}");
}

#[test]
fn config_set_then_get_roundtrips() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "durations.pomodoro", "30"]);
    assert_eq!(code, 0, "config set failed: {stderr}");

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "durations.pomodoro"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "30");
}

#[test]
fn config_set_rejects_invalid_values() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "durations.pomodoro", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"), "{stderr}");

    let (_, _, code) = run_cli(home.path(), &["config", "get", "nonexistent.key"]);
    assert_ne!(code, 0);
}

#[test]
fn timer_status_reports_a_fresh_pomodoro() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(home.path(), &["timer", "status"]);
    assert_eq!(code, 0, "timer status failed: {stderr}");
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["phase_title"], "Pomodoro #1");
    assert_eq!(status["remaining_secs"], 25 * 60);
    assert_eq!(status["progress_percent"], 0);
}

#[test]
fn timer_next_advances_and_persists_the_phase() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["timer", "next"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Short Break #1"), "{stdout}");

    // The transition survives into a fresh process.
    let (stdout, _, code) = run_cli(home.path(), &["timer", "status"]);
    assert_eq!(code, 0);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["settings"]["current_phase"], "shortBreak");
}

#[test]
fn timer_reset_restores_defaults() {
    let home = tempfile::tempdir().unwrap();
    let _ = run_cli(home.path(), &["config", "set", "pomodoro_cycle_count", "9"]);
    let (_, _, code) = run_cli(home.path(), &["timer", "reset"]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "pomodoro_cycle_count"]);
    assert_eq!(stdout.trim(), "0");
}
