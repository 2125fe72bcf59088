//! Basic CLI E2E tests.
//!
//! Tests run the built binary against snapshot files in a temp directory.
//! HOME points into the temp directory so the real preferences file is
//! never read or written.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
    "tasks": [
        {"id": "later", "title": "Plan offsite", "created_at": "2025-03-09T09:00:00Z",
         "due": "2025-04-10T17:00:00Z", "priority": 1, "estimated_minutes": 30},
        {"id": "today", "title": "Ship report", "created_at": "2025-03-09T09:00:00Z",
         "due": "2025-03-10T17:00:00Z", "priority": 1, "estimated_minutes": 30}
    ],
    "events": [
        {"id": "client", "title": "Quarterly review", "start": "2025-03-10T10:00:00Z",
         "end": "2025-03-10T11:00:00Z", "category": "client_meeting"}
    ],
    "now": "2025-03-10T08:30:00Z"
}"#;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_focusplan-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("FOCUSPLAN_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn write_snapshot(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, SNAPSHOT).unwrap();
    path
}

#[test]
fn test_rank_json_puts_due_today_first() {
    let dir = TempDir::new().unwrap();
    let input = write_snapshot(&dir);
    let (code, stdout, stderr) =
        run_cli(dir.path(), &["rank", "--input", input.to_str().unwrap(), "--json"]);
    assert_eq!(code, 0, "rank failed: {stderr}");

    let scores: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let scores = scores.as_array().unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0]["task_id"], "today");
}

#[test]
fn test_rank_top_limits_output() {
    let dir = TempDir::new().unwrap();
    let input = write_snapshot(&dir);
    let (code, stdout, _) = run_cli(
        dir.path(),
        &["rank", "--input", input.to_str().unwrap(), "--top", "1", "--json"],
    );
    assert_eq!(code, 0);
    let scores: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(scores.as_array().unwrap().len(), 1);
}

#[test]
fn test_rank_text_shows_titles() {
    let dir = TempDir::new().unwrap();
    let input = write_snapshot(&dir);
    let (code, stdout, _) = run_cli(dir.path(), &["rank", "--input", input.to_str().unwrap()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Ship report"));
    assert!(stdout.contains("Plan offsite"));
}

#[test]
fn test_plan_json_wraps_meeting() {
    let dir = TempDir::new().unwrap();
    let input = write_snapshot(&dir);
    let (code, stdout, stderr) = run_cli(
        dir.path(),
        &["plan", "--input", input.to_str().unwrap(), "--date", "2025-03-10", "--json"],
    );
    assert_eq!(code, 0, "plan failed: {stderr}");

    let output: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let kinds: Vec<&str> = output["schedule"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|b| b["type"].as_str())
        .collect();
    assert!(kinds.contains(&"meeting-prep"));
    assert!(kinds.contains(&"meeting"));
    assert!(kinds.contains(&"meeting-decompress"));
    assert!(output["unscheduled"].as_array().unwrap().is_empty());
}

#[test]
fn test_plan_rejects_bad_date() {
    let dir = TempDir::new().unwrap();
    let input = write_snapshot(&dir);
    let (code, _, stderr) = run_cli(
        dir.path(),
        &["plan", "--input", input.to_str().unwrap(), "--date", "03/10/2025"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_missing_snapshot_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");
    let (code, _, stderr) = run_cli(dir.path(), &["rank", "--input", missing.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_prefs_set_then_get() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("prefs.toml");
    let file = file.to_str().unwrap();

    let (code, stdout, stderr) =
        run_cli(dir.path(), &["prefs", "set", "weights.urgency", "90", "--file", file]);
    assert_eq!(code, 0, "set failed: {stderr}");
    assert_eq!(stdout.trim(), "ok");

    let (code, stdout, _) = run_cli(dir.path(), &["prefs", "get", "weights.urgency", "--file", file]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "90");
}

#[test]
fn test_prefs_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("prefs.toml");
    let (code, _, stderr) = run_cli(
        dir.path(),
        &["prefs", "set", "weights.nope", "1", "--file", file.to_str().unwrap()],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    assert!(!file.exists());
}

#[test]
fn test_prefs_preset_applies() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("prefs.toml");
    let file = file.to_str().unwrap();

    let (code, _, stderr) = run_cli(dir.path(), &["prefs", "preset", "deep_focus", "--file", file]);
    assert_eq!(code, 0, "preset failed: {stderr}");

    let (_, stdout, _) = run_cli(dir.path(), &["prefs", "get", "deep_work_min_minutes", "--file", file]);
    assert_eq!(stdout.trim(), "90");
}

#[test]
fn test_prefs_presets_lists_names() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["prefs", "presets"]);
    assert_eq!(code, 0);
    assert!(stdout.lines().any(|l| l == "balanced"));
    assert!(stdout.lines().any(|l| l == "deep_focus"));
}

#[test]
fn test_energy_chart_for_date() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["energy", "--date", "2025-03-10"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Energy Curve for Monday 2025-03-10"));
    assert!(stdout.contains("09:00"));
}
