//! Integration tests for the lockin binary.
//!
//! These tests verify end-to-end behavior including:
//! - Session start/pause/stop workflow
//! - Settings changes and validation
//! - Progress and export output
//! - Data persistence across runs

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI bound to a data dir and a quiet config
fn cli(dir: &Path) -> Command {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        fs::write(&config_path, "[notifications]\nbell = false\n").expect("write config");
    }

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lockin"));
    cmd.arg("--data-dir")
        .arg(dir.join("data"))
        .arg("--config")
        .arg(config_path);
    cmd
}

fn state_path(dir: &Path) -> PathBuf {
    dir.join("data").join("state.json")
}

fn read_state(dir: &Path) -> Value {
    let content = fs::read_to_string(state_path(dir)).expect("Failed to read state");
    serde_json::from_str(&content).expect("state is JSON")
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("lockin"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Focus timer for alternating work and rest sessions",
        ));
}

#[test]
fn test_default_command_shows_status() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode:      Work"))
        .stdout(predicate::str::contains("Remaining: 60:00"))
        .stdout(predicate::str::contains("Status:    idle"));
}

#[test]
fn test_config_seeds_fresh_store() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("config.toml"),
        "[timer]\nwork_minutes = 25\nrest_minutes = 5\n",
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Remaining: 25:00"));
}

#[test]
fn test_settings_update_rebaselines_countdown() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("settings")
        .arg("--work")
        .arg("50")
        .assert()
        .success()
        .stdout(predicate::str::contains("Work: 50 min"))
        .stdout(predicate::str::contains("Rest: 10 min"));

    let state = read_state(temp_dir.path());
    assert_eq!(state["settings"]["work_duration"], 3000);
    assert_eq!(state["current_session"]["time_remaining"], 3000);
    assert_eq!(state["current_session"]["initial_duration"], 3000);
}

#[test]
fn test_settings_rejects_zero() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("settings")
        .arg("--rest")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));

    assert!(!state_path(temp_dir.path()).exists());
}

#[test]
fn test_full_session_completes_and_records() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["settings", "--work", "1"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["start", "--tick-ms", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Started Work session (01:00 remaining)"))
        .stdout(predicate::str::contains("Work session complete!"))
        .stdout(predicate::str::contains("Recorded 1.0 min of work"));

    let state = read_state(temp_dir.path());
    assert_eq!(state["current_session"]["is_active"], false);
    assert_eq!(state["current_session"]["time_remaining"], 0);
    assert!(state["current_session"]["start_time"].is_null());

    let days = state["daily_progress"].as_array().expect("ledger array");
    assert_eq!(days.len(), 1);
    let sessions = days[0]["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["duration"], 60);
    assert_eq!(sessions[0]["type"], "work");
}

#[test]
fn test_start_at_zero_does_not_record_again() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["settings", "--work", "1"])
        .assert()
        .success();
    cli(temp_dir.path())
        .args(["start", "--tick-ms", "0"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["start", "--tick-ms", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to run"));

    let state = read_state(temp_dir.path());
    assert_eq!(state["current_session"]["is_active"], false);
    let sessions = state["daily_progress"][0]["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
}

#[test]
fn test_mode_toggles_between_work_and_rest() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("mode")
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to Rest (10:00)"));

    cli(temp_dir.path())
        .arg("mode")
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to Work (60:00)"));
}

#[test]
fn test_pause_when_idle_records_nothing() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("pause")
        .assert()
        .success()
        .stdout(predicate::str::contains("No elapsed time to record"));

    let state = read_state(temp_dir.path());
    assert_eq!(state["daily_progress"].as_array().unwrap().len(), 0);
}

/// A session left running by an interrupted `start` can be paused later
fn write_running_state(dir: &Path, initial: u32, remaining: u32) {
    let state = serde_json::json!({
        "settings": { "work_duration": 1500, "rest_duration": 300 },
        "current_session": {
            "mode": "work",
            "time_remaining": remaining,
            "is_active": true,
            "start_time": 1_710_000_000_000_i64,
            "initial_duration": initial
        },
        "daily_progress": []
    });
    fs::create_dir_all(dir.join("data")).unwrap();
    fs::write(state_path(dir), state.to_string()).unwrap();
}

#[test]
fn test_pause_records_elapsed_from_running_state() {
    let temp_dir = setup_test_dir();
    write_running_state(temp_dir.path(), 1500, 1380);

    cli(temp_dir.path())
        .arg("pause")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded 2.0 min of work"))
        .stdout(predicate::str::contains("Paused with 23:00 remaining"));

    let state = read_state(temp_dir.path());
    assert_eq!(state["current_session"]["is_active"], false);
    assert_eq!(state["current_session"]["time_remaining"], 1380);
    assert_eq!(state["daily_progress"][0]["sessions"][0]["duration"], 120);
}

#[test]
fn test_stop_records_and_resets() {
    let temp_dir = setup_test_dir();
    write_running_state(temp_dir.path(), 1500, 600);

    cli(temp_dir.path())
        .arg("stop")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded 15.0 min of work"))
        .stdout(predicate::str::contains("Work session reset to 25:00"));

    let state = read_state(temp_dir.path());
    assert_eq!(state["current_session"]["time_remaining"], 1500);
    assert_eq!(state["current_session"]["initial_duration"], 1500);
}

#[test]
fn test_reset_while_running_discards_elapsed() {
    let temp_dir = setup_test_dir();
    write_running_state(temp_dir.path(), 1500, 600);

    cli(temp_dir.path())
        .arg("reset")
        .assert()
        .success()
        .stderr(predicate::str::contains("elapsed time was not recorded"))
        .stdout(predicate::str::contains("Reset Work session to 25:00"));

    let state = read_state(temp_dir.path());
    assert_eq!(state["daily_progress"].as_array().unwrap().len(), 0);
    assert_eq!(state["current_session"]["is_active"], false);
}

#[test]
fn test_progress_shows_total() {
    let temp_dir = setup_test_dir();
    write_running_state(temp_dir.path(), 5400, 0);

    cli(temp_dir.path()).arg("pause").assert().success();

    cli(temp_dir.path())
        .args(["progress", "--days", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Last 7 days"))
        .stdout(predicate::str::contains("1.5 hours"))
        .stdout(predicate::str::contains("Total deep work time"));
}

#[test]
fn test_progress_rejects_out_of_range_days() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["progress", "--days", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 1 and 366"));

    cli(temp_dir.path())
        .args(["progress", "--days", "4000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 1 and 366"));

    cli(temp_dir.path())
        .args(["progress", "--days", "366"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Last 366 days"));
}

#[test]
fn test_export_writes_csv() {
    let temp_dir = setup_test_dir();
    write_running_state(temp_dir.path(), 1500, 0);
    cli(temp_dir.path()).arg("stop").assert().success();

    let out = temp_dir.path().join("export.csv");
    cli(temp_dir.path())
        .arg("export")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 sessions"));

    let csv_content = fs::read_to_string(&out).expect("Failed to read CSV");
    assert!(csv_content.starts_with("date,type,duration_seconds"));
    assert!(csv_content.contains(",work,1500,"));
}
