//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with a temporary HOME so the user's real
//! configuration is never touched.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_taskplan"))
        .args(args)
        .env("HOME", home)
        .env_remove("TASKPLAN_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn write_tasks(dir: &Path) -> String {
    let path = dir.join("tasks.json");
    std::fs::write(
        &path,
        r#"[
            { "id": "u", "title": "Urgent fix", "priority": "urgent", "duration": 45 },
            { "id": "h", "title": "Design review", "priority": "high", "duration": 45 },
            { "id": "l", "title": "Inbox", "priority": "low", "duration": 45 },
            { "id": "big", "title": "Too big", "priority": "low", "duration": 600 }
        ]"#,
    )
    .unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_schedule_run_json() {
    let home = tempfile::tempdir().unwrap();
    let tasks = write_tasks(home.path());
    let (code, stdout, stderr) = run_cli(
        home.path(),
        &["schedule", "run", "--tasks", &tasks, "--today", "2026-10-19", "--json"],
    );
    assert_eq!(code, 0, "stderr: {stderr}");

    let placed: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(placed.len(), 3);
    assert_eq!(placed[0]["id"], "u");
    assert_eq!(placed[0]["date"], "2026-10-19");
    assert!(placed.iter().all(|t| t["scheduled"] == true));
    assert!(stderr.contains("unplaced: big"));
}

#[test]
fn test_schedule_run_table() {
    let home = tempfile::tempdir().unwrap();
    let tasks = write_tasks(home.path());
    let (code, stdout, _) = run_cli(
        home.path(),
        &["schedule", "run", "--tasks", &tasks, "--today", "2026-10-19"],
    );
    assert_eq!(code, 0);
    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.lines().all(|l| l.starts_with("2026-10-19")));
}

#[test]
fn test_schedule_run_custom_range_needs_both_bounds() {
    let home = tempfile::tempdir().unwrap();
    let tasks = write_tasks(home.path());
    let (code, _, stderr) = run_cli(
        home.path(),
        &["schedule", "run", "--tasks", &tasks, "--from", "2026-10-19"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_schedule_run_rejects_bad_policy_file() {
    let home = tempfile::tempdir().unwrap();
    let tasks = write_tasks(home.path());
    let policy = home.path().join("policy.json");
    std::fs::write(&policy, r#"{ "timeSlotInterval": 0 }"#).unwrap();
    let (code, _, stderr) = run_cli(
        home.path(),
        &[
            "schedule",
            "run",
            "--tasks",
            &tasks,
            "--policy",
            &policy.to_string_lossy(),
            "--today",
            "2026-10-19",
        ],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("timeSlotInterval"));
}

#[test]
fn test_schedule_validate_reports_overlap() {
    let home = tempfile::tempdir().unwrap();
    let schedule = home.path().join("schedule.json");
    std::fs::write(
        &schedule,
        r#"[
            { "id": "a", "title": "A", "scheduled": true, "date": "2026-10-19",
              "startTime": "09:00", "endTime": "10:00", "duration": 60 },
            { "id": "b", "title": "B", "scheduled": true, "date": "2026-10-19",
              "startTime": "09:30", "endTime": "10:30", "duration": 60 }
        ]"#,
    )
    .unwrap();
    let (code, stdout, _) = run_cli(
        home.path(),
        &[
            "schedule",
            "validate",
            "--schedule",
            &schedule.to_string_lossy(),
            "--from",
            "2026-10-19",
            "--to",
            "2026-10-23",
        ],
    );
    assert_ne!(code, 0);
    assert!(stdout.contains("overlap"));
}

#[test]
fn test_config_set_get_roundtrip() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(home.path(), &["config", "set", "policy.maxTasksPerDay", "3"]);
    assert_eq!(code, 0);

    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "policy.maxTasksPerDay"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "3");

    let config = std::fs::read_to_string(home.path().join(".config/taskplan/config.toml")).unwrap();
    assert!(config.contains("maxTasksPerDay = 3"));

    let (code, _, _) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "policy.maxTasksPerDay"]);
    assert_eq!(stdout.trim(), "6");
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["config", "get", "policy.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_policy_show_applies_config() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["config", "set", "policy.taskSelectionMode", "reschedule"]);
    let (code, stdout, _) = run_cli(home.path(), &["policy", "show"]);
    assert_eq!(code, 0);
    let policy: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(policy["taskSelectionMode"], "reschedule");
    assert_eq!(policy["maxTasksPerDay"], 6);
}

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("taskplan"));
}
