#![cfg(feature = "cli")]

use assert_cmd::Command;
use chrono::NaiveDate;
use predicates::prelude::*;
use predicates::str::contains as str_contains;
use site_schedule::{Project, Task, save_project_to_json};
use std::fs;
use tempfile::TempDir;

fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cli"));
    cmd.current_dir(dir.path()).env_remove("SITE_SCHEDULE_LOG");
    cmd
}

#[test]
fn templates_lists_builtin_catalog() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .arg("templates")
        .assert()
        .success()
        .stdout(str_contains("kitchen-remodel"))
        .stdout(str_contains("deck-addition"));
}

#[test]
fn generate_prints_summary_and_saves_files() {
    let dir = TempDir::new().unwrap();
    let json = dir.path().join("deck.json");
    let csv = dir.path().join("deck.csv");
    cli(&dir)
        .args(["generate", "--template", "deck-addition", "--start", "2025-05-05"])
        .args(["--name", "Back deck"])
        .arg("--output")
        .arg(&json)
        .arg("--csv")
        .arg(&csv)
        .assert()
        .success()
        .stdout(str_contains("Foundation - Part 1"))
        .stdout(str_contains("finish=2025-05-21"))
        .stdout(str_contains("Project saved to"));
    assert!(json.exists());
    assert!(fs::read_to_string(&csv).unwrap().starts_with("id,name"));

    cli(&dir)
        .arg("analyze")
        .arg(&json)
        .assert()
        .success()
        .stdout(str_contains("Project: Back deck"))
        .stdout(str_contains("Critical path: 16 days"))
        .stdout(str_contains("No conflicts."))
        .stdout(str_contains("Progress: 0%"));
}

#[test]
fn analyze_fails_on_circular_dependency() {
    let dir = TempDir::new().unwrap();
    let start = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
    let mut project = Project::from_tasks(
        "Loop",
        start,
        vec![Task::new("a", "A", start, 1), Task::new("b", "B", start, 1).depends_on("a")],
    )
    .unwrap();
    project.tasks[0].add_dependency("b");
    let json = dir.path().join("loop.json");
    save_project_to_json(&project, &json).unwrap();

    cli(&dir)
        .arg("analyze")
        .arg(&json)
        .assert()
        .failure()
        .stderr(str_contains("circular dependency"));
}

#[test]
fn analyze_honours_configured_missing_dependency_policy() {
    let dir = TempDir::new().unwrap();
    let start = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
    let project = Project::from_tasks(
        "Dangling",
        start,
        vec![Task::new("a", "Frame", start, 2).depends_on("ghost")],
    )
    .unwrap();
    let json = dir.path().join("dangling.json");
    save_project_to_json(&project, &json).unwrap();

    cli(&dir)
        .arg("analyze")
        .arg(&json)
        .assert()
        .success()
        .stdout(str_contains("missing-dependency"));

    fs::write(
        dir.path().join("site-schedule.toml"),
        "[scheduling]\nmissing_dependencies = \"reject\"\n",
    )
    .unwrap();
    cli(&dir)
        .arg("analyze")
        .arg(&json)
        .assert()
        .failure()
        .stderr(str_contains("depends on unknown task ghost"));
}

#[test]
fn unknown_template_fails() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["generate", "--template", "igloo", "--start", "2025-05-05"])
        .assert()
        .failure()
        .stderr(str_contains("unknown template"));
}

#[test]
fn bad_start_date_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["generate", "--template", "deck-addition", "--start", "05/05/2025"])
        .assert()
        .failure()
        .stderr(str_contains("invalid date"));
}

#[test]
fn local_config_changes_chunk_size() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("site-schedule.toml"),
        "[scheduling]\nmax_subtask_days = 10\n",
    )
    .unwrap();
    cli(&dir)
        .args(["generate", "--template", "deck-addition", "--start", "2025-05-05"])
        .assert()
        .success()
        .stdout(str_contains("Framing - Part 1"))
        .stdout(str_contains("Framing - Part 2").not());
}
