//! Corruption recovery tests for the coach binary.
//!
//! These tests verify the system can handle:
//! - Corrupted state files
//! - Corrupted journal lines
//! - Missing files
//! - Partial writes

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;
use tempfile::TempDir;

const TODAY: &str = "2024-03-06";

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("coach"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let output = cli()
        .args(args)
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--today")
        .arg(TODAY)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8_lossy(&output).into_owned()
}

fn add_goal(data_dir: &Path) {
    run_ok(
        data_dir,
        &[
            "goal",
            "add",
            "--name",
            "Sparring",
            "--work-types",
            "footwork,focus",
            "--start",
            "2024-01-01",
        ],
    );
}

#[test]
fn test_corrupted_state_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::write(data_dir.join("state.json"), "{ invalid json }}}}")
        .expect("Failed to write corrupted state");

    // A corrupted state is treated as empty, so init reseeds it
    let out = run_ok(&data_dir, &["init"]);
    assert!(out.contains("Seeded 8 work types"));

    run_ok(&data_dir, &["progress"]);
}

#[test]
fn test_corrupted_journal_ignored_during_read() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    run_ok(&data_dir, &["init"]);
    add_goal(&data_dir);

    fs::create_dir_all(data_dir.join("journal")).unwrap();
    fs::write(
        data_dir.join("journal/completions.jsonl"),
        "{ invalid json }\n{ more invalid }\n",
    )
    .expect("Failed to write corrupted journal");

    let out = run_ok(&data_dir, &["progress"]);
    assert!(out.contains("0.0%"), "stdout: {}", out);

    // Appending after the garbage still works and is counted
    run_ok(&data_dir, &["complete", "focus"]);
    let out = run_ok(&data_dir, &["progress"]);
    assert!(out.contains("50.0%"), "stdout: {}", out);
}

#[test]
fn test_partial_journal_line() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    run_ok(&data_dir, &["init"]);
    add_goal(&data_dir);
    run_ok(&data_dir, &["complete", "footwork"]);

    // Simulate a crash mid-write
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(data_dir.join("journal/completions.jsonl"))
        .unwrap();
    write!(file, "{{\"id\":\"1234\",\"work_ty").unwrap();
    drop(file);

    let out = run_ok(&data_dir, &["progress"]);
    assert!(out.contains("50.0%"), "stdout: {}", out);
}

#[test]
fn test_empty_files() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(data_dir.join("journal")).unwrap();
    fs::write(data_dir.join("state.json"), "").unwrap();
    fs::write(data_dir.join("journal/completions.jsonl"), "").unwrap();
    fs::write(data_dir.join("completions.csv"), "").unwrap();

    run_ok(&data_dir, &["init"]);
    let out = run_ok(&data_dir, &["progress"]);
    assert!(out.contains("No goals."));
}

#[test]
fn test_rollup_skips_bad_journal_lines() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    run_ok(&data_dir, &["init"]);
    run_ok(&data_dir, &["complete", "focus"]);

    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(data_dir.join("journal/completions.jsonl"))
        .unwrap();
    writeln!(file, "not json at all").unwrap();
    drop(file);

    run_ok(&data_dir, &["complete", "footwork"]);

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 2 completions"));
}

#[test]
fn test_state_manual_recovery() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    run_ok(&data_dir, &["init"]);
    add_goal(&data_dir);

    // Operator deletes a damaged state file; the journal survives
    run_ok(&data_dir, &["complete", "focus"]);
    fs::remove_file(data_dir.join("state.json")).unwrap();

    let out = run_ok(&data_dir, &["goal", "list"]);
    assert!(out.contains("No goals."));

    run_ok(&data_dir, &["init"]);
    add_goal(&data_dir);
    let out = run_ok(&data_dir, &["progress"]);
    assert!(out.contains("50.0%"), "stdout: {}", out);
}

fn new_week(data_dir: &Path) -> String {
    let out = run_ok(
        data_dir,
        &["week", "new", "--name", "Camp", "--start", "2024-03-04"],
    );
    out.lines()
        .find_map(|l| l.trim().strip_prefix("id: "))
        .expect("no week id printed")
        .trim()
        .to_string()
}

#[test]
fn test_hand_edited_short_week_fails_cleanly() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    run_ok(&data_dir, &["init"]);
    let week_id = new_week(&data_dir);

    // Drop the last four days from the stored week
    let state_path = data_dir.join("state.json");
    let mut state: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&state_path).unwrap()).unwrap();
    state["week_plans"][0]["days"]
        .as_array_mut()
        .unwrap()
        .truncate(3);
    fs::write(&state_path, serde_json::to_string_pretty(&state).unwrap()).unwrap();

    cli()
        .args(["week", "assign", "--week", &week_id, "--day", "5"])
        .args(["--work-type", "focus"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("has no day 5"));

    // Days that do exist can still be assigned
    run_ok(
        &data_dir,
        &["week", "assign", "--week", &week_id, "--day", "1", "--work-type", "focus"],
    );
}

#[test]
fn test_week_balance_ignores_unreadable_journal() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    run_ok(&data_dir, &["init"]);
    let week_id = new_week(&data_dir);

    // A directory where the journal file should be cannot be read
    fs::create_dir_all(data_dir.join("journal/completions.jsonl")).unwrap();

    cli()
        .arg("progress")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure();

    let out = run_ok(&data_dir, &["week", "balance", &week_id]);
    assert!(out.contains("No physical work is scheduled this week"), "stdout: {}", out);
}
