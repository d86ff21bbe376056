//! CLI tests for the single-trial `planner` commands.
//!
//! Spawns the planner binary and checks stdout and exit codes.

use std::process::{Command, Output};

use planner::exit_codes;
use planner::io::config::{TaskConfig, load_config};

fn planner(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_planner"))
        .args(args)
        .output()
        .expect("run planner")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn classify_prints_outcome_label() {
    let output = planner(&["classify", "--start", "5", "--depth", "2", "right", "left"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "Aversive Pruning");

    let output = planner(&["classify", "--start", "5", "--depth", "2", "l", "l"]);
    assert_eq!(stdout(&output), "OLL Correct");
}

#[test]
fn classify_short_sequence_is_a_miss() {
    let output = planner(&["classify", "--start", "1", "--depth", "3", "left"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "Miss");
}

#[test]
fn classify_rejects_invalid_state() {
    let output = planner(&["classify", "--start", "7", "--depth", "1", "left"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("outside the task graph"), "{stderr}");
}

#[test]
fn enumerate_lists_every_candidate() {
    let output = planner(&["enumerate", "--start", "1", "--depth", "2"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "left,left rewards=140,-20 total=120 final=3");
}

#[test]
fn analyze_reads_schedule_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let schedule = temp.path().join("run1.schedule");
    std::fs::write(&schedule, "depth,start\n2,5\n3,3\n").expect("write schedule");

    let output = planner(&["analyze", schedule.to_str().expect("utf8 path")]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "trial=0 start=5 depth=2 best=70 optimal_paths=1 requires_large_loss=true second_best=0"
    );
    assert!(lines[1].contains("best=50"), "{}", lines[1]);
    assert!(lines[1].contains("second_best=-20"), "{}", lines[1]);
}

#[test]
fn close_trial_reports_compensation() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("missing.toml");
    let output = planner(&[
        "close-trial",
        "--trial-start",
        "0",
        "--now",
        "15.4",
        "--ideal-next-start",
        "15",
        "--config",
        config.to_str().expect("utf8 path"),
    ]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        stdout(&output),
        "elapsed=15.400 compensation_units=1 committed_end=16.000 ideal_next_start=16.000"
    );
}

#[test]
fn init_config_writes_defaults_and_refuses_overwrite() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("planner.toml");
    let path_arg = path.to_str().expect("utf8 path");

    let output = planner(&["init-config", path_arg]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(load_config(&path).expect("load"), TaskConfig::default());

    let output = planner(&["init-config", path_arg]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));

    let output = planner(&["init-config", "--force", path_arg]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
}

#[test]
fn analyze_reports_next_button_for_goal_rows() {
    let temp = tempfile::tempdir().expect("tempdir");
    let schedule = temp.path().join("goals.schedule");
    std::fs::write(&schedule, "depth,start,goal\n1,2,5\n1,1,6\n").expect("write schedule");

    let output = planner(&["analyze", schedule.to_str().expect("utf8 path")]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert!(
        lines[0].ends_with(" goal=5 next_button=right path_reward=-70"),
        "{}",
        lines[0]
    );
    assert!(
        lines[1].ends_with(" goal=6 next_button=NA path_reward=NA"),
        "{}",
        lines[1]
    );
}

#[test]
fn goal_checks_final_state_only() {
    let output = planner(&["goal", "--start", "1", "--goal", "3", "left", "left"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "reached");

    let output = planner(&["goal", "--start", "1", "--goal", "3", "right"]);
    assert_eq!(stdout(&output), "missed");
}

#[test]
fn path_test_compares_transition_reward() {
    let output = planner(&["path-test", "--start", "2", "--goal", "5", "--answer=-70"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "correct");

    let output = planner(&["path-test", "--start", "2", "--goal", "5", "--answer", "-20"]);
    assert_eq!(stdout(&output), "incorrect");

    let output = planner(&["path-test", "--start", "2", "--goal", "1", "--answer=20"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not one move from"), "{stderr}");
}
