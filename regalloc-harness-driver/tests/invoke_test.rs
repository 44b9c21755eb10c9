// SPDX-License-Identifier: Apache-2.0

#![cfg(unix)]

use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use regalloc_harness_test_helpers::{HarnessFixture, SUM_PROGRAM};
use test_case::test_case;

fn run_driver(fixture: &HarnessFixture, args: &[&str]) -> Output {
    let config_path = fixture.write_config_toml();
    let command_path = env!("CARGO_BIN_EXE_regalloc-harness-driver");
    Command::new(command_path)
        .current_dir(fixture.root())
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .arg("--config")
        .arg(config_path)
        .args(args)
        .output()
        .expect("Failed to run regalloc-harness-driver")
}

fn add_sum_suite(fixture: &HarnessFixture, name: &str, expected: &str) {
    let ir_name = format!("{}.ir", name);
    fixture.add_suite(
        name,
        &[
            (ir_name.as_str(), SUM_PROGRAM),
            ("t1.in", "2\n3\n"),
            ("t1.out", expected),
        ],
    );
}

#[test]
fn test_all_correct_exits_zero() {
    let _ = env_logger::builder().is_test(true).try_init();
    let fixture = HarnessFixture::new();
    add_sum_suite(&fixture, "add", "5\n");
    let output = run_driver(&fixture, &[]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );
    let input = fixture.test_dir().join("add").join("t1.in");
    assert!(stdout.contains("Running test add"));
    assert!(stdout.contains(&format!("Correct: {}, naive (3 writes)", input.display())));
    assert!(stdout.contains(&format!("Correct: {}, greedy (1 writes)", input.display())));
    assert!(stdout.contains("1 suite(s) run, 1 passed, 0 failed"));
}

#[test]
fn test_incorrect_case_exits_nonzero() {
    let _ = env_logger::builder().is_test(true).try_init();
    let fixture = HarnessFixture::new();
    add_sum_suite(&fixture, "add", "6\n");
    let output = run_driver(&fixture, &[]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Incorrect: "));
    assert!(stdout.contains("Failed: add"));
    assert!(fixture
        .read_log("add")
        .unwrap()
        .contains("Expected:\n6\nGot:\n5\n"));
}

#[test]
fn test_build_failure_is_reported_and_fails_run() {
    let _ = env_logger::builder().is_test(true).try_init();
    let fixture = HarnessFixture::new();
    fixture.fail_builds_for(&["--greedy"]);
    add_sum_suite(&fixture, "add", "5\n");
    let output = run_driver(&fixture, &[]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Error: add (greedy) failed to compile"));
    assert!(!stdout.contains("Correct:"));
    assert_eq!(fixture.read_log("add"), None);
}

#[test]
fn test_invalid_suite_is_skipped_without_failing() {
    let _ = env_logger::builder().is_test(true).try_init();
    let fixture = HarnessFixture::new();
    add_sum_suite(&fixture, "add", "5\n");
    fixture.add_suite("broken", &[("a.ir", ""), ("b.ir", "")]);
    let output = run_driver(&fixture, &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Error: broken has 2 ir files"));
    assert!(!stdout.contains("Running test broken"));
}

#[test_case(&["add"], true, false; "select_add")]
#[test_case(&["mul"], false, true; "select_mul")]
#[test_case(&[], true, true; "select_all")]
fn test_suite_selection(args: &[&str], runs_add: bool, runs_mul: bool) {
    let _ = env_logger::builder().is_test(true).try_init();
    let fixture = HarnessFixture::new();
    add_sum_suite(&fixture, "add", "5\n");
    add_sum_suite(&fixture, "mul", "5\n");
    let output = run_driver(&fixture, args);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.contains("Running test add"), runs_add);
    assert_eq!(stdout.contains("Running test mul"), runs_mul);
}

#[test]
fn test_build_flag_runs_project_build_first() {
    let _ = env_logger::builder().is_test(true).try_init();
    let fixture = HarnessFixture::new();
    add_sum_suite(&fixture, "add", "5\n");
    assert!(!fixture.build_marker().exists());
    let output = run_driver(&fixture, &["--build"]);
    assert!(output.status.success());
    assert!(fixture.build_marker().exists());
}

#[test]
fn test_missing_config_file_is_reported() {
    let _ = env_logger::builder().is_test(true).try_init();
    let fixture = HarnessFixture::new();
    let output = Command::new(env!("CARGO_BIN_EXE_regalloc-harness-driver"))
        .current_dir(fixture.root())
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg("does-not-exist.toml")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("config file does not exist"));
}

#[test]
fn test_missing_simulator_is_reported() {
    let _ = env_logger::builder().is_test(true).try_init();
    let fixture = HarnessFixture::new();
    add_sum_suite(&fixture, "add", "5\n");
    let output = run_driver(&fixture, &["--simulator", "definitely-not-spim"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("simulator `definitely-not-spim` not found"));
}

#[test]
fn test_config_in_working_directory_is_picked_up() {
    let _ = env_logger::builder().is_test(true).try_init();
    let fixture = HarnessFixture::new();
    add_sum_suite(&fixture, "add", "5\n");
    fixture.write_config_toml();
    let output = Command::new(env!("CARGO_BIN_EXE_regalloc-harness-driver"))
        .current_dir(fixture.root())
        .env("NO_COLOR", "1")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Running test add"));
}

#[test]
fn test_repeated_strategy_in_config_is_rejected() {
    let _ = env_logger::builder().is_test(true).try_init();
    let fixture = HarnessFixture::new();
    add_sum_suite(&fixture, "add", "5\n");
    let config_path = fixture.write_config_toml();
    let mut contents = std::fs::read_to_string(&config_path).unwrap();
    contents.push_str("strategies = [\"naive\", \"naive\"]\n");
    std::fs::write(&config_path, contents).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_regalloc-harness-driver"))
        .current_dir(fixture.root())
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(&config_path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("strategies must not repeat"));
    assert!(!fixture.log_dir().join("add_naive.s").exists());
}
