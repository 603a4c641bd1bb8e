#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_adds_both_kinds_of_position() {
    run_cli("add range 1 red 2025-01-06 2025-01-10\nadd offset 2 blue 5 3\nshow\nquit\n")
        .success()
        .stdout(str_contains("2025-01-06T00:00:00Z"))
        .stdout(str_contains("| 2  | blue"));
}

#[test]
fn cli_reports_validation_errors() {
    run_cli("add offset 1 red 0 -2\nquit\n")
        .success()
        .stdout(str_contains("invalid duration"));
}

#[test]
fn cli_delete_command_removes_position() {
    run_cli("add offset 1 red 0 1\nadd offset 2 red 1 1\ndelete 2\nquit\n")
        .success()
        .stdout(str_contains("Deleted position 2."));
}

#[test]
fn cli_describes_directions() {
    run_cli("direction 1\ndirection right\ndirection 9\nquit\n")
        .success()
        .stdout(str_contains("direction=left code=1 opposite=right"))
        .stdout(str_contains("direction=right code=2 opposite=left"))
        .stdout(str_contains("invalid direction code 9"));
}

#[test]
fn cli_new_reports_exhausted_id_space() {
    run_cli("add offset 2147483647 red 0 1\nnew\nshow\nquit\n")
        .success()
        .stdout(str_contains("id space exhausted"))
        .stdout(str_contains("2147483647"));
}

#[test]
fn cli_exits_cleanly_on_end_of_input() {
    run_cli("add offset 1 red 0 1\n").success();
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().to_string();
    let script = format!(
        "add offset 1 persisted 4 2\nsave json {}\nadd offset 2 temporary 1 1\nload json {}\nshow\nquit\n",
        path, path
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(
        output.contains("Timeline loaded from"),
        "expected output to mention load completion"
    );
    let after_reload = output
        .split("Timeline loaded from")
        .last()
        .unwrap_or_default();
    assert!(
        after_reload.contains("persisted"),
        "persisted position should remain:\n{}",
        after_reload
    );
    assert!(
        !after_reload.contains("temporary"),
        "temporary position should not appear after reload:\n{}",
        after_reload
    );
}
