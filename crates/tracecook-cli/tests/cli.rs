use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn cooks_a_single_record_file_and_reports_a_summary() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    write!(
        input,
        r#"{{"id": "r1", "timestamp": "2024-01-01T00:00:00Z", "request": {{"model": "gpt-4", "messages": [{{"role": "user", "content": "hi"}}]}}, "response": {{"choices": [{{"message": {{"role": "assistant", "content": "hello"}}}}]}}}}"#
    )
    .unwrap();
    let output = tempfile::NamedTempFile::new().unwrap();

    Command::cargo_bin("tracecook")
        .unwrap()
        .arg(input.path())
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 1 records"))
        .stdout(predicate::str::contains("2 messages"))
        .stdout(predicate::str::contains("1 requests"));

    let written = std::fs::read_to_string(output.path()).unwrap();
    assert!(written.contains("\"messages\""));
    assert!(written.contains("\"tools\""));
    assert!(written.contains("\"requests\""));
}

#[test]
fn missing_input_file_exits_nonzero_with_error() {
    let output = tempfile::NamedTempFile::new().unwrap();

    Command::cargo_bin("tracecook")
        .unwrap()
        .arg("/nonexistent/path/does-not-exist.json")
        .arg(output.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn accepts_an_explicit_format_hint() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    write!(
        input,
        r#"{{"id": "r1", "timestamp": "2024-01-01T00:00:00Z", "request": {{"model": "claude-3", "messages": []}}, "response": null}}"#
    )
    .unwrap();
    let output = tempfile::NamedTempFile::new().unwrap();

    Command::cargo_bin("tracecook")
        .unwrap()
        .arg(input.path())
        .arg(output.path())
        .arg("--format")
        .arg("claude")
        .assert()
        .success();
}
