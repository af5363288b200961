//! End-to-end tests for the jsonpipe binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use tempfile::tempdir;

const OFFICES: &str = "{\"id\": \"A\", \"name\": \"Office_A\", \"description\": \"Office\"}\n\
{\"id\": \"B\", \"name\": \"Office_1\", \"description\": \"Office\"}\n\
{\"id\": \"A\", \"name\": \"Office_2\", \"description\": \"Office\"}\n";

fn jsonpipe() -> Command {
    let mut cmd = Command::cargo_bin("jsonpipe").unwrap();
    cmd.env_remove("JSONPIPE_PRESETS")
        .env_remove("JSONPIPE_MODULES")
        .env_remove("RUST_LOG");
    cmd
}

fn lines(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn filter_regex_from_stdin() {
    let output = jsonpipe()
        .args(["filter_regex", "-f", "name", "-r", r"office_\d+", "--regex-flags", "I"])
        .write_stdin(OFFICES)
        .output()
        .unwrap();

    assert!(output.status.success());
    let names: Vec<_> = lines(&output.stdout)
        .iter()
        .map(|r| r["name"].clone())
        .collect();
    assert_eq!(names, [json!("Office_1"), json!("Office_2")]);
}

#[test]
fn template_between_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("in.jsonl");
    let output = dir.path().join("out").join("result.jsonl");
    fs::write(&input, OFFICES)?;

    jsonpipe()
        .args(["template", "-f", "{description}_{id}", "-t", "label"])
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let records = lines(&fs::read(&output)?);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["label"], json!("Office_A"));
    assert_eq!(records[1]["label"], json!("Office_B"));
    Ok(())
}

#[test]
fn preset_from_presets_env() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let presets = dir.path().join("presets.json");
    fs::write(
        &presets,
        json!({
            "clean": [
                {"operation": "dedupe", "field": "id"},
                {"operation": "remove_fields", "field": "description"}
            ]
        })
        .to_string(),
    )?;

    let output = jsonpipe()
        .args(["preset", "-t", "clean"])
        .env("JSONPIPE_PRESETS", &presets)
        .write_stdin(OFFICES)
        .output()?;

    assert!(output.status.success());
    assert_eq!(
        lines(&output.stdout),
        [
            json!({"id": "A", "name": "Office_A"}),
            json!({"id": "B", "name": "Office_1"})
        ]
    );
    Ok(())
}

#[test]
fn preset_from_module_directory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("presets"))?;
    fs::write(
        dir.path().join("presets").join("offices.json"),
        json!({"pipeline": {"normalize": [{"operation": "plaintext", "field": "name"}]}})
            .to_string(),
    )?;

    let output = jsonpipe()
        .args(["preset", "-p", "normalize", "--pipeline", "presets.offices.pipeline"])
        .arg("--modules")
        .arg(dir.path())
        .write_stdin("{\"name\": \"Office A\"}\n")
        .output()?;

    assert!(output.status.success());
    assert_eq!(lines(&output.stdout), [json!({"name": "office_a"})]);
    Ok(())
}

#[test]
fn missing_operation_is_usage_error() {
    jsonpipe()
        .write_stdin(OFFICES)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn missing_required_argument_fails() {
    jsonpipe()
        .args(["rename_field", "-f", "name"])
        .write_stdin(OFFICES)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("target"));
}

#[test]
fn preset_without_pipeline_fails() {
    jsonpipe()
        .args(["preset", "-t", "clean"])
        .write_stdin(OFFICES)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("A pipeline must be defined"));
}

#[test]
fn malformed_line_stops_after_earlier_output() {
    let output = jsonpipe()
        .args(["fixed_value", "-f", "source", "-t", "import"])
        .write_stdin("{\"id\": 1}\nnot json\n{\"id\": 2}\n")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        lines(&output.stdout),
        [json!({"id": 1, "source": "import"})]
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 2"));
}

#[test]
fn irrelevant_option_is_warned_and_ignored() {
    let output = jsonpipe()
        .args(["dedupe", "-f", "id", "-r", "unused"])
        .write_stdin(OFFICES)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(lines(&output.stdout).len(), 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("regex"));
}
