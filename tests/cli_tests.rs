//! Integration tests for the pyshape CLI
//!
//! These drive the binary end to end: one JSON request on stdin, one JSON
//! response on stdout, or a failure message on stderr with exit status 1.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

/// Test helper to get the CLI binary
fn pyshape_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pyshape").unwrap();
    cmd.env_remove("PYSHAPE_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn request(code: &str, mode: Option<&str>) -> String {
    let mut value = serde_json::json!({ "code": code });
    if let Some(mode) = mode {
        value["mode"] = mode.into();
    }
    format!("{value}\n")
}

#[test]
fn test_simple_mode_example() {
    pyshape_cmd()
        .write_stdin(request("x = 1\ny = True", Some("simple")))
        .assert()
        .success()
        .stdout(r#"{"lines":{"1":["Assign","Int"],"2":["Assign","True"]}}"#.to_owned() + "\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_mode_defaults_to_simple() {
    pyshape_cmd()
        .write_stdin(request("x = 1", None))
        .assert()
        .success()
        .stdout(r#"{"lines":{"1":["Assign","Int"]}}"#.to_owned() + "\n");
}

#[test]
fn test_complex_mode_example() {
    let expected = r#"{"lines":{"1":[{"name":"If","startLine":1,"endLine":2}],"2":[{"name":"Assign","startLine":2},{"name":"Int","startLine":2}]}}"#;
    pyshape_cmd()
        .write_stdin(request("if x:\n    y = 1", Some("complex")))
        .assert()
        .success()
        .stdout(expected.to_owned() + "\n");
}

#[test]
fn test_hierarchical_mode() {
    let expected = r#"{"name":"root","children":[{"name":"While","startLine":1,"endLine":2,"children":[{"name":"True","startLine":1,"children":[]},{"name":"Break","startLine":2,"children":[]}]}]}"#;
    pyshape_cmd()
        .write_stdin(request("while True:\n    break\n", Some("hierarchical")))
        .assert()
        .success()
        .stdout(expected.to_owned() + "\n");
}

#[test]
fn test_concepts_mode() {
    pyshape_cmd()
        .write_stdin(request("x = 1\ny = 2\nz = x < y", Some("concepts")))
        .assert()
        .success()
        .stdout("[\"Assign\",\"Int\",\"Lt\"]\n");
}

#[test]
fn test_empty_code_in_every_mode() {
    let expected = [
        ("simple", r#"{"lines":{}}"#),
        ("complex", r#"{"lines":{}}"#),
        ("hierarchical", r#"{"name":"root","children":[]}"#),
        ("concepts", "[]"),
    ];
    for (mode, output) in expected {
        pyshape_cmd()
            .write_stdin(request("", Some(mode)))
            .assert()
            .success()
            .stdout(output.to_owned() + "\n");
    }
}

#[test]
fn test_syntax_error_fails_without_output() {
    for mode in ["simple", "complex", "hierarchical", "concepts"] {
        pyshape_cmd()
            .write_stdin(request("def f(:", Some(mode)))
            .assert()
            .failure()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::starts_with(
                "Parsing failed!\n\nError occurred: invalid syntax",
            ));
    }
}

#[test]
fn test_deleting_a_call_fails_with_cpython_message() {
    pyshape_cmd()
        .write_stdin(request("del f()", Some("complex")))
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(
            "Parsing failed!\n\nError occurred: cannot delete function call (<unknown>, line 1)\n",
        );
}

#[test]
fn test_unknown_mode_fails() {
    pyshape_cmd()
        .write_stdin(request("x = 1", Some("tree")))
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr("Parsing failed!\n\nError occurred: Unknown parsing mode\n");
}

#[test]
fn test_missing_code_fails() {
    pyshape_cmd()
        .write_stdin("{\"mode\": \"simple\"}\n")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid request"));
}

#[test]
fn test_empty_stdin_fails() {
    pyshape_cmd()
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Parsing failed!"));
}

#[test]
fn test_pretty_flag() {
    pyshape_cmd()
        .arg("--pretty")
        .write_stdin(request("pass", Some("concepts")))
        .assert()
        .success()
        .stdout("[\n  \"Pass\"\n]\n");
}

#[test]
fn test_config_file_sets_default_mode() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("pyshape.yml");
    fs::write(&config_path, "default_mode: concepts\n").unwrap();

    pyshape_cmd()
        .arg("--config")
        .arg(&config_path)
        .write_stdin(request("pass", None))
        .assert()
        .success()
        .stdout("[\"Pass\"]\n");
}

#[test]
fn test_config_from_environment() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("pyshape.yml");
    fs::write(&config_path, "default_mode: concepts\n").unwrap();

    pyshape_cmd()
        .env("PYSHAPE_CONFIG", &config_path)
        .write_stdin(request("pass", None))
        .assert()
        .success()
        .stdout("[\"Pass\"]\n");
}

#[test]
fn test_default_mode_flag_overrides_config_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("pyshape.yml");
    fs::write(&config_path, "default_mode: concepts\n").unwrap();

    pyshape_cmd()
        .arg("--config")
        .arg(&config_path)
        .args(["--default-mode", "simple"])
        .write_stdin(request("pass", None))
        .assert()
        .success()
        .stdout("{\"lines\":{\"1\":[\"Pass\"]}}\n");
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("pyshape.yml");
    fs::write(&config_path, "max_source_bytes: 0\n").unwrap();

    pyshape_cmd()
        .arg("--config")
        .arg(&config_path)
        .write_stdin(request("pass", None))
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_source_bytes"));
}

#[test]
fn test_source_limit_from_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("pyshape.yml");
    fs::write(&config_path, "max_source_bytes: 4\n").unwrap();

    pyshape_cmd()
        .arg("--config")
        .arg(&config_path)
        .write_stdin(request("x = 1000", None))
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Validation error"));
}

#[test]
fn test_analyze_file() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("script.py");
    fs::write(&source, "if x:\n    y = 1\n").unwrap();

    pyshape_cmd()
        .arg("analyze")
        .arg(&source)
        .args(["--mode", "complex"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"name":"If","startLine":1,"endLine":2}"#,
        ));
}

#[test]
fn test_analyze_file_with_syntax_error() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("broken.py");
    fs::write(&source, "def f(:\n").unwrap();

    pyshape_cmd()
        .arg("analyze")
        .arg(&source)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("Parsing failed!"));
}

#[test]
fn test_analyze_missing_file() {
    pyshape_cmd()
        .args(["analyze", "/nonexistent/script.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read source file"));
}

#[test]
fn test_print_default_config() {
    pyshape_cmd()
        .arg("print-default-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("default_mode: simple"))
        .stdout(predicate::str::contains("pretty: false"));
}

#[test]
fn test_list_kinds() {
    pyshape_cmd()
        .arg("list-kinds")
        .assert()
        .success()
        .stdout(predicate::str::contains("Subscript"))
        .stdout(predicate::str::contains("NameConstant"));
}

#[test]
fn test_verbose_logs_go_to_stderr() {
    pyshape_cmd()
        .arg("--verbose")
        .write_stdin(request("pass", Some("concepts")))
        .assert()
        .success()
        .stdout("[\"Pass\"]\n")
        .stderr(predicate::str::contains("request received"));
}
