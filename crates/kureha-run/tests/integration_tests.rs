use assert_cmd::cargo;
use rstest::rstest;
use scopeguard::defer;
use std::io::Write;
use std::{fs::File, path::PathBuf};

const HELLO: &str = r#"{
  "program": {"expr": {"Program": [
    {"expr": {"Def": {
      "receiver": null,
      "name": "hello",
      "params": null,
      "body": {"statements": [
        {"expr": {"Call": {"name": "puts", "args": [{"expr": {"String": "Hello, World!"}}]}}}
      ]}
    }}}
  ]}}
}"#;

const TWO_CALLS: &str = r#"{
  "program": {"expr": {"Program": [
    {"expr": {"Call": {"name": "setup", "variable_call": true}}},
    {"expr": {"Comment": " run it"}},
    {"expr": {"Call": {"name": "puts", "args": [{"expr": {"String": "x"}}]}}}
  ]}}
}"#;

pub fn create_file(name: &str, content: &str) -> (PathBuf, PathBuf) {
    let temp_dir = std::env::temp_dir();
    let temp_file_path = temp_dir.join(name);
    let mut file = File::create(&temp_file_path).expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");

    (temp_dir, temp_file_path)
}

#[test]
fn test_cli_run_with_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = cargo::cargo_bin_cmd!("kureha");

    let assert = cmd.write_stdin(HELLO).assert();
    assert
        .success()
        .code(0)
        .stdout("def hello;puts\"Hello, World!\";end\n");

    Ok(())
}

#[rstest]
#[case::defaults(vec![], "setup;puts\"x\"\n")]
#[case::no_separators(vec!["--no-separators"], "setup\nputs\"x\"\n")]
#[case::keep_comments(vec!["--keep-comments"], "setup# run it\nputs\"x\"\n")]
#[case::space_after_keywords(vec!["--space-after-keywords"], "setup;puts \"x\"\n")]
fn test_cli_render_options(
    #[case] args: Vec<&str>,
    #[case] expected_output: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = cargo::cargo_bin_cmd!("kureha");

    let assert = cmd.args(args).write_stdin(TWO_CALLS).assert();
    assert.success().code(0).stdout(expected_output.to_owned());

    Ok(())
}

#[test]
fn test_cli_run_with_bare_tree() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = cargo::cargo_bin_cmd!("kureha");

    let assert = cmd
        .write_stdin(r#"{"expr": {"Return": [{"expr": {"Hash": []}}]}}"#)
        .assert();
    assert.success().code(0).stdout("return({})\n");

    Ok(())
}

#[test]
fn test_cli_run_with_file() -> Result<(), Box<dyn std::error::Error>> {
    let (_, temp_file_path) = create_file("kureha_hello.json", HELLO);
    let temp_file_path_clone = temp_file_path.clone();

    defer! {
        if temp_file_path_clone.exists() {
            std::fs::remove_file(&temp_file_path_clone).expect("Failed to delete temp file");
        }
    }

    let mut cmd = cargo::cargo_bin_cmd!("kureha");

    let assert = cmd.arg(temp_file_path.to_string_lossy().to_string()).assert();
    assert
        .success()
        .code(0)
        .stdout("def hello;puts\"Hello, World!\";end\n");

    Ok(())
}

#[test]
fn test_cli_output_dir() -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = tempfile::tempdir()?;
    let output_dir = tempfile::tempdir()?;
    let input = input_dir.path().join("app.json");
    std::fs::write(&input, HELLO)?;

    let mut cmd = cargo::cargo_bin_cmd!("kureha");

    let assert = cmd
        .arg("-o")
        .arg(output_dir.path())
        .arg(&input)
        .assert();
    assert.success().code(0).stdout("");

    assert_eq!(
        std::fs::read_to_string(output_dir.path().join("app.rb"))?,
        "def hello;puts\"Hello, World!\";end\n"
    );

    Ok(())
}

#[test]
fn test_cli_check_fails_on_unsupported_construct() -> Result<(), Box<dyn std::error::Error>> {
    let (_, temp_file_path) = create_file(
        "kureha_unsupported.json",
        r#"{"program": {"expr": {"Program": [
          {"range": {"start": {"line": 2, "column": 3}, "end": {"line": 2, "column": 9}},
           "expr": {"Unsupported": {"kind": "pattern_match"}}}
        ]}}}"#,
    );
    let temp_file_path_clone = temp_file_path.clone();

    defer! {
        if temp_file_path_clone.exists() {
            std::fs::remove_file(&temp_file_path_clone).expect("Failed to delete temp file");
        }
    }

    let mut cmd = cargo::cargo_bin_cmd!("kureha");

    let assert = cmd
        .arg("--check")
        .arg(temp_file_path.to_string_lossy().to_string())
        .assert();
    let output = assert.failure().get_output().stdout.clone();
    let output = String::from_utf8(output)?;

    assert!(output.contains("kureha_unsupported.json"));
    assert!(output.contains("Unsupported construct `pattern_match` at line 2, column 3"));

    Ok(())
}

#[test]
fn test_cli_fails_on_syntax_errors() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = cargo::cargo_bin_cmd!("kureha");

    let assert = cmd
        .write_stdin(
            r#"{
  "program": {"expr": {"Program": []}},
  "errors": [{
    "message": "unexpected end-of-input",
    "range": {"start": {"line": 3, "column": 1}, "end": {"line": 3, "column": 4}}
  }]
}"#,
        )
        .assert();
    assert.failure().stdout("");

    Ok(())
}

#[test]
fn test_cli_fails_on_invalid_json() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = cargo::cargo_bin_cmd!("kureha");

    let assert = cmd.write_stdin("puts 1").assert();
    assert.failure();

    Ok(())
}

#[test]
fn test_cli_reports_unknown_node_kind() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = cargo::cargo_bin_cmd!("kureha");

    let assert = cmd
        .write_stdin(r#"{"program": {"expr": {"Program": [{"expr": {"FlipFlop": {}}}]}}}"#)
        .assert();
    let stderr = String::from_utf8(assert.failure().stdout("").get_output().stderr.clone())?;

    assert!(stderr.contains("Unsupported construct `FlipFlop`"));

    Ok(())
}
