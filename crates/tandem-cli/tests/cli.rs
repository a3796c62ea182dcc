use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tandem(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tandem").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    tandem(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("compile"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_missing_source_file() {
    let temp = TempDir::new().unwrap();
    tandem(&temp)
        .args(["compile", "Missing.java"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read source file"));
}

#[test]
fn test_library_url_is_required() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("Hello.java"), "public class Hello {}").unwrap();

    tandem(&temp)
        .args(["--base-dir", "fs", "compile", "Hello.java"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("library_url is not set"));
}

#[test]
fn test_malformed_config_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("tandem.json"), "{ nope").unwrap();

    tandem(&temp)
        .arg("provision")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[cfg(unix)]
#[test]
fn test_provision_reports_missing_runtime_archive() {
    let temp = TempDir::new().unwrap();
    let config = config_json(&temp);
    fs::write(temp.path().join("custom.json"), config).unwrap();

    tandem(&temp)
        .args(["--config", "custom.json", "provision"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-runtime.zip"));
}

/// Config with explicit tool paths so no PATH lookup is needed.
fn config_json(temp: &TempDir) -> String {
    format!(
        r#"{{
            "base_dir": "{base}",
            "runtime_archive": "{base}/no-such-runtime.zip",
            "library_url": "http://127.0.0.1:9/teavm-classlib.zip",
            "compiler": {{ "program": "/bin/sh" }},
            "engine": {{ "program": "/bin/sh" }}
        }}"#,
        base = temp.path().join("fs").display()
    )
}
