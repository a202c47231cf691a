use predicates::prelude::*;
use std::fs;

use crate::common::TestProject;

const REGISTRY: &str = "http://127.0.0.1:9";

#[test]
fn test_config_saves_api_key() {
    let project = TestProject::new();

    project
        .cmd(REGISTRY)
        .args(["config", "--api-key", "my-secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration saved"));

    let content = fs::read_to_string(project.config_path()).unwrap();
    assert!(content.contains("api_key = \"my-secret\""));
}

#[cfg(unix)]
#[test]
fn test_config_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let project = TestProject::new();
    project.cmd(REGISTRY).args(["config", "--api-key", "k"]).assert().success();

    let mode = fs::metadata(project.config_path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_config_replaces_existing_key() {
    let project = TestProject::with_api_key("old");

    project.cmd(REGISTRY).args(["config", "--api-key", "new"]).assert().success();

    let content = fs::read_to_string(project.config_path()).unwrap();
    assert!(content.contains("new"));
    assert!(!content.contains("old"));
}

#[test]
fn test_config_without_key_requires_terminal() {
    let project = TestProject::new();

    project
        .cmd(REGISTRY)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--api-key"));

    assert!(!project.config_path().exists());
}

#[test]
fn test_config_show_path() {
    let project = TestProject::new();

    project
        .cmd(REGISTRY)
        .args(["config", "--show-path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(project.config_path().to_str().unwrap()));
}
