use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;

use crate::common::{TestProject, manifest_json, serve_file, serve_manifest};

#[test]
fn test_add_without_config_fails_before_network() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.path_contains("/");
        then.status(200);
    });

    let project = TestProject::new();
    project
        .cmd(&server.base_url())
        .args(["add", "button", "-f", "vue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No configuration found"))
        .stderr(predicate::str::contains("bx-components config"));

    assert_eq!(any.hits(), 0);
}

#[test]
fn test_add_installs_dependencies_first() {
    let server = MockServer::start();
    serve_manifest(&server, "k", manifest_json("dialog", &[("vue", &["dialog/Dialog.vue"])], &["button"]));
    serve_manifest(&server, "k", manifest_json("button", &[("vue", &["button/Button.vue"])], &[]));
    serve_file(&server, "/vue/dialog/Dialog.vue", "<dialog/>");
    serve_file(&server, "/vue/button/Button.vue", "<button/>");

    let project = TestProject::with_api_key("k");
    let assert = project
        .cmd(&server.base_url())
        .args(["add", "dialog", "--framework", "vue"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let button = stdout.find("button").unwrap();
    let dialog = stdout.find("dialog").unwrap();
    assert!(button < dialog, "dependency should be reported first:\n{stdout}");

    assert_eq!(project.read_component_file("dialog/Dialog.vue"), "<dialog/>");
    assert_eq!(project.read_component_file("button/Button.vue"), "<button/>");
}

#[test]
fn test_add_requires_framework_when_not_interactive() {
    let project = TestProject::with_api_key("k");

    project
        .cmd("http://127.0.0.1:9")
        .args(["add", "button"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--framework"));
}

#[test]
fn test_add_unknown_framework_is_rejected() {
    let project = TestProject::with_api_key("k");

    project
        .cmd("http://127.0.0.1:9")
        .args(["add", "button", "-f", "svelte"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("svelte"));
}

#[test]
fn test_add_unknown_component_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ghost");
        then.status(404);
    });

    let project = TestProject::with_api_key("k");
    project
        .cmd(&server.base_url())
        .args(["add", "ghost", "-f", "vue"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Component 'ghost' not found"));

    assert!(!project.components_dir().exists());
}

#[test]
fn test_add_skips_component_without_framework_files() {
    let server = MockServer::start();
    serve_manifest(&server, "k", manifest_json("calendar", &[("vue", &["calendar/Calendar.vue"])], &[]));

    let project = TestProject::with_api_key("k");
    project
        .cmd(&server.base_url())
        .args(["add", "calendar", "-f", "angular"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no Angular files available"));

    assert!(!project.components_dir().join("calendar").exists());
}

#[test]
fn test_add_keeps_existing_files_unless_overwrite() {
    let server = MockServer::start();
    serve_manifest(&server, "k", manifest_json("button", &[("vue", &["button/Button.vue"])], &[]));
    serve_file(&server, "/vue/button/Button.vue", "registry version");

    let project = TestProject::with_api_key("k");
    let existing = project.components_dir().join("button");
    fs::create_dir_all(&existing).unwrap();
    fs::write(existing.join("Button.vue"), "local version").unwrap();

    project
        .cmd(&server.base_url())
        .args(["add", "button", "-f", "vue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 kept"));
    assert_eq!(project.read_component_file("button/Button.vue"), "local version");

    project
        .cmd(&server.base_url())
        .args(["add", "button", "-f", "vue", "--overwrite"])
        .assert()
        .success();
    assert_eq!(project.read_component_file("button/Button.vue"), "registry version");
}

#[test]
fn test_add_custom_cwd_and_path() {
    let server = MockServer::start();
    serve_manifest(&server, "k", manifest_json("button", &[("angular", &["button/button.ts"])], &[]));
    serve_file(&server, "/angular/button/button.ts", "export {}");

    let project = TestProject::with_api_key("k");
    let other = project.project_dir().join("apps/web");

    project
        .cmd(&server.base_url())
        .args(["add", "button", "-f", "angular", "-p", "lib/ui", "-c"])
        .arg(&other)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(other.join("lib/ui/button/button.ts")).unwrap(), "export {}");
}

#[test]
fn test_add_failed_file_gives_nonzero_exit() {
    let server = MockServer::start();
    serve_manifest(&server, "k", manifest_json("button", &[("vue", &["button/Button.vue"])], &[]));
    server.mock(|when, then| {
        when.method(GET).path("/vue/button/Button.vue");
        then.status(500);
    });

    let project = TestProject::with_api_key("k");
    project
        .cmd(&server.base_url())
        .args(["add", "button", "-f", "vue"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("button failed"))
        .stderr(predicate::str::contains("could not be installed"));
}

#[test]
fn test_add_all_installs_every_listed_component() {
    let server = MockServer::start();
    let listing = serde_json::Value::Array(vec![
        manifest_json("card", &[("vue", &["card/Card.vue"])], &[]),
        manifest_json("badge", &[("vue", &["badge/Badge.vue"])], &[]),
    ]);
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).json_body(listing);
    });
    serve_manifest(&server, "k", manifest_json("card", &[("vue", &["card/Card.vue"])], &[]));
    serve_manifest(&server, "k", manifest_json("badge", &[("vue", &["badge/Badge.vue"])], &[]));
    serve_file(&server, "/vue/card/Card.vue", "card");
    serve_file(&server, "/vue/badge/Badge.vue", "badge");

    let project = TestProject::with_api_key("k");
    project
        .cmd(&server.base_url())
        .args(["add", "--all", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed 2 component(s)"));

    assert_eq!(project.read_component_file("card/Card.vue"), "card");
    assert_eq!(project.read_component_file("badge/Badge.vue"), "badge");
}

#[test]
fn test_add_cycle_is_reported() {
    let server = MockServer::start();
    serve_manifest(&server, "k", manifest_json("a", &[("vue", &["a/A.vue"])], &["b"]));
    serve_manifest(&server, "k", manifest_json("b", &[("vue", &["b/B.vue"])], &["a"]));

    let project = TestProject::with_api_key("k");
    project
        .cmd(&server.base_url())
        .args(["add", "a", "-f", "vue"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("a → b → a"));
}
