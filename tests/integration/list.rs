use httpmock::prelude::*;
use predicates::prelude::*;

use crate::common::{TestProject, manifest_json};

#[test]
fn test_list_shows_components() {
    let server = MockServer::start();
    let body = serde_json::Value::Array(vec![
        manifest_json("dialog", &[("vue", &["dialog/Dialog.vue"])], &["button"]),
        manifest_json(
            "button",
            &[("vue", &["button/Button.vue"]), ("angular", &["button/button.ts"])],
            &[],
        ),
    ]);
    server.mock(|when, then| {
        when.method(GET).path("/").header("bx_auth", "k");
        then.status(200).json_body(body);
    });

    let project = TestProject::with_api_key("k");
    project
        .cmd(&server.base_url())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("button"))
        .stdout(predicate::str::contains("vue, angular"))
        .stdout(predicate::str::contains("→ button"));
}

#[test]
fn test_list_names_only() {
    let server = MockServer::start();
    let body = serde_json::Value::Array(vec![
        manifest_json("card", &[], &[]),
        manifest_json("accordion", &[], &[]),
    ]);
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).json_body(body);
    });

    let project = TestProject::with_api_key("k");
    project
        .cmd(&server.base_url())
        .args(["list", "--names"])
        .assert()
        .success()
        .stdout("accordion\ncard\n");
}

#[test]
fn test_list_rejected_key() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(401);
    });

    let project = TestProject::with_api_key("wrong");
    project
        .cmd(&server.base_url())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("401"))
        .stderr(predicate::str::contains("bx-components config"));
}
