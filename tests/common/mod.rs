//! Common test utilities for bx-components integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use assert_cmd::Command;
use httpmock::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub use bx_components::test_utils::manifest_json;

/// An isolated project directory with its own credential file
pub struct TestProject {
    _temp: TempDir,
    project_dir: PathBuf,
    config_path: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("project");
        fs::create_dir_all(&project_dir).unwrap();
        let config_path = temp.path().join("config").join("config.toml");

        Self {
            _temp: temp,
            project_dir,
            config_path,
        }
    }

    /// Project with an API key already stored.
    pub fn with_api_key(key: &str) -> Self {
        let project = Self::new();
        fs::create_dir_all(project.config_path.parent().unwrap()).unwrap();
        fs::write(&project.config_path, format!("api_key = \"{key}\"\n")).unwrap();
        project
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Default output directory of `add`.
    pub fn components_dir(&self) -> PathBuf {
        self.project_dir.join("src").join("components")
    }

    pub fn read_component_file(&self, path: &str) -> String {
        fs::read_to_string(self.components_dir().join(path)).unwrap()
    }

    /// The binary, run inside the project against `registry`.
    pub fn cmd(&self, registry: &str) -> Command {
        let mut cmd = Command::cargo_bin("bx-components").unwrap();
        cmd.current_dir(&self.project_dir)
            .env("BX_CONFIG", &self.config_path)
            .env("BX_REGISTRY_URL", registry)
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

/// Serve a manifest at `/<name>`, requiring the API key header.
pub fn serve_manifest(server: &MockServer, key: &str, manifest: serde_json::Value) {
    let path = format!("/{}", manifest["name"].as_str().unwrap());
    let key = key.to_string();
    server.mock(|when, then| {
        when.method(GET).path(path).header("bx_auth", key);
        then.status(200).header("content-type", "application/json").json_body(manifest);
    });
}

/// Serve a raw file at `path`.
pub fn serve_file(server: &MockServer, path: &str, body: &str) {
    let path = path.to_string();
    let body = body.to_string();
    server.mock(|when, then| {
        when.method(GET).path(path);
        then.status(200).body(body);
    });
}
