//! Test utilities for bx-components
//!
//! Helpers shared by unit tests and the integration test target (enabled
//! there through the `test-utils` feature).

use serde_json::{Value, json};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`. With neither, tests run
/// without a subscriber.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Manifest JSON for a UI component.
///
/// `files` pairs a framework key with the file paths it ships.
pub fn manifest_json(name: &str, files: &[(&str, &[&str])], registry_dependencies: &[&str]) -> Value {
    let files: serde_json::Map<String, Value> = files
        .iter()
        .map(|(framework, paths)| {
            let refs: Vec<Value> = paths.iter().map(|p| json!({ "path": p })).collect();
            ((*framework).to_string(), Value::Array(refs))
        })
        .collect();

    json!({
        "name": name,
        "type": 0,
        "files": files,
        "dependencies": [],
        "registryDependencies": registry_dependencies,
    })
}
