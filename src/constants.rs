//! Global constants used throughout bx-components.
//!
//! Timeouts, redirect limits, default locations and header names that are
//! shared between the registry client, the file fetcher and the CLI.

use std::time::Duration;

/// Registry used when neither `--registry` nor `BX_REGISTRY_URL` is set.
pub const DEFAULT_REGISTRY_URL: &str = "http://localhost:1923";

/// Directory (relative to the working directory) components are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "src/components";

/// Header carrying the API key on every registry and file request.
pub const AUTH_HEADER: &str = "bx_auth";

/// Maximum number of redirects followed for a single file download.
///
/// Redirect chains longer than this fail with `TooManyRedirects`.
pub const MAX_REDIRECTS: usize = 5;

/// Timeout for establishing a TCP connection (10 seconds).
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for a complete manifest request (10 seconds).
pub const MANIFEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Idle timeout while streaming a file (60 seconds).
///
/// Applied to the response headers and to every body chunk, so large files
/// are fine as long as bytes keep arriving.
pub const DOWNLOAD_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "bx-components";

/// File name of the persisted credential record.
pub const CONFIG_FILE_NAME: &str = "config.toml";
