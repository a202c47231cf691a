//! bx-components - install UI components from a bx registry
//!
//! A registry serves one JSON manifest per component and the raw source files
//! of each supported framework. This crate resolves a component's
//! `registryDependencies` depth-first and writes every file into the
//! project, dependencies before dependents.
//!
//! # Architecture Overview
//!
//! ```text
//! CLI (add / config / list)
//!   └── Installer ── resolves the dependency tree, owns the install report
//!         ├── RegistryClient ── GET <registry>/<name>
//!         ├── FileFetcher ───── GET <registry>/<framework>/<path>, follows redirects
//!         └── Credential ────── loaded once from the CredentialStore
//! ```
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface
//! - [`config`] - Persisted API key
//! - [`core`] - Error types and the closed [`Framework`](core::Framework) set
//! - [`registry`] - Manifest model and registry client
//! - [`fetcher`] - Streaming, redirect-aware file downloads
//! - [`installer`] - Dependency-first installation and reporting
//! - [`http`] - Shared HTTP client settings and URL helpers
//! - [`constants`] - Defaults for timeouts, paths and URLs
//!
//! # Example
//!
//! ```rust,no_run
//! use bx_components::config::CredentialStore;
//! use bx_components::core::Framework;
//! use bx_components::http::{HttpConfig, parse_base_url};
//! use bx_components::installer::{InstallOptions, Installer};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let installer = Installer::from_store(
//!     &CredentialStore::new()?,
//!     parse_base_url("http://localhost:1923")?,
//!     HttpConfig::default(),
//!     InstallOptions::new("src/components"),
//! )
//! .await?;
//!
//! let report = installer.install("dialog", Framework::Vue).await;
//! report.print();
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod fetcher;
pub mod http;
pub mod installer;
pub mod registry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
