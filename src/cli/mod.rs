//! Command-line interface for bx-components.
//!
//! # Commands
//!
//! - `add` - Install components and their registry dependencies
//! - `config` - Store the registry API key
//! - `list` - Show every component the registry offers
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug logging
//! - `--quiet` - Disable logging
//! - `--config <path>` - Credential file location (`BX_CONFIG`)
//! - `--registry <url>` - Registry base URL (`BX_REGISTRY_URL`)
//! - `--timeout <secs>` - Manifest request timeout
//! - `--download-timeout <secs>` - Idle time allowed while downloading a file
//!
//! # Examples
//!
//! ```bash
//! bx-components config
//! bx-components add button card --framework vue
//! bx-components --registry https://registry.example.com list
//! RUST_LOG=debug bx-components add dialog -f angular
//! ```

mod add;
mod config;
mod list;


pub use add::AddCommand;
pub use config::ConfigCommand;
pub use list::ListCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::CredentialStore;
use crate::constants::DEFAULT_REGISTRY_URL;
use crate::http::{HttpConfig, parse_base_url};
use crate::installer::CancellationFlag;

/// Settings derived from the global flags, shared by every command
///
/// Building this separately from [`Cli`] lets tests run commands against a
/// temporary credential file and a mock registry.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Filter directive for the log subscriber, `None` disables logging
    pub log_level: Option<String>,
    /// Credential file override
    pub config_path: Option<PathBuf>,
    /// Registry base URL as given
    pub registry_url: String,
    /// Network settings
    pub http: HttpConfig,
    /// Whether prompts may be shown
    pub interactive: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: Some("bx_components=warn".to_string()),
            config_path: None,
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            http: HttpConfig::default(),
            interactive: false,
        }
    }
}

impl CliConfig {
    /// Credential store for this invocation.
    pub fn credential_store(&self) -> Result<CredentialStore> {
        Ok(CredentialStore::from_optional(self.config_path.clone())?)
    }

    /// Parsed registry base URL.
    pub fn registry(&self) -> Result<Url> {
        Ok(parse_base_url(&self.registry_url)?)
    }

    /// Install the global log subscriber.
    ///
    /// `RUST_LOG` takes precedence over the verbosity flags. Logs go to stderr
    /// so they never mix with command output.
    pub fn init_logging(&self) {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => match &self.log_level {
                Some(level) => EnvFilter::new(level),
                None => return,
            },
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Install UI components from a bx registry into your project.
#[derive(Parser, Debug)]
#[command(name = "bx-components", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the credential file
    #[arg(long, global = true, env = "BX_CONFIG")]
    config: Option<PathBuf>,

    /// Registry base URL
    #[arg(long, global = true, env = "BX_REGISTRY_URL", default_value = DEFAULT_REGISTRY_URL)]
    registry: String,

    /// Manifest request timeout in seconds
    #[arg(long, global = true, default_value_t = 10)]
    timeout: u64,

    /// Seconds a download may go without receiving data
    #[arg(long, global = true, default_value_t = 60)]
    download_timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add components to your project
    Add(AddCommand),

    /// Store the registry API key
    Config(ConfigCommand),

    /// List components available in the registry
    List(ListCommand),
}

impl Cli {
    /// Build a [`CliConfig`] from the parsed flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("bx_components=debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("bx_components=warn".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
            registry_url: self.registry.clone(),
            http: HttpConfig {
                manifest_timeout: Duration::from_secs(self.timeout),
                download_idle_timeout: Duration::from_secs(self.download_timeout),
                ..HttpConfig::default()
            },
            interactive: std::io::stdin().is_terminal(),
        }
    }

    /// Whether the selected command stops on a [`CancellationFlag`].
    ///
    /// `config` only prompts and writes a local file, so it keeps the default
    /// interrupt behaviour.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self.command, Commands::Add(_) | Commands::List(_))
    }

    /// Run the selected command.
    pub async fn execute(self, cancel: CancellationFlag) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config, cancel).await
    }

    /// Run the selected command with explicit settings.
    pub async fn execute_with_config(self, config: CliConfig, cancel: CancellationFlag) -> Result<()> {
        match self.command {
            Commands::Add(cmd) => cmd.execute(&config, cancel).await,
            Commands::Config(cmd) => cmd.execute(&config).await,
            Commands::List(cmd) => cmd.execute(&config, cancel).await,
        }
    }
}
