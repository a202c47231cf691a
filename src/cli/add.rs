//! Add components to a project.
//!
//! Each requested component is installed together with its registry
//! dependencies under `<cwd>/<path>` (default `./src/components`).
//!
//! ```bash
//! bx-components add button card -f vue
//! bx-components add dialog --framework angular --overwrite
//! bx-components add --all -f vue --yes
//! ```
//!
//! # Framework selection
//!
//! 1. `--framework` when given
//! 2. Vue when `--yes` is given
//! 3. An interactive prompt when stdin is a terminal
//! 4. Otherwise an error
//!
//! # Credential
//!
//! When no API key is stored and the session is interactive, the key is asked
//! for, saved, and the install continues. Non-interactive sessions fail before
//! any request is sent.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use super::CliConfig;
use super::config::{prompt_api_key, save_api_key};
use crate::config::Credential;
use crate::constants::DEFAULT_OUTPUT_DIR;
use crate::core::{BxError, Framework};
use crate::fetcher::FileFetcher;
use crate::installer::{
    CancellationFlag, FailurePolicy, InstallOptions, InstallReport, Installer,
    UnsupportedDependencyPolicy,
};
use crate::registry::RegistryClient;

#[derive(Args, Debug)]
pub struct AddCommand {
    /// Components to add
    components: Vec<String>,

    /// Framework you are using
    #[arg(short, long)]
    framework: Option<Framework>,

    /// Overwrite existing files
    #[arg(short, long)]
    overwrite: bool,

    /// Working directory, defaults to the current directory
    #[arg(short, long)]
    cwd: Option<PathBuf>,

    /// Directory components are written to, relative to the working directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    path: PathBuf,

    /// Add every component the registry offers
    #[arg(short, long, conflicts_with = "components")]
    all: bool,

    /// Skip confirmation prompts and accept defaults
    #[arg(short, long)]
    yes: bool,

    /// Stop at the first component that fails
    #[arg(long)]
    fail_fast: bool,

    /// Treat a dependency without files for the framework as a failure
    #[arg(long)]
    strict_deps: bool,
}

impl AddCommand {
    pub async fn execute(self, config: &CliConfig, cancel: CancellationFlag) -> Result<()> {
        if self.components.is_empty() && !self.all {
            bail!("No components given. Pass component names or --all");
        }

        let framework = self.select_framework(config)?;
        let credential = load_or_collect_credential(config).await?;
        let options = self.install_options()?;
        debug!("Installing into {}", options.output_root.display());

        let http = config.http.clone();
        let client = http.build_client()?;
        let registry = RegistryClient::with_client(client.clone(), config.registry()?, http.clone());
        let fetcher = FileFetcher::with_client(client, http);

        let names = if self.all {
            let names = list_all(&registry, &credential, &cancel).await?;
            if !self.confirm_all(config, names.len(), framework)? {
                println!("{}", "Cancelled".yellow());
                return Ok(());
            }
            names
        } else {
            self.components.clone()
        };

        let spinner = spinner(config);
        let mut installer = Installer::new(registry, fetcher, credential, options)
            .with_cancellation(cancel);
        if let Some(spinner) = &spinner {
            installer = installer.with_progress(spinner.clone());
        }

        let reports = installer.install_all(&names, framework).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        summarize(&reports, names.len())
    }

    pub(super) fn select_framework(&self, config: &CliConfig) -> Result<Framework> {
        if let Some(framework) = self.framework {
            return Ok(framework);
        }
        if self.yes {
            return Ok(Framework::Vue);
        }
        if !config.interactive {
            bail!("No framework given. Pass --framework <vue|angular> when not running in a terminal");
        }

        let names: Vec<&str> = Framework::ALL.iter().map(Framework::display_name).collect();
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Which framework are you using?")
            .items(&names)
            .default(0)
            .interact()?;

        Ok(Framework::ALL[selection])
    }

    pub(super) fn install_options(&self) -> Result<InstallOptions> {
        let cwd = match &self.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };

        Ok(InstallOptions {
            overwrite: self.overwrite,
            failure_policy: if self.fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::KeepGoing
            },
            unsupported_dependency: if self.strict_deps {
                UnsupportedDependencyPolicy::Fail
            } else {
                UnsupportedDependencyPolicy::Skip
            },
            ..InstallOptions::new(cwd.join(&self.path))
        })
    }

    fn confirm_all(&self, config: &CliConfig, count: usize, framework: Framework) -> Result<bool> {
        if self.yes || !config.interactive {
            return Ok(true);
        }

        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Add all {count} components for {}?", framework.display_name()))
            .default(true)
            .interact()?;
        Ok(confirmed)
    }
}

async fn load_or_collect_credential(config: &CliConfig) -> Result<Credential> {
    let store = config.credential_store()?;

    match store.load().await {
        Ok(credential) => Ok(credential),
        Err(BxError::ConfigMissing { .. }) if config.interactive => {
            println!("{}", "No API key configured yet.".yellow());
            let key = prompt_api_key()?;
            let credential = save_api_key(&store, &key).await?;
            println!("{} Configuration saved to {}", "✓".green(), store.path().display());
            Ok(credential)
        }
        Err(e) => Err(e.into()),
    }
}

async fn list_all(
    registry: &RegistryClient,
    credential: &Credential,
    cancel: &CancellationFlag,
) -> Result<Vec<String>> {
    let mut names: Vec<String> = cancel
        .run(registry.list_components(credential))
        .await?
        .into_iter()
        .map(|manifest| manifest.name)
        .collect();
    names.sort();
    names.dedup();
    Ok(names)
}

fn spinner(config: &CliConfig) -> Option<ProgressBar> {
    if !config.interactive {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

fn summarize(reports: &[InstallReport], requested: usize) -> Result<()> {
    for report in reports {
        report.print();
    }

    if reports.iter().any(|r| r.aborted == Some(BxError::Cancelled)) {
        bail!(BxError::Cancelled);
    }

    let failed = reports.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        bail!("{failed} of {requested} requested components could not be installed");
    }

    let installed: usize = reports.iter().map(|r| r.installed().count()).sum();
    println!("\n{} Installed {} component(s)", "✓".green().bold(), installed);
    Ok(())
}
