//! Outcome of one top-level install call.

use colored::Colorize;
use std::path::PathBuf;

use crate::core::{BxError, Framework};

/// Aggregate result of installing one requested component and its dependencies
///
/// Entries appear in completion order, so every dependency is listed before
/// the components that depend on it. A component reached twice in the same
/// call has a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Component name that was requested
    pub request: String,
    /// Framework the install targeted
    pub framework: Framework,
    /// Per-component outcomes, dependency-first
    pub entries: Vec<ComponentReport>,
    /// Error that stopped the call before it completed
    pub aborted: Option<BxError>,
}

/// Outcome for a single component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentReport {
    /// Component name
    pub name: String,
    /// What happened to it
    pub status: ComponentStatus,
}

/// Terminal state of a component within an install call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentStatus {
    /// All files are present under the output root
    Installed {
        /// Files in manifest order
        files: Vec<InstalledFile>,
    },
    /// Nothing was written, and that is not an error
    Skipped {
        /// Why the component was skipped
        reason: SkipReason,
    },
    /// The component could not be installed
    Failed {
        /// Cause, naming the component and file where applicable
        error: BxError,
    },
}

/// Why a component was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The manifest has no file list for the requested framework
    UnsupportedFramework {
        /// Requested framework
        framework: Framework,
    },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFramework { framework } => {
                write!(f, "no {} files available", framework.display_name())
            }
        }
    }
}

/// A file of an installed component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledFile {
    /// Path as declared in the manifest
    pub path: String,
    /// Where the file lives on disk
    pub destination: PathBuf,
    /// Whether it was fetched or already present
    pub action: FileAction,
}

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// Fetched from the registry
    Downloaded {
        /// Bytes written
        bytes: u64,
    },
    /// Already present and overwrite was not requested
    Kept,
}

impl InstallReport {
    pub(crate) const fn new(request: String, framework: Framework) -> Self {
        Self {
            request,
            framework,
            entries: Vec::new(),
            aborted: None,
        }
    }

    pub(crate) fn record(&mut self, name: &str, status: ComponentStatus) {
        self.entries.push(ComponentReport {
            name: name.to_string(),
            status,
        });
    }

    /// True when nothing failed and the call ran to completion.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && self.failed().next().is_none()
    }

    /// Component names in the order they reached a terminal state.
    #[must_use]
    pub fn order(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Entry for a component, if it was reached.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&ComponentReport> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Installed components.
    pub fn installed(&self) -> impl Iterator<Item = &ComponentReport> {
        self.entries.iter().filter(|e| matches!(e.status, ComponentStatus::Installed { .. }))
    }

    /// Skipped components.
    pub fn skipped(&self) -> impl Iterator<Item = &ComponentReport> {
        self.entries.iter().filter(|e| matches!(e.status, ComponentStatus::Skipped { .. }))
    }

    /// Failed components.
    pub fn failed(&self) -> impl Iterator<Item = &ComponentReport> {
        self.entries.iter().filter(|e| matches!(e.status, ComponentStatus::Failed { .. }))
    }

    /// Print a colored summary to stdout.
    pub fn print(&self) {
        for entry in &self.entries {
            match &entry.status {
                ComponentStatus::Installed { files } => {
                    let downloaded = files
                        .iter()
                        .filter(|f| matches!(f.action, FileAction::Downloaded { .. }))
                        .count();
                    let kept = files.len() - downloaded;
                    let mut line = format!(
                        "{} {} ({} downloaded",
                        "✓".green(),
                        entry.name.bold(),
                        downloaded
                    );
                    if kept > 0 {
                        line.push_str(&format!(", {kept} kept"));
                    }
                    line.push(')');
                    println!("{line}");
                }
                ComponentStatus::Skipped { reason } => {
                    println!("{} {} skipped: {}", "-".yellow(), entry.name.bold(), reason);
                }
                ComponentStatus::Failed { error } => {
                    println!("{} {} failed: {}", "✗".red(), entry.name.bold(), error);
                    if let BxError::FileInstallFailed { source, .. } = error {
                        println!("    {}", source.to_string().dimmed());
                    }
                }
            }
        }

        if let Some(error) = &self.aborted {
            println!(
                "{} installing {} stopped: {}",
                "✗".red(),
                self.request.bold(),
                error
            );
        }
    }
}
