//! Dependency resolution and installation of components.
//!
//! [`Installer::install`] takes a component name and a [`Framework`] and
//! materializes the component, plus every component it transitively lists in
//! `registryDependencies`, under the output root.
//!
//! # Algorithm
//!
//! Depth-first, one component at a time:
//!
//! 1. Fetch the manifest. A missing component or registry failure aborts the
//!    whole call, since the dependency graph is broken.
//! 2. Install each registry dependency, in listed order, before any of the
//!    component's own files are written.
//! 3. If the manifest has no files for the framework, record a skip.
//! 4. Otherwise fetch each file, in listed order, from
//!    `<registry>/<framework>/<path>` to `<output root>/<path>`.
//!
//! # Guarantees
//!
//! - **Dependency-first**: a component's entry in the [`InstallReport`] always
//!   comes after the entries of all its dependencies.
//! - **Each component once**: a visited set scoped to the top-level call keeps
//!   shared dependencies from being fetched twice.
//! - **Termination**: meeting a component that is still on the active path
//!   aborts with [`BxError::CyclicDependency`].
//! - **Sequential**: at most one request is in flight at any time.
//! - **No process exits**: failures end up in the report; the caller decides
//!   what to do with them.
//!
//! # Policies
//!
//! - [`FailurePolicy`] decides whether a component failure stops the whole
//!   call or only that component (and whatever depends on it).
//! - [`UnsupportedDependencyPolicy`] decides whether a dependency skipped for
//!   lack of framework files blocks its dependents.

mod report;


pub use report::{
    ComponentReport, ComponentStatus, FileAction, InstallReport, InstalledFile, SkipReason,
};

use indicatif::ProgressBar;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{Credential, CredentialStore};
use crate::core::{BxError, Framework};
use crate::fetcher::FileFetcher;
use crate::http::{HttpConfig, join_segments};
use crate::registry::{ComponentManifest, FileRef, RegistryClient};

/// What to do when a component fails to install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Mark the component (and its dependents) failed and carry on
    #[default]
    KeepGoing,
    /// Stop the install call at the first failure
    FailFast,
}

/// What a dependency without files for the target framework means for its dependents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedDependencyPolicy {
    /// Install the dependent anyway
    #[default]
    Skip,
    /// Fail the dependent with [`BxError::DependencyUnavailable`]
    Fail,
}

/// Settings for an [`Installer`]
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Directory component files are written under
    pub output_root: PathBuf,
    /// Replace files that already exist
    pub overwrite: bool,
    /// Behaviour on component failure
    pub failure_policy: FailurePolicy,
    /// Behaviour when a dependency is skipped
    pub unsupported_dependency: UnsupportedDependencyPolicy,
}

impl InstallOptions {
    /// Defaults for the given output root.
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            overwrite: false,
            failure_policy: FailurePolicy::default(),
            unsupported_dependency: UnsupportedDependencyPolicy::default(),
        }
    }
}

/// Cancellation shared between the installer and a signal handler
///
/// Once cancelled, the request in flight is dropped and no further request is
/// issued. Files already written stay on disk. A new file whose download was
/// interrupted is removed.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(CancellationToken);

impl CancellationFlag {
    /// A flag that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.cancel();
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Resolves once cancellation is requested.
    pub async fn cancelled(&self) {
        self.0.cancelled().await;
    }

    /// Drive `operation` until it finishes or cancellation is requested.
    ///
    /// On cancellation the operation is dropped and [`BxError::Cancelled`]
    /// is returned. An already cancelled flag never polls `operation`.
    pub async fn run<T, F>(&self, operation: F) -> Result<T, BxError>
    where
        F: Future<Output = Result<T, BxError>>,
    {
        tokio::select! {
            biased;
            () = self.0.cancelled() => Err(BxError::Cancelled),
            result = operation => result,
        }
    }
}

/// Installs components and their registry dependencies
pub struct Installer {
    registry: RegistryClient,
    fetcher: FileFetcher,
    credential: Credential,
    options: InstallOptions,
    cancel: CancellationFlag,
    progress: Option<ProgressBar>,
}

/// Terminal state of a visited component, as seen by its dependents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Installed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Copy)]
enum Visit {
    InProgress,
    Done(Outcome),
}

/// Traversal state of one top-level call
struct Resolution {
    framework: Framework,
    visits: HashMap<String, Visit>,
    path: Vec<String>,
    report: InstallReport,
}

impl Resolution {
    fn cycle_through(&self, name: &str) -> String {
        let start = self.path.iter().position(|n| n == name).unwrap_or(0);
        let mut chain: Vec<&str> = self.path[start..].iter().map(String::as_str).collect();
        chain.push(name);
        chain.join(" → ")
    }
}

impl Installer {
    /// Create an installer from its collaborators.
    #[must_use]
    pub fn new(
        registry: RegistryClient,
        fetcher: FileFetcher,
        credential: Credential,
        options: InstallOptions,
    ) -> Self {
        Self {
            registry,
            fetcher,
            credential,
            options,
            cancel: CancellationFlag::new(),
            progress: None,
        }
    }

    /// Create an installer whose credential comes from `store`.
    ///
    /// The credential is loaded before anything touches the network, so a
    /// missing record fails with [`BxError::ConfigMissing`] without a request.
    pub async fn from_store(
        store: &CredentialStore,
        registry_url: Url,
        http: HttpConfig,
        options: InstallOptions,
    ) -> Result<Self, BxError> {
        let credential = store.load().await?;

        let client = http.build_client()?;
        let registry = RegistryClient::with_client(client.clone(), registry_url, http.clone());
        let fetcher = FileFetcher::with_client(client, http);

        Ok(Self::new(registry, fetcher, credential, options))
    }

    /// Use a shared cancellation flag.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Report progress on a spinner.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Settings in use.
    #[must_use]
    pub const fn options(&self) -> &InstallOptions {
        &self.options
    }

    /// Install `name` and its registry dependencies for `framework`.
    pub async fn install(&self, name: &str, framework: Framework) -> InstallReport {
        let mut resolution = Resolution {
            framework,
            visits: HashMap::new(),
            path: Vec::new(),
            report: InstallReport::new(name.to_string(), framework),
        };

        info!("Installing {} for {}", name, framework);
        if let Err(error) = self.visit(name, &mut resolution).await {
            warn!("Install of '{}' stopped: {}", name, error);
            resolution.report.aborted = Some(error);
        }

        resolution.report
    }

    /// Install several components, each as its own top-level call.
    ///
    /// Under [`FailurePolicy::FailFast`] the remaining requests are not
    /// attempted after the first unsuccessful one. Cancellation always stops
    /// the loop.
    pub async fn install_all(&self, names: &[String], framework: Framework) -> Vec<InstallReport> {
        let mut reports = Vec::with_capacity(names.len());

        for name in names {
            let report = self.install(name, framework).await;
            let stop = matches!(report.aborted, Some(BxError::Cancelled))
                || (!report.is_success() && self.options.failure_policy == FailurePolicy::FailFast);
            reports.push(report);
            if stop {
                break;
            }
        }

        reports
    }

    /// Visit one component. `Err` aborts the whole top-level call.
    async fn visit(&self, name: &str, resolution: &mut Resolution) -> Result<Outcome, BxError> {
        match resolution.visits.get(name) {
            Some(Visit::InProgress) => {
                return Err(BxError::CyclicDependency {
                    chain: resolution.cycle_through(name),
                });
            }
            Some(Visit::Done(outcome)) => {
                debug!("'{}' already handled in this install ({:?})", name, outcome);
                return Ok(*outcome);
            }
            None => {}
        }

        self.check_cancelled()?;
        resolution.visits.insert(name.to_string(), Visit::InProgress);
        resolution.path.push(name.to_string());
        self.set_message(format!("Resolving {name}"));

        let fetched = self.cancel.run(self.registry.fetch_manifest(name, &self.credential)).await;
        let manifest = match fetched {
            Ok(manifest) => manifest,
            Err(BxError::Cancelled) => return Err(BxError::Cancelled),
            Err(error) => {
                resolution.report.record(name, ComponentStatus::Failed {
                    error: error.clone(),
                });
                return Err(error);
            }
        };

        let status = self.install_manifest(name, &manifest, resolution).await?;
        let outcome = match &status {
            ComponentStatus::Installed { .. } => Outcome::Installed,
            ComponentStatus::Skipped { .. } => Outcome::Skipped,
            ComponentStatus::Failed { .. } => Outcome::Failed,
        };

        let abort = match &status {
            ComponentStatus::Failed { error }
                if self.options.failure_policy == FailurePolicy::FailFast =>
            {
                Some(error.clone())
            }
            _ => None,
        };

        resolution.report.record(name, status);
        resolution.path.pop();
        resolution.visits.insert(name.to_string(), Visit::Done(outcome));

        match abort {
            Some(error) => Err(error),
            None => Ok(outcome),
        }
    }

    /// Dependencies first, then the component's own files.
    ///
    /// `name` is the name the component was requested under; reports and
    /// errors use it even if the manifest names itself differently.
    async fn install_manifest(
        &self,
        name: &str,
        manifest: &ComponentManifest,
        resolution: &mut Resolution,
    ) -> Result<ComponentStatus, BxError> {
        let mut blocked_by: Option<String> = None;

        if !manifest.registry_dependencies.is_empty() {
            debug!(
                "Installing dependencies of {}: {}",
                name,
                manifest.registry_dependencies.join(", ")
            );
        }

        for dependency in &manifest.registry_dependencies {
            let outcome = Box::pin(self.visit(dependency, resolution)).await?;
            let blocks = match outcome {
                Outcome::Installed => false,
                Outcome::Failed => true,
                Outcome::Skipped => {
                    self.options.unsupported_dependency == UnsupportedDependencyPolicy::Fail
                }
            };
            if blocks && blocked_by.is_none() {
                blocked_by = Some(dependency.clone());
            }
        }

        if let Some(dependency) = blocked_by {
            warn!("Not installing {}: dependency {} is unavailable", name, dependency);
            return Ok(ComponentStatus::Failed {
                error: BxError::DependencyUnavailable {
                    component: name.to_string(),
                    dependency,
                },
            });
        }

        let framework = resolution.framework;
        let Some(files) = manifest.files_for(framework) else {
            warn!("No {} files found for component {}", framework, name);
            return Ok(ComponentStatus::Skipped {
                reason: SkipReason::UnsupportedFramework {
                    framework,
                },
            });
        };

        self.install_files(name, framework, files).await
    }

    async fn install_files(
        &self,
        component: &str,
        framework: Framework,
        files: &[FileRef],
    ) -> Result<ComponentStatus, BxError> {
        // Reject every bad path before the first write
        let mut planned = Vec::with_capacity(files.len());
        for file in files {
            match file.destination(component, &self.options.output_root) {
                Ok(destination) => planned.push((file, destination)),
                Err(error) => {
                    warn!("Rejected file '{}' of {}: {}", file.path, component, error);
                    return Ok(ComponentStatus::Failed {
                        error,
                    });
                }
            }
        }

        let base = self.registry.framework_base(framework);
        let mut installed = Vec::with_capacity(planned.len());

        for (file, destination) in planned {
            let existing = is_file(&destination).await;
            let action = if existing && !self.options.overwrite {
                debug!("Keeping existing {}", destination.display());
                FileAction::Kept
            } else {
                self.set_message(format!("Downloading {}", file.path));

                let source = source_location(&base, file);
                let fetch = self.fetcher.fetch(&source, &destination, &self.credential);
                match self.cancel.run(fetch).await {
                    Ok(bytes) => {
                        debug!("Downloaded {}", file.path);
                        FileAction::Downloaded {
                            bytes,
                        }
                    }
                    Err(BxError::Cancelled) => {
                        if !existing && tokio::fs::remove_file(&destination).await.is_ok() {
                            debug!("Removed partial {}", destination.display());
                        }
                        return Err(BxError::Cancelled);
                    }
                    Err(source) => {
                        warn!("Failed to download {} for {}: {}", file.path, component, source);
                        return Ok(ComponentStatus::Failed {
                            error: BxError::FileInstallFailed {
                                component: component.to_string(),
                                path: file.path.clone(),
                                source: Box::new(source),
                            },
                        });
                    }
                }
            };

            installed.push(InstalledFile {
                path: file.path.clone(),
                destination,
                action,
            });
        }

        info!("Successfully installed {} for {}", component, framework);
        Ok(ComponentStatus::Installed {
            files: installed,
        })
    }

    fn check_cancelled(&self) -> Result<(), BxError> {
        if self.cancel.is_cancelled() {
            return Err(BxError::Cancelled);
        }
        Ok(())
    }

    fn set_message(&self, message: String) {
        if let Some(progress) = &self.progress {
            progress.set_message(message);
        }
    }
}

/// Whether `path` is an existing regular file. Directories and broken links
/// are not.
async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|metadata| metadata.is_file()).unwrap_or(false)
}

/// Remote location of a manifest file, `<framework base>/<path>`.
#[must_use]
pub fn source_location(framework_base: &Url, file: &FileRef) -> Url {
    join_segments(framework_base, &file.path)
}
