//! Error handling for bx-components
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** so the installer can decide between aborting,
//!    skipping and recording a failure in the install report
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`BxError`] - Enumerated error types for every failure in the install pipeline
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! # Error Categories
//!
//! - **Configuration**: [`BxError::ConfigMissing`], [`BxError::ConfigError`]
//! - **Registry**: [`BxError::InvalidComponentName`], [`BxError::ComponentNotFound`], [`BxError::RegistryError`],
//!   [`BxError::InvalidManifest`]
//! - **Network**: [`BxError::TransportError`], [`BxError::DownloadFailed`],
//!   [`BxError::TooManyRedirects`]
//! - **Resolution**: [`BxError::CyclicDependency`], [`BxError::DependencyUnavailable`]
//! - **Files**: [`BxError::PathTraversal`], [`BxError::FileInstallFailed`],
//!   [`BxError::FileSystemError`]
//!
//! [`BxError`] is `Clone` because failures are stored inside
//! [`InstallReport`](crate::installer::InstallReport) entries. Variants that wrap
//! foreign errors keep their message as a string for that reason.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bx_components::core::{BxError, user_friendly_error};
//!
//! let error = BxError::ComponentNotFound {
//!     name: "button".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for bx-components operations
///
/// # Propagation
///
/// - [`ComponentNotFound`], [`RegistryError`], [`InvalidManifest`] and
///   [`CyclicDependency`] abort the whole install call.
/// - [`UnsupportedFramework`] only surfaces when parsing a framework name at the
///   command boundary; inside the installer a missing framework is a skip.
/// - [`FileInstallFailed`] marks a single component as failed in the report.
///
/// [`ComponentNotFound`]: BxError::ComponentNotFound
/// [`RegistryError`]: BxError::RegistryError
/// [`InvalidManifest`]: BxError::InvalidManifest
/// [`CyclicDependency`]: BxError::CyclicDependency
/// [`UnsupportedFramework`]: BxError::UnsupportedFramework
/// [`FileInstallFailed`]: BxError::FileInstallFailed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BxError {
    /// No persisted credential record exists
    ///
    /// This is a recoverable condition: run `bx-components config` to store an
    /// API key and retry.
    #[error("No configuration found at {path}")]
    ConfigMissing {
        /// Location that was searched for the credential record
        path: String,
    },

    /// The credential record exists but cannot be used
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// The registry does not know the requested component
    #[error("Component '{name}' not found")]
    ComponentNotFound {
        /// Name used for the registry lookup
        name: String,
    },

    /// A component name that cannot be a single registry path segment
    #[error("Invalid component name '{name}'")]
    InvalidComponentName {
        /// Name as requested
        name: String,
    },

    /// The registry answered with a non-success status other than 404
    #[error("Registry request for '{name}' failed: {status} {status_text}")]
    RegistryError {
        /// Component name (or `*` for the listing endpoint)
        name: String,
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase for the status
        status_text: String,
    },

    /// The registry returned a body that is not a valid manifest
    #[error("Invalid manifest for '{name}': {reason}")]
    InvalidManifest {
        /// Component name
        name: String,
        /// Parse failure
        reason: String,
    },

    /// Connection, DNS, timeout or stream failure
    #[error("Network error for {url}: {reason}")]
    TransportError {
        /// Requested URL
        url: String,
        /// Underlying cause
        reason: String,
    },

    /// A file download ended with a non-success status
    #[error("Failed to download {url}: {status} {status_text}")]
    DownloadFailed {
        /// URL of the terminal (post-redirect) request
        url: String,
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase for the status
        status_text: String,
    },

    /// A redirect chain exceeded the hop limit
    #[error("Too many redirects fetching {url} (limit {limit})")]
    TooManyRedirects {
        /// Originally requested URL
        url: String,
        /// Maximum number of followed redirects
        limit: usize,
    },

    /// A manifest file path resolves outside the output root
    #[error("File path '{path}' of component '{component}' escapes the output directory")]
    PathTraversal {
        /// Component that declared the path
        component: String,
        /// Offending manifest path
        path: String,
    },

    /// Registry dependencies form a cycle
    #[error("Circular dependency detected: {chain}")]
    CyclicDependency {
        /// Dependency chain, e.g. `a → b → a`
        chain: String,
    },

    /// A dependency was skipped or failed, so the dependent was not installed
    #[error("Component '{component}' requires '{dependency}', which was not installed")]
    DependencyUnavailable {
        /// Component whose files were not written
        component: String,
        /// Dependency that is missing
        dependency: String,
    },

    /// Writing one of a component's files failed
    #[error("Failed to install '{path}' for component '{component}'")]
    FileInstallFailed {
        /// Component being installed
        component: String,
        /// Manifest path of the file
        path: String,
        /// Underlying fetch or filesystem error
        #[source]
        source: Box<BxError>,
    },

    /// Local filesystem operation failed
    #[error("File system error: {operation} {path}: {reason}")]
    FileSystemError {
        /// Operation that failed (e.g. "create directory")
        operation: String,
        /// Path involved
        path: String,
        /// Underlying cause
        reason: String,
    },

    /// A framework name outside the supported set
    #[error("Unsupported framework: {framework}")]
    UnsupportedFramework {
        /// The rejected framework name
        framework: String,
    },

    /// The install was interrupted before completion
    #[error("Installation cancelled")]
    Cancelled,

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl BxError {
    /// Build a [`BxError::FileSystemError`] from an I/O error.
    pub fn filesystem(
        operation: impl Into<String>,
        path: &std::path::Path,
        error: &std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            operation: operation.into(),
            path: path.display().to_string(),
            reason: error.to_string(),
        }
    }

    /// Build a [`BxError::TransportError`] from a reqwest error.
    pub fn transport(url: impl Into<String>, error: &reqwest::Error) -> Self {
        let reason = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            format!("connection failed: {error}")
        } else {
            error.to_string()
        };
        Self::TransportError {
            url: url.into(),
            reason,
        }
    }

    /// Whether this error means the registry could not be reached at all.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::TransportError { .. })
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context about the error in yellow (optional)
/// 3. **Suggestion**: Actionable steps to resolve the issue in green (optional)
///
/// ```rust,no_run
/// use bx_components::core::{BxError, ErrorContext};
///
/// let context = ErrorContext::new(BxError::Cancelled)
///     .with_suggestion("Re-run the command to finish the install")
///     .with_details("Files written before the interrupt are kept");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: BxError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: BxError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`]
///
/// [`BxError`] values anywhere in the chain get tailored suggestions. Other
/// errors are shown with their full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(bx_error) = error.chain().find_map(|e| e.downcast_ref::<BxError>()) {
        return create_error_context(bx_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(BxError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                    reason: io_error.to_string(),
                })
                .with_suggestion("Check write permissions of the output directory")
                .with_details("bx-components needs to create directories and files under the output path");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(BxError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                    reason: io_error.to_string(),
                })
                .with_suggestion("Check that the directory passed with --cwd exists");
            }
            _ => {}
        }
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(BxError::Other {
        message,
    })
}

fn create_error_context(error: BxError) -> ErrorContext {
    match &error {
        BxError::ConfigMissing { path } => {
            let details = format!("No API key is stored at {path}");
            ErrorContext::new(error)
                .with_suggestion("Run 'bx-components config' to store your API key")
                .with_details(details)
        }

        BxError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'bx-components config' to overwrite the stored configuration"),

        BxError::InvalidComponentName { .. } => ErrorContext::new(error)
            .with_details("Component names cannot be empty, '.' or '..', or contain '/' or '\\'")
            .with_suggestion("Run 'bx-components list' to see available components"),

        BxError::ComponentNotFound { name } => {
            let details = format!("The registry has no component named '{name}'");
            ErrorContext::new(error)
                .with_suggestion("Check the spelling or run 'bx-components list' to see available components")
                .with_details(details)
        }

        BxError::RegistryError { status, .. } => {
            let suggestion = match *status {
                401 | 403 => "Your API key was rejected. Run 'bx-components config' to update it",
                500..=599 => "The registry is having problems. Try again later",
                _ => "Check the registry URL passed with --registry",
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        BxError::TransportError { .. } => ErrorContext::new(error)
            .with_suggestion("Check your network connection and that the registry is running")
            .with_details("Use --timeout or --download-timeout to allow slower responses"),

        BxError::CyclicDependency { .. } => ErrorContext::new(error)
            .with_suggestion("Fix the registryDependencies of the listed components in the registry")
            .with_details("Components cannot depend on each other in a loop"),

        BxError::PathTraversal { .. } => ErrorContext::new(error)
            .with_details("The manifest declares a file outside the output directory; nothing was written for it"),

        BxError::FileInstallFailed { component, .. } => {
            let suggestion = format!("Re-run 'bx-components add {component}' to retry this component");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        BxError::Cancelled => ErrorContext::new(error)
            .with_details("Files written before the interrupt were kept"),

        _ => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = BxError::ComponentNotFound {
            name: "foo".to_string(),
        };
        assert_eq!(error.to_string(), "Component 'foo' not found");

        let error = BxError::RegistryError {
            name: "button".to_string(),
            status: 500,
            status_text: "Internal Server Error".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Registry request for 'button' failed: 500 Internal Server Error"
        );

        let error = BxError::CyclicDependency {
            chain: "a → b → a".to_string(),
        };
        assert_eq!(error.to_string(), "Circular dependency detected: a → b → a");
    }

    #[test]
    fn test_file_install_failed_keeps_source() {
        use std::error::Error as _;

        let error = BxError::FileInstallFailed {
            component: "button".to_string(),
            path: "button/Button.vue".to_string(),
            source: Box::new(BxError::DownloadFailed {
                url: "http://localhost/vue/button/Button.vue".to_string(),
                status: 404,
                status_text: "Not Found".to_string(),
            }),
        };

        assert!(error.to_string().contains("button/Button.vue"));
        assert!(error.to_string().contains("button"));
        let source = error.source().unwrap().to_string();
        assert!(source.contains("404"));
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new(BxError::Cancelled).with_suggestion("Run it again");

        let display = format!("{ctx}");
        assert!(display.contains("Installation cancelled"));
        assert!(display.contains("Run it again"));
    }

    #[test]
    fn test_user_friendly_error_config_missing() {
        let error = BxError::ConfigMissing {
            path: "/tmp/none/config.toml".to_string(),
        };
        let ctx = user_friendly_error(anyhow::Error::from(error));

        assert!(matches!(ctx.error, BxError::ConfigMissing { .. }));
        assert!(ctx.suggestion.unwrap().contains("bx-components config"));
        assert!(ctx.details.unwrap().contains("/tmp/none/config.toml"));
    }

    #[test]
    fn test_user_friendly_error_finds_wrapped_error() {
        let error = anyhow::Error::from(BxError::ComponentNotFound {
            name: "card".to_string(),
        })
        .context("Failed to add components");

        let ctx = user_friendly_error(error);
        assert_eq!(
            ctx.error,
            BxError::ComponentNotFound {
                name: "card".to_string()
            }
        );
    }

    #[test]
    fn test_user_friendly_error_unauthorized() {
        let error = BxError::RegistryError {
            name: "button".to_string(),
            status: 401,
            status_text: "Unauthorized".to_string(),
        };
        let ctx = user_friendly_error(anyhow::Error::from(error));
        assert!(ctx.suggestion.unwrap().contains("API key"));
    }

    #[test]
    fn test_user_friendly_error_generic() {
        let error = anyhow::anyhow!("root cause").context("outer");
        let ctx = user_friendly_error(error);

        match ctx.error {
            BxError::Other { message } => {
                assert!(message.contains("outer"));
                assert!(message.contains("Caused by:"));
                assert!(message.contains("root cause"));
            }
            other => panic!("Expected Other error, got {other:?}"),
        }
    }

    #[test]
    fn test_user_friendly_error_permission_denied() {
        use std::io::{Error, ErrorKind};

        let io_error = Error::new(ErrorKind::PermissionDenied, "access denied");
        let ctx = user_friendly_error(anyhow::Error::from(io_error));

        assert!(matches!(ctx.error, BxError::FileSystemError { .. }));
        assert!(ctx.suggestion.is_some());
        assert!(ctx.details.is_some());
    }
}
