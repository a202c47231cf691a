//! Persisted API key storage.
//!
//! The credential record is a small TOML file holding a single `api_key`
//! field. It lives in the user's config directory by default:
//!
//! - **Unix/macOS**: `~/.config/bx-components/config.toml` (or the platform equivalent)
//! - **Windows**: `%APPDATA%\bx-components\config.toml`
//!
//! A missing file is reported as [`BxError::ConfigMissing`] so callers can
//! prompt for a key. A file that exists but cannot be read, parsed or holds an
//! empty key is a [`BxError::ConfigError`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use crate::core::BxError;

/// An opaque API key
///
/// `Debug` never prints the key itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw API key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for use in request headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// On-disk shape of the credential record
#[derive(Debug, Serialize, Deserialize)]
struct StoredConfig {
    api_key: String,
}

/// Reads and writes the credential record at a fixed location
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store backed by the platform default location.
    pub fn new() -> Result<Self, BxError> {
        Ok(Self {
            path: Self::default_path()?,
        })
    }

    /// Store backed by an explicit file, used by `--config` and tests.
    #[must_use]
    pub const fn with_path(path: PathBuf) -> Self {
        Self {
            path,
        }
    }

    /// Store from an optional override, falling back to the default location.
    pub fn from_optional(path: Option<PathBuf>) -> Result<Self, BxError> {
        match path {
            Some(path) => Ok(Self::with_path(path)),
            None => Self::new(),
        }
    }

    /// Default location of the credential record.
    pub fn default_path() -> Result<PathBuf, BxError> {
        let config_dir = dirs::config_dir().ok_or_else(|| BxError::ConfigError {
            message: "Unable to determine the user configuration directory".to_string(),
        })?;

        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Location this store reads from and writes to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a credential record exists.
    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Load the stored credential.
    ///
    /// # Errors
    ///
    /// - [`BxError::ConfigMissing`] if no record exists
    /// - [`BxError::ConfigError`] if the record is unreadable, malformed or empty
    pub async fn load(&self) -> Result<Credential, BxError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BxError::ConfigMissing {
                    path: self.path.display().to_string(),
                });
            }
            Err(e) => {
                return Err(BxError::ConfigError {
                    message: format!("Failed to read {}: {e}", self.path.display()),
                });
            }
        };

        let stored: StoredConfig = toml::from_str(&content).map_err(|e| BxError::ConfigError {
            message: format!("Failed to parse {}: {e}", self.path.display()),
        })?;

        if stored.api_key.trim().is_empty() {
            return Err(BxError::ConfigError {
                message: format!("API key in {} is empty", self.path.display()),
            });
        }

        debug!("Loaded credential from {}", self.path.display());
        Ok(Credential::new(stored.api_key))
    }

    /// Create or replace the credential record.
    ///
    /// Missing parent directories are created first. The whole record is
    /// overwritten; nothing from a previous record is kept.
    pub async fn save(&self, credential: &Credential) -> Result<(), BxError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BxError::filesystem("create directory", parent, &e))?;
        }

        let stored = StoredConfig {
            api_key: credential.expose().to_string(),
        };
        let content = toml::to_string_pretty(&stored).map_err(|e| BxError::ConfigError {
            message: format!("Failed to serialize configuration: {e}"),
        })?;

        fs::write(&self.path, content)
            .await
            .map_err(|e| BxError::filesystem("write", &self.path, &e))?;

        // Owner read/write only, the file holds a credential
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let perms = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, perms)
                .await
                .map_err(|e| BxError::filesystem("set permissions on", &self.path, &e))?;
        }

        debug!("Saved credential to {}", self.path.display());
        Ok(())
    }
}
