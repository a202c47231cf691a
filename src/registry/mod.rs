//! Registry client for component manifests.
//!
//! The registry exposes two lookups:
//!
//! - `GET <base>/` - every component manifest
//! - `GET <base>/<name>` - one manifest, `404` when unknown
//!
//! Requests carry the API key in the `bx_auth` header. There are no retries:
//! a failed attempt is returned to the caller immediately.

mod manifest;

pub use manifest::{ComponentKind, ComponentManifest, FileRef};

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::Credential;
use crate::constants::AUTH_HEADER;
use crate::core::{BxError, Framework};
use crate::http::{HttpConfig, join_segments, push_segment};

/// Fetches manifests from one registry
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: Url,
    config: HttpConfig,
}

impl RegistryClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(base_url: Url, config: HttpConfig) -> Result<Self, BxError> {
        let client = config.build_client()?;
        Ok(Self::with_client(client, base_url, config))
    }

    /// Create a client sharing an existing connection pool.
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url, config: HttpConfig) -> Self {
        Self {
            client,
            base_url,
            config,
        }
    }

    /// Registry base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL of a framework's raw files, `<base>/<framework>`.
    #[must_use]
    pub fn framework_base(&self, framework: Framework) -> Url {
        join_segments(&self.base_url, framework.as_str())
    }

    /// Fetch the manifest of a single component.
    ///
    /// # Errors
    ///
    /// - [`BxError::InvalidComponentName`] before any request if `name` is
    ///   empty, `.`, `..`, or contains a path separator
    /// - [`BxError::ComponentNotFound`] on `404`
    /// - [`BxError::RegistryError`] on any other non-success status
    /// - [`BxError::TransportError`] on connection failure or timeout
    /// - [`BxError::InvalidManifest`] if the body is not a manifest
    pub async fn fetch_manifest(
        &self,
        name: &str,
        credential: &Credential,
    ) -> Result<ComponentManifest, BxError> {
        validate_name(name)?;
        let url = push_segment(&self.base_url, name);
        debug!("Fetching manifest for '{}' from {}", name, url);

        let response = self.get(&url, credential).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(BxError::ComponentNotFound {
                name: name.to_string(),
            });
        }
        if !status.is_success() {
            return Err(registry_error(name, status));
        }

        let manifest: ComponentManifest = parse_body(name, &url, response).await?;
        if manifest.name != name {
            tracing::warn!(
                "Registry returned manifest '{}' when asked for '{}'",
                manifest.name,
                name
            );
        }

        Ok(manifest)
    }

    /// Fetch every manifest the registry knows about.
    pub async fn list_components(
        &self,
        credential: &Credential,
    ) -> Result<Vec<ComponentManifest>, BxError> {
        let url = self.base_url.clone();
        debug!("Listing components from {}", url);

        let response = self.get(&url, credential).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(registry_error("*", status));
        }

        parse_body("*", &url, response).await
    }

    async fn get(&self, url: &Url, credential: &Credential) -> Result<Response, BxError> {
        self.client
            .get(url.clone())
            .header(AUTH_HEADER, credential.expose())
            .timeout(self.config.manifest_timeout)
            .send()
            .await
            .map_err(|e| BxError::transport(url.as_str(), &e))
    }
}

/// A component name must address exactly one registry entry.
fn validate_name(name: &str) -> Result<(), BxError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(BxError::InvalidComponentName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn registry_error(name: &str, status: StatusCode) -> BxError {
    BxError::RegistryError {
        name: name.to_string(),
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

async fn parse_body<T: DeserializeOwned>(
    name: &str,
    url: &Url,
    response: Response,
) -> Result<T, BxError> {
    let body = response.bytes().await.map_err(|e| BxError::transport(url.as_str(), &e))?;

    serde_json::from_slice(&body).map_err(|e| BxError::InvalidManifest {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
