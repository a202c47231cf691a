//! Streaming file downloads.
//!
//! [`FileFetcher::fetch`] writes a remote file to a local path:
//!
//! 1. Creates the destination's parent directories
//! 2. Sends an authenticated `GET`
//! 3. Follows `301`/`302`/`303`/`307`/`308` redirects up to a fixed number of
//!    hops, always writing to the originally requested destination
//! 4. Streams the body chunk by chunk into the file
//!
//! Writes are not atomic: a transfer that fails halfway leaves a partial file
//! behind. Re-running the install replaces it when `--overwrite` is given.

use futures::StreamExt;
use reqwest::header::LOCATION;
use reqwest::{Client, Response};
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use crate::config::Credential;
use crate::constants::AUTH_HEADER;
use crate::core::BxError;
use crate::http::{HttpConfig, same_origin};

/// Downloads component files
#[derive(Debug, Clone)]
pub struct FileFetcher {
    client: Client,
    config: HttpConfig,
}

impl FileFetcher {
    /// Create a fetcher with its own HTTP connection pool.
    pub fn new(config: HttpConfig) -> Result<Self, BxError> {
        let client = config.build_client()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a fetcher sharing an existing connection pool.
    ///
    /// The client must not follow redirects on its own.
    #[must_use]
    pub const fn with_client(client: Client, config: HttpConfig) -> Self {
        Self {
            client,
            config,
        }
    }

    /// Download `source` into `destination`, returning the number of bytes written.
    ///
    /// The credential is sent to `source` and to redirect targets on the same
    /// origin; it is withheld once a redirect leaves that origin.
    ///
    /// # Errors
    ///
    /// - [`BxError::DownloadFailed`] for a non-success terminal status
    /// - [`BxError::TooManyRedirects`] when the chain exceeds the configured limit
    /// - [`BxError::TransportError`] for connection, timeout or stream failures
    /// - [`BxError::FileSystemError`] when the destination cannot be written
    pub async fn fetch(
        &self,
        source: &Url,
        destination: &Path,
        credential: &Credential,
    ) -> Result<u64, BxError> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BxError::filesystem("create directory", parent, &e))?;
        }

        let response = self.follow(source, credential).await?;
        self.stream_to_file(response, destination).await
    }

    /// Resolve redirects until a terminal response arrives.
    async fn follow(&self, source: &Url, credential: &Credential) -> Result<Response, BxError> {
        let mut current = source.clone();
        let mut hops = 0usize;

        loop {
            let mut request = self.client.get(current.clone());
            if same_origin(source, &current) {
                request = request.header(AUTH_HEADER, credential.expose());
            }

            let response = tokio::time::timeout(self.config.download_idle_timeout, request.send())
                .await
                .map_err(|_| timed_out(&current))?
                .map_err(|e| BxError::transport(current.as_str(), &e))?;

            let status = response.status();
            if status.is_redirection() {
                if let Some(target) = redirect_target(&current, &response) {
                    if hops >= self.config.max_redirects {
                        return Err(BxError::TooManyRedirects {
                            url: source.to_string(),
                            limit: self.config.max_redirects,
                        });
                    }
                    hops += 1;
                    debug!("Redirect {} ({}) -> {}", current, status.as_u16(), target);
                    current = target;
                    continue;
                }
            }

            if !status.is_success() {
                return Err(BxError::DownloadFailed {
                    url: current.to_string(),
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                });
            }

            return Ok(response);
        }
    }

    async fn stream_to_file(&self, response: Response, destination: &Path) -> Result<u64, BxError> {
        let url = response.url().to_string();
        let mut file = File::create(destination)
            .await
            .map_err(|e| BxError::filesystem("create", destination, &e))?;

        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        loop {
            let next = tokio::time::timeout(self.config.download_idle_timeout, stream.next())
                .await
                .map_err(|_| BxError::TransportError {
                    url: url.clone(),
                    reason: format!(
                        "timed out after {}s without data",
                        self.config.download_idle_timeout.as_secs()
                    ),
                })?;

            match next {
                Some(Ok(chunk)) => {
                    file.write_all(&chunk)
                        .await
                        .map_err(|e| BxError::filesystem("write", destination, &e))?;
                    written += chunk.len() as u64;
                }
                Some(Err(e)) => return Err(BxError::transport(url, &e)),
                None => break,
            }
        }

        file.flush().await.map_err(|e| BxError::filesystem("flush", destination, &e))?;
        debug!("Wrote {} bytes to {}", written, destination.display());

        Ok(written)
    }
}

/// `Location` of a redirect response, resolved against the request URL.
fn redirect_target(current: &Url, response: &Response) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    current.join(location).ok()
}

fn timed_out(url: &Url) -> BxError {
    BxError::TransportError {
        url: url.to_string(),
        reason: "request timed out".to_string(),
    }
}
