//! Shared HTTP plumbing for the registry client and the file fetcher.
//!
//! Both talk to the same registry host with the same credential header, so
//! they share one [`reqwest::Client`] built from an [`HttpConfig`]. Automatic
//! redirects are disabled on that client: the file fetcher follows them
//! itself so it can bound the chain and keep the original destination.

use reqwest::Client;
use reqwest::redirect::Policy;
use std::time::Duration;
use url::Url;

use crate::constants::{CONNECT_TIMEOUT, DOWNLOAD_IDLE_TIMEOUT, MANIFEST_TIMEOUT, MAX_REDIRECTS};
use crate::core::BxError;

/// Network settings shared by every request of one CLI invocation
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,
    /// Time allowed for a complete manifest request
    pub manifest_timeout: Duration,
    /// Time allowed between body chunks (and for the response headers) of a file
    pub download_idle_timeout: Duration,
    /// Maximum redirects followed per file
    pub max_redirects: usize,
    /// `User-Agent` header value
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
            manifest_timeout: MANIFEST_TIMEOUT,
            download_idle_timeout: DOWNLOAD_IDLE_TIMEOUT,
            max_redirects: MAX_REDIRECTS,
            user_agent: format!("bx-components/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    /// Build the shared client.
    pub fn build_client(&self) -> Result<Client, BxError> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .redirect(Policy::none())
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| BxError::Other {
                message: format!("Failed to create HTTP client: {e}"),
            })
    }
}

/// Parse a registry base URL given on the command line.
pub fn parse_base_url(raw: &str) -> Result<Url, BxError> {
    let url = Url::parse(raw).map_err(|e| BxError::ConfigError {
        message: format!("Invalid registry URL '{raw}': {e}"),
    })?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(BxError::ConfigError {
            message: format!("Registry URL '{raw}' must be an http(s) URL"),
        });
    }

    Ok(url)
}

/// Append `/`-separated segments to a base URL.
///
/// Used for manifest file paths, which are meant to span several levels. Each
/// segment is percent-encoded on its own, so `?` and `#` stay in the path. A
/// trailing slash on the base is ignored. Use [`push_segment`] for a value
/// that must stay one level.
///
/// ```rust
/// use bx_components::http::join_segments;
/// use url::Url;
///
/// let base = Url::parse("http://localhost:1923/").unwrap();
/// let url = join_segments(&base, "vue/button/Button.vue");
/// assert_eq!(url.as_str(), "http://localhost:1923/vue/button/Button.vue");
/// ```
#[must_use]
pub fn join_segments(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty();
        segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
    }
    url
}

/// Append exactly one path segment to a base URL.
///
/// `/` inside `segment` is percent-encoded instead of starting a new level.
///
/// ```rust
/// use bx_components::http::push_segment;
/// use url::Url;
///
/// let base = Url::parse("http://localhost:1923/").unwrap();
/// assert_eq!(push_segment(&base, "vue/button").as_str(), "http://localhost:1923/vue%2Fbutton");
/// ```
#[must_use]
pub fn push_segment(base: &Url, segment: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    url
}

/// Whether two URLs share scheme, host and port.
#[must_use]
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}
