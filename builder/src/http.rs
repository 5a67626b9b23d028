//! HTTP transport shared by every network stage of a build.
//!
//! One [`HttpClient`] is constructed per run and borrowed by the
//! existing-listing fetch, the release queries, and the artefact downloads.
//! Artefact retrieval sits behind the [`ArtifactDownloader`] trait so tests
//! can substitute canned archives for real downloads.

use std::time::Duration;

/// Per-request timeout applied to every call made through the client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// User agent sent with artefact and listing downloads.
pub const ARTIFACT_USER_AGENT: &str = "VCCBootstrap/1.0";

/// User agent sent with GitHub API requests.
pub const API_USER_AGENT: &str = "VRChat-Package-Manager-Automation";

const GITHUB_HOSTS: &[&str] = &["github.com", "api.github.com"];

/// Domain suffix of GitHub Pages sites, where published listings live.
const PAGES_SUFFIX: &str = ".github.io";

/// Trait for downloading artefacts and published listings.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactDownloader {
    /// Download the complete body of the artefact at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with a
    /// non-success status.
    fn download_artifact(&self, url: &str) -> Result<Vec<u8>, DownloadError>;

    /// Download a previously published listing document as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with a
    /// non-success status.
    fn download_listing(&self, url: &str) -> Result<String, DownloadError>;
}

/// Errors arising from HTTP transfers.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The request could not be completed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The server answered 404.
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The server answered with another non-success status.
    #[error("HTTP {status} for {url}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

/// Blocking HTTP client backed by a single `ureq` agent.
///
/// The agent is created in [`HttpClient::new`] and reused for every call
/// until the client is dropped at the end of the run.
pub struct HttpClient {
    agent: ureq::Agent,
    token: Option<String>,
}

impl HttpClient {
    /// Create a client that authenticates with `token` when one is given.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            token,
        }
    }

    /// Return true when requests carry a bearer token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// GET a GitHub API resource and return the body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not 2xx.
    pub fn get_api_text(&self, url: &str) -> Result<String, DownloadError> {
        let mut request = self
            .agent
            .get(url)
            .header("User-Agent", API_USER_AGENT)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        let mut response = request.call().map_err(|e| map_ureq_error(url, &e))?;
        response
            .body_mut()
            .read_to_string()
            .map_err(|e| body_error(url, &e))
    }

    fn bearer_for(&self, url: &str) -> Option<String> {
        match &self.token {
            Some(token) if is_github_url(url) => Some(format!("Bearer {token}")),
            _ => None,
        }
    }

    /// Like [`Self::bearer_for`], but also authorises GitHub Pages hosts.
    fn listing_bearer_for(&self, url: &str) -> Option<String> {
        match &self.token {
            Some(token) if is_github_url(url) || is_pages_url(url) => {
                Some(format!("Bearer {token}"))
            }
            _ => None,
        }
    }
}

impl ArtifactDownloader for HttpClient {
    fn download_artifact(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let mut request = self.agent.get(url).header("User-Agent", ARTIFACT_USER_AGENT);
        if let Some(bearer) = self.bearer_for(url) {
            request = request.header("Authorization", bearer);
        }
        let mut response = request.call().map_err(|e| map_ureq_error(url, &e))?;
        response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| body_error(url, &e))
    }

    /// Fetch the published listing, authenticated in server builds.
    ///
    /// The token is sent to GitHub and to GitHub Pages hosts, which is
    /// where the computed listing location points.
    fn download_listing(&self, url: &str) -> Result<String, DownloadError> {
        let mut request = self
            .agent
            .get(url)
            .header("User-Agent", ARTIFACT_USER_AGENT)
            .header("Accept", "application/octet-stream");
        if let Some(bearer) = self.listing_bearer_for(url) {
            request = request.header("Authorization", bearer);
        }
        let mut response = request.call().map_err(|e| map_ureq_error(url, &e))?;
        response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(|e| body_error(url, &e))
    }
}

/// Return true when `url` points at a GitHub host.
///
/// The bearer token is only ever sent to GitHub; explicit release URLs in a
/// listing source may point anywhere.
fn is_github_url(url: &str) -> bool {
    url_host(url).is_some_and(|host| {
        GITHUB_HOSTS
            .iter()
            .any(|candidate| host.eq_ignore_ascii_case(candidate))
    })
}

/// Return true when `url` points at a `*.github.io` site.
fn is_pages_url(url: &str) -> bool {
    url_host(url).is_some_and(|host| {
        let host = host.to_ascii_lowercase();
        host.len() > PAGES_SUFFIX.len() && host.ends_with(PAGES_SUFFIX)
    })
}

/// Host part of an absolute URL, without user info or port.
fn url_host(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?;
    host.split(':').next()
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        ureq::Error::StatusCode(status) => DownloadError::Status {
            url: url.to_owned(),
            status: *status,
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

fn body_error(url: &str, err: &ureq::Error) -> DownloadError {
    DownloadError::HttpError {
        url: url.to_owned(),
        reason: format!("failed to read response body: {err}"),
    }
}
