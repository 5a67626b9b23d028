//! Release URL resolution for GitHub repositories.
//!
//! Each `githubRepos` entry in a listing source expands into the download
//! URLs of every `.zip` asset across the repository's releases. Order is
//! kept exactly as the API reports it (releases first, then assets within
//! a release) because it becomes the order of packages in the listing.

use crate::error::BuilderError;
use crate::http::{DownloadError, HttpClient};
use crate::outcome::Outcome;
use log::{debug, error, info, trace};
use serde::Deserialize;
use std::fmt;

/// Default GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size requested from the releases endpoint (the API maximum).
const RELEASES_PER_PAGE: usize = 100;

/// Extension an asset must have to be considered a package archive.
const ARCHIVE_EXTENSION: &str = ".zip";

/// A repository reference of the form `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    owner: String,
    name: String,
}

impl RepoRef {
    /// Split `reference` into owner and name.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::RepositoryReferenceMalformed`] unless the
    /// reference has exactly two non-empty `/`-separated parts.
    ///
    /// # Examples
    ///
    /// ```
    /// use vpm_listing_builder::github::RepoRef;
    ///
    /// let repo = RepoRef::parse("acme/widget").expect("valid reference");
    /// assert_eq!(repo.owner(), "acme");
    /// assert!(RepoRef::parse("acme/widget/extra").is_err());
    /// ```
    pub fn parse(reference: &str) -> Result<Self, BuilderError> {
        let parts: Vec<&str> = reference.split('/').collect();
        match parts.as_slice() {
            [owner, name] if !owner.trim().is_empty() && !name.trim().is_empty() => Ok(Self {
                owner: owner.trim().to_owned(),
                name: name.trim().to_owned(),
            }),
            _ => Err(BuilderError::RepositoryReferenceMalformed {
                reference: reference.to_owned(),
            }),
        }
    }

    /// Repository owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A release as reported by the releases endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Git tag the release was cut from.
    #[serde(default)]
    pub tag_name: Option<String>,
    /// Files attached to the release, in API order.
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    /// Asset file name.
    pub name: String,
    /// Direct download URL.
    pub browser_download_url: String,
}

impl Release {
    /// Download URLs of the release's `.zip` assets, in asset order.
    pub fn archive_urls(&self) -> impl Iterator<Item = &str> {
        self.assets
            .iter()
            .filter(|asset| asset.name.ends_with(ARCHIVE_EXTENSION))
            .map(|asset| asset.browser_download_url.as_str())
    }
}

/// Trait for querying a repository host, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseSource {
    /// Report whether the repository exists.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cannot be queried. An absent
    /// repository is `Ok(false)`, not an error.
    fn repository_exists(&self, repo: &RepoRef) -> Result<bool, DownloadError>;

    /// Return the repository's full release history, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error when any page of the history cannot be fetched or
    /// decoded.
    fn list_releases(&self, repo: &RepoRef) -> Result<Vec<Release>, DownloadError>;
}

/// [`ReleaseSource`] backed by the GitHub REST API.
pub struct GitHubClient<'a> {
    http: &'a HttpClient,
    api_url: String,
}

impl<'a> GitHubClient<'a> {
    /// Create a client for the API rooted at `api_url`.
    #[must_use]
    pub fn new(http: &'a HttpClient, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_owned(),
        }
    }

    fn repository_url(&self, repo: &RepoRef) -> String {
        format!("{}/repos/{}/{}", self.api_url, repo.owner, repo.name)
    }

    fn releases_page_url(&self, repo: &RepoRef, page: usize) -> String {
        format!(
            "{}/releases?per_page={RELEASES_PER_PAGE}&page={page}",
            self.repository_url(repo)
        )
    }
}

impl ReleaseSource for GitHubClient<'_> {
    fn repository_exists(&self, repo: &RepoRef) -> Result<bool, DownloadError> {
        match self.http.get_api_text(&self.repository_url(repo)) {
            Ok(_) => Ok(true),
            Err(DownloadError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn list_releases(&self, repo: &RepoRef) -> Result<Vec<Release>, DownloadError> {
        collect_pages(|page| {
            let url = self.releases_page_url(repo, page);
            debug!("Fetching releases page {page} for {repo}");
            self.http.get_api_text(&url).map(|body| (url, body))
        })
    }
}

/// Fetch release pages from 1 upwards until a short page, keeping API order.
///
/// `fetch` returns the requested URL together with the page body.
fn collect_pages<F>(mut fetch: F) -> Result<Vec<Release>, DownloadError>
where
    F: FnMut(usize) -> Result<(String, String), DownloadError>,
{
    let mut releases = Vec::new();
    for page in 1.. {
        let (url, body) = fetch(page)?;
        let batch: Vec<Release> =
            serde_json::from_str(&body).map_err(|e| DownloadError::HttpError {
                url,
                reason: format!("invalid release list: {e}"),
            })?;
        let is_last_page = batch.len() < RELEASES_PER_PAGE;
        releases.extend(batch);
        if is_last_page {
            break;
        }
    }
    Ok(releases)
}

/// Expand `reference` into the download URLs of its release archives.
///
/// Returns [`Outcome::SoftSkip`] when the repository has no releases and
/// [`Outcome::Fatal`] when the reference is malformed, the repository does
/// not exist, or the host cannot be queried.
pub fn resolve_release_urls(host: &dyn ReleaseSource, reference: &str) -> Outcome<Vec<String>> {
    let repo = match RepoRef::parse(reference) {
        Ok(repo) => repo,
        Err(err) => {
            error!("Could not get owner and repository from included repo info {reference:?}");
            return Outcome::Fatal(err);
        }
    };

    match host.repository_exists(&repo) {
        Ok(true) => {}
        Ok(false) => {
            error!("Could not get remote repo {repo}");
            return Outcome::Fatal(BuilderError::RepositoryNotFound {
                owner: repo.owner,
                name: repo.name,
            });
        }
        Err(source) => return Outcome::Fatal(release_query_error(repo, source)),
    }

    let releases = match host.list_releases(&repo) {
        Ok(releases) => releases,
        Err(source) => return Outcome::Fatal(release_query_error(repo, source)),
    };

    if releases.is_empty() {
        info!("Found no releases for {repo}");
        return Outcome::skip(format!("{repo} has no releases"));
    }

    let mut urls = Vec::new();
    for release in &releases {
        let before = urls.len();
        urls.extend(release.archive_urls().map(str::to_owned));
        trace!(
            "Release {} of {repo} has {} archive(s)",
            release.tag_name.as_deref().unwrap_or("(untagged)"),
            urls.len() - before
        );
    }
    debug!(
        "Found {} archive(s) across {} release(s) of {repo}",
        urls.len(),
        releases.len()
    );
    Outcome::Success(urls)
}

fn release_query_error(repo: RepoRef, source: DownloadError) -> BuilderError {
    error!("Release query for {repo} failed: {source}");
    BuilderError::ReleaseQuery {
        owner: repo.owner,
        name: repo.name,
        source,
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
