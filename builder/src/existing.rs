//! Known-URL set from the previously published listing.
//!
//! Artefacts already present in the published listing are trusted as-is
//! and never downloaded again. The published listing is a soft
//! dependency: when it cannot be fetched or read, every candidate is
//! treated as new.

use crate::http::ArtifactDownloader;
use crate::listing::ExistingListing;
use log::{debug, error, info, warn};
use std::collections::HashSet;

/// Artefact URLs already present in the published listing.
///
/// Lookups are exact, case-sensitive string matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownUrls(HashSet<String>);

impl KnownUrls {
    /// Return true when `url` is already published.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.0.contains(url)
    }

    /// Number of distinct published URLs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true when nothing is published yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for KnownUrls {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Collect the artefact URLs of the listing published at `listing_url`.
///
/// `None` means there is no hosting context to compute the listing location
/// from (a local run); the fetch is skipped. Download and parse failures are
/// logged and produce an empty set.
pub fn fetch_known_urls(
    downloader: &dyn ArtifactDownloader,
    listing_url: Option<&str>,
) -> KnownUrls {
    let Some(url) = listing_url else {
        debug!("No published listing location; treating every candidate as new");
        return KnownUrls::default();
    };

    let body = match downloader.download_listing(url) {
        Ok(body) => body,
        Err(err) => {
            error!("Could not download manifest from {url}: {err}");
            return KnownUrls::default();
        }
    };

    let known = known_urls_from_listing(&body);
    info!("Published listing at {url} references {} artefact(s)", known.len());
    known
}

/// Parse listing text and collect its artefact URLs.
///
/// Empty or unparseable text yields an empty set.
pub fn known_urls_from_listing(body: &str) -> KnownUrls {
    if body.trim().is_empty() {
        warn!("Published listing is empty");
        return KnownUrls::default();
    }
    match serde_json::from_str::<Option<ExistingListing>>(body) {
        Ok(Some(listing)) => listing.urls().into_iter().collect(),
        Ok(None) => KnownUrls::default(),
        Err(err) => {
            warn!("Could not read published listing: {err}");
            KnownUrls::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{DownloadError, MockArtifactDownloader};
    use rstest::rstest;

    const LISTING_URL: &str = "https://acme.github.io/listing/index.json";
    const PUBLISHED: &str = r#"{"id":"l","packages":[
        {"id":"a","name":"A","version":"1","url":"https://x.test/a1.zip"}
    ]}"#;

    #[test]
    fn local_runs_skip_the_fetch() {
        let mut downloader = MockArtifactDownloader::new();
        downloader.expect_download_listing().never();
        assert!(fetch_known_urls(&downloader, None).is_empty());
    }

    #[test]
    fn collects_urls_from_published_listing() {
        let mut downloader = MockArtifactDownloader::new();
        downloader
            .expect_download_listing()
            .withf(|url| url == LISTING_URL)
            .times(1)
            .returning(|_| Ok(PUBLISHED.to_owned()));

        let known = fetch_known_urls(&downloader, Some(LISTING_URL));
        assert!(known.contains("https://x.test/a1.zip"));
        assert_eq!(known.len(), 1);
    }

    #[rstest]
    #[case::not_found(DownloadError::NotFound { url: LISTING_URL.to_owned() })]
    #[case::server_error(DownloadError::Status { url: LISTING_URL.to_owned(), status: 500 })]
    #[case::network(DownloadError::HttpError {
        url: LISTING_URL.to_owned(),
        reason: "dns".to_owned(),
    })]
    fn download_failure_yields_empty_set(#[case] failure: DownloadError) {
        let mut downloader = MockArtifactDownloader::new();
        downloader
            .expect_download_listing()
            .return_once(move |_| Err(failure));
        assert!(fetch_known_urls(&downloader, Some(LISTING_URL)).is_empty());
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("  \n")]
    #[case::null("null")]
    #[case::html("<!doctype html><title>404</title>")]
    #[case::wrong_shape(r#"{"packages":"nope"}"#)]
    fn unreadable_listing_yields_empty_set(#[case] body: &str) {
        assert!(known_urls_from_listing(body).is_empty());
    }

    #[test]
    fn lookups_are_case_sensitive() {
        let known: KnownUrls = ["https://x.test/A.zip"].into_iter().collect();
        assert!(known.contains("https://x.test/A.zip"));
        assert!(!known.contains("https://x.test/a.zip"));
    }
}
