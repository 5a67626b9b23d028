//! Listing assembly.
//!
//! Merges explicit release URLs with the URLs resolved from repositories,
//! drops the ones already published, validates the rest one at a time in
//! candidate order, and wraps the accepted manifests in a
//! [`ResultListing`].

use crate::artifact::validate_artifact;
use crate::error::Result;
use crate::existing::{KnownUrls, fetch_known_urls};
use crate::github::{ReleaseSource, resolve_release_urls};
use crate::http::ArtifactDownloader;
use crate::listing::ResultListing;
use crate::manifest::PackageManifest;
use crate::outcome::Outcome;
use crate::source::ListingSource;
use log::info;

/// Builds a listing from a source using injected transports.
pub struct ListingAssembler<'a> {
    releases: &'a dyn ReleaseSource,
    downloader: &'a dyn ArtifactDownloader,
}

impl<'a> ListingAssembler<'a> {
    /// Create an assembler over the given release host and downloader.
    #[must_use]
    pub fn new(releases: &'a dyn ReleaseSource, downloader: &'a dyn ArtifactDownloader) -> Self {
        Self {
            releases,
            downloader,
        }
    }

    /// Run the whole assembly for `source`.
    ///
    /// `published_listing_url` locates the previously published listing;
    /// `None` skips deduplication.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error raised while resolving repositories or
    /// validating artefacts. Nothing is returned for a partial run.
    pub fn assemble(
        &self,
        source: &ListingSource,
        published_listing_url: Option<&str>,
    ) -> Result<ResultListing> {
        let known = fetch_known_urls(self.downloader, published_listing_url);
        let candidates = candidate_urls(source, self.releases)?;
        let packages = self.accept_new(&candidates, &known)?;
        info!("All packages prepared, generating Listing");
        Ok(build_listing(source, packages))
    }

    /// Validate every candidate not in `known`, keeping candidate order.
    ///
    /// # Errors
    ///
    /// Returns the first fatal validation error.
    pub fn accept_new(
        &self,
        candidates: &[String],
        known: &KnownUrls,
    ) -> Result<Vec<PackageManifest>> {
        let mut packages = Vec::new();
        for url in candidates {
            info!("Looking at {url}");
            if known.contains(url) {
                info!("Current listing already contains {url}, skipping");
                continue;
            }

            match validate_artifact(self.downloader, url) {
                Outcome::Success(manifest) => {
                    info!(
                        "Found {} ({}) {}, adding to listing",
                        manifest.id, manifest.name, manifest.version
                    );
                    packages.push(manifest);
                }
                Outcome::SoftSkip { reason } => {
                    info!("Could not find manifest in zip file {url}, skipping ({reason})");
                }
                Outcome::Fatal(err) => return Err(err),
            }
        }
        Ok(packages)
    }
}

/// Build the ordered candidate sequence for `source`.
///
/// Explicit release URLs come first in document order, followed by each
/// repository's archive URLs in declaration order.
///
/// # Errors
///
/// Returns the first fatal error from repository resolution.
pub fn candidate_urls(source: &ListingSource, releases: &dyn ReleaseSource) -> Result<Vec<String>> {
    let mut candidates: Vec<String> = source.release_urls().map(str::to_owned).collect();

    for reference in &source.github_repos {
        match resolve_release_urls(releases, reference) {
            Outcome::Success(urls) => candidates.extend(urls),
            Outcome::SoftSkip { reason } => info!("Skipping {reference}: {reason}"),
            Outcome::Fatal(err) => return Err(err),
        }
    }

    Ok(candidates)
}

/// Wrap accepted manifests with the source's listing metadata.
#[must_use]
pub fn build_listing(source: &ListingSource, packages: Vec<PackageManifest>) -> ResultListing {
    ResultListing {
        name: source.name.clone(),
        id: source.id.clone(),
        author: source.author_name().map(str::to_owned),
        url: source.url.clone(),
        packages,
    }
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
