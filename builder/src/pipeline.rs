//! Listing build orchestration.
//!
//! Wires the source loader, the assembler, and the writer together. The
//! transports are injected so the whole run can be exercised without a
//! network.

use crate::assembler::ListingAssembler;
use crate::config::BuildConfig;
use crate::error::Result;
use crate::github::{GitHubClient, ReleaseSource};
use crate::http::{ArtifactDownloader, HttpClient};
use crate::source::load_source;
use crate::writer::{ListingInfo, write_listing};
use camino::Utf8PathBuf;
use log::{debug, info};

/// Summary of a completed build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Where the listing was written.
    pub listing_path: Utf8PathBuf,
    /// Number of packages in the written listing.
    pub package_count: usize,
}

/// Build the listing described by `config` using the given transports.
///
/// The listing file is only written once every candidate has been
/// processed, so a fatal error leaves the publish directory untouched.
///
/// # Errors
///
/// Returns the first fatal error: an unreadable source, a failed repository
/// or artefact query, an invalid manifest, or a failed write.
pub fn run_build(
    config: &BuildConfig,
    releases: &dyn ReleaseSource,
    downloader: &dyn ArtifactDownloader,
) -> Result<BuildReport> {
    let source = load_source(&config.source_path)?;
    info!("Loaded listing source {} from {}", source.id, config.source_path);

    let listing = ListingAssembler::new(releases, downloader)
        .assemble(&source, config.published_listing_url.as_deref())?;
    let package_count = listing.packages.len();

    let listing_path = write_listing(&listing, &config.publish_dir, config.write_mode)?;
    ListingInfo::from_source(&source).log();

    Ok(BuildReport {
        listing_path,
        package_count,
    })
}

/// Build the listing described by `config` over HTTP.
///
/// # Errors
///
/// See [`run_build`].
pub fn run(config: &BuildConfig) -> Result<BuildReport> {
    let http = HttpClient::new(config.token.clone());
    if http.is_authenticated() {
        debug!("Using authenticated GitHub requests");
    }
    let github = GitHubClient::new(&http, &config.api_url);
    run_build(config, &github, &http)
}
