//! Shared stubs for the listing builder integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::fs;
use std::sync::Mutex;
use vpm_listing_builder::config::BuildConfig;
use vpm_listing_builder::github::{Release, ReleaseAsset, ReleaseSource, RepoRef};
use vpm_listing_builder::http::{ArtifactDownloader, DownloadError};
use vpm_listing_builder::writer::WriteMode;

/// In-memory repository host keyed by `owner/name`.
#[derive(Default)]
pub struct StubReleases {
    repositories: HashMap<String, Vec<Release>>,
}

impl StubReleases {
    /// Register a repository with releases given newest first as lists of
    /// `(asset name, download URL)` pairs.
    pub fn with_repository(mut self, reference: &str, releases: &[&[(&str, &str)]]) -> Self {
        let releases = releases
            .iter()
            .map(|assets| Release {
                tag_name: None,
                assets: assets
                    .iter()
                    .map(|(name, url)| ReleaseAsset {
                        name: (*name).to_owned(),
                        browser_download_url: (*url).to_owned(),
                    })
                    .collect(),
            })
            .collect();
        self.repositories.insert(reference.to_owned(), releases);
        self
    }
}

impl ReleaseSource for StubReleases {
    fn repository_exists(&self, repo: &RepoRef) -> Result<bool, DownloadError> {
        Ok(self.repositories.contains_key(&repo.to_string()))
    }

    fn list_releases(&self, repo: &RepoRef) -> Result<Vec<Release>, DownloadError> {
        Ok(self
            .repositories
            .get(&repo.to_string())
            .cloned()
            .unwrap_or_default())
    }
}

/// In-memory downloader that records every URL it is asked for.
#[derive(Default)]
pub struct StubDownloader {
    artifacts: HashMap<String, Vec<u8>>,
    listing: Option<String>,
    requested: Mutex<Vec<String>>,
}

impl StubDownloader {
    /// Serve `bytes` at `url`.
    pub fn with_artifact(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.artifacts.insert(url.to_owned(), bytes);
        self
    }

    /// Serve `body` for any listing request.
    pub fn with_listing(mut self, body: &str) -> Self {
        self.listing = Some(body.to_owned());
        self
    }

    /// Artefact URLs requested so far, in request order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().expect("lock").clone()
    }
}

impl ArtifactDownloader for StubDownloader {
    fn download_artifact(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.requested.lock().expect("lock").push(url.to_owned());
        self.artifacts
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::NotFound {
                url: url.to_owned(),
            })
    }

    fn download_listing(&self, url: &str) -> Result<String, DownloadError> {
        self.listing.clone().ok_or_else(|| DownloadError::NotFound {
            url: url.to_owned(),
        })
    }
}

/// A scratch workspace holding a source document and a publish directory.
pub struct Workspace {
    _temp: tempfile::TempDir,
    /// Root of the scratch workspace.
    pub root: Utf8PathBuf,
}

impl Workspace {
    /// Create a workspace whose `source.json` contains `source`.
    pub fn with_source(source: &serde_json::Value) -> Self {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
        fs::write(
            root.join("source.json"),
            serde_json::to_string_pretty(source).expect("serialise source"),
        )
        .expect("write source");
        Self { _temp: temp, root }
    }

    /// Publish directory inside the workspace.
    pub fn publish_dir(&self) -> Utf8PathBuf {
        self.root.join("docs")
    }

    /// Configuration for a local build, optionally consulting a published
    /// listing.
    pub fn config(&self, published_listing_url: Option<&str>) -> BuildConfig {
        BuildConfig {
            source_path: self.root.join("source.json"),
            publish_dir: self.publish_dir(),
            write_mode: WriteMode::Clean,
            published_listing_url: published_listing_url.map(str::to_owned),
            api_url: "https://api.github.test".to_owned(),
            token: None,
        }
    }

    /// Parse the written listing.
    pub fn written_listing(&self) -> serde_json::Value {
        read_json(&self.publish_dir().join("index.json"))
    }
}

/// Read and parse a JSON file.
pub fn read_json(path: &Utf8Path) -> serde_json::Value {
    let body = fs::read_to_string(path).expect("read listing");
    serde_json::from_str(&body).expect("listing is JSON")
}
