//! Build configuration resolved from CLI arguments and the host environment.
//!
//! The hosting environment decides three things: whether this is a server
//! build (publish in place, consult the published listing), which token
//! authenticates GitHub requests, and where the published listing lives.

use crate::cli::BuildArgs;
use crate::writer::{LISTING_FILENAME, WriteMode};
use camino::{Utf8Path, Utf8PathBuf};
use std::env;

/// Default publish directory, relative to the working directory.
pub const DEFAULT_PUBLISH_DIRECTORY: &str = "docs";

/// Source folder used by local runs, relative to the parent directory.
pub const LOCAL_SOURCE_FOLDER: &str = "package-index";

/// Capabilities supplied by the hosting environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnvironment {
    /// True when running on a CI server.
    pub is_server_build: bool,
    /// Token for authenticated GitHub requests.
    pub token: Option<String>,
    /// Owner of the repository being built.
    pub repository_owner: Option<String>,
    /// The repository being built, as `owner/name`.
    pub repository: Option<String>,
}

impl HostEnvironment {
    /// Read the GitHub Actions environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            is_server_build: env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true"),
            token: non_empty_var("GITHUB_TOKEN"),
            repository_owner: non_empty_var("GITHUB_REPOSITORY_OWNER"),
            repository: non_empty_var("GITHUB_REPOSITORY"),
        }
    }

    /// Location of the listing this repository publishes, e.g.
    /// `https://acme.github.io/listing/index.json`.
    ///
    /// Returns `None` when the owner or repository name is unknown.
    #[must_use]
    pub fn published_listing_url(&self) -> Option<String> {
        let owner = self.repository_owner.as_deref()?;
        let repository = self.repository.as_deref()?;
        let name = repository.split('/').nth(1).filter(|n| !n.is_empty())?;
        Some(format!("https://{owner}.github.io/{name}/{LISTING_FILENAME}"))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Everything a build needs, resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Path to the listing source document.
    pub source_path: Utf8PathBuf,
    /// Directory the listing is written into.
    pub publish_dir: Utf8PathBuf,
    /// How the publish directory is prepared.
    pub write_mode: WriteMode,
    /// Where the previously published listing lives, if it is consulted.
    pub published_listing_url: Option<String>,
    /// Root of the GitHub REST API.
    pub api_url: String,
    /// Bearer token for GitHub requests.
    pub token: Option<String>,
}

impl BuildConfig {
    /// Resolve the configuration for a build started in `root`.
    ///
    /// Explicit arguments win. Otherwise server builds read the source
    /// from the parent of `root`, write in place, and consult the listing
    /// computed from the host environment; local runs read from
    /// `../package-index`, clean the publish directory first, and skip the
    /// published listing.
    #[must_use]
    pub fn resolve(args: &BuildArgs, host: &HostEnvironment, root: &Utf8Path) -> Self {
        let parent = root.parent().unwrap_or(root);
        let source_folder = args.source_folder.clone().unwrap_or_else(|| {
            if host.is_server_build {
                parent.to_owned()
            } else {
                parent.join(LOCAL_SOURCE_FOLDER)
            }
        });

        let published_listing_url = args.current_listing_url.clone().or_else(|| {
            host.is_server_build
                .then(|| host.published_listing_url())
                .flatten()
        });

        Self {
            source_path: source_folder.join(&args.source_filename),
            publish_dir: args
                .list_publish_directory
                .clone()
                .unwrap_or_else(|| root.join(DEFAULT_PUBLISH_DIRECTORY)),
            write_mode: if host.is_server_build {
                WriteMode::InPlace
            } else {
                WriteMode::Clean
            },
            published_listing_url,
            api_url: args.github_api_url.clone(),
            token: host
                .is_server_build
                .then(|| host.token.clone())
                .flatten(),
        }
    }
}
