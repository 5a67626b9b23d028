//! Error types for the listing builder.
//!
//! Every variant here is fatal: it unwinds the run and no listing is
//! written. Conditions the pipeline tolerates (a repository without
//! releases, an archive without a manifest, an unavailable previous listing)
//! never become a [`BuilderError`]; they travel as
//! [`Outcome::SoftSkip`](crate::outcome::Outcome::SoftSkip) or are absorbed
//! where they occur.

use crate::http::DownloadError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort a listing build.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// The listing source document does not exist.
    #[error("could not find listing source at {path}")]
    SourceNotFound {
        /// Path where the source document was expected.
        path: Utf8PathBuf,
    },

    /// The listing source document could not be used.
    #[error("invalid listing source at {path}: {reason}")]
    InvalidSource {
        /// Path to the offending source document.
        path: Utf8PathBuf,
        /// Description of what is wrong with it.
        reason: String,
    },

    /// A `githubRepos` entry is not of the form `owner/name`.
    #[error("could not get owner and repository from {reference:?}; expected owner/name")]
    RepositoryReferenceMalformed {
        /// The entry as written in the source document.
        reference: String,
    },

    /// The upstream host does not know the repository.
    #[error("could not get remote repo {owner}/{name}")]
    RepositoryNotFound {
        /// Repository owner.
        owner: String,
        /// Repository name.
        name: String,
    },

    /// Querying a repository or its releases failed for a reason other than
    /// the repository being absent.
    #[error("release query for {owner}/{name} failed")]
    ReleaseQuery {
        /// Repository owner.
        owner: String,
        /// Repository name.
        name: String,
        /// The transport failure.
        #[source]
        source: DownloadError,
    },

    /// A candidate artefact could not be downloaded.
    #[error("could not find valid zip file at {url}")]
    ArtifactFetch {
        /// The artefact URL.
        url: String,
        /// The transport failure.
        #[source]
        source: DownloadError,
    },

    /// The downloaded artefact is not a readable zip archive.
    #[error("artefact at {url} is not a valid zip archive: {reason}")]
    ArtifactInvalid {
        /// The artefact URL.
        url: String,
        /// Description of the archive failure.
        reason: String,
    },

    /// The archive contains a `package.json` that cannot be used.
    #[error("invalid package manifest in {url}: {reason}")]
    ManifestInvalid {
        /// The artefact URL.
        url: String,
        /// Description of the manifest failure.
        reason: String,
    },

    /// The listing could not be written to its destination.
    #[error("failed to write listing to {path}")]
    WriteFailed {
        /// Destination path.
        path: Utf8PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialisation failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for listing builder operations.
pub type Result<T> = std::result::Result<T, BuilderError>;
