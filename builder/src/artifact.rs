//! Artefact validation.
//!
//! Downloads a candidate archive, looks for `package.json` at its root and,
//! when present, turns it into a [`PackageManifest`] stamped with the fetch
//! URL and the SHA-256 of the complete archive bytes.

use crate::error::BuilderError;
use crate::http::ArtifactDownloader;
use crate::manifest::{MANIFEST_FILENAME, PackageManifest, parse_manifest};
use crate::outcome::Outcome;
use log::{debug, error};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read};
use zip::ZipArchive;
use zip::result::ZipError;

/// Download and validate the artefact at `url`.
///
/// Returns [`Outcome::SoftSkip`] when the archive has no root
/// `package.json`. Any download failure, unreadable archive, or invalid
/// manifest is [`Outcome::Fatal`].
pub fn validate_artifact(
    downloader: &dyn ArtifactDownloader,
    url: &str,
) -> Outcome<PackageManifest> {
    let bytes = match downloader.download_artifact(url) {
        Ok(bytes) => bytes,
        Err(source) => {
            error!("Could not find valid zip file at {url}: {source}");
            return Outcome::Fatal(BuilderError::ArtifactFetch {
                url: url.to_owned(),
                source,
            });
        }
    };
    debug!("Downloaded {} bytes from {url}", bytes.len());
    manifest_from_archive(&bytes, url)
}

/// Extract and stamp the manifest from already downloaded archive bytes.
pub fn manifest_from_archive(bytes: &[u8], url: &str) -> Outcome<PackageManifest> {
    let manifest_bytes = match read_manifest_entry(bytes) {
        Ok(Some(entry)) => entry,
        Ok(None) => return Outcome::skip(format!("no {MANIFEST_FILENAME} in {url}")),
        Err(err) => {
            return Outcome::Fatal(BuilderError::ArtifactInvalid {
                url: url.to_owned(),
                reason: err.to_string(),
            });
        }
    };

    let text = match String::from_utf8(manifest_bytes) {
        Ok(text) => text,
        Err(err) => {
            return Outcome::Fatal(BuilderError::ManifestInvalid {
                url: url.to_owned(),
                reason: format!("{MANIFEST_FILENAME} is not UTF-8: {err}"),
            });
        }
    };

    match parse_manifest(&text) {
        Ok(manifest) => Outcome::Success(manifest.with_artifact(url, sha256_hex(bytes))),
        Err(err) => Outcome::Fatal(BuilderError::ManifestInvalid {
            url: url.to_owned(),
            reason: err.to_string(),
        }),
    }
}

/// Read the root `package.json` entry from a zip archive held in memory.
///
/// Returns `Ok(None)` when the archive is valid but has no such entry.
///
/// # Errors
///
/// Returns an error if `bytes` is not a readable zip archive or the entry
/// cannot be decompressed.
pub fn read_manifest_entry(bytes: &[u8]) -> Result<Option<Vec<u8>>, ZipError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entry = match archive.by_name(MANIFEST_FILENAME) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(err),
    };
    let mut contents = Vec::new();
    entry.read_to_end(&mut contents)?;
    Ok(Some(contents))
}

/// Lowercase hex SHA-256 of `bytes`.
///
/// # Examples
///
/// ```
/// use vpm_listing_builder::artifact::sha256_hex;
///
/// assert_eq!(
///     sha256_hex(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
