//! Listing serialisation and persistence.

use crate::error::{BuilderError, Result};
use crate::listing::ResultListing;
use crate::source::ListingSource;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// File name of the published listing inside the publish directory.
pub const LISTING_FILENAME: &str = "index.json";

/// How the publish directory is prepared before writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Empty the directory first (local runs).
    Clean,
    /// Write alongside existing contents (server builds publish in place).
    InPlace,
}

/// Render `listing` as indented JSON with null fields omitted.
///
/// # Errors
///
/// Returns an error if serialisation fails.
pub fn render_listing(listing: &ResultListing) -> Result<String> {
    Ok(serde_json::to_string_pretty(listing)?)
}

/// Write `listing` to `dir/index.json` and return the written path.
///
/// The listing is staged in a temporary file inside `dir` first, so a
/// failed write never leaves a cleaned directory without its listing.
///
/// # Errors
///
/// Returns [`BuilderError::WriteFailed`] if the directory cannot be
/// prepared or the file cannot be written.
pub fn write_listing(
    listing: &ResultListing,
    dir: &Utf8Path,
    mode: WriteMode,
) -> Result<Utf8PathBuf> {
    let json = render_listing(listing)?;
    let write_failed = |source| BuilderError::WriteFailed {
        path: dir.to_owned(),
        source,
    };

    fs::create_dir_all(dir).map_err(write_failed)?;
    let mut staged = NamedTempFile::new_in(dir).map_err(write_failed)?;
    staged.write_all(json.as_bytes()).map_err(write_failed)?;

    if mode == WriteMode::Clean {
        clean_directory(dir, staged.path()).map_err(write_failed)?;
    }

    let path = dir.join(LISTING_FILENAME);
    staged
        .persist(&path)
        .map_err(|err| BuilderError::WriteFailed {
            path: path.clone(),
            source: err.error,
        })?;
    info!("Saved Listing to {path}");
    Ok(path)
}

/// Remove everything in `dir` except `keep`.
fn clean_directory(dir: &Utf8Path, keep: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path == keep {
            continue;
        }
        debug!("Removing {}", path.display());
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Human-facing summary of a listing, logged after a successful write.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListingInfo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    info_link: LinkInfo<'a>,
    author: AuthorInfo<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct LinkInfo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AuthorInfo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

impl<'a> ListingInfo<'a> {
    /// Summarise the metadata declared in `source`.
    #[must_use]
    pub fn from_source(source: &'a ListingSource) -> Self {
        let link = source.info_link.as_ref();
        let author = source.author.as_ref();
        Self {
            name: source.name.as_deref(),
            url: source.url.as_deref(),
            description: source.description.as_deref(),
            info_link: LinkInfo {
                text: link.and_then(|l| l.text.as_deref()),
                url: link.and_then(|l| l.url.as_deref()),
            },
            author: AuthorInfo {
                name: author.and_then(|a| a.name.as_deref()),
                url: author.and_then(|a| a.url.as_deref()),
                email: author.and_then(|a| a.email.as_deref()),
            },
        }
    }

    /// Log the summary as indented JSON.
    pub fn log(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => info!("Made listingInfo {json}"),
            Err(err) => debug!("Could not render listing info: {err}"),
        }
    }
}
