//! Listing source documents.
//!
//! The source is the hand-maintained `source.json` that declares a
//! listing's metadata together with where its packages come from: explicit
//! release URLs and GitHub repositories whose releases are scanned.

use crate::error::{BuilderError, Result};
use camino::Utf8Path;
use log::error;
use serde::{Deserialize, Deserializer, Serialize};

/// A parsed listing source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSource {
    /// Listing identifier; required and non-blank.
    #[serde(default)]
    pub id: String,
    /// Listing display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Listing author.
    #[serde(default)]
    pub author: Option<Author>,
    /// Where the listing is published.
    #[serde(default)]
    pub url: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Link to further information about the listing.
    #[serde(default)]
    pub info_link: Option<InfoLink>,
    /// Packages with explicitly listed release URLs.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub packages: Vec<PackageSource>,
    /// Repositories, as `owner/name`, whose release assets are scanned.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub github_repos: Vec<String>,
}

/// Listing author details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Homepage.
    #[serde(default)]
    pub url: Option<String>,
    /// Contact address.
    #[serde(default)]
    pub email: Option<String>,
}

/// A titled link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoLink {
    /// Link text.
    #[serde(default)]
    pub text: Option<String>,
    /// Link target.
    #[serde(default)]
    pub url: Option<String>,
}

/// A package declared directly in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSource {
    /// Archive URLs, one per release.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub releases: Vec<String>,
}

/// Read an explicit `null` list as an empty one.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ListingSource {
    /// Author display name, if the source declares one.
    #[must_use]
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().and_then(|a| a.name.as_deref())
    }

    /// Every explicitly declared release URL, in document order.
    pub fn release_urls(&self) -> impl Iterator<Item = &str> {
        self.packages
            .iter()
            .flat_map(|p| p.releases.iter().map(String::as_str))
    }
}

/// Read and validate the listing source at `path`.
///
/// # Errors
///
/// Returns [`BuilderError::SourceNotFound`] when `path` is not a file, and
/// [`BuilderError::InvalidSource`] when the document is not valid JSON, is
/// `null`, or has a blank `id`.
pub fn load_source(path: &Utf8Path) -> Result<ListingSource> {
    if !path.is_file() {
        error!("Could not find Listing Source at {path}");
        return Err(BuilderError::SourceNotFound {
            path: path.to_owned(),
        });
    }

    let contents = std::fs::read_to_string(path)?;
    parse_source(&contents, path)
}

/// Parse source text; `path` is used for error reporting only.
fn parse_source(contents: &str, path: &Utf8Path) -> Result<ListingSource> {
    let parsed: Option<ListingSource> =
        serde_json::from_str(contents).map_err(|e| BuilderError::InvalidSource {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;

    let Some(source) = parsed else {
        error!("Fail to get Listing Source");
        return Err(BuilderError::InvalidSource {
            path: path.to_owned(),
            reason: "document is empty".to_owned(),
        });
    };

    if source.id.trim().is_empty() {
        error!("You need a id for your list. Add a id on {path}");
        return Err(BuilderError::InvalidSource {
            path: path.to_owned(),
            reason: "the listing needs a non-empty id".to_owned(),
        });
    }

    Ok(source)
}
