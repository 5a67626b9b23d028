//! Listing documents: the one this tool publishes and the one it reads back.

use crate::manifest::PackageManifest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The listing produced by a build.
///
/// Created once per run from the source metadata and the accepted
/// manifests, then serialised by the writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultListing {
    /// Listing display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Listing identifier.
    pub id: String,
    /// Author display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Where the listing is published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Accepted packages, in candidate order.
    pub packages: Vec<PackageManifest>,
}

/// A previously published listing, read only for its artefact URLs.
///
/// Both the flat layout this tool writes (`packages: [manifest, ...]`) and
/// the VPM repository layout (`packages: {id: {versions: {v: manifest}}}`)
/// are accepted. Entries are not validated beyond their `url`.
#[derive(Debug, Default, Deserialize)]
pub struct ExistingListing {
    #[serde(default)]
    packages: PublishedPackages,
}

#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum PublishedPackages {
    Flat(Vec<PublishedEntry>),
    ById(HashMap<String, PublishedVersions>),
    #[default]
    Empty,
}

#[derive(Debug, Deserialize)]
struct PublishedVersions {
    #[serde(default)]
    versions: HashMap<String, PublishedEntry>,
}

#[derive(Debug, Deserialize)]
struct PublishedEntry {
    #[serde(default)]
    url: Option<String>,
}

impl ExistingListing {
    /// Every artefact URL the listing references.
    pub fn urls(&self) -> Vec<&str> {
        match &self.packages {
            PublishedPackages::Flat(entries) => {
                entries.iter().filter_map(|e| e.url.as_deref()).collect()
            }
            PublishedPackages::ById(by_id) => by_id
                .values()
                .flat_map(|package| package.versions.values())
                .filter_map(|e| e.url.as_deref())
                .collect(),
            PublishedPackages::Empty => Vec::new(),
        }
    }
}
