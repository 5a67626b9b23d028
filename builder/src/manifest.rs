//! Package manifest schema.
//!
//! A [`PackageManifest`] is the `package.json` found at the root of a
//! release archive, normalised for publication: the typed identity fields
//! are validated, every other field is carried through in its original
//! order, and the artefact location and digest are stamped in by the
//! validator.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// File name of the manifest entry inside a package archive.
pub const MANIFEST_FILENAME: &str = "package.json";

const UTF8_BOM: char = '\u{feff}';

/// A package manifest as published in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package identifier, e.g. `com.acme.widget`.
    pub id: String,
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// Human-facing package name.
    #[serde(
        rename = "displayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Minimum supported Unity version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unity: Option<String>,
    /// Location of the artefact this manifest was read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Lowercase hex SHA-256 of the whole artefact.
    #[serde(rename = "zipSHA256", default, skip_serializing_if = "Option::is_none")]
    pub zip_sha256: Option<String>,
    /// All remaining manifest fields, in document order.
    #[serde(flatten, serialize_with = "serialize_without_nulls")]
    pub extra: Map<String, Value>,
}

impl PackageManifest {
    /// Point the manifest at the artefact it was read from.
    ///
    /// Any `url` the manifest declared itself is replaced.
    #[must_use]
    pub fn with_artifact(mut self, url: &str, zip_sha256: String) -> Self {
        self.url = Some(url.to_owned());
        self.zip_sha256 = Some(zip_sha256);
        self
    }
}

/// Errors arising from manifest parsing.
#[derive(Debug, thiserror::Error)]
pub enum ManifestParseError {
    /// JSON deserialisation failed, including missing required fields.
    #[error("manifest parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required identity field is empty.
    #[error("manifest field `{field}` must not be empty")]
    EmptyField {
        /// The offending field name.
        field: &'static str,
    },
}

/// Parse `package.json` text into a validated [`PackageManifest`].
///
/// A leading byte-order mark is ignored.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, or if `id`, `name` or
/// `version` is missing or blank.
///
/// # Examples
///
/// ```
/// use vpm_listing_builder::manifest::parse_manifest;
///
/// let manifest = parse_manifest(r#"{"id":"com.acme.widget","name":"Widget","version":"1.0.0"}"#)
///     .expect("valid manifest");
/// assert_eq!(manifest.id, "com.acme.widget");
/// ```
pub fn parse_manifest(json: &str) -> Result<PackageManifest, ManifestParseError> {
    let manifest: PackageManifest = serde_json::from_str(json.trim_start_matches(UTF8_BOM))?;
    for (field, value) in [
        ("id", &manifest.id),
        ("name", &manifest.name),
        ("version", &manifest.version),
    ] {
        if value.trim().is_empty() {
            return Err(ManifestParseError::EmptyField { field });
        }
    }
    Ok(manifest)
}

fn serialize_without_nulls<S>(extra: &Map<String, Value>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(extra.iter().filter(|(_, value)| !value.is_null()))
}
