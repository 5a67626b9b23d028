//! Shared test utilities for the listing builder crate.

use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub use crate::artifact::sha256_hex;

/// Build a `package.json` body with the given identity fields.
pub fn manifest_json(id: &str, name: &str, version: &str) -> String {
    format!(r#"{{"id":"{id}","name":"{name}","version":"{version}"}}"#)
}

/// Build an in-memory zip archive from `(entry name, contents)` pairs.
///
/// # Panics
///
/// Panics if the archive cannot be written, which only happens for
/// duplicate entry names.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(contents).expect("write zip entry");
    }
    writer.finish().expect("finish zip archive").into_inner()
}

/// Build a package archive with a root `package.json` and one asset.
pub fn package_archive(id: &str, name: &str, version: &str) -> Vec<u8> {
    let manifest = manifest_json(id, name, version);
    zip_archive(&[
        ("package.json", manifest.as_bytes()),
        ("Runtime/Widget.cs", b"public class Widget {}".as_slice()),
    ])
}
