//! End-to-end listing builds over stubbed transports.

mod support;

use rstest::rstest;
use serde_json::json;
use std::fs;
use support::{StubDownloader, StubReleases, Workspace};
use vpm_listing_builder::error::BuilderError;
use vpm_listing_builder::pipeline::run_build;
use vpm_listing_builder::test_utils::{package_archive, sha256_hex, zip_archive};

const OLD_URL: &str = "https://github.com/acme/widget/releases/download/1.0.0/widget-1.0.0.zip";
const NEW_URL: &str = "https://github.com/acme/widget/releases/download/1.1.0/widget-1.1.0.zip";
const NOTES_URL: &str = "https://github.com/acme/widget/releases/download/1.0.0/notes.txt";
const LISTING_URL: &str = "https://acme.github.io/listing/index.json";

fn widget_releases() -> StubReleases {
    StubReleases::default().with_repository(
        "acme/widget",
        &[
            &[("widget-1.1.0.zip", NEW_URL)],
            &[("widget-1.0.0.zip", OLD_URL), ("notes.txt", NOTES_URL)],
        ],
    )
}

fn widget_downloader() -> StubDownloader {
    StubDownloader::default()
        .with_artifact(OLD_URL, package_archive("com.acme.widget", "Widget", "1.0.0"))
        .with_artifact(NEW_URL, package_archive("com.acme.widget", "Widget", "1.1.0"))
}

fn repository_source() -> serde_json::Value {
    json!({
        "id": "com.acme.listing",
        "name": "Acme Listing",
        "url": LISTING_URL,
        "author": { "name": "Acme", "email": "dev@acme.test" },
        "githubRepos": ["acme/widget"],
    })
}

#[test]
fn repository_releases_become_listing_packages_newest_first() {
    let workspace = Workspace::with_source(&repository_source());
    let downloader = widget_downloader();

    let report = run_build(&workspace.config(None), &widget_releases(), &downloader)
        .expect("build succeeds");

    assert_eq!(report.package_count, 2);
    assert_eq!(report.listing_path, workspace.publish_dir().join("index.json"));
    assert_eq!(downloader.requested(), [NEW_URL, OLD_URL]);

    let listing = workspace.written_listing();
    assert_eq!(listing["id"], "com.acme.listing");
    assert_eq!(listing["name"], "Acme Listing");
    assert_eq!(listing["author"], "Acme");
    assert_eq!(listing["url"], LISTING_URL);

    let packages = listing["packages"].as_array().expect("packages array");
    let versions: Vec<&str> = packages
        .iter()
        .map(|p| p["version"].as_str().expect("version"))
        .collect();
    assert_eq!(versions, ["1.1.0", "1.0.0"]);
    assert_eq!(packages[0]["url"], NEW_URL);
    assert_eq!(
        packages[0]["zipSHA256"],
        sha256_hex(&package_archive("com.acme.widget", "Widget", "1.1.0"))
    );
}

#[test]
fn explicit_releases_precede_repository_releases() {
    let explicit = "https://cdn.acme.test/gadget-2.0.0.zip";
    let mut source = repository_source();
    source["packages"] = json!([{ "releases": [explicit] }]);
    let workspace = Workspace::with_source(&source);
    let downloader = widget_downloader().with_artifact(
        explicit,
        package_archive("com.acme.gadget", "Gadget", "2.0.0"),
    );

    run_build(&workspace.config(None), &widget_releases(), &downloader).expect("build succeeds");

    assert_eq!(downloader.requested(), [explicit, NEW_URL, OLD_URL]);
    let listing = workspace.written_listing();
    assert_eq!(listing["packages"][0]["id"], "com.acme.gadget");
}

#[rstest]
#[case::flat_listing(json!({ "packages": [{ "url": OLD_URL }] }))]
#[case::vpm_listing(json!({
    "packages": { "com.acme.widget": { "versions": { "1.0.0": { "url": OLD_URL } } } }
}))]
fn published_archives_are_not_downloaded_again(#[case] published: serde_json::Value) {
    let workspace = Workspace::with_source(&repository_source());
    let downloader = widget_downloader().with_listing(&published.to_string());

    let report = run_build(
        &workspace.config(Some(LISTING_URL)),
        &widget_releases(),
        &downloader,
    )
    .expect("build succeeds");

    assert_eq!(report.package_count, 1);
    assert_eq!(downloader.requested(), [NEW_URL]);
    assert_eq!(workspace.written_listing()["packages"][0]["url"], NEW_URL);
}

#[test]
fn unavailable_published_listing_means_nothing_is_known() {
    let workspace = Workspace::with_source(&repository_source());
    let downloader = widget_downloader();

    let report = run_build(
        &workspace.config(Some(LISTING_URL)),
        &widget_releases(),
        &downloader,
    )
    .expect("build succeeds");

    assert_eq!(report.package_count, 2);
}

#[test]
fn archives_without_a_manifest_are_skipped() {
    let workspace = Workspace::with_source(&repository_source());
    let downloader = StubDownloader::default()
        .with_artifact(NEW_URL, zip_archive(&[("README.md", b"no manifest here".as_slice())]))
        .with_artifact(OLD_URL, package_archive("com.acme.widget", "Widget", "1.0.0"));

    let report = run_build(&workspace.config(None), &widget_releases(), &downloader)
        .expect("build succeeds");

    assert_eq!(report.package_count, 1);
    assert_eq!(workspace.written_listing()["packages"][0]["version"], "1.0.0");
}

#[test]
fn repository_without_releases_yields_an_empty_listing() {
    let workspace = Workspace::with_source(&repository_source());
    let releases = StubReleases::default().with_repository("acme/widget", &[]);

    let report = run_build(&workspace.config(None), &releases, &StubDownloader::default())
        .expect("build succeeds");

    assert_eq!(report.package_count, 0);
    assert_eq!(workspace.written_listing()["packages"], json!([]));
}

#[test]
fn null_fields_are_omitted_from_the_listing() {
    let source = json!({
        "id": "com.acme.listing",
        "packages": [{ "releases": [OLD_URL] }],
    });
    let workspace = Workspace::with_source(&source);
    let manifest = br#"{
        "id": "com.acme.widget",
        "name": "Widget",
        "version": "1.0.0",
        "description": null,
        "unity": "2022.3"
    }"#;
    let downloader = StubDownloader::default().with_artifact(
        OLD_URL,
        zip_archive(&[("package.json", manifest.as_slice())]),
    );

    run_build(&workspace.config(None), &StubReleases::default(), &downloader)
        .expect("build succeeds");

    let body = fs::read_to_string(workspace.publish_dir().join("index.json")).expect("read");
    assert!(!body.contains("null"));
    let listing = workspace.written_listing();
    assert!(listing.get("name").is_none());
    assert!(listing.get("author").is_none());
    assert!(listing["packages"][0].get("description").is_none());
    assert_eq!(listing["packages"][0]["unity"], "2022.3");
}

#[test]
fn repeated_builds_write_identical_listings() {
    let workspace = Workspace::with_source(&repository_source());
    let path = workspace.publish_dir().join("index.json");

    run_build(&workspace.config(None), &widget_releases(), &widget_downloader())
        .expect("first build");
    let first = fs::read(&path).expect("read first");
    run_build(&workspace.config(None), &widget_releases(), &widget_downloader())
        .expect("second build");
    let second = fs::read(&path).expect("read second");

    assert_eq!(first, second);
}

#[test]
fn blank_source_id_fails_without_writing() {
    let workspace = Workspace::with_source(&json!({ "id": "  ", "githubRepos": ["acme/widget"] }));

    let err = run_build(&workspace.config(None), &widget_releases(), &widget_downloader())
        .expect_err("blank id is rejected");

    assert!(matches!(err, BuilderError::InvalidSource { .. }));
    assert!(!workspace.publish_dir().exists());
}

#[test]
fn unknown_repository_fails_without_writing() {
    let mut source = repository_source();
    source["githubRepos"] = json!(["acme/missing"]);
    let workspace = Workspace::with_source(&source);

    let err = run_build(&workspace.config(None), &widget_releases(), &widget_downloader())
        .expect_err("unknown repository is fatal");

    assert!(matches!(
        err,
        BuilderError::RepositoryNotFound { ref owner, ref name }
            if owner == "acme" && name == "missing"
    ));
    assert!(!workspace.publish_dir().exists());
}

#[test]
fn corrupt_archive_fails_the_build() {
    let workspace = Workspace::with_source(&repository_source());
    let downloader = widget_downloader().with_artifact(NEW_URL, b"not a zip".to_vec());

    let err = run_build(&workspace.config(None), &widget_releases(), &downloader)
        .expect_err("corrupt archive is fatal");

    assert!(matches!(err, BuilderError::ArtifactInvalid { .. }));
    assert_eq!(downloader.requested(), [NEW_URL]);
    assert!(!workspace.publish_dir().exists());
}

#[test]
fn missing_source_is_reported_with_its_path() {
    let workspace = Workspace::with_source(&repository_source());
    let mut config = workspace.config(None);
    config.source_path = workspace.root.join("absent.json");

    let err = run_build(&config, &widget_releases(), &widget_downloader())
        .expect_err("missing source is fatal");

    assert!(matches!(
        err,
        BuilderError::SourceNotFound { ref path } if path == &config.source_path
    ));
}
