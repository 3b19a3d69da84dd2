use std::fs;
use std::path::PathBuf;

use feedshift_core::error::PipelineError;
use feedshift_core::fetch::StaticFeedSource;
use feedshift_core::pipeline::{convert_document, run, RunOptions};
use feedshift_core::settings::{Settings, TransformSettings};
use feedshift_core::transform::VatPolicy;
use feedshift_parser::parse_document;
use feedshift_transfer::MemoryServer;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../feedshift-parser/tests/data")
        .join(name)
}

fn vendor_source() -> StaticFeedSource {
    StaticFeedSource(fs::read_to_string(fixture_path("vendor_feed.xml")).expect("failed to read fixture"))
}

fn settings(directory: &str) -> Settings {
    Settings::from_toml_str(&format!(
        r#"
        [source]
        url = "https://vendor.example/xml/?R=1"

        [destination]
        host = "ftp.example.com"
        username = "feeds"
        password = "secret"
        directory = "{directory}"
        filename = "products.xml"
        "#
    ))
    .expect("settings parse failed")
}

#[test]
fn convert_document_reports_counts() {
    let source = vendor_source();
    let converted = convert_document(&source.0, &TransformSettings::default()).expect("convert failed");

    assert_eq!(converted.products, 2);
    assert_eq!(converted.variants, 2);
    assert_eq!(converted.images, 5);

    let root = parse_document(&converted.xml).expect("output must parse");
    assert_eq!(
        root.child_names(),
        vec!["script", "script", "product", "product"]
    );
}

#[test]
fn publishes_into_a_newly_created_directory() {
    let server = MemoryServer::new().with_directory("/public_html");
    let summary = run(
        &settings("/public_html/feeds/"),
        &vendor_source(),
        Some(&server.connector()),
        &RunOptions::default(),
    )
    .expect("run failed");

    assert!(summary.published);
    assert_eq!(summary.products, 2);
    assert!(server.has_directory("/public_html/feeds"));

    let written = server
        .file("/public_html/feeds/products.xml")
        .expect("feed was not written");
    assert_eq!(written.len(), summary.bytes);
    assert!(written.starts_with(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
}

#[test]
fn unreachable_destination_is_reported_as_not_published() {
    let server = MemoryServer::new().refusing_connections();
    let summary = run(
        &settings("/feeds"),
        &vendor_source(),
        Some(&server.connector()),
        &RunOptions::default(),
    )
    .expect("conversion itself should succeed");

    assert!(!summary.published);
    assert!(server.file_paths().is_empty());
}

#[test]
fn dry_run_writes_local_copy_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let local = dir.path().join("out.xml");

    let mut settings = settings("/feeds");
    settings.destination.host.clear();
    settings.validate(false).expect("dry run needs only the source");

    let summary = run(
        &settings,
        &vendor_source(),
        None,
        &RunOptions {
            local_copy: Some(local.clone()),
        },
    )
    .expect("dry run failed");

    assert!(!summary.published);
    let written = fs::read_to_string(&local).expect("local copy missing");
    assert_eq!(written.len(), summary.bytes);
}

#[test]
fn invalid_vat_stops_the_run_before_upload() {
    let server = MemoryServer::new();
    let source = StaticFeedSource("<root><product><code>5</code><vat>yirmi</vat></product></root>".into());

    let err = run(&settings("/"), &source, Some(&server.connector()), &RunOptions::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Transform(_)));
    assert_eq!(server.sessions_opened(), 0);

    let mut lenient = settings("/");
    lenient.transform.invalid_vat = VatPolicy::Zero;
    let summary = run(&lenient, &source, Some(&server.connector()), &RunOptions::default())
        .expect("zero policy run failed");
    assert!(summary.published);
}

#[test]
fn malformed_source_is_an_xml_error() {
    let server = MemoryServer::new();
    let source = StaticFeedSource("<root><product>".into());
    let err = run(&settings("/"), &source, Some(&server.connector()), &RunOptions::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Xml(_)));
}
