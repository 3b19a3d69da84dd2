use std::fs;
use std::path::PathBuf;

use crate::model::{read_feed, SourceFeed};
use crate::XmlError;

fn fixture(path: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn vendor_feed() -> SourceFeed {
    read_feed(&fixture("vendor_feed.xml")).expect("vendor feed parse failed")
}

#[test]
fn reads_products_in_feed_order() {
    let feed = vendor_feed();
    let codes: Vec<&str> = feed.products.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["1001", "1002"]);
}

#[test]
fn collects_top_level_scripts_in_order() {
    let feed = vendor_feed();
    assert_eq!(feed.scripts.len(), 2);
    assert_eq!(
        feed.scripts[0].attributes,
        vec![("type".to_string(), "text/javascript".to_string())]
    );
    assert_eq!(feed.scripts[0].text.as_deref(), Some("window.feedVersion = 3;"));
    assert_eq!(feed.scripts[1].text.as_deref(), Some("trackFeed();"));
}

#[test]
fn scalar_fields_are_cleaned() {
    let product = &vendor_feed().products[0];
    assert_eq!(product.ws_code, "WS-1001");
    assert_eq!(product.cat2_name, "Garters");
    assert_eq!(product.category_path, "Lingerie > Garters");
    assert_eq!(product.name, "Lace Garter Set");
    assert_eq!(product.detail, "Soft lace garter,\nhand finished.");
    assert_eq!(product.vat, "20");
}

#[test]
fn variants_keep_their_own_values() {
    let product = &vendor_feed().products[0];
    assert_eq!(product.variants.len(), 2);
    assert_eq!(product.variants[0].type1, "Black");
    assert_eq!(product.variants[0].stock, "5");
    assert_eq!(product.variants[0].barcode, "B1");
    assert_eq!(product.variants[1].type2, "M");
    assert_eq!(product.variants[1].stock, "0");
    assert_eq!(product.variants[1].barcode, "B2");
}

#[test]
fn images_keep_order_and_empty_entries() {
    let feed = vendor_feed();
    assert_eq!(
        feed.products[0].images,
        vec![
            "https://cdn.example.com/1001/front.jpg",
            "https://cdn.example.com/1001/back.jpg",
            "https://cdn.example.com/1001/detail.jpg",
        ]
    );
    assert_eq!(
        feed.products[1].images,
        vec!["", "https://cdn.example.com/1002/only.jpg"]
    );
}

#[test]
fn sparse_product_defaults_to_empty_fields() {
    let product = &vendor_feed().products[1];
    assert!(product.variants.is_empty());
    assert_eq!(product.barcode, "");
    assert_eq!(product.brand, "");
    assert_eq!(product.vat, "");
    assert_eq!(product.stock, "");
}

#[test]
fn malformed_feed_is_an_error() {
    let err = read_feed("<root><product><code>1</product></root>").unwrap_err();
    assert!(matches!(err, XmlError::Malformed { .. }));
}
