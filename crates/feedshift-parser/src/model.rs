//! Typed view of the vendor product feed.
//!
//! Every scalar is read through [`child_text`], so a field that is missing in
//! the feed is simply `""` here.

use crate::accessor::child_text;
use crate::errors::XmlError;
use crate::sanitize::clean_text;
use crate::tree::{parse_document, Element};

pub const SCRIPT_TAG: &str = "script";
pub const PRODUCT_TAG: &str = "product";
pub const VARIANTS_TAG: &str = "subproducts";
pub const VARIANT_TAG: &str = "subproduct";
pub const IMAGES_TAG: &str = "images";
pub const IMAGE_TAG: &str = "img_item";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceVariant {
    pub type1: String,
    pub type2: String,
    pub stock: String,
    pub barcode: String,
}

impl SourceVariant {
    pub fn from_element(element: &Element) -> Self {
        Self {
            type1: child_text(element, "type1"),
            type2: child_text(element, "type2"),
            stock: child_text(element, "stock"),
            barcode: child_text(element, "barcode"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceProduct {
    pub code: String,
    pub ws_code: String,
    pub barcode: String,
    pub cat1_name: String,
    pub cat2_name: String,
    pub cat1_code: String,
    pub category_path: String,
    pub brand: String,
    pub name: String,
    pub detail: String,
    pub variants: Vec<SourceVariant>,
    /// Cleaned image references in feed order; entries may be empty.
    pub images: Vec<String>,
    pub price_list: String,
    pub price_special: String,
    pub vat: String,
    pub currency: String,
    pub desi: String,
    pub stock: String,
}

impl SourceProduct {
    pub fn from_element(element: &Element) -> Self {
        let variants: Vec<SourceVariant> = element
            .first_child(VARIANTS_TAG)
            .map(|container| {
                container
                    .children_named(VARIANT_TAG)
                    .map(SourceVariant::from_element)
                    .collect()
            })
            .unwrap_or_default();

        let images: Vec<String> = element
            .first_child(IMAGES_TAG)
            .map(|container| {
                container
                    .children_named(IMAGE_TAG)
                    .map(|image| clean_text(image.text.as_deref()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            code: child_text(element, "code"),
            ws_code: child_text(element, "ws_code"),
            barcode: child_text(element, "barcode"),
            cat1_name: child_text(element, "cat1name"),
            cat2_name: child_text(element, "cat2name"),
            cat1_code: child_text(element, "cat1code"),
            category_path: child_text(element, "category_path"),
            brand: child_text(element, "brand"),
            name: child_text(element, "name"),
            detail: child_text(element, "detail"),
            variants,
            images,
            price_list: child_text(element, "price_list_vat_included"),
            price_special: child_text(element, "price_special_vat_included"),
            vat: child_text(element, "vat"),
            currency: child_text(element, "currency"),
            desi: child_text(element, "desi"),
            stock: child_text(element, "stock"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceFeed {
    /// Top-level `<script>` elements, kept untouched.
    pub scripts: Vec<Element>,
    pub products: Vec<SourceProduct>,
}

impl SourceFeed {
    pub fn from_root(root: &Element) -> Self {
        Self {
            scripts: root.children_named(SCRIPT_TAG).cloned().collect(),
            products: root
                .children_named(PRODUCT_TAG)
                .map(SourceProduct::from_element)
                .collect(),
        }
    }
}

pub fn read_feed(content: &str) -> Result<SourceFeed, XmlError> {
    let root = parse_document(content)?;
    Ok(SourceFeed::from_root(&root))
}
