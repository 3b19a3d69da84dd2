use feedshift_parser::{write_document, Element, XmlError};

use crate::output::{
    OutputFeed, OutputProduct, OutputVariant, ACTIVE_FLAG, IMAGE_TAG_PREFIX, PLACEHOLDER_BRAND_ID,
    PRIMARY_AXIS_LABEL, PRODUCT_TAG, ROOT_TAG, SECONDARY_AXIS_LABEL, VARIANTS_TAG, VARIANT_TAG,
};

fn variant_element(variant: &OutputVariant) -> Element {
    let mut element = Element::new(VARIANT_TAG);
    element
        .push_text("name1", PRIMARY_AXIS_LABEL)
        .push_text("value1", variant.primary_value.as_str())
        .push_text("name2", SECONDARY_AXIS_LABEL)
        .push_text("value2", variant.secondary_value.as_str())
        .push_text("quantity", variant.quantity.as_str())
        .push_text("barcode", variant.barcode.as_str());
    element
}

/// Builds one `<product>` with its children in the order the consumer reads them.
pub fn product_element(product: &OutputProduct) -> Element {
    let mut element = Element::new(PRODUCT_TAG);
    element
        .push_text("id", product.id.as_str())
        .push_text("productCode", product.product_code.as_str())
        .push_text("barcode", product.barcode.as_str())
        .push_text("main_category", product.main_category.as_str())
        .push_text("top_category", product.top_category.as_str())
        .push_text("sub_category", product.sub_category.as_str())
        .push_text("sub_category_", "")
        .push_text("categoryID", product.category_id.as_str())
        .push_text("category", product.category.as_str())
        .push_text("active", ACTIVE_FLAG)
        .push_text("brandID", PLACEHOLDER_BRAND_ID)
        .push_text("brand", product.brand.as_str())
        .push_text("name", product.name.as_str())
        .push_text("description", product.description.as_str());

    let mut variants = Element::new(VARIANTS_TAG);
    for variant in &product.variants {
        variants.push(variant_element(variant));
    }
    element.push(variants);

    for (index, image) in product.images.iter().enumerate() {
        element.push_text(&format!("{IMAGE_TAG_PREFIX}{}", index + 1), image.as_str());
    }

    element
        .push_text("listPrice", product.list_price.as_str())
        .push_text("price", product.price.as_str())
        .push_text("tax", product.tax.to_string())
        .push_text("currency", product.currency.as_str())
        .push_text("desi", product.desi.as_str())
        .push_text("quantity", product.quantity.as_str());
    element
}

pub fn feed_element(feed: &OutputFeed) -> Element {
    let mut root = Element::new(ROOT_TAG);
    root.children.extend(feed.scripts.iter().cloned());
    root.children.extend(feed.products.iter().map(product_element));
    root
}

/// Serializes the feed with its XML declaration, ready for upload.
pub fn render_feed(feed: &OutputFeed) -> Result<String, XmlError> {
    write_document(&feed_element(feed))
}
