//! Projection of vendor records onto the destination schema.

use std::fmt;
use std::str::FromStr;

use feedshift_parser::{SourceFeed, SourceProduct, SourceVariant};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::output::{OutputFeed, OutputProduct, OutputVariant, Tax};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("VAT value {0:?} is not a finite number")]
pub struct InvalidVat(pub String);

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("product {product:?}: {source}")]
    InvalidVat {
        product: String,
        #[source]
        source: InvalidVat,
    },
}

/// What to do with a VAT field that is present but not a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VatPolicy {
    /// Fail the conversion.
    #[default]
    Reject,
    /// Log a warning and emit a zero tax.
    Zero,
}

impl VatPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            VatPolicy::Reject => "reject",
            VatPolicy::Zero => "zero",
        }
    }
}

impl fmt::Display for VatPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VatPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(VatPolicy::Reject),
            "zero" => Ok(VatPolicy::Zero),
            other => Err(format!("unknown VAT policy '{other}' (expected 'reject' or 'zero')")),
        }
    }
}

/// Turns a VAT percentage into a tax fraction. An empty field is not an error.
pub fn compute_tax(vat: &str) -> Result<Tax, InvalidVat> {
    let vat = vat.trim();
    if vat.is_empty() {
        return Ok(Tax::Unset);
    }
    match vat.parse::<f64>() {
        Ok(percent) if percent.is_finite() => Ok(Tax::Fraction(percent / 100.0)),
        _ => Err(InvalidVat(vat.to_string())),
    }
}

fn transform_variant(variant: &SourceVariant) -> OutputVariant {
    OutputVariant {
        primary_value: variant.type1.clone(),
        secondary_value: variant.type2.clone(),
        quantity: variant.stock.clone(),
        barcode: variant.barcode.clone(),
    }
}

pub fn transform_product(
    product: &SourceProduct,
    policy: VatPolicy,
) -> Result<OutputProduct, TransformError> {
    let tax = match (compute_tax(&product.vat), policy) {
        (Ok(tax), _) => tax,
        (Err(source), VatPolicy::Reject) => {
            return Err(TransformError::InvalidVat {
                product: product.code.clone(),
                source,
            })
        }
        (Err(source), VatPolicy::Zero) => {
            warn!(product = %product.code, error = %source, "using zero tax for unparseable VAT");
            Tax::Unset
        }
    };

    Ok(OutputProduct {
        id: product.code.clone(),
        product_code: product.ws_code.clone(),
        barcode: product.barcode.clone(),
        main_category: product.cat1_name.clone(),
        // top and sub category both read cat2name
        top_category: product.cat2_name.clone(),
        sub_category: product.cat2_name.clone(),
        category_id: product.cat1_code.clone(),
        category: product.category_path.clone(),
        brand: product.brand.clone(),
        name: product.name.clone(),
        description: product.detail.clone(),
        variants: product.variants.iter().map(transform_variant).collect(),
        images: product.images.clone(),
        list_price: product.price_list.clone(),
        price: product.price_special.clone(),
        tax,
        currency: product.currency.clone(),
        desi: product.desi.clone(),
        quantity: product.stock.clone(),
    })
}

pub fn transform_feed(feed: &SourceFeed, policy: VatPolicy) -> Result<OutputFeed, TransformError> {
    let products = feed
        .products
        .iter()
        .map(|product| transform_product(product, policy))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        scripts = feed.scripts.len(),
        products = products.len(),
        "transformed feed"
    );

    Ok(OutputFeed {
        scripts: feed.scripts.clone(),
        products,
    })
}
