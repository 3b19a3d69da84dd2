//! Records in the destination schema.

use std::fmt;

use feedshift_parser::Element;

pub const ROOT_TAG: &str = "products";
pub const PRODUCT_TAG: &str = "product";
pub const VARIANTS_TAG: &str = "variants";
pub const VARIANT_TAG: &str = "variant";
pub const IMAGE_TAG_PREFIX: &str = "image";

/// Axis label written for every variant's first value, whatever it holds.
pub const PRIMARY_AXIS_LABEL: &str = "Renk";
/// Axis label written for every variant's second value.
pub const SECONDARY_AXIS_LABEL: &str = "Beden";

pub const ACTIVE_FLAG: &str = "1";
pub const PLACEHOLDER_BRAND_ID: &str = "0";

/// Tax as a fraction of the price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tax {
    /// The feed had no VAT for the product.
    Unset,
    Fraction(f64),
}

impl Tax {
    pub fn value(&self) -> f64 {
        match self {
            Tax::Unset => 0.0,
            Tax::Fraction(fraction) => *fraction,
        }
    }
}

impl fmt::Display for Tax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tax::Unset => f.write_str("0"),
            // integral fractions keep one decimal place, e.g. `1.0`
            Tax::Fraction(fraction) if fraction.fract() == 0.0 && fraction.abs() < 1e16 => {
                write!(f, "{fraction:.1}")
            }
            Tax::Fraction(fraction) => write!(f, "{fraction}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputVariant {
    pub primary_value: String,
    pub secondary_value: String,
    pub quantity: String,
    pub barcode: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputProduct {
    pub id: String,
    pub product_code: String,
    pub barcode: String,
    pub main_category: String,
    pub top_category: String,
    pub sub_category: String,
    pub category_id: String,
    pub category: String,
    pub brand: String,
    pub name: String,
    pub description: String,
    pub variants: Vec<OutputVariant>,
    /// Rendered as `image1`, `image2`, ... in this order.
    pub images: Vec<String>,
    pub list_price: String,
    pub price: String,
    pub tax: Tax,
    pub currency: String,
    pub desi: String,
    pub quantity: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputFeed {
    /// Script elements carried over from the source root, emitted first.
    pub scripts: Vec<Element>,
    pub products: Vec<OutputProduct>,
}

impl OutputFeed {
    pub fn variant_count(&self) -> usize {
        self.products.iter().map(|product| product.variants.len()).sum()
    }

    pub fn image_count(&self) -> usize {
        self.products.iter().map(|product| product.images.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_renders_like_a_decimal_fraction() {
        assert_eq!(Tax::Unset.to_string(), "0");
        assert_eq!(Tax::Fraction(0.2).to_string(), "0.2");
        assert_eq!(Tax::Fraction(0.18).to_string(), "0.18");
        assert_eq!(Tax::Fraction(0.0).to_string(), "0.0");
        assert_eq!(Tax::Fraction(1.0).to_string(), "1.0");
        assert_eq!(Tax::Fraction(0.085).to_string(), "0.085");
    }
}
