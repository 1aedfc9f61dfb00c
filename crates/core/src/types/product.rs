//! Catalog product and seller types.
//!
//! These are the stable internal shapes the rendering layer consumes. The
//! upstream wire schema lives in the storefront crate; the normalizer maps
//! it into these types.

use serde::{Deserialize, Serialize};

use super::id::Asin;
use super::price::Price;

/// Stock availability for a catalog product.
///
/// The upstream reports availability as free-form text; anything that does
/// not explicitly say "out of stock" is treated as in stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    InStock,
    OutOfStock,
}

impl Availability {
    /// Classify an upstream availability label.
    ///
    /// A label containing "out of stock" (case-insensitive) maps to
    /// [`Availability::OutOfStock`]; any other text, or no label at all,
    /// maps to [`Availability::InStock`].
    #[must_use]
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some(text) if text.to_lowercase().contains("out of stock") => Self::OutOfStock,
            _ => Self::InStock,
        }
    }

    /// Whether the product can be purchased.
    #[must_use]
    pub const fn is_in_stock(self) -> bool {
        matches!(self, Self::InStock)
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InStock => write!(f, "In stock"),
            Self::OutOfStock => write!(f, "Out of stock"),
        }
    }
}

/// A product in its stable internal shape, produced by the normalizer.
///
/// Consumed read-only by the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Opaque external identifier (ASIN-like).
    pub external_id: Asin,
    /// Display title; never empty after normalization.
    pub title: String,
    /// Unit price; zero when the upstream price was absent or unparseable.
    pub price: Price,
    /// Image URL; a deterministic placeholder when the upstream had none.
    pub image_url: String,
    /// Stock availability.
    pub availability: Availability,
    /// Upstream category, when reported.
    pub category: Option<String>,
}

/// Upstream metadata associating a brand with a list of product identifiers.
///
/// Fetched per request and never cached. The `product_ids` sequence is the
/// sole source of truth for which products exist in a given render, in
/// upstream order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRecord {
    /// Brand display name.
    pub brand_name: String,
    /// Ordered product identifiers belonging to the seller.
    pub product_ids: Vec<Asin>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_out_of_stock_label() {
        assert_eq!(
            Availability::from_label(Some("Temporarily out of stock")),
            Availability::OutOfStock
        );
        assert_eq!(
            Availability::from_label(Some("OUT OF STOCK")),
            Availability::OutOfStock
        );
    }

    #[test]
    fn test_availability_in_stock_label() {
        assert_eq!(
            Availability::from_label(Some("In Stock")),
            Availability::InStock
        );
        assert_eq!(
            Availability::from_label(Some("Only 3 left in stock")),
            Availability::InStock
        );
    }

    #[test]
    fn test_availability_missing_label() {
        assert_eq!(Availability::from_label(None), Availability::InStock);
    }

    #[test]
    fn test_availability_display() {
        assert_eq!(Availability::InStock.to_string(), "In stock");
        assert_eq!(Availability::OutOfStock.to_string(), "Out of stock");
        assert!(Availability::InStock.is_in_stock());
        assert!(!Availability::OutOfStock.is_in_stock());
    }
}
