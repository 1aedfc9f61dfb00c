//! Response normalizer: upstream product schema to the stable internal
//! shape.
//!
//! `normalize` is pure and total - it never fails. Missing or malformed
//! fields degrade to defaults so one bad product can never take down a
//! render.

use rust_decimal::Decimal;

use shoplight_core::{Asin, Availability, CatalogProduct, CurrencyCode, Price};

use super::catalog::RawProduct;

/// Placeholder image host; the position keeps the URL deterministic per
/// slot so re-renders stay stable.
const PLACEHOLDER_IMAGE_BASE: &str = "https://placehold.co/600x600";

/// Map a raw product batch into [`CatalogProduct`]s, preserving order.
#[must_use]
pub fn normalize(raw: &[RawProduct]) -> Vec<CatalogProduct> {
    raw.iter()
        .enumerate()
        .map(|(index, product)| normalize_one(product, index + 1))
        .collect()
}

/// Normalize a single product at a 1-based position.
fn normalize_one(raw: &RawProduct, position: usize) -> CatalogProduct {
    let title = match raw.product_title.as_deref() {
        Some(title) if !title.trim().is_empty() => title.to_string(),
        _ => format!("Product {position}"),
    };

    let image_url = match raw.product_photo.as_deref() {
        Some(url) if !url.trim().is_empty() => url.to_string(),
        _ => placeholder_image_url(position),
    };

    CatalogProduct {
        external_id: Asin::new(raw.asin.clone().unwrap_or_default()),
        title,
        price: Price::new(parse_price(raw.product_price.as_deref()), CurrencyCode::USD),
        image_url,
        availability: Availability::from_label(raw.product_availability.as_deref()),
        category: raw
            .product_category
            .clone()
            .filter(|c| !c.trim().is_empty()),
    }
}

/// Parse upstream price text such as `"$1,299.99"`.
///
/// Unparseable or missing text yields zero - prices are display data here,
/// so a silent zero beats failing the whole batch.
fn parse_price(text: Option<&str>) -> Decimal {
    let Some(text) = text else {
        return Decimal::ZERO;
    };

    text.trim()
        .trim_start_matches('$')
        .replace(',', "")
        .parse()
        .unwrap_or(Decimal::ZERO)
}

/// Deterministic placeholder URL derived from the product's position.
fn placeholder_image_url(position: usize) -> String {
    format!("{PLACEHOLDER_IMAGE_BASE}?text=Product+{position}")
}
