//! Seller lookup and product-catalog fetch.

use serde::Deserialize;
use tracing::{debug, instrument};

use shoplight_core::{Asin, SellerRecord};

use crate::config::CommerceConfig;

use super::auth::GuestAuthenticator;
use super::session::{MokaSessionStore, SessionStore};
use super::{CatalogError, Stage, UpstreamError, truncate_body};

const SELLER_PATH: &str = "/api/v1/ai/get_seller_data_by_request_id";
const PRODUCTS_PATH: &str = "/api/v1/amazon/products";

// =============================================================================
// Wire types
// =============================================================================

/// Seller lookup body:
/// `{data:[{amazon_data:{products:[{asin,...}]}, brand_data:{...}}]}`.
#[derive(Debug, Deserialize)]
struct SellerDataResponse {
    #[serde(default)]
    data: Vec<SellerEntry>,
}

#[derive(Debug, Deserialize)]
struct SellerEntry {
    amazon_data: Option<AmazonData>,
    brand_data: Option<BrandData>,
}

#[derive(Debug, Deserialize)]
struct AmazonData {
    #[serde(default)]
    products: Vec<AsinEntry>,
}

#[derive(Debug, Deserialize)]
struct AsinEntry {
    asin: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BrandData {
    brand_name: Option<String>,
}

/// One product as the upstream reports it, prior to normalization.
///
/// Every field is optional; the normalizer is responsible for filling
/// defaults, so nothing here is validated beyond JSON shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProduct {
    pub asin: Option<String>,
    pub product_title: Option<String>,
    pub product_price: Option<String>,
    pub product_photo: Option<String>,
    pub product_availability: Option<String>,
    pub product_category: Option<String>,
}

/// Catalog fetch body: `{products:[...], total}`.
#[derive(Debug, Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    products: Vec<RawProduct>,
    total: Option<u64>,
}

/// Result of a full chain run: the seller plus its raw product batch.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub seller: SellerRecord,
    pub products: Vec<RawProduct>,
    pub total: u64,
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the seller/catalog chain.
///
/// Seller records and product batches are transient - fetched per request,
/// never cached. Only the guest session behind the authenticator is cached.
#[derive(Clone)]
pub struct CatalogClient<S = MokaSessionStore> {
    http: reqwest::Client,
    base_url: String,
    default_request_id: String,
    auth: GuestAuthenticator<S>,
}

impl CatalogClient {
    /// Create a client with the production `moka` token cache.
    #[must_use]
    pub fn new(config: &CommerceConfig) -> Self {
        Self::with_store(config, MokaSessionStore::new())
    }
}

impl<S: SessionStore> CatalogClient<S> {
    /// Create a client over a specific token cache.
    pub fn with_store(config: &CommerceConfig, store: S) -> Self {
        let http = reqwest::Client::new();

        Self {
            http: http.clone(),
            base_url: config.base_url.clone(),
            default_request_id: config.default_request_id.clone(),
            auth: GuestAuthenticator::new(http, config, store),
        }
    }

    /// Run the full chain for a request id (the configured default when
    /// absent).
    ///
    /// A seller with zero product identifiers yields an empty catalog, not
    /// an error. The product fetch is all-or-nothing across the identifier
    /// batch; there is no identifier-level partial failure handling.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Auth`] unchanged when the token exchange
    /// fails, [`CatalogError::Upstream`] when either stage fails or
    /// returns structurally invalid data.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self, request_id: Option<&str>) -> Result<Catalog, CatalogError> {
        let token = self.auth.get_token().await?;
        let request_id = request_id.unwrap_or(&self.default_request_id);

        let seller = self.fetch_seller(&token, request_id).await?;

        if seller.product_ids.is_empty() {
            debug!("seller has no products, returning empty catalog");
            return Ok(Catalog {
                seller,
                products: Vec::new(),
                total: 0,
            });
        }

        let (products, total) = self.fetch_products(&token, &seller.product_ids).await?;

        Ok(Catalog {
            seller,
            products,
            total,
        })
    }

    /// GET the seller-data endpoint for one request id.
    async fn fetch_seller(
        &self,
        token: &str,
        request_id: &str,
    ) -> Result<SellerRecord, UpstreamError> {
        let response = self
            .http
            .get(format!("{}{SELLER_PATH}", self.base_url))
            .query(&[("request_id", request_id)])
            .header("authorization", token)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        parse_seller_response(status, &body)
    }

    /// POST the identifier batch to the product-catalog endpoint.
    async fn fetch_products(
        &self,
        token: &str,
        asins: &[Asin],
    ) -> Result<(Vec<RawProduct>, u64), UpstreamError> {
        let response = self
            .http
            .post(format!("{}{PRODUCTS_PATH}", self.base_url))
            .header("authorization", token)
            .json(&serde_json::json!({ "asins": asins }))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        parse_products_response(status, &body)
    }
}

// =============================================================================
// Response parsing
// =============================================================================

fn parse_seller_response(status: u16, body: &str) -> Result<SellerRecord, UpstreamError> {
    if !(200..300).contains(&status) {
        return Err(UpstreamError::Api {
            stage: Stage::Seller,
            status,
            body: truncate_body(body),
        });
    }

    let parsed: SellerDataResponse =
        serde_json::from_str(body).map_err(|source| UpstreamError::Parse {
            stage: Stage::Seller,
            source,
        })?;

    // The first entry is authoritative
    let entry = parsed
        .data
        .into_iter()
        .next()
        .ok_or(UpstreamError::EmptySellerData)?;

    let brand_name = entry
        .brand_data
        .and_then(|b| b.brand_name)
        .unwrap_or_default();

    let product_ids = entry
        .amazon_data
        .map(|a| a.products)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.asin)
        .filter(|asin| !asin.is_empty())
        .map(Asin::new)
        .collect();

    Ok(SellerRecord {
        brand_name,
        product_ids,
    })
}

fn parse_products_response(
    status: u16,
    body: &str,
) -> Result<(Vec<RawProduct>, u64), UpstreamError> {
    if !(200..300).contains(&status) {
        return Err(UpstreamError::Api {
            stage: Stage::Products,
            status,
            body: truncate_body(body),
        });
    }

    let parsed: ProductsResponse =
        serde_json::from_str(body).map_err(|source| UpstreamError::Parse {
            stage: Stage::Products,
            source,
        })?;

    let total = parsed
        .total
        .unwrap_or_else(|| parsed.products.len() as u64);

    Ok((parsed.products, total))
}
