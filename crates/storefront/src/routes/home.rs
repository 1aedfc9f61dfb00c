//! Catalog page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use shoplight_core::{CatalogProduct, RequestId};

use crate::commerce::{CatalogError, UpstreamError, normalize};
use crate::filters;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub external_id: String,
    pub title: String,
    pub price: String,
    pub image_url: String,
    pub availability: String,
    pub in_stock: bool,
    pub category: Option<String>,
}

impl From<&CatalogProduct> for ProductView {
    fn from(product: &CatalogProduct) -> Self {
        Self {
            external_id: product.external_id.to_string(),
            title: product.title.clone(),
            price: product.price.display(),
            image_url: product.image_url.clone(),
            availability: product.availability.to_string(),
            in_stock: product.availability.is_in_stock(),
            category: product.category.clone(),
        }
    }
}

/// Catalog page query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub request_id: Option<RequestId>,
}

/// Catalog page template.
///
/// Renders either the product grid or a user-facing error with a retry
/// control; the retry is a plain reload of the same URL, which re-triggers
/// the full chain.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub brand_name: String,
    pub products: Vec<ProductView>,
    pub error: Option<String>,
    pub retry_href: String,
}

/// Display the catalog page.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let retry_href = query.request_id.as_ref().map_or_else(
        || "/".to_string(),
        |request_id| format!("/?request_id={request_id}"),
    );

    match state
        .catalog()
        .fetch_catalog(query.request_id.as_ref().map(RequestId::as_str))
        .await
    {
        Ok(catalog) => {
            let products = normalize(&catalog.products)
                .iter()
                .map(ProductView::from)
                .collect();

            HomeTemplate {
                brand_name: catalog.seller.brand_name,
                products,
                error: None,
                retry_href,
            }
        }
        Err(e) => {
            // The sentry tracing layer forwards ERROR events upstream
            tracing::error!(error = %e, "catalog chain failed");

            HomeTemplate {
                brand_name: String::new(),
                products: Vec::new(),
                error: Some(user_message(&e)),
                retry_href,
            }
        }
    }
}

/// Convert a chain error into a user-facing message.
///
/// Diagnostics (statuses, raw bodies) stay in the logs; pages only see
/// which part of the experience broke.
fn user_message(err: &CatalogError) -> String {
    match err {
        CatalogError::Auth(_) => "We couldn't start a browsing session. Please try again.",
        CatalogError::Upstream(UpstreamError::EmptySellerData) => {
            "We couldn't find this seller's storefront."
        }
        CatalogError::Upstream(_) => "We couldn't load the product catalog. Please try again.",
    }
    .to_string()
}
