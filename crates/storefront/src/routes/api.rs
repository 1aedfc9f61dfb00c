//! JSON API route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use tracing::instrument;

use shoplight_core::{CatalogProduct, RequestId};

use crate::commerce::normalize;
use crate::error::Result;
use crate::routes::home::CatalogQuery;
use crate::state::AppState;

/// JSON body for `GET /api/catalog`.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub brand: String,
    pub products: Vec<CatalogProduct>,
    pub total: u64,
}

/// Return the normalized catalog as JSON.
///
/// Unlike the page route, chain errors propagate through
/// `AppError::into_response` (502 for auth/upstream failures).
#[instrument(skip(state))]
pub async fn catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>> {
    let catalog = state
        .catalog()
        .fetch_catalog(query.request_id.as_ref().map(RequestId::as_str))
        .await?;

    Ok(Json(CatalogResponse {
        brand: catalog.seller.brand_name,
        products: normalize(&catalog.products),
        total: catalog.total,
    }))
}
