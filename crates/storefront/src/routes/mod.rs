//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                     - Catalog page (default or ?request_id=)
//! GET  /health               - Health check
//!
//! # API
//! GET  /api/catalog          - Normalized catalog as JSON
//!
//! Anything else falls back to a 404.
//! ```

pub mod api;
pub mod home;

use axum::{Router, http::Uri, routing::get};

use crate::error::AppError;
use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog page
        .route("/", get(home::home))
        // JSON API
        .route("/api/catalog", get(api::catalog))
        .fallback(not_found)
}

/// Fallback handler for unmatched paths.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_unmatched_path_is_not_found() {
        let response = not_found(Uri::from_static("/no-such-page"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
