//! End-to-end tests for the guest-auth and catalog chain.
//!
//! Each test wires a purpose-built mock upstream, points a `CatalogClient`
//! at it, and asserts on the chain's outcome. The chain under test is:
//! guest sign-in -> seller lookup by request id -> product fetch by
//! identifier batch -> normalization.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use shoplight_core::Availability;
use shoplight_integration_tests::{MockUpstream, seller_ok, sign_in_ok};
use shoplight_storefront::commerce::{
    AuthError, CatalogClient, CatalogError, UpstreamError, normalize,
};

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn test_full_chain_normalizes_single_product() {
    const TOKEN: &str = "guest-token-1";

    // No /ip route: the fingerprint builder must fall back to its default
    // address without failing the chain.
    let router = Router::new()
        .route("/v1/guest/signIn", post(|| async { Json(sign_in_ok(TOKEN)) }))
        .route(
            "/api/v1/ai/get_seller_data_by_request_id",
            get(|headers: HeaderMap| async move {
                if bearer(&headers) == Some(TOKEN) {
                    Json(seller_ok("Acme Outdoors", &["B071DR7GLW"])).into_response()
                } else {
                    StatusCode::UNAUTHORIZED.into_response()
                }
            }),
        )
        .route(
            "/api/v1/amazon/products",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if bearer(&headers) != Some(TOKEN) {
                    return StatusCode::UNAUTHORIZED.into_response();
                }
                if body.get("asins") != Some(&json!(["B071DR7GLW"])) {
                    return StatusCode::BAD_REQUEST.into_response();
                }

                Json(json!({
                    "products": [{
                        "asin": "B071DR7GLW",
                        "product_title": "Trail Bottle",
                        "product_price": "$19.99",
                        "product_photo": "https://img.example.com/bottle.jpg",
                        "product_availability": "In Stock",
                        "product_category": "Sports & Outdoors",
                    }],
                    "total": 1,
                }))
                .into_response()
            }),
        );

    let upstream = MockUpstream::serve(router).await;
    let client = CatalogClient::new(&upstream.commerce_config());

    let catalog = client.fetch_catalog(Some("req-123")).await.unwrap();
    assert_eq!(catalog.seller.brand_name, "Acme Outdoors");
    assert_eq!(catalog.total, 1);

    let products = normalize(&catalog.products);
    assert_eq!(products.len(), 1);

    let product = products.first().unwrap();
    assert_eq!(product.external_id.as_str(), "B071DR7GLW");
    assert_eq!(product.title, "Trail Bottle");
    assert_eq!(product.price.amount, Decimal::new(1999, 2));
    assert_eq!(product.price.display(), "$19.99");
    assert_eq!(product.availability, Availability::InStock);
    assert_eq!(product.category.as_deref(), Some("Sports & Outdoors"));
}

// =============================================================================
// Chain short-circuits and failures
// =============================================================================

#[tokio::test]
async fn test_empty_seller_data_is_upstream_error() {
    let router = Router::new()
        .route("/v1/guest/signIn", post(|| async { Json(sign_in_ok("tok")) }))
        .route(
            "/api/v1/ai/get_seller_data_by_request_id",
            get(|| async { Json(json!({ "data": [] })) }),
        );

    let upstream = MockUpstream::serve(router).await;
    let client = CatalogClient::new(&upstream.commerce_config());

    let err = client.fetch_catalog(None).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Upstream(UpstreamError::EmptySellerData)
    ));
}

#[tokio::test]
async fn test_seller_without_products_yields_empty_catalog() {
    let products_hits = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&products_hits);

    let router = Router::new()
        .route("/v1/guest/signIn", post(|| async { Json(sign_in_ok("tok")) }))
        .route(
            "/api/v1/ai/get_seller_data_by_request_id",
            get(|| async { Json(seller_ok("Empty Shelf Co", &[])) }),
        )
        .route(
            "/api/v1/amazon/products",
            post(move || {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "products": [], "total": 0 }))
                }
            }),
        );

    let upstream = MockUpstream::serve(router).await;
    let client = CatalogClient::new(&upstream.commerce_config());

    let catalog = client.fetch_catalog(None).await.unwrap();
    assert_eq!(catalog.seller.brand_name, "Empty Shelf Co");
    assert!(catalog.products.is_empty());
    assert_eq!(catalog.total, 0);

    // A seller with no identifiers never reaches the product endpoint
    assert_eq!(products_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sign_in_without_token_is_auth_error() {
    let router = Router::new().route(
        "/v1/guest/signIn",
        post(|| async { Json(json!({ "data": { "token": { "refreshToken": "only" } } })) }),
    );

    let upstream = MockUpstream::serve(router).await;
    let client = CatalogClient::new(&upstream.commerce_config());

    let err = client.fetch_catalog(None).await.unwrap_err();
    match err {
        CatalogError::Auth(AuthError::Exchange { status: 200, .. }) => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_seller_failure_surfaces_status() {
    let router = Router::new()
        .route("/v1/guest/signIn", post(|| async { Json(sign_in_ok("tok")) }))
        .route(
            "/api/v1/ai/get_seller_data_by_request_id",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
        );

    let upstream = MockUpstream::serve(router).await;
    let client = CatalogClient::new(&upstream.commerce_config());

    let err = client.fetch_catalog(None).await.unwrap_err();
    match err {
        CatalogError::Upstream(UpstreamError::Api { status: 500, .. }) => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

// =============================================================================
// Token cache
// =============================================================================

#[tokio::test]
async fn test_cached_session_skips_second_exchange() {
    let sign_ins = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&sign_ins);

    let router = Router::new()
        .route("/ip", get(|| async { Json(json!({ "ip": "203.0.113.7" })) }))
        .route(
            "/v1/guest/signIn",
            post(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(sign_in_ok("cached-token"))
                }
            }),
        )
        .route(
            "/api/v1/ai/get_seller_data_by_request_id",
            get(|| async { Json(seller_ok("Acme Outdoors", &[])) }),
        );

    let upstream = MockUpstream::serve(router).await;
    let client = CatalogClient::new(&upstream.commerce_config());

    client.fetch_catalog(None).await.unwrap();
    client.fetch_catalog(None).await.unwrap();

    assert_eq!(sign_ins.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Helpers
// =============================================================================

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers.get("authorization").and_then(|v| v.to_str().ok())
}
