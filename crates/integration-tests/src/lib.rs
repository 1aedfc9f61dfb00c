//! Integration tests for Shoplight.
//!
//! The tests in `tests/` run the guest-auth and catalog chain against an
//! in-process mock of the commerce upstream, bound to an ephemeral loopback
//! port. No external services or credentials are required.
//!
//! This crate provides the shared plumbing: [`MockUpstream`] serves an
//! axum router as the upstream, and the `*_ok` helpers build canned
//! response bodies in the upstream's wire shape.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use shoplight_storefront::config::CommerceConfig;

/// An in-process stand-in for the commerce upstream.
///
/// Serves the given router on an ephemeral loopback port until dropped.
pub struct MockUpstream {
    base_url: String,
    server: JoinHandle<()>,
}

impl MockUpstream {
    /// Bind an ephemeral loopback port and serve `router` on it.
    ///
    /// # Panics
    ///
    /// Panics if the loopback bind fails.
    pub async fn serve(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let addr = listener
            .local_addr()
            .expect("Failed to read mock upstream address");

        let server = tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Mock upstream server error");
        });

        Self {
            base_url: format!("http://{addr}"),
            server,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Commerce configuration pointing every endpoint at this mock.
    ///
    /// The IP-echo URL also points at the mock; tests that do not register
    /// an `/ip` route exercise the fallback-address path of the
    /// fingerprint builder.
    #[must_use]
    pub fn commerce_config(&self) -> CommerceConfig {
        CommerceConfig {
            base_url: self.base_url.clone(),
            ip_echo_url: format!("{}/ip", self.base_url),
            default_request_id: "665f0dbb2c1a4e49c7f0d2a1".to_string(),
        }
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Canned upstream bodies
// =============================================================================

/// Guest sign-in response carrying a token that expires far in the future.
#[must_use]
pub fn sign_in_ok(access_token: &str) -> Value {
    json!({
        "data": {
            "token": {
                "accessToken": access_token,
                "refreshToken": "refresh-token",
                "accessExpireAt": far_future_ms(),
            }
        }
    })
}

/// Seller-data response with a single entry for `brand_name` carrying the
/// given product identifiers.
#[must_use]
pub fn seller_ok(brand_name: &str, asins: &[&str]) -> Value {
    let products: Vec<Value> = asins.iter().map(|asin| json!({ "asin": asin })).collect();

    json!({
        "data": [{
            "amazon_data": { "products": products },
            "brand_data": { "brand_name": brand_name },
        }]
    })
}

/// An `accessExpireAt` timestamp comfortably past any test's runtime.
#[must_use]
pub fn far_future_ms() -> i64 {
    chrono::Utc::now().timestamp_millis() + 3_600_000
}
