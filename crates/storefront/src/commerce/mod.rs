//! Commerce upstream client: guest authentication and catalog retrieval.
//!
//! # Architecture
//!
//! Each page render drives one sequential chain of calls against the
//! upstream commerce API:
//!
//! 1. Guest token (cache fast path, otherwise a sign-in exchange built
//!    from a fresh device fingerprint)
//! 2. Seller lookup by request id
//! 3. Product-catalog fetch for the seller's identifiers
//!
//! The upstream is the source of truth - no local sync, direct API calls.
//! The only cached state is the guest session, held in a `moka` cache with
//! a 600 second TTL behind the injectable [`SessionStore`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use shoplight_storefront::commerce::{CatalogClient, normalize};
//!
//! let client = CatalogClient::new(&config.commerce);
//!
//! // Run the full chain for the default request id
//! let catalog = client.fetch_catalog(None).await?;
//! let products = normalize(&catalog.products);
//! ```

mod auth;
mod catalog;
mod ip;
mod normalize;
mod session;

pub use auth::GuestAuthenticator;
pub use catalog::{Catalog, CatalogClient, RawProduct};
pub use ip::resolve_client_ip;
pub use normalize::normalize;
pub use session::{DeviceFingerprint, GuestSession, MokaSessionStore, SessionStore};

use thiserror::Error;

/// How much upstream body text is carried inside error values. Bodies are
/// diagnostics, not payloads; unbounded HTML error pages would otherwise
/// end up in logs and Sentry events.
const ERROR_BODY_LIMIT: usize = 500;

/// Truncate an upstream response body for inclusion in an error.
fn truncate_body(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}

/// Errors from the guest token exchange.
///
/// Terminal for the current render: there is no internal retry and no
/// placeholder token is ever substituted.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP transport failed before a response was produced.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The exchange returned a non-success status, an unparseable body, or
    /// a body missing the nested access-token field. Carries the HTTP
    /// status and raw body for diagnostics.
    #[error("token exchange failed (HTTP {status}): {body}")]
    Exchange { status: u16, body: String },
}

/// Stage of the seller/catalog chain an upstream error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Seller,
    Products,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seller => write!(f, "seller lookup"),
            Self::Products => write!(f, "catalog fetch"),
        }
    }
}

/// Errors from the seller or catalog stages.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// HTTP transport failed before a response was produced.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream returned a non-success status.
    #[error("{stage} returned HTTP {status}: {body}")]
    Api {
        stage: Stage,
        status: u16,
        body: String,
    },

    /// The upstream body did not parse as the expected JSON shape.
    #[error("{stage} returned malformed JSON: {source}")]
    Parse {
        stage: Stage,
        #[source]
        source: serde_json::Error,
    },

    /// The seller endpoint returned no entries for the request id.
    #[error("empty seller data")]
    EmptySellerData,
}

/// Any failure of the catalog chain.
///
/// Auth failures propagate unchanged so callers can distinguish a broken
/// sign-in from a broken seller/catalog stage.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = AuthError::Exchange {
            status: 403,
            body: "{\"error\":\"forbidden\"}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "token exchange failed (HTTP 403): {\"error\":\"forbidden\"}"
        );
    }

    #[test]
    fn test_upstream_error_display() {
        let err = UpstreamError::Api {
            stage: Stage::Seller,
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "seller lookup returned HTTP 502: bad gateway");
    }

    #[test]
    fn test_empty_seller_data_display() {
        assert_eq!(UpstreamError::EmptySellerData.to_string(), "empty seller data");
    }

    #[test]
    fn test_catalog_error_is_transparent() {
        let err = CatalogError::Upstream(UpstreamError::EmptySellerData);
        assert_eq!(err.to_string(), "empty seller data");
    }

    #[test]
    fn test_truncate_body_caps_length() {
        let long = "x".repeat(2000);
        assert_eq!(truncate_body(&long).len(), ERROR_BODY_LIMIT);
        assert_eq!(truncate_body("short"), "short");
    }
}
