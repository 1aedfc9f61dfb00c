//! Guest authenticator: exchanges a device fingerprint for a bearer token.

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::CommerceConfig;

use super::ip::resolve_client_ip;
use super::session::{
    DeviceFingerprint, GuestSession, SessionStore, TOKEN_CACHE_KEY, TOKEN_TTL_SECONDS,
};
use super::{AuthError, truncate_body};

const SIGN_IN_PATH: &str = "/v1/guest/signIn";

/// Fixed header set encoding currency/locale/platform context for the
/// exchange. The upstream keys are lowercase.
const CURRENCY_CODE: &str = "USD";
const CURRENCY_SYMBOL: &str = "$";
const LANGUAGE: &str = "en";
const PLATFORM: &str = "web";

// =============================================================================
// Wire types
// =============================================================================

/// Success body: `{data:{token:{accessToken, refreshToken, accessExpireAt}}}`.
/// Every level is optional so a structurally-off body surfaces as a missing
/// token rather than a parse error with a misleading message.
#[derive(Debug, Deserialize)]
struct SignInResponse {
    data: Option<SignInData>,
}

#[derive(Debug, Deserialize)]
struct SignInData {
    token: Option<TokenEnvelope>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenEnvelope {
    access_token: Option<String>,
    refresh_token: Option<String>,
    /// Expiry instant in epoch milliseconds.
    access_expire_at: Option<i64>,
}

// =============================================================================
// GuestAuthenticator
// =============================================================================

/// Acquires and caches anonymous guest tokens.
///
/// No internal retries: a failed exchange is terminal for the current
/// render and retry is the caller's responsibility. Concurrent cache
/// misses may each perform an exchange and overwrite the cache; the
/// operation is idempotent so the race is accepted without locking.
#[derive(Clone)]
pub struct GuestAuthenticator<S> {
    http: reqwest::Client,
    base_url: String,
    ip_echo_url: String,
    store: S,
}

impl<S: SessionStore> GuestAuthenticator<S> {
    /// Create an authenticator over the given token cache.
    pub fn new(http: reqwest::Client, config: &CommerceConfig, store: S) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            ip_echo_url: config.ip_echo_url.clone(),
            store,
        }
    }

    /// Obtain a usable bearer token.
    ///
    /// Fast path: a live cached session is returned without any network
    /// call. Otherwise resolves the client IP, synthesizes a fresh
    /// fingerprint, performs the exchange, and caches the session for
    /// [`TOKEN_TTL_SECONDS`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the exchange cannot produce a usable
    /// token; never a placeholder token.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> Result<String, AuthError> {
        if let Some(session) = self.store.lookup(TOKEN_CACHE_KEY).await {
            debug!("cache hit for guest session");
            return Ok(session.access_token);
        }

        let ip_address = resolve_client_ip(&self.http, &self.ip_echo_url).await;
        let fingerprint = DeviceFingerprint::generate(ip_address);

        let response = self
            .http
            .post(format!("{}{SIGN_IN_PATH}", self.base_url))
            .header("currencycode", CURRENCY_CODE)
            .header("currencysymbol", CURRENCY_SYMBOL)
            .header("language", LANGUAGE)
            .header("platform", PLATFORM)
            .json(&fingerprint)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        let session = extract_session(status, &body)?;
        self.store.store(TOKEN_CACHE_KEY, session.clone()).await;

        debug!("guest session exchanged and cached");
        Ok(session.access_token)
    }
}

/// Turn an exchange response into a session.
///
/// Non-success status, unparseable JSON, and a body lacking the nested
/// access-token field all fail with the status and raw body attached.
fn extract_session(status: u16, body: &str) -> Result<GuestSession, AuthError> {
    if !(200..300).contains(&status) {
        return Err(AuthError::Exchange {
            status,
            body: truncate_body(body),
        });
    }

    let Ok(parsed) = serde_json::from_str::<SignInResponse>(body) else {
        return Err(AuthError::Exchange {
            status,
            body: truncate_body(body),
        });
    };

    let token = parsed.data.and_then(|d| d.token);
    let access_token = token
        .as_ref()
        .and_then(|t| t.access_token.clone())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::Exchange {
            status,
            body: truncate_body(body),
        })?;

    // Sessions lacking an upstream expiry get the cache TTL
    #[allow(clippy::cast_possible_wrap)]
    let default_expire_at = Utc::now().timestamp_millis() + (TOKEN_TTL_SECONDS as i64) * 1_000;

    let (refresh_token, access_expire_at) = token.map_or_else(
        || (String::new(), default_expire_at),
        |t| (
            t.refresh_token.unwrap_or_default(),
            t.access_expire_at.unwrap_or(default_expire_at),
        ),
    );

    Ok(GuestSession {
        access_token,
        access_expire_at,
        refresh_token,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory fake with no TTL semantics, standing in for the edge
    /// cache substrate.
    #[derive(Default)]
    struct FakeSessionStore {
        entries: Mutex<HashMap<String, GuestSession>>,
    }

    impl SessionStore for FakeSessionStore {
        async fn lookup(&self, key: &str) -> Option<GuestSession> {
            let entries = self.entries.lock().unwrap();
            entries
                .get(key)
                .filter(|session| session.is_live())
                .cloned()
        }

        async fn store(&self, key: &str, session: GuestSession) {
            let mut entries = self.entries.lock().unwrap();
            entries.insert(key.to_string(), session);
        }
    }

    fn unroutable_config() -> CommerceConfig {
        CommerceConfig {
            // Connection-refused on loopback; any network call fails fast
            base_url: "http://127.0.0.1:9".to_string(),
            ip_echo_url: "http://127.0.0.1:9/ip".to_string(),
            default_request_id: "req-default".to_string(),
        }
    }

    const GOOD_BODY: &str = r#"{
        "data": {
            "token": {
                "accessToken": "tok-abc",
                "refreshToken": "ref-xyz",
                "accessExpireAt": 4102444800000
            }
        }
    }"#;

    #[test]
    fn test_extract_session_success() {
        let session = extract_session(200, GOOD_BODY).unwrap();
        assert_eq!(session.access_token, "tok-abc");
        assert_eq!(session.refresh_token, "ref-xyz");
        assert_eq!(session.access_expire_at, 4_102_444_800_000);
    }

    #[test]
    fn test_missing_access_token_is_auth_error() {
        let body = r#"{"data":{"token":{"refreshToken":"ref"}}}"#;
        let err = extract_session(200, body).unwrap_err();
        assert!(matches!(err, AuthError::Exchange { status: 200, .. }));
    }

    #[test]
    fn test_empty_access_token_is_auth_error() {
        let body = r#"{"data":{"token":{"accessToken":""}}}"#;
        assert!(extract_session(200, body).is_err());
    }

    #[test]
    fn test_missing_data_is_auth_error() {
        assert!(extract_session(200, "{}").is_err());
    }

    #[test]
    fn test_non_success_status_is_auth_error() {
        let err = extract_session(503, "upstream down").unwrap_err();
        match err {
            AuthError::Exchange { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_body_is_auth_error() {
        let err = extract_session(200, "<html>gateway error</html>").unwrap_err();
        assert!(matches!(err, AuthError::Exchange { status: 200, .. }));
    }

    #[test]
    fn test_missing_expiry_defaults_to_ttl() {
        let body = r#"{"data":{"token":{"accessToken":"tok"}}}"#;
        let session = extract_session(200, body).unwrap();
        assert!(session.is_live());
        assert!(session.access_expire_at > Utc::now().timestamp_millis());
    }

    #[tokio::test]
    async fn test_cached_session_skips_network() {
        let store = FakeSessionStore::default();
        store
            .store(
                TOKEN_CACHE_KEY,
                GuestSession {
                    access_token: "tok-cached".to_string(),
                    access_expire_at: Utc::now().timestamp_millis() + 600_000,
                    refresh_token: String::new(),
                },
            )
            .await;

        // The configured upstream refuses connections, so any network
        // attempt would fail; only the cache fast path can succeed.
        let auth = GuestAuthenticator::new(reqwest::Client::new(), &unroutable_config(), store);
        let token = auth.get_token().await.unwrap();
        assert_eq!(token, "tok-cached");
    }

    #[tokio::test]
    async fn test_expired_cached_session_forces_exchange() {
        let store = FakeSessionStore::default();
        store
            .store(
                TOKEN_CACHE_KEY,
                GuestSession {
                    access_token: "tok-stale".to_string(),
                    access_expire_at: Utc::now().timestamp_millis() - 1_000,
                    refresh_token: String::new(),
                },
            )
            .await;

        let auth = GuestAuthenticator::new(reqwest::Client::new(), &unroutable_config(), store);
        // The stale session must not be returned; the forced exchange hits
        // the unroutable upstream and fails.
        assert!(auth.get_token().await.is_err());
    }
}
