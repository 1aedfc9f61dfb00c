//! Guest session types and the token cache.
//!
//! The token cache is injected into the authenticator behind the
//! [`SessionStore`] trait so tests can substitute an in-memory fake with
//! controlled clocks. Production uses [`MokaSessionStore`].

use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shoplight_core::DeviceId;

/// How long an issued guest token is cached, in seconds.
pub const TOKEN_TTL_SECONDS: u64 = 600;

/// Cache key under which the process-wide guest session is stored. One
/// active session per key; a fresh exchange always overwrites.
pub const TOKEN_CACHE_KEY: &str = "guest-session";

/// Fixed fingerprint context for a server-rendered web storefront.
const APP_VERSION: &str = "1.4.2";
const DEVICE_MAKE: &str = "web";
const DEVICE_MODEL: &str = "browser";
const DEVICE_OS_VERSION: &str = "unknown";

// =============================================================================
// DeviceFingerprint
// =============================================================================

/// Device class reported in the sign-in payload.
///
/// This server-side storefront only ever sends [`DeviceType::Web`]; the
/// other variants mirror the upstream contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Web,
    Ios,
    Android,
}

/// Anonymous device identity exchanged for a guest token.
///
/// Created fresh per authentication attempt with a random device id and
/// the current timestamp; never persisted and immutable once built. The
/// upstream API speaks camelCase.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFingerprint {
    pub device_id: DeviceId,
    pub ip_address: String,
    pub app_version: String,
    pub device_make: String,
    pub device_model: String,
    pub device_os_version: String,
    pub device_type: DeviceType,
    /// Current wall-clock time in epoch milliseconds.
    pub device_time: i64,
}

impl DeviceFingerprint {
    /// Synthesize a fingerprint for one sign-in attempt.
    #[must_use]
    pub fn generate(ip_address: String) -> Self {
        Self {
            device_id: DeviceId::new(Uuid::new_v4().to_string()),
            ip_address,
            app_version: APP_VERSION.to_string(),
            device_make: DEVICE_MAKE.to_string(),
            device_model: DEVICE_MODEL.to_string(),
            device_os_version: DEVICE_OS_VERSION.to_string(),
            device_type: DeviceType::Web,
            device_time: Utc::now().timestamp_millis(),
        }
    }
}

// =============================================================================
// GuestSession
// =============================================================================

/// An anonymous, time-bounded bearer credential.
///
/// Owned exclusively by the token cache; superseded (not mutated) on
/// renewal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestSession {
    /// Opaque bearer token.
    pub access_token: String,
    /// Expiry instant in epoch milliseconds.
    pub access_expire_at: i64,
    /// Opaque refresh token. Carried for completeness; guest flows simply
    /// re-exchange instead of refreshing.
    pub refresh_token: String,
}

impl GuestSession {
    /// Whether the session is still valid at the given instant.
    #[must_use]
    pub const fn is_live_at(&self, now_ms: i64) -> bool {
        now_ms < self.access_expire_at
    }

    /// Whether the session is still valid right now.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.is_live_at(Utc::now().timestamp_millis())
    }
}

// =============================================================================
// SessionStore
// =============================================================================

/// Key/value store holding the last-issued guest session.
///
/// The backing substrate may be unavailable in some execution environments;
/// implementations must report that as a miss, never as an error. `store`
/// overwrites unconditionally - last-writer-wins, no versioning. The trait
/// is only ever used through generics, not as a trait object.
#[allow(async_fn_in_trait)]
pub trait SessionStore: Send + Sync {
    /// Fetch a live session, treating expired entries as absent.
    async fn lookup(&self, key: &str) -> Option<GuestSession>;

    /// Store a session, replacing any existing entry under the key.
    async fn store(&self, key: &str, session: GuestSession);
}

/// Production token cache backed by `moka`.
///
/// The cache TTL matches [`TOKEN_TTL_SECONDS`]; on top of that, `lookup`
/// lazily validates the session's own expiry against wall-clock time, so a
/// stale entry is never returned even if the substrate kept it around.
#[derive(Clone)]
pub struct MokaSessionStore {
    cache: Cache<String, GuestSession>,
}

impl MokaSessionStore {
    /// Create a store with the standard token TTL.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                // One session per key; capacity is a formality
                .max_capacity(16)
                .time_to_live(Duration::from_secs(TOKEN_TTL_SECONDS))
                .build(),
        }
    }
}

impl Default for MokaSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MokaSessionStore {
    async fn lookup(&self, key: &str) -> Option<GuestSession> {
        let session = self.cache.get(key).await?;

        if session.is_live() {
            return Some(session);
        }

        // Lazy expiry: drop the dead entry instead of waiting for eviction
        self.cache.invalidate(key).await;
        None
    }

    async fn store(&self, key: &str, session: GuestSession) {
        self.cache.insert(key.to_string(), session).await;
    }
}
