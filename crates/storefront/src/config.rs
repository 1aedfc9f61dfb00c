//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `API_BASE_URL` - Base URL of the commerce upstream. Falls back to
//!   `NEXT_PUBLIC_API_BASE_URL` (the key used by the legacy deployment).
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `IP_ECHO_URL` - Public IP-echo endpoint used when building guest
//!   sign-in fingerprints (default: api.ipify.org)
//! - `DEFAULT_REQUEST_ID` - Seller request id used when a page does not
//!   supply one
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use url::Url;

/// IP-echo endpoint used when `IP_ECHO_URL` is not set.
const DEFAULT_IP_ECHO_URL: &str = "https://api.ipify.org?format=json";

/// Seller request id used when neither the environment nor the caller
/// supplies one.
const DEFAULT_REQUEST_ID: &str = "665f0dbb2c1a4e49c7f0d2a1";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Commerce upstream configuration
    pub commerce: CommerceConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Commerce upstream configuration.
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// Base URL of the commerce API, without a trailing slash.
    pub base_url: String,
    /// IP-echo endpoint queried while building a device fingerprint.
    pub ip_echo_url: String,
    /// Request id used when a catalog fetch does not supply one.
    pub default_request_id: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;

        let commerce = CommerceConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            commerce,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CommerceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_base = get_api_base_url("API_BASE_URL")?;
        let base_url = normalize_base_url("API_BASE_URL", &raw_base)?;

        Ok(Self {
            base_url,
            ip_echo_url: get_env_or_default("IP_ECHO_URL", DEFAULT_IP_ECHO_URL),
            default_request_id: get_env_or_default("DEFAULT_REQUEST_ID", DEFAULT_REQUEST_ID),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get the upstream base URL with fallback to the legacy key
/// `NEXT_PUBLIC_API_BASE_URL` (set by the previous deployment tooling).
fn get_api_base_url(primary_key: &str) -> Result<String, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(value);
    }
    if let Ok(value) = std::env::var("NEXT_PUBLIC_API_BASE_URL") {
        return Ok(value);
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate a base URL and strip any trailing slash so endpoint paths can
/// be appended uniformly.
fn normalize_base_url(var_name: &str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}
