//! Public IP resolution for device fingerprints.
//!
//! The guest sign-in payload wants the caller's public IP address. Failing
//! to discover it must never abort the authentication flow, so any error
//! here degrades to a fixed fallback literal instead of propagating.

use serde::Deserialize;

/// Address reported when the IP-echo service cannot be reached or returns
/// something unusable. A deliberate degrade-not-fail default.
pub const FALLBACK_CLIENT_IP: &str = "127.0.0.1";

/// Response body of the IP-echo service (`{"ip":"203.0.113.7"}`).
#[derive(Debug, Deserialize)]
struct IpEchoResponse {
    ip: String,
}

/// Resolve the caller's public IP address.
///
/// Performs one GET against the configured IP-echo endpoint. On any network
/// error, non-success status, or malformed body, returns
/// [`FALLBACK_CLIENT_IP`] rather than an error.
pub async fn resolve_client_ip(http: &reqwest::Client, echo_url: &str) -> String {
    match try_resolve(http, echo_url).await {
        Ok(ip) if !ip.is_empty() => ip,
        Ok(_) => {
            tracing::debug!("IP echo returned an empty address, using fallback");
            FALLBACK_CLIENT_IP.to_string()
        }
        Err(e) => {
            tracing::debug!(error = %e, "IP echo lookup failed, using fallback");
            FALLBACK_CLIENT_IP.to_string()
        }
    }
}

async fn try_resolve(http: &reqwest::Client, echo_url: &str) -> Result<String, reqwest::Error> {
    let response = http.get(echo_url).send().await?.error_for_status()?;
    let body: IpEchoResponse = response.json().await?;
    Ok(body.ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_endpoint_falls_back() {
        let http = reqwest::Client::new();
        // Port 9 (discard) on loopback refuses connections immediately
        let ip = resolve_client_ip(&http, "http://127.0.0.1:9/ip").await;
        assert_eq!(ip, FALLBACK_CLIENT_IP);
    }

    #[test]
    fn test_echo_body_parses() {
        let body: IpEchoResponse =
            serde_json::from_str("{\"ip\":\"203.0.113.7\"}").expect("valid echo body");
        assert_eq!(body.ip, "203.0.113.7");
    }
}
