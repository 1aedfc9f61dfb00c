//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_external_id!` macro to create type-safe wrappers around
//! opaque upstream identifiers so they cannot be mixed up with one another.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe wrapper around an opaque external ID.
///
/// Upstream identifiers (ASINs, request IDs) are opaque strings whose format
/// we do not own, so the wrapper stores a `String` verbatim. Creates a
/// newtype with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use shoplight_core::define_external_id;
/// define_external_id!(Asin);
/// define_external_id!(RequestId);
///
/// let asin = Asin::new("B071DR7GLW");
/// let request_id = RequestId::new("demo-request");
///
/// // These are different types, so this won't compile:
/// // let _: Asin = request_id;
/// # let _ = asin;
/// ```
#[macro_export]
macro_rules! define_external_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

// External identifiers handed to us by the commerce upstream
define_external_id!(Asin);
define_external_id!(RequestId);

/// A randomly generated device identifier used in guest sign-in payloads.
///
/// Stored as its string form since the upstream only ever sees it
/// serialized; a fresh one is minted per authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap an already-formatted device identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_asin_round_trip() {
        let asin = Asin::new("B071DR7GLW");
        assert_eq!(asin.as_str(), "B071DR7GLW");
        assert_eq!(asin.to_string(), "B071DR7GLW");
        assert_eq!(Asin::from("B071DR7GLW"), asin);
    }

    #[test]
    fn test_asin_serde_transparent() {
        let asin = Asin::new("B071DR7GLW");
        let json = serde_json::to_string(&asin).unwrap();
        assert_eq!(json, "\"B071DR7GLW\"");

        let parsed: Asin = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, asin);
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::new("abc123");
        assert_eq!(format!("{id}"), "abc123");
    }
}
