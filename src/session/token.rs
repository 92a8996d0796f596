//! Time-derived session token.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Opaque correlation key for one widget lifetime.
///
/// Serializes as a bare string so it can be dropped straight into request
/// payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Create a token from the current time in milliseconds since the epoch.
    #[must_use]
    pub fn generate() -> Self {
        Self(Utc::now().timestamp_millis().to_string())
    }

    /// Wrap an existing token.
    pub fn from_string(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_millisecond_timestamp() {
        let before = Utc::now().timestamp_millis();
        let token = SessionToken::generate();
        let after = Utc::now().timestamp_millis();

        let value: i64 = token.as_str().parse().unwrap();
        assert!(value >= before && value <= after);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let token = SessionToken::from_string("1700000000000");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"1700000000000\"");
        assert_eq!(token.to_string(), "1700000000000");
    }
}
