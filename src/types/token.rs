//! Token Types
//!
//! Token endpoint response and the immutable token value handed to callers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Clock;

/// Token response from the token endpoint.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
    pub access_token: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub device_secret: Option<String>,
}

/// Result of a successful token exchange.
///
/// Serializable so it can be handed to a storage layer unchanged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: String,
    /// Lifetime in seconds, counted from `issued_at`.
    pub expires_in: u64,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_secret: Option<String>,
    /// When the client received the token, per the configured clock.
    pub issued_at: DateTime<Utc>,
}

impl Token {
    /// Create from token response.
    pub fn from_response(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        Self {
            token_type: response.token_type,
            expires_in: response.expires_in,
            access_token: response.access_token,
            scope: response.scope,
            refresh_token: response.refresh_token,
            id_token: response.id_token,
            device_secret: response.device_secret,
            issued_at,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        let seconds = i64::try_from(self.expires_in).unwrap_or(i64::MAX);
        Duration::try_seconds(seconds)
            .and_then(|lifetime| self.issued_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Check if token is expired.
    pub fn is_expired(&self, clock: &dyn Clock) -> bool {
        self.expires_at() <= clock.now()
    }

    /// Get remaining lifetime in seconds.
    pub fn remaining_lifetime(&self, clock: &dyn Clock) -> i64 {
        (self.expires_at() - clock.now()).num_seconds().max(0)
    }

    /// Get scopes as vector.
    pub fn scopes(&self) -> Vec<&str> {
        self.scope
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Format as Authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Token")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("refresh_token", &redacted(&self.refresh_token))
            .field("id_token", &redacted(&self.id_token))
            .field("device_secret", &redacted(&self.device_secret))
            .field("issued_at", &self.issued_at)
            .finish()
    }
}
