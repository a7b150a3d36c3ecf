//! Introspection Types
//!
//! Types for OAuth2 Token Introspection (RFC 7662) and Revocation (RFC 7009).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::claims::Claims;
use crate::error::ProtocolError;

/// Kind of token, used as the introspection `token_type_hint`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    AccessToken,
    RefreshToken,
    IdToken,
    DeviceSecret,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
            Self::IdToken => "id_token",
            Self::DeviceSecret => "device_secret",
        }
    }
}

/// Introspection outcome, keyed on the literal `active` boolean.
#[derive(Clone, Debug, PartialEq)]
pub enum IntrospectInfo {
    /// Token is active; the full response is kept for typed decoding.
    Active { claims: Claims },
    Inactive,
}

impl IntrospectInfo {
    /// Interpret an introspection response body.
    pub fn from_body(body: &str) -> Result<Self, ProtocolError> {
        let claims = Claims::from_json(body)?;
        match claims.get("active") {
            Some(Value::Bool(true)) => Ok(Self::Active { claims }),
            Some(Value::Bool(false)) => Ok(Self::Inactive),
            Some(other) => Err(ProtocolError::InvalidResponse {
                message: format!("introspection `active` is not a boolean: {}", other),
            }),
            None => Err(ProtocolError::MissingField {
                field: "active".to_string(),
            }),
        }
    }

    pub fn active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Claims of an active token.
    pub fn claims(&self) -> Option<&Claims> {
        match self {
            Self::Active { claims } => Some(claims),
            Self::Inactive => None,
        }
    }

    /// Decode the claims of an active token; `None` when inactive.
    pub fn deserialize_claims<T: DeserializeOwned>(&self) -> Option<Result<T, ProtocolError>> {
        self.claims().map(Claims::deserialize_claims::<T>)
    }
}

/// Registered RFC 7662 claims, a ready-made target for [`Claims::deserialize_claims`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IntrospectionClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Expiration timestamp (Unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued-at timestamp (Unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Additional claims.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl IntrospectionClaims {
    /// Get scopes as vector.
    pub fn scopes(&self) -> Vec<String> {
        self.scope
            .as_ref()
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_default()
    }
}
