//! Configuration Types
//!
//! Client configuration and provider endpoint types.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::core::{Clock, DispatchPolicy, HttpTransport, ResponseCache, SecureRandom};
use crate::error::ProtocolError;
use crate::events::EventCoordinator;
use crate::token::validation::Validators;

/// Provider endpoints, as published by the discovery document.
///
/// Immutable once built; shared behind an `Arc` for the lifetime of the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Issuer identifier.
    pub issuer: Url,
    /// Authorization endpoint URL.
    pub authorization_endpoint: Url,
    /// Token endpoint URL.
    pub token_endpoint: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_endpoint: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introspection_endpoint: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_endpoint: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_session_endpoint: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_authorization_endpoint: Option<Url>,
}

impl Endpoints {
    /// Endpoints with only the required URLs set.
    pub fn new(issuer: Url, authorization_endpoint: Url, token_endpoint: Url) -> Self {
        Self {
            issuer,
            authorization_endpoint,
            token_endpoint,
            userinfo_endpoint: None,
            jwks_uri: None,
            registration_endpoint: None,
            introspection_endpoint: None,
            revocation_endpoint: None,
            end_session_endpoint: None,
            device_authorization_endpoint: None,
        }
    }

    pub fn userinfo(&self) -> Result<&Url, ProtocolError> {
        require(self.userinfo_endpoint.as_ref(), "userinfo")
    }

    pub fn introspection(&self) -> Result<&Url, ProtocolError> {
        require(self.introspection_endpoint.as_ref(), "introspection")
    }

    pub fn revocation(&self) -> Result<&Url, ProtocolError> {
        require(self.revocation_endpoint.as_ref(), "revocation")
    }

    pub fn end_session(&self) -> Result<&Url, ProtocolError> {
        require(self.end_session_endpoint.as_ref(), "end_session")
    }
}

fn require<'a>(endpoint: Option<&'a Url>, name: &'static str) -> Result<&'a Url, ProtocolError> {
    endpoint.ok_or(ProtocolError::MissingEndpoint { endpoint: name })
}

/// Client authentication method at the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
    /// client_id and client_secret in request body.
    ClientSecretPost,
    /// HTTP Basic Authentication header.
    ClientSecretBasic,
    /// No client authentication (public client).
    #[default]
    None,
}

/// Grant type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    ClientCredentials,
    RefreshToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }
}

/// Immutable client configuration.
///
/// Built once with [`crate::builders::OidcConfigurationBuilder`] and shared read-only by
/// every operation.
#[derive(Clone)]
pub struct OidcConfiguration {
    pub client_id: String,
    /// Scope requested when the caller does not name one; always sent on refresh.
    pub default_scope: String,
    pub client_secret: Option<SecretString>,
    pub auth_method: ClientAuthMethod,
    pub timeout: Duration,
    pub transport: Arc<dyn HttpTransport>,
    pub clock: Arc<dyn Clock>,
    pub random: Arc<dyn SecureRandom>,
    pub validators: Validators,
    pub dispatch: DispatchPolicy,
    pub events: EventCoordinator,
    pub cache: Arc<dyn ResponseCache>,
}

impl std::fmt::Debug for OidcConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcConfiguration")
            .field("client_id", &self.client_id)
            .field("default_scope", &self.default_scope)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("auth_method", &self.auth_method)
            .field("timeout", &self.timeout)
            .field("dispatch", &self.dispatch)
            .finish_non_exhaustive()
    }
}

/// Per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_type_as_str() {
        assert_eq!(GrantType::AuthorizationCode.as_str(), "authorization_code");
        assert_eq!(GrantType::ClientCredentials.as_str(), "client_credentials");
        assert_eq!(GrantType::RefreshToken.as_str(), "refresh_token");
    }

    #[test]
    fn test_endpoints_from_discovery_document() {
        let json = r#"{
            "issuer": "https://example.okta.com/oauth2/default",
            "authorization_endpoint": "https://example.okta.com/oauth2/default/v1/authorize",
            "token_endpoint": "https://example.okta.com/oauth2/default/v1/token",
            "userinfo_endpoint": "https://example.okta.com/oauth2/default/v1/userinfo",
            "registration_endpoint": "https://example.okta.com/oauth2/v1/clients",
            "introspection_endpoint": "https://example.okta.com/oauth2/default/v1/introspect",
            "revocation_endpoint": "https://example.okta.com/oauth2/default/v1/revoke",
            "end_session_endpoint": "https://example.okta.com/oauth2/default/v1/logout",
            "response_types_supported": ["code"]
        }"#;

        let endpoints: Endpoints = serde_json::from_str(json).unwrap();
        assert_eq!(
            endpoints.token_endpoint.as_str(),
            "https://example.okta.com/oauth2/default/v1/token"
        );
        assert!(endpoints.jwks_uri.is_none());
        assert!(endpoints.device_authorization_endpoint.is_none());
        assert_eq!(
            endpoints.revocation().unwrap().path(),
            "/oauth2/default/v1/revoke"
        );
    }

    #[test]
    fn test_missing_required_endpoint_fails_to_parse() {
        let json = r#"{"issuer": "https://example.com", "token_endpoint": "https://example.com/token"}"#;
        assert!(serde_json::from_str::<Endpoints>(json).is_err());
    }

    #[test]
    fn test_missing_optional_endpoint_at_use_time() {
        let endpoints = Endpoints::new(
            Url::parse("https://example.com").unwrap(),
            Url::parse("https://example.com/authorize").unwrap(),
            Url::parse("https://example.com/token").unwrap(),
        );

        match endpoints.introspection() {
            Err(ProtocolError::MissingEndpoint { endpoint }) => assert_eq!(endpoint, "introspection"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
