//! Authorization Types
//!
//! Options for building an authorization request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Optional parameters for an authorization request.
#[derive(Clone, Debug, Default)]
pub struct AuthorizationParams {
    /// Requested scope (overrides the configured default).
    pub scope: Option<String>,
    /// Login hint for pre-filling user identity.
    pub login_hint: Option<String>,
    /// Prompt behavior.
    pub prompt: Option<Prompt>,
    /// Maximum authentication age in seconds; checked against `auth_time` in the ID token.
    pub max_age: Option<u64>,
    /// Additional parameters.
    pub extra_params: BTreeMap<String, String>,
}

impl AuthorizationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn login_hint(mut self, login_hint: impl Into<String>) -> Self {
        self.login_hint = Some(login_hint.into());
        self
    }

    pub fn prompt(mut self, prompt: Prompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn extra_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.insert(key.into(), value.into());
        self
    }
}

/// Prompt behavior for authorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
    /// Do not display any authentication or consent UI.
    None,
    /// Force re-authentication.
    Login,
    /// Force consent screen.
    Consent,
    /// Force account selection.
    SelectAccount,
}

impl Prompt {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Login => "login",
            Self::Consent => "consent",
            Self::SelectAccount => "select_account",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_as_str() {
        assert_eq!(Prompt::None.as_str(), "none");
        assert_eq!(Prompt::Login.as_str(), "login");
        assert_eq!(Prompt::Consent.as_str(), "consent");
        assert_eq!(Prompt::SelectAccount.as_str(), "select_account");
    }

    #[test]
    fn test_authorization_params_builder() {
        let params = AuthorizationParams::new()
            .scope("openid")
            .max_age(300)
            .extra_param("acr_values", "urn:okta:loa:2fa:any");

        assert_eq!(params.scope.as_deref(), Some("openid"));
        assert_eq!(params.max_age, Some(300));
        assert!(params.prompt.is_none());
        assert_eq!(params.extra_params.len(), 1);
    }
}
