//! Authorization Code Flow
//!
//! RFC 6749 Section 4.1 - Authorization Code Grant, with PKCE (RFC 7636) and OIDC nonce.
//!
//! The flow object is stateless: [`AuthorizationCodeFlow::start`] hands a [`FlowContext`] to the
//! caller, who keeps it (in memory or serialized) until the redirect comes back and then passes
//! both to [`AuthorizationCodeFlow::resume`].

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use url::Url;

use crate::client::OidcClient;
use crate::core::{FormBody, PkceGenerator, CODE_CHALLENGE_METHOD};
use crate::error::{AuthorizationError, ClientResult, OidcError};
use crate::types::{matches_redirect, AuthorizationParams, RedirectParams, Token};

/// Random bytes behind `state` and `nonce`.
const STATE_ENTROPY_BYTES: usize = 32;

/// Per-attempt values correlating an authorization request with its redirect.
///
/// Serializable so the redirect may be resumed in another process.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowContext {
    state: String,
    code_verifier: String,
    nonce: Option<String>,
    redirect_uri: Url,
    max_age: Option<u64>,
    client_id: String,
    authorization_endpoint: Url,
}

impl FlowContext {
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn code_verifier(&self) -> &str {
        &self.code_verifier
    }

    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    pub fn max_age(&self) -> Option<u64> {
        self.max_age
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn authorization_endpoint(&self) -> &Url {
        &self.authorization_endpoint
    }
}

impl fmt::Debug for FlowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowContext")
            .field("state", &"[REDACTED]")
            .field("code_verifier", &"[REDACTED]")
            .field("nonce", &self.nonce.as_ref().map(|_| "[REDACTED]"))
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("max_age", &self.max_age)
            .field("client_id", &self.client_id)
            .field("authorization_endpoint", &self.authorization_endpoint.as_str())
            .finish()
    }
}

/// Launch URL plus the context needed to resume.
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
    pub url: Url,
    pub context: FlowContext,
}

/// Terminal outcome of [`AuthorizationCodeFlow::resume`].
#[derive(Debug)]
#[must_use]
pub enum FlowOutcome {
    /// The redirect did not come back to the configured redirect URI.
    RedirectSchemeMismatch { expected: String, received: String },
    /// Neither `code` nor `error` was present.
    MissingResultCode,
    /// Provider error, state mismatch, foreign context or endpoint failure.
    Error(OidcError),
    /// The code exchange ran; its result is forwarded as is.
    Token(ClientResult<Token>),
}

impl FlowOutcome {
    /// Collapse the outcome into a single result.
    pub fn into_result(self) -> ClientResult<Token> {
        match self {
            Self::RedirectSchemeMismatch { expected, received } => {
                Err(AuthorizationError::RedirectSchemeMismatch { expected, received }.into())
            }
            Self::MissingResultCode => Err(AuthorizationError::MissingResultCode.into()),
            Self::Error(error) => Err(error),
            Self::Token(result) => result,
        }
    }
}

/// Authorization code flow bound to one client and one redirect URI.
#[derive(Clone, Debug)]
pub struct AuthorizationCodeFlow {
    client: OidcClient,
    redirect_uri: Url,
}

impl AuthorizationCodeFlow {
    pub fn new(client: OidcClient, redirect_uri: Url) -> Self {
        Self {
            client,
            redirect_uri,
        }
    }

    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    /// Generate a fresh context and the authorization URL to launch.
    pub async fn start(&self, params: AuthorizationParams) -> ClientResult<AuthorizationRequest> {
        let endpoints = self.client.endpoints().await?;
        let config = self.client.configuration();

        let scope = params
            .scope
            .unwrap_or_else(|| config.default_scope.clone());
        let state = config.random.random_url_safe(STATE_ENTROPY_BYTES);
        let nonce = requests_openid(&scope)
            .then(|| config.random.random_url_safe(STATE_ENTROPY_BYTES));
        let pkce = PkceGenerator::new(config.random.as_ref()).generate();

        let mut query: FormBody = params.extra_params.into_iter().collect();
        query.insert("client_id", config.client_id.as_str());
        query.insert("code_challenge", pkce.code_challenge.as_str());
        query.insert("code_challenge_method", CODE_CHALLENGE_METHOD);
        query.insert("redirect_uri", self.redirect_uri.as_str());
        query.insert("response_type", "code");
        query.insert("scope", scope.as_str());
        query.insert("state", state.as_str());
        if let Some(nonce) = &nonce {
            query.insert("nonce", nonce.as_str());
        }
        if let Some(login_hint) = &params.login_hint {
            query.insert("login_hint", login_hint.as_str());
        }
        if let Some(prompt) = params.prompt {
            query.insert("prompt", prompt.as_str());
        }
        if let Some(max_age) = params.max_age {
            query.insert("max_age", max_age.to_string());
        }

        let mut url = endpoints.authorization_endpoint.clone();
        let encoded = query.encode();
        let full_query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{}&{}", existing, encoded),
            _ => encoded,
        };
        url.set_query(Some(&full_query));

        debug!(
            scope = %scope,
            nonce = nonce.is_some(),
            "Authorization flow started"
        );

        Ok(AuthorizationRequest {
            url,
            context: FlowContext {
                state,
                code_verifier: pkce.code_verifier,
                nonce,
                redirect_uri: self.redirect_uri.clone(),
                max_age: params.max_age,
                client_id: config.client_id.clone(),
                authorization_endpoint: endpoints.authorization_endpoint.clone(),
            },
        })
    }

    /// Resolve the redirect the user agent came back with.
    ///
    /// Nothing is sent to the provider unless the redirect carries a code and the
    /// matching `state`.
    pub async fn resume(&self, redirect: &str, context: &FlowContext) -> FlowOutcome {
        let received = match Url::parse(redirect) {
            Ok(url) if matches_redirect(&self.redirect_uri, &url) => url,
            _ => {
                debug!("Redirect does not match the configured redirect URI");
                return FlowOutcome::RedirectSchemeMismatch {
                    expected: self.redirect_uri.to_string(),
                    received: redirect.to_string(),
                };
            }
        };

        if let Err(error) = self.check_context(context).await {
            return FlowOutcome::Error(error);
        }

        let params = RedirectParams::from_url(&received);
        if let Some(error) = params.error {
            debug!(error = %error, "Provider returned an authorization error");
            return FlowOutcome::Error(
                AuthorizationError::Provider {
                    error,
                    error_description: params.error_description,
                }
                .into(),
            );
        }

        let carries_result = params.state.is_some() || params.code.is_some();
        if carries_result && params.state.as_deref() != Some(context.state()) {
            warn!("Authorization redirect state does not match the flow context");
            return FlowOutcome::Error(AuthorizationError::StateMismatch.into());
        }

        let Some(code) = params.code else {
            return FlowOutcome::MissingResultCode;
        };

        FlowOutcome::Token(self.client.exchange_code(&code, context).await)
    }

    async fn check_context(&self, context: &FlowContext) -> ClientResult<()> {
        let endpoints = self.client.endpoints().await?;

        let reason = if context.client_id != self.client.client_id() {
            Some("client_id")
        } else if context.authorization_endpoint != endpoints.authorization_endpoint {
            Some("authorization_endpoint")
        } else if context.redirect_uri != self.redirect_uri {
            Some("redirect_uri")
        } else {
            None
        };

        match reason {
            Some(field) => {
                warn!(field = field, "Flow context was created by a different client");
                Err(AuthorizationError::ForeignContext {
                    reason: format!("{} does not match", field),
                }
                .into())
            }
            None => Ok(()),
        }
    }
}

fn requests_openid(scope: &str) -> bool {
    scope.split_whitespace().any(|s| s == "openid")
}
