//! RP-Initiated Logout
//!
//! OpenID Connect RP-Initiated Logout 1.0 through the provider's `end_session_endpoint`.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use url::Url;

use crate::client::OidcClient;
use crate::core::FormBody;
use crate::error::{AuthorizationError, ClientResult, OidcError};
use crate::types::{matches_redirect, RedirectParams};

const STATE_ENTROPY_BYTES: usize = 32;

/// Values needed to resume a logout redirect.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndSessionContext {
    state: String,
    redirect_uri: Url,
}

impl EndSessionContext {
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }
}

impl fmt::Debug for EndSessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndSessionContext")
            .field("state", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri.as_str())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct EndSessionRequest {
    pub url: Url,
    pub context: EndSessionContext,
}

#[derive(Debug)]
#[must_use]
pub enum EndSessionOutcome {
    RedirectSchemeMismatch { expected: String, received: String },
    /// Provider error or state mismatch.
    Error(OidcError),
    Success,
}

impl EndSessionOutcome {
    pub fn into_result(self) -> ClientResult<()> {
        match self {
            Self::RedirectSchemeMismatch { expected, received } => {
                Err(AuthorizationError::RedirectSchemeMismatch { expected, received }.into())
            }
            Self::Error(error) => Err(error),
            Self::Success => Ok(()),
        }
    }
}

/// Logout flow redirecting back to `post_logout_redirect_uri`.
#[derive(Clone, Debug)]
pub struct RedirectEndSessionFlow {
    client: OidcClient,
    post_logout_redirect_uri: Url,
}

impl RedirectEndSessionFlow {
    pub fn new(client: OidcClient, post_logout_redirect_uri: Url) -> Self {
        Self {
            client,
            post_logout_redirect_uri,
        }
    }

    /// Build the logout URL for the session behind `id_token_hint`.
    pub async fn start(&self, id_token_hint: &str) -> ClientResult<EndSessionRequest> {
        let endpoints = self.client.endpoints().await?;
        let config = self.client.configuration();
        let state = config.random.random_url_safe(STATE_ENTROPY_BYTES);

        let query = FormBody::new()
            .field("client_id", config.client_id.as_str())
            .field("id_token_hint", id_token_hint)
            .field("post_logout_redirect_uri", self.post_logout_redirect_uri.as_str())
            .field("state", state.as_str());

        let mut url = endpoints.end_session()?.clone();
        url.set_query(Some(&query.encode()));

        debug!("End session flow started");
        Ok(EndSessionRequest {
            url,
            context: EndSessionContext {
                state,
                redirect_uri: self.post_logout_redirect_uri.clone(),
            },
        })
    }

    pub fn resume(&self, redirect: &str, context: &EndSessionContext) -> EndSessionOutcome {
        let received = match Url::parse(redirect) {
            Ok(url) if matches_redirect(&context.redirect_uri, &url) => url,
            _ => {
                return EndSessionOutcome::RedirectSchemeMismatch {
                    expected: context.redirect_uri.to_string(),
                    received: redirect.to_string(),
                }
            }
        };

        let params = RedirectParams::from_url(&received);
        if let Some(error) = params.error {
            return EndSessionOutcome::Error(
                AuthorizationError::Provider {
                    error,
                    error_description: params.error_description,
                }
                .into(),
            );
        }

        if params.state.as_deref() != Some(context.state()) {
            warn!("End session redirect state does not match the context");
            return EndSessionOutcome::Error(AuthorizationError::StateMismatch.into());
        }

        EndSessionOutcome::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::*;
    use crate::core::MockHttpTransport;
    use crate::error::{ErrorKind, ProtocolError};
    use crate::types::Endpoints;
    use std::sync::Arc;

    fn flow() -> RedirectEndSessionFlow {
        RedirectEndSessionFlow::new(
            client(Arc::new(MockHttpTransport::new())),
            Url::parse("unitTest:/logout").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_start_builds_logout_url() {
        let request = flow().start("exampleIdToken").await.unwrap();

        assert_eq!(
            request.url.as_str(),
            format!(
                "{}/v1/logout?client_id=unit_test_client_id&id_token_hint=exampleIdToken&post_logout_redirect_uri=unittest%3A%2Flogout&state={}",
                ISSUER,
                request.context.state()
            )
        );
    }

    #[tokio::test]
    async fn test_start_without_end_session_endpoint() {
        let bare = Endpoints::new(
            Url::parse(ISSUER).unwrap(),
            endpoints().authorization_endpoint,
            endpoints().token_endpoint,
        );
        let client = crate::client::OidcClient::create(
            client(Arc::new(MockHttpTransport::new()))
                .configuration()
                .clone(),
            bare,
        );
        let flow = RedirectEndSessionFlow::new(client, Url::parse("unitTest:/logout").unwrap());

        let error = flow.start("exampleIdToken").await.unwrap_err();
        assert!(matches!(
            error,
            OidcError::Protocol(ProtocolError::MissingEndpoint { .. })
        ));
    }

    #[tokio::test]
    async fn test_resume_outcomes() {
        let flow = flow();
        let context = flow.start("exampleIdToken").await.unwrap().context;

        let success = format!("unitTest:/logout?state={}", context.state());
        assert!(matches!(
            flow.resume(&success, &context),
            EndSessionOutcome::Success
        ));

        assert!(matches!(
            flow.resume("wrong:/logout", &context),
            EndSessionOutcome::RedirectSchemeMismatch { .. }
        ));

        match flow.resume("unitTest:/logout?state=MISMATCH", &context) {
            EndSessionOutcome::Error(error) => {
                assert_eq!(error.kind(), ErrorKind::SecurityViolation)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let error = flow
            .resume("unitTest:/logout?error=invalid_request", &context)
            .into_result()
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ProviderError);
        assert_eq!(error.to_string(), "invalid_request");
    }
}
