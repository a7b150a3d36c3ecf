//! Token Exchange
//!
//! Token endpoint grants: authorization code, refresh token and client credentials.
//! Every grant runs the same pipeline: resolve endpoints, POST the sorted form, decode,
//! validate, post `TokenCreated`, return.

use tracing::debug;

use crate::client::OidcClient;
use crate::core::FormBody;
use crate::error::{ClientResult, ProtocolError};
use crate::events::Event;
use crate::flows::FlowContext;
use crate::token::validation::ValidationContext;
use crate::types::{GrantType, Token, TokenResponse};

impl OidcClient {
    /// Exchange an authorization code using the PKCE verifier and redirect URI of `context`.
    pub async fn exchange_code(&self, code: &str, context: &FlowContext) -> ClientResult<Token> {
        let form = FormBody::new()
            .field("grant_type", GrantType::AuthorizationCode.as_str())
            .field("code", code)
            .field("code_verifier", context.code_verifier())
            .field("redirect_uri", context.redirect_uri().as_str());

        self.token_request(
            GrantType::AuthorizationCode,
            form,
            context.nonce().map(String::from),
            context.max_age(),
        )
        .await
    }

    /// Refresh with the configured default scope, which is always sent.
    pub async fn refresh_token(&self, refresh_token: &str) -> ClientResult<Token> {
        let form = FormBody::new()
            .field("grant_type", GrantType::RefreshToken.as_str())
            .field("refresh_token", refresh_token)
            .field("scope", self.configuration().default_scope.as_str());

        self.token_request(GrantType::RefreshToken, form, None, None).await
    }

    /// Client credentials grant; `scope` defaults to the configured default scope.
    pub async fn client_credentials(&self, scope: Option<&str>) -> ClientResult<Token> {
        let scope = scope.unwrap_or(self.configuration().default_scope.as_str());
        let form = FormBody::new()
            .field("grant_type", GrantType::ClientCredentials.as_str())
            .field("scope", scope);

        self.token_request(GrantType::ClientCredentials, form, None, None).await
    }

    async fn token_request(
        &self,
        grant: GrantType,
        form: FormBody,
        nonce: Option<String>,
        max_age: Option<u64>,
    ) -> ClientResult<Token> {
        let endpoints = self.endpoints().await?;
        let config = self.configuration().clone();

        debug!(grant_type = grant.as_str(), "Requesting token");
        let response = self.post_form(&endpoints.token_endpoint, form).await?;

        let context = ValidationContext {
            client_id: config.client_id.clone(),
            endpoints,
            nonce,
            max_age,
            now: config.clock.now(),
        };
        let validators = config.validators.clone();
        let token = config
            .dispatch
            .run_compute(move || {
                let parsed: TokenResponse =
                    serde_json::from_str(&response.body).map_err(ProtocolError::invalid_json)?;
                let token = Token::from_response(parsed, context.now);
                validators.validate_token(&token, &context)?;
                Ok(token)
            })
            .await?;

        debug!(grant_type = grant.as_str(), "Token issued");
        config.events.post(Event::TokenCreated {
            token: token.clone(),
            credential: None,
        });
        Ok(token)
    }
}
