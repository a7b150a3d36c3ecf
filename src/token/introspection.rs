//! Token Introspection
//!
//! RFC 7662 - OAuth 2.0 Token Introspection.

use tracing::debug;

use crate::client::OidcClient;
use crate::core::FormBody;
use crate::error::ClientResult;
use crate::types::{IntrospectInfo, TokenType};

impl OidcClient {
    /// Ask the provider whether `token` is active.
    ///
    /// A response without a boolean `active` field is a protocol error, never `Inactive`.
    pub async fn introspect_token(
        &self,
        token_type: TokenType,
        token: &str,
    ) -> ClientResult<IntrospectInfo> {
        let endpoints = self.endpoints().await?;
        let url = endpoints.introspection()?;

        let form = FormBody::new()
            .field("token", token)
            .field("token_type_hint", token_type.as_str());
        let response = self.post_form(url, form).await?;

        let info = self
            .configuration()
            .dispatch
            .run_compute(move || Ok(IntrospectInfo::from_body(&response.body)?))
            .await?;

        debug!(token_type = token_type.as_str(), active = info.active(), "Token introspected");
        Ok(info)
    }
}
