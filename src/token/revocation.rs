//! Token Revocation
//!
//! RFC 7009 - OAuth 2.0 Token Revocation.

use tracing::debug;

use crate::client::OidcClient;
use crate::core::FormBody;
use crate::error::ClientResult;

impl OidcClient {
    /// Revoke `token`. Any 2xx answer is success, whatever the body.
    pub async fn revoke_token(&self, token: &str) -> ClientResult<()> {
        let endpoints = self.endpoints().await?;
        let url = endpoints.revocation()?;

        self.post_form(url, FormBody::new().field("token", token))
            .await?;

        debug!("Token revoked");
        Ok(())
    }
}
