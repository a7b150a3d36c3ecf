//! UserInfo
//!
//! OIDC Core 5.3 - UserInfo endpoint.

use crate::client::OidcClient;
use crate::core::HttpRequest;
use crate::error::ClientResult;
use crate::types::{Claims, UserInfo};

impl OidcClient {
    /// Fetch the claims about the user behind `access_token`.
    pub async fn get_user_info(&self, access_token: &str) -> ClientResult<UserInfo> {
        let endpoints = self.endpoints().await?;
        let url = endpoints.userinfo()?;

        let request = HttpRequest::get(url.as_str())
            .with_header("authorization", format!("Bearer {}", access_token));
        let response = self.send(request).await?;

        self.configuration()
            .dispatch
            .run_compute(move || Ok(UserInfo::new(Claims::from_json(&response.body)?)))
            .await
    }
}
