//! OIDC Client
//!
//! Entry point tying configuration, endpoint discovery and the token operations together.
//! Token endpoint grants live in `token::exchange`; introspection, revocation and userinfo
//! in their own modules under `token`.

use base64::Engine;
use secrecy::ExposeSecret;
use std::sync::Arc;
use url::Url;

use crate::core::{discovery_url, perform_request, EndpointsCache, FormBody, HttpRequest, HttpResponse};
use crate::error::{ClientResult, ConfigurationError};
use crate::types::{ClientAuthMethod, Endpoints, OidcConfiguration};

struct ClientInner {
    config: Arc<OidcConfiguration>,
    endpoints: EndpointsCache,
}

/// OIDC client bound to one configuration and one provider.
///
/// Cheap to clone; clones share the endpoint cache.
#[derive(Clone)]
pub struct OidcClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for OidcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcClient")
            .field("config", &self.inner.config)
            .field("endpoints", &self.inner.endpoints)
            .finish()
    }
}

impl OidcClient {
    fn with_cache(config: impl Into<Arc<OidcConfiguration>>, endpoints: EndpointsCache) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config: config.into(),
                endpoints,
            }),
        }
    }

    /// Client for already known endpoints; discovery is never performed.
    pub fn create(config: impl Into<Arc<OidcConfiguration>>, endpoints: Endpoints) -> Self {
        Self::with_cache(config, EndpointsCache::resolved(endpoints))
    }

    /// Client that loads its endpoints from `discovery_url` on first use.
    pub fn create_from_discovery_url(
        config: impl Into<Arc<OidcConfiguration>>,
        discovery_url: Url,
    ) -> Self {
        Self::with_cache(config, EndpointsCache::discover(discovery_url, None))
    }

    /// Client for `issuer`; the discovered document must name the same issuer.
    pub fn create_from_issuer(
        config: impl Into<Arc<OidcConfiguration>>,
        issuer: &str,
    ) -> ClientResult<Self> {
        let issuer = Url::parse(issuer).map_err(|_| ConfigurationError::InvalidUrl {
            field: "issuer".to_string(),
            url: issuer.to_string(),
        })?;
        let url = discovery_url(&issuer)?;
        Ok(Self::with_cache(
            config,
            EndpointsCache::discover(url, Some(issuer)),
        ))
    }

    pub fn configuration(&self) -> &Arc<OidcConfiguration> {
        &self.inner.config
    }

    pub fn client_id(&self) -> &str {
        &self.inner.config.client_id
    }

    /// Provider endpoints, discovered on first call and cached for the life of the client.
    pub async fn endpoints(&self) -> ClientResult<Arc<Endpoints>> {
        self.inner.endpoints.get(&self.inner.config).await
    }

    /// Send a request with the configured timeout; non-2xx answers are errors.
    pub(crate) async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let config = &self.inner.config;
        perform_request(
            config.transport.clone(),
            &config.dispatch,
            request.with_timeout(config.timeout),
        )
        .await
    }

    /// Form POST carrying `client_id` and the configured client authentication.
    pub(crate) async fn post_form(&self, url: &Url, mut form: FormBody) -> ClientResult<HttpResponse> {
        let config = &self.inner.config;
        form.insert("client_id", config.client_id.as_str());

        let mut basic_auth = None;
        if let Some(secret) = &config.client_secret {
            match config.auth_method {
                ClientAuthMethod::ClientSecretPost => {
                    form.insert("client_secret", secret.expose_secret().as_str())
                }
                ClientAuthMethod::ClientSecretBasic => {
                    let credentials = format!(
                        "{}:{}",
                        urlencoding::encode(&config.client_id),
                        urlencoding::encode(secret.expose_secret())
                    );
                    basic_auth = Some(format!(
                        "Basic {}",
                        base64::engine::general_purpose::STANDARD.encode(credentials)
                    ));
                }
                ClientAuthMethod::None => {}
            }
        }

        let mut request = HttpRequest::post_form(url.as_str(), form.encode());
        if let Some(header) = basic_auth {
            request = request.with_header("authorization", header);
        }
        self.send(request).await
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::builders::oidc_configuration;
    use crate::core::{HttpResponse, MockHttpTransport};
    use crate::error::ErrorKind;
    use crate::token::validation::Validators;

    #[tokio::test]
    async fn test_create_with_known_endpoints() {
        let transport = Arc::new(MockHttpTransport::new());
        let client = client(transport.clone());

        let endpoints = client.endpoints().await.unwrap();
        assert_eq!(endpoints.issuer.as_str(), ISSUER);
        assert_eq!(transport.request_count(), 0);
        assert_eq!(client.client_id(), CLIENT_ID);
    }

    #[tokio::test]
    async fn test_create_from_issuer_uses_well_known_url() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json_response(200, serde_json::to_value(endpoints()).unwrap());
        let config = oidc_configuration()
            .client_id(CLIENT_ID)
            .default_scope(DEFAULT_SCOPE)
            .validators(Validators::unchecked())
            .transport(transport.clone())
            .build()
            .unwrap();

        let client = OidcClient::create_from_issuer(config, &format!("{}/", ISSUER)).unwrap();
        client.endpoints().await.unwrap();

        assert_eq!(
            transport.get_last_request().unwrap().url,
            format!("{}/.well-known/openid-configuration", ISSUER)
        );
    }

    #[test]
    fn test_create_from_invalid_issuer() {
        let config = oidc_configuration()
            .client_id(CLIENT_ID)
            .default_scope(DEFAULT_SCOPE)
            .validators(Validators::unchecked())
            .transport(Arc::new(MockHttpTransport::new()))
            .build()
            .unwrap();

        let error = OidcClient::create_from_issuer(config, "not a url").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_client_secret_basic_header() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_response(HttpResponse::new(200, ""));
        let config = oidc_configuration()
            .client_id("client")
            .client_secret("secret")
            .default_scope(DEFAULT_SCOPE)
            .validators(Validators::unchecked())
            .transport(transport.clone())
            .build()
            .unwrap();
        let client = OidcClient::create(config, endpoints());

        client
            .post_form(&endpoints().token_endpoint, FormBody::new().field("a", "b"))
            .await
            .unwrap();

        let request = transport.get_last_request().unwrap();
        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some("Basic Y2xpZW50OnNlY3JldA==")
        );
        assert_eq!(request.body.as_deref(), Some("a=b&client_id=client"));
    }

    #[tokio::test]
    async fn test_client_secret_post_body() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_response(HttpResponse::new(200, ""));
        let config = oidc_configuration()
            .client_id("client")
            .client_secret("secret")
            .auth_method(ClientAuthMethod::ClientSecretPost)
            .default_scope(DEFAULT_SCOPE)
            .validators(Validators::unchecked())
            .transport(transport.clone())
            .build()
            .unwrap();
        let client = OidcClient::create(config, endpoints());

        client
            .post_form(&endpoints().token_endpoint, FormBody::new())
            .await
            .unwrap();

        let request = transport.get_last_request().unwrap();
        assert!(request.headers.get("authorization").is_none());
        assert_eq!(
            request.body.as_deref(),
            Some("client_id=client&client_secret=secret")
        );
    }
}
