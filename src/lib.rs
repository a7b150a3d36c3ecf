//! OIDC Client Integration Module
//!
//! OpenID Connect / OAuth2 client runtime: endpoint discovery, token endpoint grants,
//! pluggable token validation, introspection, revocation, userinfo and the browser redirect
//! flows.
//!
//! # Features
//!
//! - OIDC Discovery with a single-flight, per-client endpoint cache
//! - Authorization Code Flow with PKCE (RFC 6749 Section 4.1, RFC 7636)
//! - Token Refresh (RFC 6749 Section 6) and Client Credentials (RFC 6749 Section 4.4)
//! - Token Introspection (RFC 7662)
//! - Token Revocation (RFC 7009)
//! - UserInfo and RP-Initiated Logout
//! - Token lifecycle events fanned out to registered observers
//!
//! # Example
//!
//! ```rust,no_run
//! use oidc_integration::{oidc_configuration, AuthorizationCodeFlow, AuthorizationParams, OidcClient, Validators};
//!
//! # async fn run() -> Result<(), oidc_integration::OidcError> {
//! let config = oidc_configuration()
//!     .client_id("my-client-id")
//!     .default_scope("openid email profile offline_access")
//!     .validators(Validators::standard())
//!     .build()?;
//!
//! let client = OidcClient::create_from_issuer(config, "https://example.okta.com/oauth2/default")?;
//! let redirect_uri = url::Url::parse("com.example.app:/callback").expect("valid redirect URI");
//! let flow = AuthorizationCodeFlow::new(client, redirect_uri);
//!
//! let request = flow.start(AuthorizationParams::new()).await?;
//! println!("Open {}", request.url);
//!
//! // ... the user agent comes back to the redirect URI ...
//! # let redirect = "com.example.app:/callback?code=abc&state=xyz";
//! let token = flow.resume(redirect, &request.context).await.into_result()?;
//! println!("Access token expires at {}", token.expires_at());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `types`: endpoints, tokens, claims, configuration
//! - `error`: error hierarchy and `ClientResult`
//! - `core`: transport, clock, randomness, response cache, dispatch, PKCE, discovery
//! - `token`: token endpoint grants, validators, introspection, revocation, userinfo
//! - `flows`: authorization code and end session redirect flows
//! - `events`: event coordinator and observers
//! - `builders`: fluent configuration builder
//! - `client`: `OidcClient`, tying configuration and endpoints together

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod events;
pub mod flows;
pub mod token;
pub mod types;

// Re-export main client
pub use client::OidcClient;

// Re-export builders
pub use builders::{oidc_configuration, OidcConfigurationBuilder};

// Re-export errors
pub use error::{
    get_user_message, parse_error_response, AuthorizationError, ClientResult, ConfigurationError,
    ErrorKind, NetworkError, OAuth2ErrorResponse, OidcError, ProtocolError, ValidatedToken,
    ValidationError,
};

// Re-export types
pub use types::{
    // Config
    ClientAuthMethod, Endpoints, GrantType, OidcConfiguration, DEFAULT_TIMEOUT,
    // Token
    Token, TokenResponse,
    // Claims
    Claims, IntrospectInfo, IntrospectionClaims, TokenType, UserInfo,
    // Auth
    AuthorizationParams, Prompt, RedirectParams,
};

// Re-export core components
pub use core::{
    // Transport
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport,
    // Collaborators
    Clock, InMemoryResponseCache, MockClock, MockSecureRandom, NoResponseCache,
    OsSecureRandom, ResponseCache, SecureRandom, SystemClock,
    // Dispatch
    Dispatch, DispatchPolicy,
    // PKCE
    PkceGenerator, PkceParams,
};

// Re-export flows
pub use flows::{
    AuthorizationCodeFlow, AuthorizationRequest, EndSessionContext, EndSessionOutcome,
    EndSessionRequest, FlowContext, FlowOutcome, RedirectEndSessionFlow,
};

// Re-export token validation
pub use token::{
    AccessTokenValidator, DeviceSecretValidator, IdTokenValidator, ValidationContext, Validators,
};
#[cfg(feature = "jwt")]
pub use token::{DefaultAccessTokenValidator, DefaultDeviceSecretValidator, DefaultIdTokenValidator};

// Re-export events
pub use events::{Event, EventCoordinator, EventObserver, Subscription};
