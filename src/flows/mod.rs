//! OIDC Flows
//!
//! Browser redirect flows. Both are stateless: the caller keeps the returned context until
//! the redirect arrives.
//!
//! - **Authorization Code Flow** (RFC 6749 Section 4.1) with PKCE (RFC 7636)
//! - **RP-Initiated Logout** (OpenID Connect RP-Initiated Logout 1.0)

pub mod authorization_code;
pub mod end_session;

pub use authorization_code::{AuthorizationCodeFlow, AuthorizationRequest, FlowContext, FlowOutcome};
pub use end_session::{EndSessionContext, EndSessionOutcome, EndSessionRequest, RedirectEndSessionFlow};
