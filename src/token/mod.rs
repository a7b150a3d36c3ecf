//! Token Operations
//!
//! Token endpoint grants, validation hooks, introspection, revocation and userinfo.
//!
//! The network operations are methods on [`crate::OidcClient`]:
//!
//! - **Exchange**: authorization code, refresh token and client credentials grants
//! - **Introspection**: RFC 7662 token introspection
//! - **Revocation**: RFC 7009 token revocation
//! - **UserInfo**: OIDC userinfo claims

pub mod exchange;
pub mod introspection;
pub mod revocation;
pub mod userinfo;
pub mod validation;

pub use validation::*;
