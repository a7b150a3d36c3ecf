//! OIDC Types
//!
//! Core type definitions for OIDC operations.

pub mod auth;
pub mod callback;
pub mod claims;
pub mod config;
pub mod introspection;
pub mod token;
pub mod userinfo;

pub use auth::*;
pub use callback::*;
pub use claims::*;
pub use config::*;
pub use introspection::*;
pub use token::*;
pub use userinfo::*;
