//! Builders
//!
//! Fluent builder patterns for OIDC configuration.

pub mod config;

pub use config::{oidc_configuration, OidcConfigurationBuilder};
