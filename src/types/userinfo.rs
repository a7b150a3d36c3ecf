//! UserInfo Types

use serde::de::DeserializeOwned;

use super::claims::Claims;
use crate::error::ProtocolError;

/// Claims returned by the userinfo endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct UserInfo {
    claims: Claims,
}

impl UserInfo {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    /// Subject identifier, when the provider returned one.
    pub fn subject(&self) -> Option<&str> {
        self.claims.get_str("sub")
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn deserialize_claims<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        self.claims.deserialize_claims()
    }
}
