//! PKCE Generator
//!
//! RFC 7636 Proof Key for Code Exchange, S256 only.

use base64::Engine;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::core::random::SecureRandom;

/// Random bytes behind a verifier; encodes to 43 characters.
const VERIFIER_ENTROPY_BYTES: usize = 32;

/// Challenge method sent with every authorization request.
pub const CODE_CHALLENGE_METHOD: &str = "S256";

/// PKCE verifier and its derived challenge.
#[derive(Clone, PartialEq, Eq)]
pub struct PkceParams {
    pub code_verifier: String,
    pub code_challenge: String,
}

impl fmt::Debug for PkceParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PkceParams")
            .field("code_verifier", &"[REDACTED]")
            .field("code_challenge", &self.code_challenge)
            .finish()
    }
}

/// PKCE generator backed by the configured random source.
pub struct PkceGenerator<'a> {
    random: &'a dyn SecureRandom,
}

impl<'a> PkceGenerator<'a> {
    pub fn new(random: &'a dyn SecureRandom) -> Self {
        Self { random }
    }

    /// Generate PKCE parameters.
    pub fn generate(&self) -> PkceParams {
        let code_verifier = self.random.random_url_safe(VERIFIER_ENTROPY_BYTES);
        let code_challenge = compute_challenge(&code_verifier);
        PkceParams {
            code_verifier,
            code_challenge,
        }
    }
}

/// S256: BASE64URL(SHA256(code_verifier)).
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash)
}

/// Validate PKCE verifier format.
pub fn is_valid_verifier(verifier: &str) -> bool {
    let len = verifier.len();
    if !(43..=128).contains(&len) {
        return false;
    }

    // unreserved characters only
    verifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '~')
}
