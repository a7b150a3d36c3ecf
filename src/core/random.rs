//! Secure Random
//!
//! Randomness source for `state`, nonce and PKCE verifier generation.

use base64::Engine;
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::VecDeque;

/// Secure random interface (for dependency injection).
pub trait SecureRandom: Send + Sync {
    /// Fill `dest` with random bytes.
    fn fill_bytes(&self, dest: &mut [u8]);

    /// `len` random bytes encoded as unpadded base64url.
    fn random_url_safe(&self, len: usize) -> String {
        let mut bytes = vec![0u8; len];
        self.fill_bytes(&mut bytes);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }
}

/// Operating system CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsSecureRandom;

impl SecureRandom for OsSecureRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}

/// Mock random source for testing.
///
/// Each call consumes the next queued byte pattern; once the queue is empty the
/// configured fallback byte is repeated.
#[derive(Debug, Default)]
pub struct MockSecureRandom {
    queued: Mutex<VecDeque<u8>>,
    fallback: u8,
}

impl MockSecureRandom {
    pub fn new(fallback: u8) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback,
        }
    }

    /// Queue a byte used to fill the whole buffer of the next call.
    pub fn queue_fill(&self, byte: u8) -> &Self {
        self.queued.lock().push_back(byte);
        self
    }
}

impl SecureRandom for MockSecureRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        let byte = self.queued.lock().pop_front().unwrap_or(self.fallback);
        dest.fill(byte);
    }
}
