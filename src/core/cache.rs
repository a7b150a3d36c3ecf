//! Response Cache
//!
//! Raw-body cache for documents that are safe to share between client instances,
//! such as the discovery document.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Response cache interface (for dependency injection).
pub trait ResponseCache: Send + Sync {
    /// Cached body for `url`, if any.
    fn get(&self, url: &str) -> Option<String>;

    /// Store the body fetched from `url`.
    fn set(&self, url: &str, body: String);
}

/// Cache that never stores anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResponseCache;

impl ResponseCache for NoResponseCache {
    fn get(&self, _url: &str) -> Option<String> {
        None
    }

    fn set(&self, _url: &str, _body: String) {}
}

/// Process-local cache keyed by URL.
#[derive(Debug, Default)]
pub struct InMemoryResponseCache {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl ResponseCache for InMemoryResponseCache {
    fn get(&self, url: &str) -> Option<String> {
        self.entries.read().get(url).cloned()
    }

    fn set(&self, url: &str, body: String) {
        self.entries.write().insert(url.to_string(), body);
    }
}
