//! OIDC Discovery
//!
//! Endpoint discovery cache. The discovery document is fetched at most once per client:
//! concurrent first callers share one in-flight request, a success is kept for the life of
//! the cache, and a failure is handed to every waiter and then forgotten so the next call
//! retries.

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};
use url::Url;

use crate::core::transport::{perform_request, HttpRequest};
use crate::error::{ClientResult, ConfigurationError, ProtocolError};
use crate::types::{Endpoints, OidcConfiguration};

type EndpointsFuture = BoxFuture<'static, ClientResult<Arc<Endpoints>>>;

/// Well-known discovery document path.
pub const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";

/// Discovery document URL for `issuer`; trailing slashes on the issuer are ignored.
pub fn discovery_url(issuer: &Url) -> Result<Url, ConfigurationError> {
    let url = format!("{}{}", issuer.as_str().trim_end_matches('/'), DISCOVERY_PATH);
    Url::parse(&url).map_err(|_| ConfigurationError::InvalidUrl {
        field: "issuer".to_string(),
        url,
    })
}

fn normalize_issuer(issuer: &str) -> &str {
    issuer.trim_end_matches('/')
}

enum Source {
    Discover {
        url: Url,
        expected_issuer: Option<Url>,
    },
    Fixed,
}

/// Single-flight, never-expiring endpoint cache.
pub struct EndpointsCache {
    source: Source,
    resolved: OnceLock<Arc<Endpoints>>,
    // Weak so that a fetch abandoned by every waiter is dropped rather than kept alive here.
    in_flight: Mutex<Option<WeakShared<EndpointsFuture>>>,
}

impl std::fmt::Debug for EndpointsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointsCache")
            .field("resolved", &self.resolved.get().is_some())
            .finish_non_exhaustive()
    }
}

impl EndpointsCache {
    /// Cache pre-populated with known endpoints; never touches the network.
    pub fn resolved(endpoints: Endpoints) -> Self {
        let resolved = OnceLock::new();
        let _ = resolved.set(Arc::new(endpoints));
        Self {
            source: Source::Fixed,
            resolved,
            in_flight: Mutex::new(None),
        }
    }

    /// Cache filled from the discovery document at `url`.
    ///
    /// With `expected_issuer`, a document naming a different issuer is rejected.
    pub fn discover(url: Url, expected_issuer: Option<Url>) -> Self {
        Self {
            source: Source::Discover {
                url,
                expected_issuer,
            },
            resolved: OnceLock::new(),
            in_flight: Mutex::new(None),
        }
    }

    /// Cached endpoints, if discovery already succeeded.
    pub fn get_cached(&self) -> Option<Arc<Endpoints>> {
        self.resolved.get().cloned()
    }

    /// Resolve the endpoints, joining an in-flight fetch when there is one.
    pub async fn get(&self, config: &Arc<OidcConfiguration>) -> ClientResult<Arc<Endpoints>> {
        if let Some(endpoints) = self.resolved.get() {
            return Ok(endpoints.clone());
        }

        let (url, expected_issuer) = match &self.source {
            Source::Discover {
                url,
                expected_issuer,
            } => (url, expected_issuer),
            Source::Fixed => {
                return Err(ConfigurationError::InvalidConfig {
                    message: "endpoints were not provided".to_string(),
                }
                .into())
            }
        };

        let fetch = {
            let mut slot = self.in_flight.lock();
            if let Some(endpoints) = self.resolved.get() {
                return Ok(endpoints.clone());
            }
            match slot.as_ref().and_then(WeakShared::upgrade) {
                Some(fetch) => fetch,
                None => {
                    let fetch = fetch_endpoints(config.clone(), url.clone(), expected_issuer.clone())
                        .boxed()
                        .shared();
                    *slot = fetch.downgrade();
                    fetch
                }
            }
        };

        let result = fetch.clone().await;

        let mut slot = self.in_flight.lock();
        if let Ok(endpoints) = &result {
            let _ = self.resolved.set(endpoints.clone());
        }
        let is_current = slot
            .as_ref()
            .and_then(WeakShared::upgrade)
            .map_or(false, |current| Shared::ptr_eq(&current, &fetch));
        if is_current {
            *slot = None;
        }

        result
    }
}

async fn fetch_endpoints(
    config: Arc<OidcConfiguration>,
    url: Url,
    expected_issuer: Option<Url>,
) -> ClientResult<Arc<Endpoints>> {
    if let Some(body) = config.cache.get(url.as_str()) {
        match parse_endpoints(&body, expected_issuer.as_ref()) {
            Ok(endpoints) => {
                debug!(url = %url, "Discovery document served from response cache");
                return Ok(Arc::new(endpoints));
            }
            Err(error) => warn!(url = %url, error = %error, "Ignoring unusable cached discovery document"),
        }
    }

    debug!(url = %url, "Fetching discovery document");
    let request = HttpRequest::get(url.as_str()).with_timeout(config.timeout);
    let response = perform_request(config.transport.clone(), &config.dispatch, request)
        .await
        .map_err(|error| {
            warn!(url = %url, error = %error, "Discovery request failed");
            error
        })?;

    let body = response.body;
    let (endpoints, body) = config
        .dispatch
        .run_compute(move || {
            let endpoints = parse_endpoints(&body, expected_issuer.as_ref())?;
            Ok((endpoints, body))
        })
        .await
        .map_err(|error| {
            warn!(url = %url, error = %error, "Discovery document rejected");
            error
        })?;

    config.cache.set(url.as_str(), body);
    debug!(url = %url, issuer = %endpoints.issuer, "Discovery succeeded");
    Ok(Arc::new(endpoints))
}

fn parse_endpoints(body: &str, expected_issuer: Option<&Url>) -> Result<Endpoints, ProtocolError> {
    let endpoints: Endpoints = serde_json::from_str(body).map_err(ProtocolError::invalid_json)?;

    if let Some(expected) = expected_issuer {
        let expected = normalize_issuer(expected.as_str());
        let received = normalize_issuer(endpoints.issuer.as_str());
        if expected != received {
            return Err(ProtocolError::IssuerMismatch {
                expected: expected.to_string(),
                received: received.to_string(),
            });
        }
    }

    Ok(endpoints)
}
