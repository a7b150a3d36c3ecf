//! Configuration Builder
//!
//! Fluent builder for OIDC client configuration.

use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{
    Clock, DispatchPolicy, HttpTransport, NoResponseCache, OsSecureRandom, ReqwestHttpTransport,
    ResponseCache, SecureRandom, SystemClock, DEFAULT_MAX_RESPONSE_SIZE,
};
use crate::error::{ConfigurationError, OidcError};
use crate::events::EventCoordinator;
use crate::token::validation::Validators;
use crate::types::{ClientAuthMethod, OidcConfiguration, DEFAULT_TIMEOUT};

/// OIDC configuration builder.
#[derive(Default)]
pub struct OidcConfigurationBuilder {
    client_id: Option<String>,
    default_scope: Option<String>,
    client_secret: Option<SecretString>,
    auth_method: Option<ClientAuthMethod>,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn HttpTransport>>,
    clock: Option<Arc<dyn Clock>>,
    random: Option<Arc<dyn SecureRandom>>,
    validators: Option<Validators>,
    dispatch: Option<DispatchPolicy>,
    events: Option<EventCoordinator>,
    cache: Option<Arc<dyn ResponseCache>>,
}

impl OidcConfigurationBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the scope used when a request names none. Space separated.
    pub fn default_scope(mut self, scope: impl Into<String>) -> Self {
        self.default_scope = Some(scope.into());
        self
    }

    /// Set client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Set client authentication method.
    pub fn auth_method(mut self, method: ClientAuthMethod) -> Self {
        self.auth_method = Some(method);
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn secure_random(mut self, random: Arc<dyn SecureRandom>) -> Self {
        self.random = Some(random);
        self
    }

    /// Set token validators. Required.
    pub fn validators(mut self, validators: Validators) -> Self {
        self.validators = Some(validators);
        self
    }

    pub fn dispatch(mut self, dispatch: DispatchPolicy) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn event_coordinator(mut self, events: EventCoordinator) -> Self {
        self.events = Some(events);
        self
    }

    pub fn response_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the OIDC configuration.
    pub fn build(self) -> Result<OidcConfiguration, OidcError> {
        let client_id = required(self.client_id, "client_id")?;
        let default_scope = required(self.default_scope, "default_scope")?;
        let validators = self.validators.ok_or_else(|| ConfigurationError::MissingField {
            field: "validators".to_string(),
        })?;

        if client_id.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfig {
                message: "client_id must not be empty".to_string(),
            }
            .into());
        }

        let auth_method = self.auth_method.unwrap_or(if self.client_secret.is_some() {
            ClientAuthMethod::ClientSecretBasic
        } else {
            ClientAuthMethod::None
        });

        if auth_method != ClientAuthMethod::None && self.client_secret.is_none() {
            return Err(ConfigurationError::MissingField {
                field: "client_secret".to_string(),
            }
            .into());
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestHttpTransport::with_options(
                timeout,
                DEFAULT_MAX_RESPONSE_SIZE,
            )?),
        };

        Ok(OidcConfiguration {
            client_id,
            default_scope,
            client_secret: self.client_secret,
            auth_method,
            timeout,
            transport,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            random: self.random.unwrap_or_else(|| Arc::new(OsSecureRandom)),
            validators,
            dispatch: self.dispatch.unwrap_or_default(),
            events: self.events.unwrap_or_default(),
            cache: self.cache.unwrap_or_else(|| Arc::new(NoResponseCache)),
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ConfigurationError> {
    value.ok_or_else(|| ConfigurationError::MissingField {
        field: field.to_string(),
    })
}

/// Create a new configuration builder.
pub fn oidc_configuration() -> OidcConfigurationBuilder {
    OidcConfigurationBuilder::new()
}
