//! OIDC Error Types
//!
//! Error hierarchy and the result envelope shared by every client operation.

use std::time::Duration;
use thiserror::Error;

/// Result envelope returned by every network-facing operation.
pub type ClientResult<T> = Result<T, OidcError>;

/// Root error type for the OIDC client.
///
/// Cloneable so one discovery outcome can be handed to every concurrent waiter.
#[derive(Error, Debug, Clone)]
pub enum OidcError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Transport failure or non-2xx answer. The message is uniform; the cause is kept as source.
    #[error("Request failed.")]
    Network(#[source] NetworkError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Redirect outcome; displayed with the provider or flow message alone.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
}

impl From<NetworkError> for OidcError {
    fn from(error: NetworkError) -> Self {
        Self::Network(error)
    }
}

/// Classification callers branch on without inspecting messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    NetworkFailure,
    ProtocolError,
    ValidationFailure,
    RedirectSchemeMismatch,
    MissingResultCode,
    ProviderError,
    SecurityViolation,
}

impl OidcError {
    /// Error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Network(_) => ErrorKind::NetworkFailure,
            Self::Protocol(_) => ErrorKind::ProtocolError,
            Self::Validation(_) => ErrorKind::ValidationFailure,
            Self::Authorization(AuthorizationError::RedirectSchemeMismatch { .. }) => {
                ErrorKind::RedirectSchemeMismatch
            }
            Self::Authorization(AuthorizationError::MissingResultCode) => {
                ErrorKind::MissingResultCode
            }
            Self::Authorization(AuthorizationError::Provider { .. }) => ErrorKind::ProviderError,
            Self::Authorization(AuthorizationError::StateMismatch)
            | Self::Authorization(AuthorizationError::ForeignContext { .. }) => {
                ErrorKind::SecurityViolation
            }
        }
    }

    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Configuration => "OIDC_CONFIG",
            ErrorKind::NetworkFailure => "OIDC_NETWORK",
            ErrorKind::ProtocolError => "OIDC_PROTOCOL",
            ErrorKind::ValidationFailure => "OIDC_VALIDATION",
            ErrorKind::RedirectSchemeMismatch => "OIDC_REDIRECT_SCHEME",
            ErrorKind::MissingResultCode => "OIDC_MISSING_CODE",
            ErrorKind::ProviderError => "OIDC_PROVIDER",
            ErrorKind::SecurityViolation => "OIDC_SECURITY",
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// HTTP status of a non-2xx answer, if that is what failed.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Network(NetworkError::HttpStatus { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// Configuration error.
#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid URL for {field}: {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Network/transport error.
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("HTTP status {status}")]
    HttpStatus {
        status: u16,
        error: Option<OAuth2ErrorResponse>,
    },

    #[error("Request interrupted: {message}")]
    Interrupted { message: String },
}

impl NetworkError {
    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::Interrupted { .. } => false,
            _ => true,
        }
    }

    /// Build from a non-2xx answer, keeping any OAuth2 error body.
    pub fn from_status(status: u16, body: &str) -> Self {
        Self::HttpStatus {
            status,
            error: parse_error_response(body),
        }
    }
}

/// Protocol/response parsing error.
#[derive(Error, Debug, Clone)]
pub enum ProtocolError {
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Unexpected redirect to: {location}")]
    UnexpectedRedirect { location: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },

    #[error("Provider does not advertise the {endpoint} endpoint")]
    MissingEndpoint { endpoint: &'static str },

    #[error("Issuer mismatch: expected {expected}, got {received}")]
    IssuerMismatch { expected: String, received: String },
}

impl ProtocolError {
    pub(crate) fn invalid_json(error: serde_json::Error) -> Self {
        Self::InvalidJson {
            message: error.to_string(),
        }
    }
}

/// Token validator rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{token} rejected: {message}")]
pub struct ValidationError {
    /// Which token was rejected.
    pub token: ValidatedToken,
    /// The validator's specific complaint.
    pub message: String,
}

impl ValidationError {
    pub fn new(token: ValidatedToken, message: impl Into<String>) -> Self {
        Self {
            token,
            message: message.into(),
        }
    }
}

/// Token a validator was looking at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidatedToken {
    IdToken,
    AccessToken,
    DeviceSecret,
}

impl std::fmt::Display for ValidatedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdToken => write!(f, "ID token"),
            Self::AccessToken => write!(f, "Access token"),
            Self::DeviceSecret => write!(f, "Device secret"),
        }
    }
}

/// Redirect resolution error.
#[derive(Error, Debug, Clone)]
pub enum AuthorizationError {
    #[error("Redirect scheme mismatch: expected {expected}, received {received}")]
    RedirectSchemeMismatch { expected: String, received: String },

    #[error("Invalid redirect. Missing result code.")]
    MissingResultCode,

    #[error("{}", .error_description.as_deref().unwrap_or(.error.as_str()))]
    Provider {
        error: String,
        error_description: Option<String>,
    },

    #[error("Failed due to state mismatch.")]
    StateMismatch,

    #[error("Flow context belongs to a different client: {reason}")]
    ForeignContext { reason: String },
}

/// OAuth2 error response from provider.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct OAuth2ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_uri: Option<String>,
}

/// Parse error response from HTTP body.
pub fn parse_error_response(body: &str) -> Option<OAuth2ErrorResponse> {
    serde_json::from_str(body).ok()
}

/// Get user-friendly error message.
pub fn get_user_message(error: &OidcError) -> String {
    match error.kind() {
        ErrorKind::NetworkFailure => {
            "The authentication service could not be reached. Please try again.".to_string()
        }
        ErrorKind::RedirectSchemeMismatch => {
            "Invalid redirect. Redirect scheme mismatch.".to_string()
        }
        ErrorKind::MissingResultCode => "Invalid redirect. Missing result code.".to_string(),
        ErrorKind::ProviderError => error.to_string(),
        ErrorKind::SecurityViolation => {
            "Security validation failed. Please restart the sign-in process.".to_string()
        }
        ErrorKind::ValidationFailure => {
            "The sign-in response could not be verified. Please try again.".to_string()
        }
        ErrorKind::Configuration | ErrorKind::ProtocolError => {
            "An authentication error occurred. Please try again.".to_string()
        }
    }
}
