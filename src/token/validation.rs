//! Token Validation
//!
//! Caller-supplied checks run on every token before it is returned. A validator rejects by
//! returning [`ValidationError`]; `Ok(())` is a pass. No validator set is installed
//! silently: callers pick [`Validators::standard`], their own implementations, or the
//! explicit [`Validators::unchecked`] opt-out.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::warn;

use crate::error::{ValidatedToken, ValidationError};
use crate::types::{Endpoints, Token};

/// Inputs a validator may check a token against.
#[derive(Clone, Debug)]
pub struct ValidationContext {
    pub client_id: String,
    pub endpoints: Arc<Endpoints>,
    /// Nonce sent with the authorization request, if the flow had one.
    pub nonce: Option<String>,
    /// `max_age` sent with the authorization request, in seconds.
    pub max_age: Option<u64>,
    pub now: DateTime<Utc>,
}

/// Validates ID tokens.
pub trait IdTokenValidator: Send + Sync {
    fn validate(&self, id_token: &str, context: &ValidationContext) -> Result<(), ValidationError>;
}

/// Validates access tokens, optionally against the ID token issued with them.
pub trait AccessTokenValidator: Send + Sync {
    fn validate(
        &self,
        access_token: &str,
        id_token: Option<&str>,
        context: &ValidationContext,
    ) -> Result<(), ValidationError>;
}

/// Validates device secrets, optionally against the ID token issued with them.
pub trait DeviceSecretValidator: Send + Sync {
    fn validate(
        &self,
        device_secret: &str,
        id_token: Option<&str>,
        context: &ValidationContext,
    ) -> Result<(), ValidationError>;
}

/// Accepts everything. Only reachable through [`Validators::unchecked`].
#[derive(Clone, Copy, Debug, Default)]
struct Unchecked;

impl IdTokenValidator for Unchecked {
    fn validate(&self, _id_token: &str, _context: &ValidationContext) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl AccessTokenValidator for Unchecked {
    fn validate(
        &self,
        _access_token: &str,
        _id_token: Option<&str>,
        _context: &ValidationContext,
    ) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl DeviceSecretValidator for Unchecked {
    fn validate(
        &self,
        _device_secret: &str,
        _id_token: Option<&str>,
        _context: &ValidationContext,
    ) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// The three validator slots.
#[derive(Clone)]
pub struct Validators {
    pub id_token: Arc<dyn IdTokenValidator>,
    pub access_token: Arc<dyn AccessTokenValidator>,
    pub device_secret: Arc<dyn DeviceSecretValidator>,
}

impl std::fmt::Debug for Validators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validators").finish_non_exhaustive()
    }
}

impl Validators {
    pub fn new(
        id_token: Arc<dyn IdTokenValidator>,
        access_token: Arc<dyn AccessTokenValidator>,
        device_secret: Arc<dyn DeviceSecretValidator>,
    ) -> Self {
        Self {
            id_token,
            access_token,
            device_secret,
        }
    }

    /// Validators that accept every token. Signatures and claims go unchecked.
    pub fn unchecked() -> Self {
        Self::new(Arc::new(Unchecked), Arc::new(Unchecked), Arc::new(Unchecked))
    }

    /// Standard OIDC claim checks. Signatures are not verified.
    #[cfg(feature = "jwt")]
    pub fn standard() -> Self {
        Self::new(
            Arc::new(DefaultIdTokenValidator::default()),
            Arc::new(DefaultAccessTokenValidator),
            Arc::new(DefaultDeviceSecretValidator),
        )
    }

    /// Run every applicable validator over `token`.
    pub fn validate_token(
        &self,
        token: &Token,
        context: &ValidationContext,
    ) -> Result<(), ValidationError> {
        let id_token = token.id_token.as_deref();

        let result = id_token
            .map_or(Ok(()), |id_token| self.id_token.validate(id_token, context))
            .and_then(|_| {
                self.access_token
                    .validate(&token.access_token, id_token, context)
            })
            .and_then(|_| {
                token.device_secret.as_deref().map_or(Ok(()), |secret| {
                    self.device_secret.validate(secret, id_token, context)
                })
            });

        if let Err(error) = &result {
            warn!(token = %error.token, reason = %error.message, "Token validation failed");
        }
        result
    }
}

#[cfg(feature = "jwt")]
pub use standard::*;

#[cfg(feature = "jwt")]
mod standard {
    use base64::Engine;
    use jsonwebtoken::{Algorithm, DecodingKey, TokenData, Validation};
    use serde::de::DeserializeOwned;
    use serde::Deserialize;
    use sha2::{Digest, Sha256};

    use super::*;

    /// Allowed distance between `iat` and the client clock.
    pub const DEFAULT_ISSUED_AT_GRACE_SECONDS: i64 = 600;

    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    enum Audience {
        One(String),
        Many(Vec<String>),
    }

    impl Audience {
        fn contains(&self, client_id: &str) -> bool {
            match self {
                Self::One(aud) => aud == client_id,
                Self::Many(auds) => auds.iter().any(|aud| aud == client_id),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    struct IdTokenClaims {
        iss: String,
        #[serde(default)]
        sub: Option<String>,
        aud: Audience,
        exp: i64,
        iat: i64,
        #[serde(default)]
        nonce: Option<String>,
        #[serde(default)]
        auth_time: Option<i64>,
    }

    #[derive(Debug, Deserialize)]
    struct HashClaims {
        #[serde(default)]
        at_hash: Option<String>,
        #[serde(default)]
        ds_hash: Option<String>,
    }

    /// Parse a JWT without verifying its signature or registered claims.
    fn decode_unverified<T: DeserializeOwned>(
        token: &str,
        kind: ValidatedToken,
    ) -> Result<TokenData<T>, ValidationError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<T>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| ValidationError::new(kind, format!("Malformed token: {}", e)))
    }

    /// base64url of the left half of SHA-256, as used by `at_hash` and `ds_hash`.
    pub fn left_half_hash(value: &str) -> String {
        let digest = Sha256::digest(value.as_bytes());
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&digest[..digest.len() / 2])
    }

    fn trim_issuer(issuer: &str) -> &str {
        issuer.trim_end_matches('/')
    }

    /// OIDC Core 3.1.3.7 claim checks on the ID token.
    #[derive(Clone, Debug)]
    pub struct DefaultIdTokenValidator {
        issued_at_grace_seconds: i64,
    }

    impl Default for DefaultIdTokenValidator {
        fn default() -> Self {
            Self {
                issued_at_grace_seconds: DEFAULT_ISSUED_AT_GRACE_SECONDS,
            }
        }
    }

    impl DefaultIdTokenValidator {
        pub fn with_issued_at_grace(seconds: i64) -> Self {
            Self {
                issued_at_grace_seconds: seconds,
            }
        }
    }

    impl IdTokenValidator for DefaultIdTokenValidator {
        fn validate(&self, id_token: &str, context: &ValidationContext) -> Result<(), ValidationError> {
            let reject = |message: &str| Err(ValidationError::new(ValidatedToken::IdToken, message));
            let data = decode_unverified::<IdTokenClaims>(id_token, ValidatedToken::IdToken)?;
            let claims = data.claims;
            let now = context.now.timestamp();

            if data.header.alg != Algorithm::RS256 {
                return reject("Invalid JWT algorithm.");
            }
            if trim_issuer(&claims.iss) != trim_issuer(context.endpoints.issuer.as_str()) {
                return reject("Invalid issuer.");
            }
            if !claims.aud.contains(&context.client_id) {
                return reject("Invalid audience.");
            }
            if claims.exp <= now {
                return reject("The current time MUST be before the time represented by the exp Claim.");
            }
            if now.abs_diff(claims.iat) > self.issued_at_grace_seconds.unsigned_abs() {
                return reject("Issued at time is not within the allowed threshold of now.");
            }
            if claims.sub.as_deref().map_or(true, str::is_empty) {
                return reject("A valid sub claim is required.");
            }
            // Refresh and client credentials grants carry no nonce to compare.
            if let Some(expected) = context.nonce.as_deref() {
                if claims.nonce.as_deref() != Some(expected) {
                    return reject("Invalid nonce.");
                }
            }
            if let Some(max_age) = context.max_age {
                let Some(auth_time) = claims.auth_time else {
                    return reject("Auth time not available.");
                };
                let elapsed = claims.iat.checked_sub(auth_time).unwrap_or(-1);
                if elapsed < 0 || elapsed as u64 > max_age {
                    return reject("The current time minus the auth_time exceeded the max_age.");
                }
            }
            Ok(())
        }
    }

    /// Checks the ID token's `at_hash` against the access token when both are present.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct DefaultAccessTokenValidator;

    impl AccessTokenValidator for DefaultAccessTokenValidator {
        fn validate(
            &self,
            access_token: &str,
            id_token: Option<&str>,
            _context: &ValidationContext,
        ) -> Result<(), ValidationError> {
            let Some(id_token) = id_token else {
                return Ok(());
            };
            let claims = decode_unverified::<HashClaims>(id_token, ValidatedToken::AccessToken)?.claims;
            match claims.at_hash {
                Some(expected) if expected != left_half_hash(access_token) => Err(ValidationError::new(
                    ValidatedToken::AccessToken,
                    "ID Token at_hash didn't match the access token.",
                )),
                _ => Ok(()),
            }
        }
    }

    /// Checks the ID token's `ds_hash` against the device secret when both are present.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct DefaultDeviceSecretValidator;

    impl DeviceSecretValidator for DefaultDeviceSecretValidator {
        fn validate(
            &self,
            device_secret: &str,
            id_token: Option<&str>,
            _context: &ValidationContext,
        ) -> Result<(), ValidationError> {
            let Some(id_token) = id_token else {
                return Ok(());
            };
            let claims = decode_unverified::<HashClaims>(id_token, ValidatedToken::DeviceSecret)?.claims;
            match claims.ds_hash {
                Some(expected) if expected != left_half_hash(device_secret) => Err(ValidationError::new(
                    ValidatedToken::DeviceSecret,
                    "ID Token ds_hash didn't match the device secret.",
                )),
                _ => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const CLIENT_ID: &str = "unit_test_client_id";
    const ISSUER: &str = "https://example-test.okta.com/oauth2/default";
    const NOW: i64 = 1_644_347_069;

    fn context(nonce: Option<&str>, max_age: Option<u64>) -> ValidationContext {
        ValidationContext {
            client_id: CLIENT_ID.to_string(),
            endpoints: Arc::new(Endpoints::new(
                Url::parse(ISSUER).unwrap(),
                Url::parse(&format!("{}/v1/authorize", ISSUER)).unwrap(),
                Url::parse(&format!("{}/v1/token", ISSUER)).unwrap(),
            )),
            nonce: nonce.map(String::from),
            max_age,
            now: DateTime::from_timestamp(NOW, 0).unwrap(),
        }
    }

    fn token(id_token: Option<String>) -> Token {
        Token {
            token_type: "Bearer".to_string(),
            expires_in: 3600,
            access_token: "exampleAccessToken".to_string(),
            scope: None,
            refresh_token: None,
            id_token,
            device_secret: Some("exampleDeviceSecret".to_string()),
            issued_at: DateTime::from_timestamp(NOW, 0).unwrap(),
        }
    }

    struct Rejecting;

    impl IdTokenValidator for Rejecting {
        fn validate(&self, _id_token: &str, _context: &ValidationContext) -> Result<(), ValidationError> {
            Err(ValidationError::new(ValidatedToken::IdToken, "rejected by test"))
        }
    }

    #[test]
    fn test_unchecked_accepts_everything() {
        let validators = Validators::unchecked();
        assert!(validators
            .validate_token(&token(Some("not-a-jwt".to_string())), &context(None, None))
            .is_ok());
    }

    #[test]
    fn test_id_token_validator_only_runs_with_id_token() {
        let unchecked = Validators::unchecked();
        let validators = Validators::new(
            Arc::new(Rejecting),
            unchecked.access_token.clone(),
            unchecked.device_secret.clone(),
        );

        assert!(validators.validate_token(&token(None), &context(None, None)).is_ok());

        let error = validators
            .validate_token(&token(Some("x.y.z".to_string())), &context(None, None))
            .unwrap_err();
        assert_eq!(error.token, ValidatedToken::IdToken);
        assert_eq!(error.message, "rejected by test");
    }

    #[cfg(feature = "jwt")]
    mod standard_validators {
        use super::*;
        use base64::Engine;
        use serde_json::json;

        fn jwt(alg: &str, claims: serde_json::Value) -> String {
            let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
            let header = engine.encode(json!({"alg": alg, "typ": "JWT"}).to_string());
            let payload = engine.encode(claims.to_string());
            format!("{}.{}.c2lnbmF0dXJl", header, payload)
        }

        fn claims() -> serde_json::Value {
            json!({
                "iss": ISSUER,
                "sub": "00ub41z7mgzNqryMv696",
                "aud": CLIENT_ID,
                "iat": NOW,
                "exp": NOW + 3600,
                "auth_time": NOW - 1,
                "nonce": "exampleNonce",
                "at_hash": left_half_hash("exampleAccessToken"),
                "ds_hash": left_half_hash("exampleDeviceSecret"),
            })
        }

        fn with(field: &str, value: serde_json::Value) -> serde_json::Value {
            let mut claims = claims();
            claims[field] = value;
            claims
        }

        fn validate(id_token: String, context: &ValidationContext) -> Result<(), ValidationError> {
            Validators::standard().validate_token(&token(Some(id_token)), context)
        }

        #[test]
        fn test_valid_id_token() {
            let context = context(Some("exampleNonce"), Some(300));
            assert!(validate(jwt("RS256", claims()), &context).is_ok());
        }

        #[test]
        fn test_rejects_wrong_algorithm() {
            let error = validate(jwt("HS256", claims()), &context(Some("exampleNonce"), None)).unwrap_err();
            assert_eq!(error.message, "Invalid JWT algorithm.");
        }

        #[test]
        fn test_rejects_wrong_issuer() {
            let id_token = jwt("RS256", with("iss", json!("https://evil.example.com")));
            let error = validate(id_token, &context(Some("exampleNonce"), None)).unwrap_err();
            assert_eq!(error.message, "Invalid issuer.");
        }

        #[test]
        fn test_accepts_audience_list() {
            let id_token = jwt("RS256", with("aud", json!(["other", CLIENT_ID])));
            assert!(validate(id_token, &context(Some("exampleNonce"), None)).is_ok());
        }

        #[test]
        fn test_rejects_wrong_audience() {
            let id_token = jwt("RS256", with("aud", json!("other")));
            let error = validate(id_token, &context(Some("exampleNonce"), None)).unwrap_err();
            assert_eq!(error.message, "Invalid audience.");
        }

        #[test]
        fn test_rejects_expired() {
            let id_token = jwt("RS256", with("exp", json!(NOW - 1)));
            assert!(validate(id_token, &context(Some("exampleNonce"), None)).is_err());
        }

        #[test]
        fn test_rejects_stale_issued_at() {
            let id_token = jwt("RS256", with("iat", json!(NOW - 601)));
            let error = validate(id_token, &context(Some("exampleNonce"), None)).unwrap_err();
            assert_eq!(
                error.message,
                "Issued at time is not within the allowed threshold of now."
            );
        }

        #[test]
        fn test_rejects_nonce_mismatch() {
            let error = validate(jwt("RS256", claims()), &context(Some("otherNonce"), None)).unwrap_err();
            assert_eq!(error.message, "Invalid nonce.");
        }

        #[test]
        fn test_rejects_missing_nonce() {
            let id_token = jwt("RS256", with("nonce", json!(null)));
            let error = validate(id_token, &context(Some("exampleNonce"), None)).unwrap_err();
            assert_eq!(error.message, "Invalid nonce.");
        }

        #[test]
        fn test_ignores_nonce_without_expectation() {
            assert!(validate(jwt("RS256", claims()), &context(None, None)).is_ok());
        }

        #[test]
        fn test_rejects_extreme_issued_at() {
            for iat in [i64::MIN, i64::MAX] {
                let id_token = jwt("RS256", with("iat", json!(iat)));
                let error = validate(id_token, &context(Some("exampleNonce"), None)).unwrap_err();
                assert_eq!(
                    error.message,
                    "Issued at time is not within the allowed threshold of now."
                );
            }
        }

        #[test]
        fn test_rejects_extreme_auth_time() {
            let id_token = jwt("RS256", with("auth_time", json!(i64::MIN)));
            let error = validate(id_token, &context(Some("exampleNonce"), Some(300))).unwrap_err();
            assert_eq!(
                error.message,
                "The current time minus the auth_time exceeded the max_age."
            );
        }

        #[test]
        fn test_rejects_exceeded_max_age() {
            let id_token = jwt("RS256", with("auth_time", json!(NOW - 301)));
            let error = validate(id_token, &context(Some("exampleNonce"), Some(300))).unwrap_err();
            assert_eq!(
                error.message,
                "The current time minus the auth_time exceeded the max_age."
            );
        }

        #[test]
        fn test_rejects_at_hash_mismatch() {
            let id_token = jwt("RS256", with("at_hash", json!(left_half_hash("other"))));
            let error = validate(id_token, &context(Some("exampleNonce"), None)).unwrap_err();
            assert_eq!(error.token, ValidatedToken::AccessToken);
        }

        #[test]
        fn test_rejects_ds_hash_mismatch() {
            let id_token = jwt("RS256", with("ds_hash", json!(left_half_hash("other"))));
            let error = validate(id_token, &context(Some("exampleNonce"), None)).unwrap_err();
            assert_eq!(error.token, ValidatedToken::DeviceSecret);
        }

        #[test]
        fn test_rejects_malformed_token() {
            let error = validate("not-a-jwt".to_string(), &context(None, None)).unwrap_err();
            assert_eq!(error.token, ValidatedToken::IdToken);
        }
    }
}
