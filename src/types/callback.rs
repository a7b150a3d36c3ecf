//! Callback Types
//!
//! Parameters carried by the authorization redirect.

use url::Url;

/// Parameters from an authorization or end-session redirect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RedirectParams {
    /// Authorization code (if success).
    pub code: Option<String>,
    pub state: Option<String>,
    /// Error code (if authorization failed).
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub error_uri: Option<String>,
}

impl RedirectParams {
    /// Parse redirect parameters from URL.
    pub fn from_url(url: &Url) -> Self {
        let mut params = Self::default();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                "error_description" => params.error_description = Some(value.into_owned()),
                "error_uri" => params.error_uri = Some(value.into_owned()),
                _ => {}
            }
        }

        params
    }

    /// Check if redirect contains an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Check if redirect is successful.
    pub fn is_success(&self) -> bool {
        self.code.is_some() && self.error.is_none()
    }
}

/// Whether `received` came back to the redirect target `expected` (scheme and host).
///
/// Custom-scheme redirects such as `com.example.app:/callback` have no host; both sides
/// must then lack one.
pub fn matches_redirect(expected: &Url, received: &Url) -> bool {
    expected.scheme() == received.scheme()
        && expected.host_str().map(str::to_ascii_lowercase)
            == received.host_str().map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_params_from_url() {
        let url = Url::parse("https://example.com/callback?code=abc123&state=xyz789").unwrap();
        let params = RedirectParams::from_url(&url);

        assert_eq!(params.code, Some("abc123".to_string()));
        assert_eq!(params.state, Some("xyz789".to_string()));
        assert!(params.error.is_none());
        assert!(params.is_success());
    }

    #[test]
    fn test_redirect_params_error() {
        let url = Url::parse(
            "https://example.com/callback?error=access_denied&error_description=User%20denied",
        )
        .unwrap();
        let params = RedirectParams::from_url(&url);

        assert!(params.code.is_none());
        assert_eq!(params.error, Some("access_denied".to_string()));
        assert_eq!(params.error_description, Some("User denied".to_string()));
        assert!(params.is_error());
        assert!(!params.is_success());
    }

    #[test]
    fn test_matches_redirect() {
        let expected = Url::parse("unitTest:/login").unwrap();

        assert!(matches_redirect(
            &expected,
            &Url::parse("unitTest:/login?code=ABC").unwrap()
        ));
        assert!(!matches_redirect(
            &expected,
            &Url::parse("wrong:/login?code=ABC").unwrap()
        ));

        let https = Url::parse("https://app.example.com/callback").unwrap();
        assert!(matches_redirect(
            &https,
            &Url::parse("https://APP.example.com/other").unwrap()
        ));
        assert!(!matches_redirect(
            &https,
            &Url::parse("https://evil.example.com/callback").unwrap()
        ));
    }
}
