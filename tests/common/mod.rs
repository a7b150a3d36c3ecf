//! Shared fixtures for the WireMock integration tests.

#![allow(dead_code)]

use base64::Engine;
use oidc_integration::{
    oidc_configuration, Event, EventObserver, MockClock, OidcClient, OidcConfiguration, Validators,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "unit_test_client_id";
pub const DEFAULT_SCOPE: &str = "openid email profile offline_access";
pub const ISSUER_PATH: &str = "/oauth2/default";
pub const NOW: i64 = 1_644_347_069;

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn issuer(server: &MockServer) -> String {
    format!("{}{}", server.uri(), ISSUER_PATH)
}

pub fn discovery_document(issuer: &str) -> serde_json::Value {
    json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{}/v1/authorize", issuer),
        "token_endpoint": format!("{}/v1/token", issuer),
        "userinfo_endpoint": format!("{}/v1/userinfo", issuer),
        "jwks_uri": format!("{}/v1/keys", issuer),
        "introspection_endpoint": format!("{}/v1/introspect", issuer),
        "revocation_endpoint": format!("{}/v1/revoke", issuer),
        "end_session_endpoint": format!("{}/v1/logout", issuer),
        "device_authorization_endpoint": format!("{}/v1/device/authorize", issuer),
    })
}

/// Mount the discovery document, expecting exactly one fetch.
pub async fn mount_discovery(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("{}/.well-known/openid-configuration", ISSUER_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(discovery_document(&issuer(server))))
        .expect(1)
        .mount(server)
        .await;
}

pub fn token_json() -> serde_json::Value {
    json!({
        "token_type": "Bearer",
        "expires_in": 3600,
        "access_token": "exampleAccessToken",
        "scope": "offline_access profile openid email",
        "refresh_token": "exampleRefreshToken"
    })
}

pub fn configuration(validators: Validators) -> OidcConfiguration {
    oidc_configuration()
        .client_id(CLIENT_ID)
        .default_scope(DEFAULT_SCOPE)
        .validators(validators)
        .clock(Arc::new(MockClock::at_epoch_seconds(NOW)))
        .build()
        .expect("Failed to build configuration")
}

/// Client discovering its endpoints from the mock server's issuer.
pub fn client(server: &MockServer) -> OidcClient {
    OidcClient::create_from_issuer(configuration(Validators::unchecked()), &issuer(server))
        .expect("Failed to create client")
}

/// Unsigned JWT with an RS256 header; enough for the claim checks.
pub fn jwt(claims: serde_json::Value) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(json!({"alg": "RS256", "typ": "JWT"}).to_string());
    let payload = engine.encode(claims.to_string());
    format!("{}.{}.c2lnbmF0dXJl", header, payload)
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }
}

impl EventObserver for RecordingObserver {
    fn on_event(&self, event: &Event) {
        self.events.lock().push(event.clone());
    }
}
