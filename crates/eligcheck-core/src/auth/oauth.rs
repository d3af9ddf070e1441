//! OAuth2 client-credentials exchange.

use std::time::Duration;

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{header, Client};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{Credentials, Token};
use crate::api::client::{ENV_HEADER, REQUEST_TIMEOUT_SECS};
use crate::api::ApiError;

/// Lifetime assumed when the token response has no `expires_in`
const DEFAULT_EXPIRES_IN_SECS: i64 = 3599;

/// Longest lifetime accepted from a token response
const MAX_EXPIRES_IN_SECS: i64 = 365 * 24 * 60 * 60;

/// Client for the token endpoint.
/// Clone is cheap - reqwest::Client uses Arc internally.
#[derive(Clone)]
pub struct OAuthClient {
    client: Client,
    oauth_url: String,
    client_id: String,
    client_secret: String,
    environment: String,
}

impl OAuthClient {
    pub fn new(credentials: &Credentials) -> Result<Self> {
        Self::with_timeout(credentials, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(credentials: &Credentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            oauth_url: credentials.oauth_url.clone(),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            environment: credentials.environment.clone(),
        })
    }

    /// Exchange client credentials for a token.
    ///
    /// Non-200 answers become `AuthFailure` carrying the status; transport
    /// failures, timeouts included, become `TransportError` (status 500).
    pub async fn request_token(&self) -> Result<Token, ApiError> {
        let body = json!({
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "grant_type": "client_credentials",
        });

        debug!(url = %self.oauth_url, "Requesting OAuth token");
        let response = self
            .client
            .post(&self.oauth_url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(ENV_HEADER, &self.environment)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::TransportError(format!("Error generating token: {}", e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::TransportError(format!("Error generating token: {}", e)))?;

        if status != 200 {
            warn!(status, "OAuth token request rejected");
            return Err(ApiError::auth_failure(status, &text));
        }

        let data: Value = serde_json::from_str(&text).map_err(|e| {
            ApiError::TransportError(format!("Error generating token: invalid response: {}", e))
        })?;

        let access_token = data
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::auth_failure(status, &text))?;

        let expires_in = expires_in_secs(&data);
        info!(expires_in, "OAuth token acquired");
        Ok(Token::from_access_token(
            access_token,
            Utc::now() + ChronoDuration::seconds(expires_in),
        ))
    }
}

/// `expires_in` as seconds; accepts a number or a numeric string.
/// Lifetimes longer than a year are capped at a year.
fn expires_in_secs(data: &Value) -> i64 {
    let secs = match data.get("expires_in") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    secs.filter(|secs| *secs > 0)
        .map(|secs| secs.min(MAX_EXPIRES_IN_SECS))
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials(oauth_url: String) -> Credentials {
        let config = Config {
            client_id: Some("client-1".to_string()),
            oauth_url: Some(oauth_url),
            ..Default::default()
        };
        Credentials::from_parts(&config, Some("s3cret".to_string())).unwrap()
    }

    #[test]
    fn test_expires_in_parsing() {
        assert_eq!(expires_in_secs(&json!({"expires_in": 1800})), 1800);
        assert_eq!(expires_in_secs(&json!({"expires_in": "1800"})), 1800);
        assert_eq!(expires_in_secs(&json!({})), DEFAULT_EXPIRES_IN_SECS);
        assert_eq!(
            expires_in_secs(&json!({"expires_in": "soon"})),
            DEFAULT_EXPIRES_IN_SECS
        );
        assert_eq!(
            expires_in_secs(&json!({"expires_in": -60})),
            DEFAULT_EXPIRES_IN_SECS
        );
        assert_eq!(
            expires_in_secs(&json!({"expires_in": i64::MAX})),
            MAX_EXPIRES_IN_SECS
        );
        assert_eq!(
            expires_in_secs(&json!({"expires_in": u64::MAX})),
            DEFAULT_EXPIRES_IN_SECS
        );
    }

    #[tokio::test]
    async fn test_request_token_caps_oversized_lifetime() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"access_token":"abc","expires_in":9223372036854775807}"#,
            ))
            .mount(&server)
            .await;

        let client = OAuthClient::new(&credentials(server.uri())).unwrap();
        let token = client.request_token().await.unwrap();

        assert_eq!(token.bearer, "Bearer abc");
        assert!(token.is_valid());
        let remaining = token.time_until_expiry().num_seconds();
        assert!(remaining <= MAX_EXPIRES_IN_SECS);
        assert!(remaining > MAX_EXPIRES_IN_SECS - 60);
    }

    #[tokio::test]
    async fn test_request_token_transport_error_message() {
        // Nothing listens on port 1
        let client = OAuthClient::new(&credentials("http://127.0.0.1:1".to_string())).unwrap();
        let err = client.request_token().await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(err.message().starts_with("Error generating token:"));
        assert!(!err.message().contains("Unexpected error"));
    }

    #[tokio::test]
    async fn test_request_token_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/oauthtoken"))
            .and(header("env", "sandbox"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "client_id": "client-1",
                "client_secret": "s3cret",
                "grant_type": "client_credentials"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "abc", "expires_in": 3599})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let oauth_url = format!("{}/v1/oauthtoken", server.uri());
        let client = OAuthClient::new(&credentials(oauth_url)).unwrap();
        let token = client.request_token().await.unwrap();

        assert_eq!(token.bearer, "Bearer abc");
        let remaining = token.time_until_expiry().num_seconds();
        assert!((3590..=3599).contains(&remaining));
    }

    #[tokio::test]
    async fn test_request_token_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let client = OAuthClient::new(&credentials(server.uri())).unwrap();
        let err = client.request_token().await.unwrap_err();

        assert!(matches!(err, ApiError::AuthFailure { status: 401, .. }));
        assert!(err.message().contains("invalid_client"));
    }

    #[tokio::test]
    async fn test_request_token_without_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"expires_in": 3599})))
            .mount(&server)
            .await;

        let client = OAuthClient::new(&credentials(server.uri())).unwrap();
        let err = client.request_token().await.unwrap_err();
        assert!(matches!(err, ApiError::AuthFailure { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_request_token_timeout_is_status_500() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "abc"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = OAuthClient::with_timeout(
            &credentials(server.uri()),
            Duration::from_millis(50),
        )
        .unwrap();
        let err = client.request_token().await.unwrap_err();

        assert!(matches!(err, ApiError::TransportError(_)));
        assert_eq!(err.status(), Some(500));
    }
}
