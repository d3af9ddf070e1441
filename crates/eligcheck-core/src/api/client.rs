//! API client for the member eligibility REST API.
//!
//! This module provides the `EligibilityClient` struct for the three
//! authenticated POST calls. Every failure is returned as an `ApiError`
//! value; nothing is retried automatically.

use std::time::Duration;

use anyhow::Result;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::Credentials;
use crate::models::{ApiRequest, CopayRequest, EligibilitySearchRequest, NetworkStatusRequest};
use crate::utils::truncate;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds, shared with the token exchange.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment discriminator header sent on every request
pub const ENV_HEADER: &str = "env";

/// Both carry the client id; header names are case-insensitive on the wire
const API_KEY_HEADER: &str = "x-api-key";
const CLIENT_ID_HEADER: &str = "client-id";

/// Characters of the Authorization value allowed into debug logs
const AUTH_LOG_PREVIEW_CHARS: usize = 20;

/// API client for the eligibility endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct EligibilityClient {
    client: Client,
    base_url: String,
    client_id: String,
    environment: String,
}

impl EligibilityClient {
    /// Create a new API client with the standard 30 second timeout
    pub fn new(credentials: &Credentials) -> Result<Self> {
        Self::with_timeout(credentials, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(credentials: &Credentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: credentials.api_base_url.trim_end_matches('/').to_string(),
            client_id: credentials.client_id.clone(),
            environment: credentials.environment.clone(),
        })
    }

    /// Member eligibility search
    pub async fn search_eligibility(
        &self,
        bearer: &str,
        request: &EligibilitySearchRequest,
    ) -> Result<Value, ApiError> {
        self.post(bearer, request).await
    }

    /// Provider network status for a member and date-of-service range
    pub async fn check_network_status(
        &self,
        bearer: &str,
        request: &NetworkStatusRequest,
    ) -> Result<Value, ApiError> {
        self.post(bearer, request).await
    }

    /// Copay and coinsurance details for a patient from an earlier search
    pub async fn get_copay_details(
        &self,
        bearer: &str,
        request: &CopayRequest,
    ) -> Result<Value, ApiError> {
        self.post(bearer, request).await
    }

    fn headers(&self, bearer: &str) -> Result<header::HeaderMap, ApiError> {
        let value = |v: &str| {
            header::HeaderValue::from_str(v).map_err(|_| {
                ApiError::InvalidInput("Header value contains invalid characters".to_string())
            })
        };

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value(bearer)?);
        headers.insert(header::CONTENT_TYPE, value("application/json")?);
        headers.insert(header::ACCEPT, value("application/json")?);
        headers.insert(API_KEY_HEADER, value(self.client_id.as_str())?);
        headers.insert(CLIENT_ID_HEADER, value(self.client_id.as_str())?);
        headers.insert(ENV_HEADER, value(self.environment.as_str())?);
        Ok(headers)
    }

    /// Turn a response into the parsed body (200) or an upstream error.
    async fn check_response(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        if status == 200 {
            serde_json::from_str(&text).map_err(|e| {
                ApiError::TransportError(format!("Unexpected error: invalid JSON response: {}", e))
            })
        } else {
            warn!(status, "API request failed");
            Err(ApiError::from_response(status, &text))
        }
    }

    async fn post<R: ApiRequest>(&self, bearer: &str, request: &R) -> Result<Value, ApiError> {
        request.validate()?;

        let url = format!("{}{}", self.base_url, R::PATH);
        let headers = self.headers(bearer)?;
        debug!(
            url = %url,
            authorization = %truncate(bearer, AUTH_LOG_PREVIEW_CHARS),
            "Sending POST request"
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&request.to_payload())
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "POST request failed");
                ApiError::from_transport(&e)
            })?;

        debug!(url = %url, status = response.status().as_u16(), "Response received");
        Self::check_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::TIMEOUT_MESSAGE;
    use crate::config::Config;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BEARER: &str = "Bearer test-token";

    fn credentials(base_url: String) -> Credentials {
        let config = Config {
            client_id: Some("client-1".to_string()),
            api_base_url: Some(base_url),
            ..Default::default()
        };
        Credentials::from_parts(&config, Some("s3cret".to_string())).unwrap()
    }

    fn dob() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 1, 15).unwrap()
    }

    #[tokio::test]
    async fn test_search_eligibility_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/external/member/eligibility/v3.0"))
            .and(header("authorization", BEARER))
            .and(header("accept", "application/json"))
            .and(header("content-type", "application/json"))
            .and(header("x-api-key", "client-1"))
            .and(header("client-id", "client-1"))
            .and(header("env", "sandbox"))
            .and(body_json(json!({
                "memberId": "123456789",
                "dateOfBirth": "1990-01-15",
                "searchOption": "memberIDDateOfBirth",
                "payerID": "",
                "providerLastName": "",
                "taxIdNumber": "",
                "firstName": "",
                "lastName": ""
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"memberId": "123456789", "transactionId": "TX-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = EligibilityClient::new(&credentials(server.uri())).unwrap();
        let request = EligibilitySearchRequest::new("123456789", dob());
        let data = client.search_eligibility(BEARER, &request).await.unwrap();
        assert_eq!(data["transactionId"], "TX-1");
    }

    #[tokio::test]
    async fn test_network_status_array_error_unwrapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/external/networkStatus/v4.0"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string(r#"[{"message":"not found"}]"#),
            )
            .mount(&server)
            .await;

        let client = EligibilityClient::new(&credentials(server.uri())).unwrap();
        let request = NetworkStatusRequest::new(
            "123456789",
            dob(),
            "Smith",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        );
        let err = client.check_network_status(BEARER, &request).await.unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.payload(), Some(&json!({"message": "not found"})));
        assert_eq!(err.message(), "not found");
    }

    #[tokio::test]
    async fn test_copay_raw_text_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/external/member/copay/v2.0"))
            .and(body_json(json!({"patientKey": "PK-42", "transactionId": "TX-1"})))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let client = EligibilityClient::new(&credentials(server.uri())).unwrap();
        let err = client
            .get_copay_details(BEARER, &CopayRequest::new("PK-42", "TX-1"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(err.payload(), Some(&json!({"message": "Service Unavailable"})));
    }

    #[tokio::test]
    async fn test_timeout_is_408() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = EligibilityClient::with_timeout(
            &credentials(server.uri()),
            Duration::from_millis(50),
        )
        .unwrap();
        let err = client
            .get_copay_details(BEARER, &CopayRequest::new("PK-42", "TX-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::TransportTimeout));
        assert_eq!(err.status(), Some(408));
        assert_eq!(err.message(), TIMEOUT_MESSAGE);
        assert!(err.payload().is_none());
    }

    #[tokio::test]
    async fn test_connection_failure_is_500() {
        // Nothing listens on port 1
        let client =
            EligibilityClient::new(&credentials("http://127.0.0.1:1".to_string())).unwrap();
        let err = client
            .get_copay_details(BEARER, &CopayRequest::new("PK-42", "TX-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::TransportError(_)));
        assert_eq!(err.status(), Some(500));
        assert!(err.message().starts_with("Unexpected error:"));
    }

    #[tokio::test]
    async fn test_invalid_input_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let client = EligibilityClient::new(&credentials(server.uri())).unwrap();
        let err = client
            .search_eligibility(BEARER, &EligibilitySearchRequest::new("", dob()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_success_with_invalid_json_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = EligibilityClient::new(&credentials(server.uri())).unwrap();
        let err = client
            .get_copay_details(BEARER, &CopayRequest::new("PK-42", "TX-1"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
