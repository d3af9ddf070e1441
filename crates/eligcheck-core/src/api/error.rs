use serde_json::{json, Value};
use thiserror::Error;

/// Status reported for requests that hit the client timeout
pub const TIMEOUT_STATUS: u16 = 408;

/// Status reported for transport failures that never produced a response
pub const TRANSPORT_STATUS: u16 = 500;

pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";

/// Maximum length for response bodies embedded in token error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    AuthFailure { status: u16, message: String },

    #[error("Request timed out. Please try again.")]
    TransportTimeout,

    /// Failure without a usable response; the message carries its own prefix
    #[error("{0}")]
    TransportError(String),

    #[error("Request failed with status {status}: {}", upstream_message(.payload))]
    UpstreamError { status: u16, payload: Value },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Best-available message from an upstream error payload
fn upstream_message(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| "Unknown error".to_string()),
        _ => "Unknown error".to_string(),
    }
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        let total = body.chars().count();
        if total <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let head: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total chars)", head, total)
        }
    }

    /// Non-200 answer from the OAuth endpoint.
    pub fn auth_failure(status: u16, body: &str) -> Self {
        ApiError::AuthFailure {
            status,
            message: format!(
                "Failed to generate token. Status: {}, Response: {}",
                status,
                Self::truncate_body(body)
            ),
        }
    }

    /// Non-200 answer from a business API call.
    ///
    /// The upstream sometimes wraps its error object in a one-element array;
    /// the first element is unwrapped when present. Bodies that are not JSON
    /// are wrapped as `{"message": <raw text>}`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let payload = match serde_json::from_str::<Value>(body) {
            Ok(Value::Array(mut items)) if !items.is_empty() => items.swap_remove(0),
            Ok(value) => value,
            Err(_) => json!({ "message": body }),
        };
        ApiError::UpstreamError { status, payload }
    }

    /// Classify a reqwest failure for a business API call.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::TransportTimeout
        } else {
            ApiError::TransportError(format!("Unexpected error: {}", err))
        }
    }

    /// HTTP status associated with this failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::AuthFailure { status, .. } | ApiError::UpstreamError { status, .. } => {
                Some(*status)
            }
            ApiError::TransportTimeout => Some(TIMEOUT_STATUS),
            ApiError::TransportError(_) => Some(TRANSPORT_STATUS),
            ApiError::InvalidInput(_) => None,
        }
    }

    /// Best-available message: upstream `message` field, raw text, or error text
    pub fn message(&self) -> String {
        match self {
            ApiError::UpstreamError { payload, .. } => upstream_message(payload),
            other => other.to_string(),
        }
    }

    /// Upstream error payload for business API failures
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ApiError::UpstreamError { payload, .. } => Some(payload),
            _ => None,
        }
    }
}
