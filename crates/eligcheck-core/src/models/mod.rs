//! Request value objects and response summaries for the eligibility API.
//!
//! - `EligibilitySearchRequest`: member eligibility lookup
//! - `NetworkStatusRequest`: provider in/out-of-network check
//! - `CopayRequest`: copay and coinsurance details for a patient
//! - `EligibilitySummary`: the fields of an eligibility response an operator
//!   needs for follow-up calls
//!
//! Requests are built fresh per call and never persisted.

pub mod copay;
pub mod eligibility;
pub mod network;

use serde_json::Value;

use crate::api::ApiError;

pub use copay::CopayRequest;
pub use eligibility::{EligibilitySearchRequest, EligibilitySummary, PolicySummary};
pub use network::NetworkStatusRequest;

/// A POST body for one of the business endpoints.
pub trait ApiRequest {
    /// Path below the API base URL
    const PATH: &'static str;

    /// Reject requests that must not reach the network
    fn validate(&self) -> Result<(), ApiError>;

    /// JSON body in the shape the endpoint expects
    fn to_payload(&self) -> Value;
}

/// Fail with `InvalidInput` when a required text field is blank.
pub(crate) fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::InvalidInput(format!("{} is required", field)))
    } else {
        Ok(())
    }
}
