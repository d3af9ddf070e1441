use serde_json::{json, Value};

use super::{require, ApiRequest};
use crate::api::ApiError;

/// Copay and coinsurance lookup. Both keys come from an eligibility search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopayRequest {
    pub patient_key: String,
    pub transaction_id: String,
}

impl CopayRequest {
    pub fn new(patient_key: &str, transaction_id: &str) -> Self {
        Self {
            patient_key: patient_key.trim().to_string(),
            transaction_id: transaction_id.trim().to_string(),
        }
    }
}

impl ApiRequest for CopayRequest {
    const PATH: &'static str = "/api/external/member/copay/v2.0";

    fn validate(&self) -> Result<(), ApiError> {
        require("Patient key", &self.patient_key)?;
        require("Transaction ID", &self.transaction_id)
    }

    fn to_payload(&self) -> Value {
        json!({
            "patientKey": self.patient_key,
            "transactionId": self.transaction_id,
        })
    }
}
