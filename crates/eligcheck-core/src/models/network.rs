use chrono::NaiveDate;
use serde_json::{json, Value};

use super::{require, ApiRequest};
use crate::api::ApiError;
use crate::utils::dates::to_api_date;
use crate::utils::non_empty;

/// Provider network status check for a member over a date-of-service range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkStatusRequest {
    pub member_id: String,
    pub date_of_birth: NaiveDate,
    pub provider_last_name: String,
    pub first_date_of_service: NaiveDate,
    pub last_date_of_service: NaiveDate,
    pub transaction_id: Option<String>,
    pub provider_first_name: Option<String>,
    pub provider_tin: Option<String>,
    pub provider_npi: Option<String>,
    pub first_name: Option<String>,
}

impl NetworkStatusRequest {
    pub fn new(
        member_id: &str,
        date_of_birth: NaiveDate,
        provider_last_name: &str,
        first_date_of_service: NaiveDate,
        last_date_of_service: NaiveDate,
    ) -> Self {
        Self {
            member_id: member_id.trim().to_string(),
            date_of_birth,
            provider_last_name: provider_last_name.trim().to_string(),
            first_date_of_service,
            last_date_of_service,
            transaction_id: None,
            provider_first_name: None,
            provider_tin: None,
            provider_npi: None,
            first_name: None,
        }
    }

    /// Transaction id from a previous eligibility search
    pub fn transaction_id(mut self, value: Option<&str>) -> Self {
        self.transaction_id = non_empty(value);
        self
    }

    pub fn provider_first_name(mut self, value: Option<&str>) -> Self {
        self.provider_first_name = non_empty(value);
        self
    }

    pub fn provider_tin(mut self, value: Option<&str>) -> Self {
        self.provider_tin = non_empty(value);
        self
    }

    pub fn provider_npi(mut self, value: Option<&str>) -> Self {
        self.provider_npi = non_empty(value);
        self
    }

    /// Member first name; overrides the empty placeholder
    pub fn first_name(mut self, value: Option<&str>) -> Self {
        self.first_name = non_empty(value);
        self
    }
}

impl ApiRequest for NetworkStatusRequest {
    const PATH: &'static str = "/api/external/networkStatus/v4.0";

    fn validate(&self) -> Result<(), ApiError> {
        require("Member ID", &self.member_id)?;
        require("Provider last name", &self.provider_last_name)?;
        if self.last_date_of_service < self.first_date_of_service {
            return Err(ApiError::InvalidInput(
                "Last date of service is before first date of service".to_string(),
            ));
        }
        Ok(())
    }

    fn to_payload(&self) -> Value {
        let mut payload = json!({
            "memberId": self.member_id,
            "dateOfBirth": to_api_date(self.date_of_birth),
            "providerLastName": self.provider_last_name,
            "firstDateOfService": to_api_date(self.first_date_of_service),
            "lastDateOfService": to_api_date(self.last_date_of_service),
            "familyIndicator": "N",
            "payerID": "",
            "taxIdNumber": "",
            "firstName": "",
            "lastName": "",
        });

        let optional = [
            ("transactionId", &self.transaction_id),
            ("providerFirstName", &self.provider_first_name),
            ("providerTin", &self.provider_tin),
            ("providerNpi", &self.provider_npi),
            ("firstName", &self.first_name),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                payload[key] = json!(value);
            }
        }

        // Without a transaction id the endpoint wants an explicit blank MPIN
        if self.transaction_id.is_none() {
            payload["providerMpin"] = json!("");
        }
        payload
    }
}
