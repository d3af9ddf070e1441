use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use super::{require, ApiRequest};
use crate::api::ApiError;
use crate::utils::dates::to_api_date;
use crate::utils::{format_date_us, non_empty, or_na};

/// Search option used by the operator form; the only one the sandbox supports.
pub const DEFAULT_SEARCH_OPTION: &str = "memberIDDateOfBirth";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilitySearchRequest {
    pub member_id: String,
    pub date_of_birth: NaiveDate,
    pub search_option: String,
    pub payer_id: Option<String>,
    pub provider_last_name: Option<String>,
    pub tax_id_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub service_start: Option<NaiveDate>,
    pub service_end: Option<NaiveDate>,
}

impl EligibilitySearchRequest {
    pub fn new(member_id: &str, date_of_birth: NaiveDate) -> Self {
        Self {
            member_id: member_id.trim().to_string(),
            date_of_birth,
            search_option: DEFAULT_SEARCH_OPTION.to_string(),
            payer_id: None,
            provider_last_name: None,
            tax_id_number: None,
            first_name: None,
            last_name: None,
            service_start: None,
            service_end: None,
        }
    }

    pub fn search_option(mut self, option: Option<&str>) -> Self {
        if let Some(option) = non_empty(option) {
            self.search_option = option;
        }
        self
    }

    pub fn payer_id(mut self, value: Option<&str>) -> Self {
        self.payer_id = non_empty(value);
        self
    }

    pub fn provider_last_name(mut self, value: Option<&str>) -> Self {
        self.provider_last_name = non_empty(value);
        self
    }

    pub fn tax_id_number(mut self, value: Option<&str>) -> Self {
        self.tax_id_number = non_empty(value);
        self
    }

    pub fn names(mut self, first: Option<&str>, last: Option<&str>) -> Self {
        self.first_name = non_empty(first);
        self.last_name = non_empty(last);
        self
    }

    pub fn service_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.service_start = start;
        self.service_end = end;
        self
    }
}

impl ApiRequest for EligibilitySearchRequest {
    const PATH: &'static str = "/api/external/member/eligibility/v3.0";

    fn validate(&self) -> Result<(), ApiError> {
        require("Member ID", &self.member_id)?;
        if let (Some(start), Some(end)) = (self.service_start, self.service_end) {
            if end < start {
                return Err(ApiError::InvalidInput(
                    "Service end date is before service start date".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn to_payload(&self) -> Value {
        // Optional text fields go out as "" rather than being omitted
        let mut payload = json!({
            "memberId": self.member_id,
            "dateOfBirth": to_api_date(self.date_of_birth),
            "searchOption": self.search_option,
            "payerID": self.payer_id.as_deref().unwrap_or_default(),
            "providerLastName": self.provider_last_name.as_deref().unwrap_or_default(),
            "taxIdNumber": self.tax_id_number.as_deref().unwrap_or_default(),
            "firstName": self.first_name.as_deref().unwrap_or_default(),
            "lastName": self.last_name.as_deref().unwrap_or_default(),
        });

        if let Some(start) = self.service_start {
            payload["serviceStart"] = json!(to_api_date(start));
        }
        if let Some(end) = self.service_end {
            payload["serviceEnd"] = json!(to_api_date(end));
        }
        payload
    }
}

// ============================================================================
// Response summary
// ============================================================================

/// Operator-facing digest of an eligibility search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilitySummary {
    pub member_id: String,
    pub search_status: String,
    pub transaction_id: String,
    pub policies: Vec<PolicySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySummary {
    pub patient_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub relationship: String,
    pub patient_key: String,
    pub subscriber: bool,
    pub payer_name: String,
    pub payer_id: String,
    pub group_number: String,
    pub insurance_type: String,
    pub plan_description: String,
    pub policy_status: String,
    pub coverage_type: String,
    pub eligibility_period: Option<String>,
    pub plan_period: Option<String>,
    pub plan_message: Option<String>,
}

/// Render a scalar field; numbers are common for ids in this API.
fn text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field(value: &Value, key: &str) -> String {
    or_na(text(value, key).as_deref())
}

fn period(dates: Option<&Value>) -> Option<String> {
    let dates = dates?;
    Some(format!(
        "{} to {}",
        format_date_us(&field(dates, "startDate")),
        format_date_us(&field(dates, "endDate"))
    ))
}

impl EligibilitySummary {
    pub fn from_response(data: &Value) -> Self {
        let policies = data
            .get("memberPolicies")
            .and_then(Value::as_array)
            .map(|policies| policies.iter().map(PolicySummary::from_policy).collect())
            .unwrap_or_default();

        Self {
            member_id: field(data, "memberId"),
            search_status: field(data, "searchStatus"),
            transaction_id: field(data, "transactionId"),
            policies,
        }
    }
}

impl PolicySummary {
    fn from_policy(policy: &Value) -> Self {
        let empty = Value::Null;
        let patient = policy
            .get("patientInfo")
            .and_then(Value::as_array)
            .and_then(|p| p.first())
            .unwrap_or(&empty);
        let insurance = policy.get("insuranceInfo").unwrap_or(&empty);
        let policy_info = policy.get("policyInfo").unwrap_or(&empty);

        let name = [
            text(patient, "firstName"),
            text(patient, "middleName"),
            text(patient, "lastName"),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

        Self {
            patient_name: or_na(Some(name.as_str())),
            date_of_birth: format_date_us(&field(patient, "dateOfBirth")),
            gender: field(patient, "gender"),
            relationship: field(patient, "relationship"),
            patient_key: field(patient, "patientKey"),
            subscriber: patient
                .get("subscriberBoolean")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            payer_name: field(insurance, "payerName"),
            payer_id: field(insurance, "payerId"),
            group_number: field(insurance, "groupNumber"),
            insurance_type: field(insurance, "insuranceType"),
            plan_description: field(insurance, "planDescription"),
            policy_status: field(policy_info, "policyStatus"),
            coverage_type: field(policy_info, "coverageType"),
            eligibility_period: period(policy_info.get("eligibilityDates")),
            plan_period: period(policy_info.get("planDates")),
            plan_message: text(policy, "planMessage"),
        }
    }
}
