//! Printing of results and failures.
//!
//! With `--json` every call prints one envelope on stdout:
//! `{"success": true, "status_code": 200, "data": ...}` or
//! `{"success": false, "status_code": <status>, "error": ...}`.

use eligcheck_core::models::EligibilitySummary;
use eligcheck_core::ApiError;
use serde_json::{json, Value};

pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

pub fn success_envelope(data: &Value) -> Value {
    json!({
        "success": true,
        "status_code": 200,
        "data": data,
    })
}

pub fn failure_envelope(err: &ApiError) -> Value {
    let error = match err.payload() {
        Some(payload) => payload.clone(),
        None => json!({ "message": err.message() }),
    };
    json!({
        "success": false,
        "status_code": err.status(),
        "error": error,
    })
}

/// Report a failed call and hand the error back for the exit status.
pub fn failure(context: &str, err: ApiError, json_output: bool) -> anyhow::Error {
    if json_output {
        print_json(&failure_envelope(&err));
    } else {
        match err.status() {
            Some(status) => eprintln!("{} (status {}): {}", context, status, err.message()),
            None => eprintln!("{}: {}", context, err.message()),
        }
        if let Some(payload) = err.payload() {
            eprintln!("Error response:");
            match serde_json::to_string_pretty(payload) {
                Ok(text) => eprintln!("{}", text),
                Err(_) => eprintln!("{}", payload),
            }
        }
    }
    err.into()
}

/// Print a successful business call.
pub fn result(title: &str, data: &Value, json_output: bool) {
    if json_output {
        print_json(&success_envelope(data));
    } else {
        println!("{}", title);
        print_json(data);
    }
}

/// Print an eligibility search: the keys needed for follow-up calls, then the raw response.
pub fn eligibility(data: &Value, json_output: bool) {
    if json_output {
        print_json(&success_envelope(data));
        return;
    }

    let summary = EligibilitySummary::from_response(data);
    println!("Eligibility search completed");
    println!("Member ID:      {}", summary.member_id);
    println!("Search Status:  {}", summary.search_status);
    println!("Transaction ID: {}", summary.transaction_id);

    if summary.policies.is_empty() {
        println!("No member policies found in the response.");
    }
    for (idx, policy) in summary.policies.iter().enumerate() {
        println!();
        println!("Policy {}", idx + 1);
        println!("  Patient:            {}", policy.patient_name);
        println!("  Date of Birth:      {}", policy.date_of_birth);
        println!("  Gender:             {}", policy.gender);
        println!("  Relationship:       {}", policy.relationship);
        println!("  Patient Key:        {}", policy.patient_key);
        println!("  Subscriber:         {}", if policy.subscriber { "Yes" } else { "No" });
        println!("  Payer:              {} ({})", policy.payer_name, policy.payer_id);
        println!("  Group Number:       {}", policy.group_number);
        println!("  Insurance Type:     {}", policy.insurance_type);
        println!("  Plan:               {}", policy.plan_description);
        println!("  Policy Status:      {}", policy.policy_status);
        println!("  Coverage Type:      {}", policy.coverage_type);
        if let Some(ref period) = policy.eligibility_period {
            println!("  Eligibility Period: {}", period);
        }
        if let Some(ref period) = policy.plan_period {
            println!("  Plan Period:        {}", period);
        }
        if let Some(ref message) = policy.plan_message {
            println!("  Plan Message:       {}", message);
        }
    }

    println!();
    println!("Raw response:");
    print_json(data);
}
