//! Eligibility, network status and copay commands.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Args;
use eligcheck_core::models::{
    ApiRequest, CopayRequest, EligibilitySearchRequest, NetworkStatusRequest,
};
use eligcheck_core::{ApiError, EligibilityClient};

use super::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct EligibilityArgs {
    /// Member ID
    #[arg(long)]
    pub member_id: String,

    /// Date of birth (MM/DD/YYYY unless configured otherwise)
    #[arg(long)]
    pub dob: String,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub payer_id: Option<String>,

    #[arg(long)]
    pub provider_last_name: Option<String>,

    #[arg(long)]
    pub tax_id: Option<String>,

    /// Start of the service date range
    #[arg(long)]
    pub service_start: Option<String>,

    /// End of the service date range
    #[arg(long)]
    pub service_end: Option<String>,

    /// Search option (default: memberIDDateOfBirth)
    #[arg(long)]
    pub search_option: Option<String>,
}

#[derive(Args, Debug)]
pub struct NetworkStatusArgs {
    #[arg(long)]
    pub member_id: String,

    #[arg(long)]
    pub dob: String,

    #[arg(long)]
    pub provider_last_name: String,

    /// First date of service
    #[arg(long)]
    pub first_dos: String,

    /// Last date of service
    #[arg(long)]
    pub last_dos: String,

    /// Transaction ID from an eligibility search
    #[arg(long)]
    pub transaction_id: Option<String>,

    #[arg(long)]
    pub provider_first_name: Option<String>,

    #[arg(long)]
    pub provider_tin: Option<String>,

    #[arg(long)]
    pub provider_npi: Option<String>,

    /// Member first name
    #[arg(long)]
    pub first_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct CopayArgs {
    /// Patient key from an eligibility search
    #[arg(long)]
    pub patient_key: String,

    /// Transaction ID from an eligibility search
    #[arg(long)]
    pub transaction_id: String,
}

/// Bearer value of the saved token; business calls never acquire one.
fn require_bearer(ctx: &Context) -> Result<String> {
    let manager = ctx.token_manager()?;
    match manager.bearer() {
        Some(bearer) => Ok(bearer.to_string()),
        None => bail!(
            "Cannot perform search: OAuth token is required. Run `eligcheck token generate` first."
        ),
    }
}

fn parse_date(ctx: &Context, field: &str, input: &str) -> Result<NaiveDate, ApiError> {
    ctx.config.date_formats().parse_field(field, input)
}

fn parse_optional_date(
    ctx: &Context,
    field: &str,
    input: Option<&str>,
) -> Result<Option<NaiveDate>, ApiError> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        Some(input) => parse_date(ctx, field, input).map(Some),
        None => Ok(None),
    }
}

/// Reject a request locally before any token or credential lookup.
fn validated<R: ApiRequest>(request: R) -> Result<R, ApiError> {
    request.validate()?;
    Ok(request)
}

fn build_eligibility(
    args: &EligibilityArgs,
    ctx: &Context,
) -> Result<EligibilitySearchRequest, ApiError> {
    let dob = parse_date(ctx, "date of birth", &args.dob)?;
    let service_start = parse_optional_date(ctx, "service start", args.service_start.as_deref())?;
    let service_end = parse_optional_date(ctx, "service end", args.service_end.as_deref())?;

    validated(
        EligibilitySearchRequest::new(&args.member_id, dob)
            .search_option(args.search_option.as_deref())
            .names(args.first_name.as_deref(), args.last_name.as_deref())
            .payer_id(args.payer_id.as_deref())
            .provider_last_name(args.provider_last_name.as_deref())
            .tax_id_number(args.tax_id.as_deref())
            .service_dates(service_start, service_end),
    )
}

fn build_network_status(
    args: &NetworkStatusArgs,
    ctx: &Context,
) -> Result<NetworkStatusRequest, ApiError> {
    let dob = parse_date(ctx, "date of birth", &args.dob)?;
    let first_dos = parse_date(ctx, "first date of service", &args.first_dos)?;
    let last_dos = parse_date(ctx, "last date of service", &args.last_dos)?;

    validated(
        NetworkStatusRequest::new(
            &args.member_id,
            dob,
            &args.provider_last_name,
            first_dos,
            last_dos,
        )
        .transaction_id(args.transaction_id.as_deref())
        .provider_first_name(args.provider_first_name.as_deref())
        .provider_tin(args.provider_tin.as_deref())
        .provider_npi(args.provider_npi.as_deref())
        .first_name(args.first_name.as_deref()),
    )
}

fn build_copay(args: &CopayArgs) -> Result<CopayRequest, ApiError> {
    validated(CopayRequest::new(&args.patient_key, &args.transaction_id))
}

pub async fn run_eligibility(args: EligibilityArgs, ctx: &Context) -> Result<()> {
    let request = build_eligibility(&args, ctx)
        .map_err(|e| output::failure("Invalid search", e, ctx.json_output))?;
    let bearer = require_bearer(ctx)?;

    let client = EligibilityClient::new(&ctx.credentials()?)?;
    match client.search_eligibility(&bearer, &request).await {
        Ok(data) => {
            output::eligibility(&data, ctx.json_output);
            Ok(())
        }
        Err(e) => Err(output::failure("Search failed", e, ctx.json_output)),
    }
}

pub async fn run_network_status(args: NetworkStatusArgs, ctx: &Context) -> Result<()> {
    let request = build_network_status(&args, ctx)
        .map_err(|e| output::failure("Invalid network status check", e, ctx.json_output))?;
    let bearer = require_bearer(ctx)?;

    let client = EligibilityClient::new(&ctx.credentials()?)?;
    match client.check_network_status(&bearer, &request).await {
        Ok(data) => {
            output::result("Network status check completed", &data, ctx.json_output);
            Ok(())
        }
        Err(e) => Err(output::failure("Network status check failed", e, ctx.json_output)),
    }
}

pub async fn run_copay(args: CopayArgs, ctx: &Context) -> Result<()> {
    let request = build_copay(&args)
        .map_err(|e| output::failure("Invalid copay lookup", e, ctx.json_output))?;
    let bearer = require_bearer(ctx)?;

    let client = EligibilityClient::new(&ctx.credentials()?)?;
    match client.get_copay_details(&bearer, &request).await {
        Ok(data) => {
            output::result("Copay details retrieved", &data, ctx.json_output);
            Ok(())
        }
        Err(e) => Err(output::failure("Copay lookup failed", e, ctx.json_output)),
    }
}
