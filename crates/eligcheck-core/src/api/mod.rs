//! REST API client module for the member eligibility services.
//!
//! This module provides the `EligibilityClient` for the three business
//! endpoints (eligibility search, network status, copay details) and the
//! `ApiError` failure taxonomy shared with the token exchange.
//!
//! Calls authenticate with a bearer value obtained through
//! `auth::TokenManager`; the client never acquires tokens itself.

pub mod client;
pub mod error;

pub use client::EligibilityClient;
pub use error::ApiError;
