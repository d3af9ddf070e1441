//! eligcheck-core: shared library for the eligcheck front-end.
//!
//! This crate contains the OAuth token lifecycle, the eligibility API client,
//! request value objects, configuration and date handling. It has no
//! terminal dependencies and can be driven by any front-end.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiError, EligibilityClient};
pub use auth::{CredentialStore, Credentials, Token, TokenManager};
pub use config::Config;
