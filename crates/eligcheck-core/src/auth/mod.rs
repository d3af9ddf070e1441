//! Authentication: credentials and the OAuth token lifecycle.
//!
//! This module provides:
//! - `Credentials` / `CredentialStore`: client id and secret, the secret
//!   optionally kept in the OS keychain
//! - `OAuthClient`: the client-credentials exchange
//! - `TokenManager`: acquire, persist, load, validate, clear
//!
//! Tokens are persisted to a single JSON file and treated as expired once
//! fewer than 5 minutes of lifetime remain.

pub mod credentials;
pub mod manager;
pub mod oauth;
pub mod token;

pub use credentials::{CredentialStore, Credentials};
pub use manager::TokenManager;
pub use oauth::OAuthClient;
pub use token::{Token, TokenStore, BEARER_PREFIX};
