use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use tracing::{info, warn};

use super::oauth::OAuthClient;
use super::token::{Token, TokenStore, BEARER_PREFIX};
use crate::api::ApiError;

/// Lifetime given to operator-pasted tokens
const MANUAL_TOKEN_LIFETIME_HOURS: i64 = 1;

/// Owns the current token and its file.
///
/// Token-file failures never abort: they are logged as warnings and the
/// manager falls back to "no token".
#[derive(Debug)]
pub struct TokenManager {
    store: TokenStore,
    current: Option<Token>,
}

impl TokenManager {
    pub fn new(token_path: PathBuf) -> Self {
        Self {
            store: TokenStore::new(token_path),
            current: None,
        }
    }

    pub fn token_path(&self) -> &Path {
        self.store.path()
    }

    /// Whether a token file is currently on disk
    pub fn has_saved_token(&self) -> bool {
        self.store.exists()
    }

    pub fn token(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// Bearer value, only while the token is valid
    pub fn bearer(&self) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|t| t.is_valid())
            .map(|t| t.bearer.as_str())
    }

    pub fn is_valid(&self) -> bool {
        self.current.as_ref().map(Token::is_valid).unwrap_or(false)
    }

    /// Adopt the persisted token if it is still valid.
    /// Expired or soon-to-expire tokens are deleted from disk.
    pub fn load(&mut self) -> bool {
        self.current = None;

        let token = match self.store.read() {
            Ok(Some(token)) => token,
            Ok(None) => return false,
            Err(e) => {
                warn!(error = %e, "Could not load token from file");
                return false;
            }
        };

        if token.is_valid() {
            info!(expires_at = %token.expires_at, "Loaded saved token");
            self.current = Some(token);
            true
        } else {
            info!("Saved token expired, removing");
            self.remove_file();
            false
        }
    }

    /// Run the client-credentials exchange and persist the result.
    pub async fn acquire(&mut self, oauth: &OAuthClient) -> Result<&Token, ApiError> {
        let token = oauth.request_token().await?;
        Ok(self.adopt(token))
    }

    /// Use an operator-supplied bearer value for the next hour.
    pub fn set_manual(&mut self, bearer: &str) -> Result<&Token, ApiError> {
        let bearer = bearer.trim();
        let has_value = bearer
            .strip_prefix(BEARER_PREFIX)
            .map(|rest| !rest.trim().is_empty())
            .unwrap_or(false);
        if !has_value {
            return Err(ApiError::InvalidInput(format!(
                "Token must start with '{}' followed by the token value",
                BEARER_PREFIX
            )));
        }

        let token = Token::new(
            bearer.to_string(),
            Utc::now() + Duration::hours(MANUAL_TOKEN_LIFETIME_HOURS),
        );
        Ok(self.adopt(token))
    }

    /// Forget the token and delete its file. Safe to call repeatedly.
    pub fn clear(&mut self) {
        self.current = None;
        self.remove_file();
    }

    fn adopt(&mut self, token: Token) -> &Token {
        match self.store.write(&token) {
            Ok(()) => info!(path = %self.store.path().display(), "Token saved"),
            Err(e) => warn!(error = %e, "Could not save token to file"),
        }
        self.current.insert(token)
    }

    fn remove_file(&self) {
        if let Err(e) = self.store.remove() {
            warn!(error = %e, "Could not delete token file");
        }
    }
}
