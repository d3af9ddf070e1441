//! Command handlers.

pub mod credentials;
pub mod lookup;
pub mod token;

use anyhow::Result;
use eligcheck_core::{Config, Credentials, TokenManager};

/// Shared state handed to every command.
pub struct Context {
    pub config: Config,
    pub profile: Option<String>,
    pub json_output: bool,
}

impl Context {
    /// Token manager for this operator, with any saved token already loaded.
    pub fn token_manager(&self) -> Result<TokenManager> {
        let path = self.config.token_path(self.profile.as_deref())?;
        let mut manager = TokenManager::new(path);
        manager.load();
        Ok(manager)
    }

    /// Resolve credentials, failing fast when the client id or secret is missing.
    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::resolve(&self.config)
    }
}
