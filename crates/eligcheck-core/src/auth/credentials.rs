use std::fmt;

use anyhow::{bail, Context, Result};
use keyring::Entry;
use tracing::debug;

use crate::config::{Config, ENV_CLIENT_ID, ENV_CLIENT_SECRET};

const SERVICE_NAME: &str = "eligcheck";

/// OS keychain storage for the OAuth client secret, keyed by client id.
pub struct CredentialStore;

impl CredentialStore {
    /// Store the client secret in the OS keychain
    pub fn store_secret(client_id: &str, secret: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, client_id)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(secret)
            .context("Failed to store client secret in keychain")?;
        Ok(())
    }

    /// Retrieve the client secret for a client id from the OS keychain
    pub fn get_secret(client_id: &str) -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, client_id)
            .context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve client secret from keychain")
    }

    /// Delete the stored secret for a client id
    pub fn delete_secret(client_id: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, client_id)
            .context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete client secret from keychain")?;
        Ok(())
    }

    /// Check if a secret exists for a client id
    pub fn has_secret(client_id: &str) -> bool {
        if let Ok(entry) = Entry::new(SERVICE_NAME, client_id) {
            entry.get_password().is_ok()
        } else {
            false
        }
    }
}

/// Resolved, immutable credentials for one process.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub oauth_url: String,
    pub api_base_url: String,
    pub environment: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("oauth_url", &self.oauth_url)
            .field("api_base_url", &self.api_base_url)
            .field("environment", &self.environment)
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials from config, `UHC_CLIENT_SECRET`, then the OS keychain.
    pub fn resolve(config: &Config) -> Result<Self> {
        let secret = std::env::var(ENV_CLIENT_SECRET)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                let client_id = config.client_id.as_deref()?;
                match CredentialStore::get_secret(client_id) {
                    Ok(secret) => Some(secret),
                    Err(e) => {
                        debug!(error = %e, "No client secret in keychain");
                        None
                    }
                }
            });
        Self::from_parts(config, secret)
    }

    /// Build credentials, failing fast when the client id or secret is missing.
    pub fn from_parts(config: &Config, client_secret: Option<String>) -> Result<Self> {
        let client_id = config
            .client_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let client_secret = client_secret.filter(|s| !s.trim().is_empty());

        let (client_id, client_secret) = match (client_id, client_secret) {
            (Some(id), Some(secret)) => (id.to_string(), secret),
            (None, _) => bail!(
                "API credentials not found: set {} in the environment or `client_id` in {}",
                ENV_CLIENT_ID,
                Config::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".to_string())
            ),
            (Some(_), None) => bail!(
                "API credentials not found: set {} in the environment or run `{}`",
                ENV_CLIENT_SECRET,
                "eligcheck credentials set"
            ),
        };

        Ok(Self {
            client_id,
            client_secret,
            oauth_url: config.oauth_url().to_string(),
            api_base_url: config.api_base_url().to_string(),
            environment: config.environment().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_complete() {
        let config = Config {
            client_id: Some("client-1".to_string()),
            api_base_url: Some("http://localhost:9000/".to_string()),
            ..Default::default()
        };
        let creds = Credentials::from_parts(&config, Some("s3cret".to_string())).unwrap();
        assert_eq!(creds.client_id, "client-1");
        assert_eq!(creds.client_secret, "s3cret");
        assert_eq!(creds.api_base_url, "http://localhost:9000");
        assert_eq!(creds.environment, "sandbox");
    }

    #[test]
    fn test_missing_client_id_fails_fast() {
        let err = Credentials::from_parts(&Config::default(), Some("s3cret".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_CLIENT_ID));
    }

    #[test]
    fn test_missing_secret_fails_fast() {
        let config = Config {
            client_id: Some("client-1".to_string()),
            ..Default::default()
        };
        let err = Credentials::from_parts(&config, Some("   ".to_string())).unwrap_err();
        assert!(err.to_string().contains(ENV_CLIENT_SECRET));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config {
            client_id: Some("client-1".to_string()),
            ..Default::default()
        };
        let creds = Credentials::from_parts(&config, Some("s3cret".to_string())).unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("<redacted>"));
    }
}
