//! Application configuration management.
//!
//! Non-secret settings live in `~/.config/eligcheck/config.json`; every field
//! is optional. Environment variables (`UHC_CLIENT_ID`, `UHC_OAUTH_URL`,
//! `UHC_API_BASE_URL`, `UHC_TOKEN_FILE`, `UHC_ENV`) override the file. The
//! client secret is never read from this file; see `auth::Credentials`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::DateFormats;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "eligcheck";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_OAUTH_URL: &str = "https://apimarketplace.uhc.com/v1/oauthtoken";
pub const DEFAULT_API_BASE_URL: &str = "https://apimarketplace.uhc.com/Eligibility";

/// Token file name in the cache directory
pub const DEFAULT_TOKEN_FILE: &str = "uhc_oauth_token.json";

/// Value of the `env` discriminator header
pub const DEFAULT_ENVIRONMENT: &str = "sandbox";

pub const ENV_CLIENT_ID: &str = "UHC_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "UHC_CLIENT_SECRET";
pub const ENV_OAUTH_URL: &str = "UHC_OAUTH_URL";
pub const ENV_API_BASE_URL: &str = "UHC_API_BASE_URL";
pub const ENV_TOKEN_FILE: &str = "UHC_TOKEN_FILE";
pub const ENV_ENVIRONMENT: &str = "UHC_ENV";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub client_id: Option<String>,
    pub oauth_url: Option<String>,
    pub api_base_url: Option<String>,
    pub token_file: Option<PathBuf>,
    pub environment: Option<String>,
    /// Accepted input date layouts in chrono syntax, tried in order
    pub date_formats: Vec<String>,
    /// Directory for JSON log files; file logging is off when unset
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from a key lookup (the process environment in production).
    /// Blank values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_CLIENT_ID) {
            self.client_id = Some(v);
        }
        if let Some(v) = get(ENV_OAUTH_URL) {
            self.oauth_url = Some(v);
        }
        if let Some(v) = get(ENV_API_BASE_URL) {
            self.api_base_url = Some(v);
        }
        if let Some(v) = get(ENV_TOKEN_FILE) {
            self.token_file = Some(PathBuf::from(v));
        }
        if let Some(v) = get(ENV_ENVIRONMENT) {
            self.environment = Some(v);
        }
        self
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn oauth_url(&self) -> &str {
        self.oauth_url.as_deref().unwrap_or(DEFAULT_OAUTH_URL)
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn environment(&self) -> &str {
        self.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT)
    }

    pub fn date_formats(&self) -> DateFormats {
        DateFormats::new(self.date_formats.clone())
    }

    /// Path of the token file, optionally keyed by an operator profile.
    ///
    /// A profile `alice` turns `uhc_oauth_token.json` into
    /// `uhc_oauth_token-alice.json` in the same directory.
    pub fn token_path(&self, profile: Option<&str>) -> Result<PathBuf> {
        let base = match self.token_file {
            Some(ref path) => path.clone(),
            None => {
                let cache_dir = dirs::cache_dir()
                    .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
                cache_dir.join(APP_NAME).join(DEFAULT_TOKEN_FILE)
            }
        };

        match profile {
            None => Ok(base),
            Some(profile) => profile_path(&base, profile),
        }
    }
}

fn profile_path(base: &Path, profile: &str) -> Result<PathBuf> {
    let valid = !profile.is_empty()
        && profile
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        bail!(
            "Invalid profile name '{}': use letters, digits, '-' or '_'",
            profile
        );
    }

    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("token");
    let file_name = match base.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", stem, profile, ext),
        None => format!("{}-{}", stem, profile),
    };
    Ok(base.with_file_name(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.oauth_url(), DEFAULT_OAUTH_URL);
        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(config.environment(), "sandbox");
        assert_eq!(config.date_formats(), DateFormats::default());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let config = Config {
            client_id: Some("from-file".to_string()),
            oauth_url: Some("https://file.example/oauth".to_string()),
            ..Default::default()
        }
        .with_overrides(env(&[
            (ENV_CLIENT_ID, "from-env"),
            (ENV_API_BASE_URL, "https://env.example/api/"),
            (ENV_TOKEN_FILE, "/tmp/tok.json"),
            (ENV_ENVIRONMENT, ""),
        ]));

        assert_eq!(config.client_id.as_deref(), Some("from-env"));
        assert_eq!(config.oauth_url(), "https://file.example/oauth");
        assert_eq!(config.api_base_url(), "https://env.example/api");
        assert_eq!(config.token_file, Some(PathBuf::from("/tmp/tok.json")));
        // Blank override is ignored
        assert_eq!(config.environment(), "sandbox");
    }

    #[test]
    fn test_load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"environment":"production","date_formats":["%Y-%m-%d"]}"#)
            .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.environment(), "production");
        assert_eq!(config.date_formats().formats(), ["%Y-%m-%d".to_string()]);
        assert_eq!(config.client_id, None);
    }

    #[test]
    fn test_load_from_malformed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_token_path_profiles() {
        let config = Config {
            token_file: Some(PathBuf::from("/data/uhc_oauth_token.json")),
            ..Default::default()
        };

        assert_eq!(
            config.token_path(None).unwrap(),
            PathBuf::from("/data/uhc_oauth_token.json")
        );
        assert_eq!(
            config.token_path(Some("alice")).unwrap(),
            PathBuf::from("/data/uhc_oauth_token-alice.json")
        );
        assert!(config.token_path(Some("../etc")).is_err());
        assert!(config.token_path(Some("")).is_err());
    }
}
