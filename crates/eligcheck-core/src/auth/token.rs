use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Scheme prefix every bearer value carries
pub const BEARER_PREFIX: &str = "Bearer ";

/// A token with less than this left is treated as expired, so requests
/// started just before expiry still reach the server with a live token.
const VALIDITY_BUFFER_MINUTES: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Full header value, e.g. `Bearer eyJ...`
    pub bearer: String,
    pub expires_at: DateTime<Utc>,
    pub saved_at: DateTime<Utc>,
}

impl Token {
    pub fn new(bearer: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            bearer,
            expires_at,
            saved_at: Utc::now(),
        }
    }

    /// Build from a raw access token, adding the scheme prefix.
    pub fn from_access_token(access_token: &str, expires_at: DateTime<Utc>) -> Self {
        Self::new(format!("{}{}", BEARER_PREFIX, access_token), expires_at)
    }

    pub fn validity_buffer() -> Duration {
        Duration::minutes(VALIDITY_BUFFER_MINUTES)
    }

    /// Valid iff `now + 5 minutes` is strictly before expiry.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now + Self::validity_buffer() < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at - Utc::now()
    }

    /// Remaining lifetime for display, e.g. "0h 54m 12s"
    pub fn expires_in_display(&self) -> String {
        let remaining = self.time_until_expiry();
        if remaining <= Duration::zero() {
            return "Expired".to_string();
        }
        let secs = remaining.num_seconds();
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }

    /// First `max_chars` characters of the bearer value, for display and logs
    pub fn preview(&self, max_chars: usize) -> String {
        crate::utils::truncate(&self.bearer, max_chars)
    }
}

// ============================================================================
// Persistence
// ============================================================================

/// On-disk shape: `{oauth_token, expires_at, saved_at}` with ISO-8601 times.
#[derive(Debug, Serialize, Deserialize)]
struct TokenRecord {
    #[serde(alias = "bearer")]
    oauth_token: Option<String>,
    expires_at: Option<String>,
    saved_at: Option<String>,
}

/// Parse an ISO-8601 timestamp. Values without an offset are local time.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Single-record token file. Writes overwrite the whole file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the stored token. A missing file is `Ok(None)`; a record without
    /// both a bearer value and a parseable expiry is an error.
    pub fn read(&self) -> Result<Option<Token>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read token file {}", self.path.display()))?;
        let record: TokenRecord = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse token file {}", self.path.display()))?;

        let bearer = record
            .oauth_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("Token file has no bearer value"))?;
        let expires_at = record
            .expires_at
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| anyhow::anyhow!("Token file has no valid expiry"))?;
        let saved_at = record
            .saved_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);

        Ok(Some(Token {
            bearer,
            expires_at,
            saved_at,
        }))
    }

    pub fn write(&self, token: &Token) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let record = TokenRecord {
            oauth_token: Some(token.bearer.clone()),
            expires_at: Some(token.expires_at.to_rfc3339()),
            saved_at: Some(token.saved_at.to_rfc3339()),
        };
        let contents = serde_json::to_string_pretty(&record)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write token file {}", self.path.display()))?;
        Ok(())
    }

    pub fn remove(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to delete token file {}", self.path.display()))?;
        }
        Ok(())
    }
}
