//! Client configuration resolved from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const ENV_API_BASE_URL: &str = "PORTAL_API_BASE_URL";
pub const ENV_HTTP_TIMEOUT_MS: &str = "PORTAL_HTTP_TIMEOUT_MS";
pub const ENV_PAYMENT_DELAY_MS: &str = "PORTAL_PAYMENT_DELAY_MS";
pub const ENV_SESSION_DB: &str = "PORTAL_SESSION_DB";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_PAYMENT_DELAY_MS: u64 = 2_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API base URL is empty")]
    EmptyBaseUrl,
    #[error("API base URL must be an http(s) URL with a host: {0}")]
    InvalidBaseUrl(String),
    #[error("{key} must be a whole number of milliseconds, got {value:?}")]
    InvalidMillis { key: &'static str, value: String },
    #[error("no data directory available; set {ENV_SESSION_DB}")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Normalized: no trailing slash.
    pub api_base_url: String,
    pub http_timeout: Duration,
    /// Simulated payment processing time.
    pub payment_delay: Duration,
    /// SQLite file backing the persistent session store.
    pub session_db: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_non_empty)
    }

    /// Resolve from an arbitrary variable source (tests pass a closure).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = normalize_base_url(
            &lookup(ENV_API_BASE_URL).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        )?;
        let http_timeout = millis(&lookup, ENV_HTTP_TIMEOUT_MS, DEFAULT_HTTP_TIMEOUT_MS)?;
        let payment_delay = millis(&lookup, ENV_PAYMENT_DELAY_MS, DEFAULT_PAYMENT_DELAY_MS)?;
        let session_db = match lookup(ENV_SESSION_DB) {
            Some(path) => PathBuf::from(path),
            None => default_session_db_path().ok_or(ConfigError::NoDataDir)?,
        };

        Ok(Self {
            api_base_url,
            http_timeout,
            payment_delay,
            session_db,
        })
    }
}

/// Trim whitespace and trailing slashes; require an http(s) scheme and a host.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    let Some((scheme, remainder)) = trimmed.split_once("://") else {
        return Err(ConfigError::InvalidBaseUrl(trimmed.to_string()));
    };
    if !matches!(scheme, "http" | "https") || remainder.trim().is_empty() || remainder.starts_with('/')
    {
        return Err(ConfigError::InvalidBaseUrl(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

/// `<data_dir>/portal/session.db`.
pub fn default_session_db_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("portal").join("session.db"))
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    match lookup(key) {
        None => Ok(Duration::from_millis(default)),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidMillis { key, value: raw }),
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_SESSION_DB, "/tmp/s.db")])).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8000/api");
        assert_eq!(config.http_timeout, Duration::from_millis(15_000));
        assert_eq!(config.payment_delay, Duration::from_millis(2_000));
        assert_eq!(config.session_db, PathBuf::from("/tmp/s.db"));
    }

    #[test]
    fn overrides_are_read() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_BASE_URL, " https://portal.example.com/api/ "),
            (ENV_HTTP_TIMEOUT_MS, "500"),
            (ENV_PAYMENT_DELAY_MS, "0"),
            (ENV_SESSION_DB, "/var/lib/portal.db"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://portal.example.com/api");
        assert_eq!(config.http_timeout, Duration::from_millis(500));
        assert_eq!(config.payment_delay, Duration::ZERO);
    }

    #[test]
    fn bad_millis_are_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[
            (ENV_SESSION_DB, "/tmp/s.db"),
            (ENV_HTTP_TIMEOUT_MS, "soon"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidMillis {
                key: ENV_HTTP_TIMEOUT_MS,
                value: "soon".into()
            }
        );
    }

    #[test]
    fn normalize_base_url_trims_and_drops_trailing_slash() {
        assert_eq!(
            normalize_base_url("  http://localhost:8000/api//  ").unwrap(),
            "http://localhost:8000/api"
        );
    }

    #[test]
    fn normalize_base_url_requires_http_scheme_and_host() {
        assert_eq!(normalize_base_url("   "), Err(ConfigError::EmptyBaseUrl));
        assert!(normalize_base_url("ftp://example.com").is_err());
        assert!(normalize_base_url("localhost:8000").is_err());
        assert!(normalize_base_url("http:///api").is_err());
    }
}
