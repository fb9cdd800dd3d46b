//! Bridge configuration from environment variables.
//!
//! The bridge is configured the way its host (an MCP client launching a
//! stdio server) can most easily configure it: environment variables. Only
//! the service address and API key are required; everything else has
//! defaults tuned for a local profile manager.

use std::time::Duration;
use thiserror::Error;

use crate::client::WindowSizes;

/// Required: base URL of the profile service API.
pub const ENV_API_URL: &str = "PROFILE_API_URL";
/// Required: API key sent with every request.
pub const ENV_API_KEY: &str = "PROFILE_API_KEY";
/// Optional: per-request timeout in seconds.
pub const ENV_TIMEOUT: &str = "PROFILE_API_TIMEOUT_SECS";
/// Optional: window size for open-style batches.
pub const ENV_OPEN_WINDOW: &str = "PROFILE_OPEN_WINDOW";
/// Optional: window size for create-style batches.
pub const ENV_CREATE_WINDOW: &str = "PROFILE_CREATE_WINDOW";
/// Optional: window size for close-style batches.
pub const ENV_CLOSE_WINDOW: &str = "PROFILE_CLOSE_WINDOW";
/// Optional: pause between batch windows in milliseconds.
pub const ENV_WINDOW_DELAY: &str = "PROFILE_WINDOW_DELAY_MS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_WINDOW_DELAY: Duration = Duration::from_millis(500);

/// Configuration errors name the offending variable so the fix is obvious.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingVar(&'static str),
    #[error("{0} must be a positive number")]
    InvalidNumber(&'static str),
}

/// Everything the bridge needs to talk to the profile service.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Base URL of the service API, e.g. `http://127.0.0.1:54345`.
    pub api_url: String,
    /// API key sent as the `X-API-KEY` header.
    pub api_key: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Per-operation batch window sizes.
    pub windows: WindowSizes,
    /// Pause between batch windows.
    pub inter_window_delay: Duration,
}

impl BridgeConfig {
    /// Creates a configuration with explicit connection values and default
    /// tuning.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            request_timeout: DEFAULT_TIMEOUT,
            windows: WindowSizes::default(),
            inter_window_delay: DEFAULT_WINDOW_DELAY,
        }
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through an injectable lookup. Tests pass a
    /// map-backed closure instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(ENV_API_URL).ok_or(ConfigError::MissingVar(ENV_API_URL))?;
        let api_key = lookup(ENV_API_KEY).ok_or(ConfigError::MissingVar(ENV_API_KEY))?;

        let mut config = Self::new(api_url, api_key);

        if let Some(secs) = parse_optional(&lookup, ENV_TIMEOUT)? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = parse_optional(&lookup, ENV_OPEN_WINDOW)? {
            config.windows.open = size as usize;
        }
        if let Some(size) = parse_optional(&lookup, ENV_CREATE_WINDOW)? {
            config.windows.create = size as usize;
        }
        if let Some(size) = parse_optional(&lookup, ENV_CLOSE_WINDOW)? {
            config.windows.close = size as usize;
        }
        if let Some(millis) = parse_optional(&lookup, ENV_WINDOW_DELAY)? {
            config.inter_window_delay = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

fn parse_optional<F>(lookup: &F, name: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(value) if value > 0 => Ok(Some(value)),
            _ => Err(ConfigError::InvalidNumber(name)),
        },
    }
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
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_minimal_configuration() {
        let config = BridgeConfig::from_lookup(env(&[
            (ENV_API_URL, "http://127.0.0.1:54345"),
            (ENV_API_KEY, "secret"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://127.0.0.1:54345");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.request_timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.windows, WindowSizes::default());
        assert_eq!(config.inter_window_delay, DEFAULT_WINDOW_DELAY);
    }

    #[test]
    fn test_missing_url() {
        let error = BridgeConfig::from_lookup(env(&[(ENV_API_KEY, "secret")])).unwrap_err();
        assert_eq!(error, ConfigError::MissingVar(ENV_API_URL));
        assert!(error.to_string().contains("PROFILE_API_URL"));
    }

    #[test]
    fn test_missing_key() {
        let error =
            BridgeConfig::from_lookup(env(&[(ENV_API_URL, "http://x")])).unwrap_err();
        assert_eq!(error, ConfigError::MissingVar(ENV_API_KEY));
    }

    #[test]
    fn test_tuning_overrides() {
        let config = BridgeConfig::from_lookup(env(&[
            (ENV_API_URL, "http://x"),
            (ENV_API_KEY, "k"),
            (ENV_TIMEOUT, "10"),
            (ENV_OPEN_WINDOW, "8"),
            (ENV_CREATE_WINDOW, "2"),
            (ENV_CLOSE_WINDOW, "4"),
            (ENV_WINDOW_DELAY, "250"),
        ]))
        .unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.windows.open, 8);
        assert_eq!(config.windows.create, 2);
        assert_eq!(config.windows.close, 4);
        assert_eq!(config.inter_window_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_malformed_number_fails_fast() {
        let error = BridgeConfig::from_lookup(env(&[
            (ENV_API_URL, "http://x"),
            (ENV_API_KEY, "k"),
            (ENV_OPEN_WINDOW, "many"),
        ]))
        .unwrap_err();
        assert_eq!(error, ConfigError::InvalidNumber(ENV_OPEN_WINDOW));
    }

    #[test]
    fn test_zero_window_fails_fast() {
        let error = BridgeConfig::from_lookup(env(&[
            (ENV_API_URL, "http://x"),
            (ENV_API_KEY, "k"),
            (ENV_CLOSE_WINDOW, "0"),
        ]))
        .unwrap_err();
        assert_eq!(error, ConfigError::InvalidNumber(ENV_CLOSE_WINDOW));
    }
}
