//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading (with `.env` support)
//! - Configuration validation
//! - Default value handling
//! - Protection of the preconfigured API key via [`SecretString`]
//!
//! # Example
//!
//! ```
//! use cognee_client::config::{Config, SecretString};
//!
//! // Use Config::from_env() in production
//! let config = Config::default()
//!     .with_local_base_url("http://localhost:8000/")
//!     .with_preconfigured_api_key(SecretString::new("abc123"));
//!
//! assert_eq!(config.local_base_url, "http://localhost:8000");
//! let debug = format!("{:?}", config);
//! assert!(debug.contains("<REDACTED>"));
//! assert!(!debug.contains("abc123"));
//! ```

mod secret;
mod validation;

pub use secret::SecretString;
pub use validation::{
    validate_config, MAX_HEALTH_ATTEMPTS, MAX_HEALTH_ATTEMPT_TIMEOUT_MS, MAX_HEALTH_RETRY_DELAY_MS,
    MIN_HEALTH_ATTEMPTS, MIN_HEALTH_ATTEMPT_TIMEOUT_MS,
};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Default base URL of the self-hosted backend.
pub const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:8000";

/// Default base URL of the managed cloud backend.
pub const DEFAULT_CLOUD_BASE_URL: &str = "https://api.cognee.ai";

/// Default base URL of the companion MCP server.
pub const DEFAULT_MCP_BASE_URL: &str = "http://localhost:8001";

/// Default location of the durable credential store.
pub const DEFAULT_CREDENTIALS_PATH: &str = "./data/credentials.json";

/// Default number of liveness attempts.
pub const DEFAULT_HEALTH_MAX_ATTEMPTS: u32 = 5;

/// Default delay between liveness attempts in milliseconds.
pub const DEFAULT_HEALTH_RETRY_DELAY_MS: u64 = 1_000;

/// Default time limit of a single liveness attempt in milliseconds.
pub const DEFAULT_HEALTH_ATTEMPT_TIMEOUT_MS: u64 = 5_000;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Client configuration.
///
/// Use [`Config::from_env`] to load configuration from environment variables.
/// Base URLs are normalized without a trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of all local-mode requests.
    pub local_base_url: String,
    /// Root of all cloud-mode requests.
    pub cloud_base_url: String,
    /// Root of the MCP server liveness endpoint.
    pub mcp_base_url: String,
    /// Build-time API key. When present, the user-entry flow is skipped.
    pub preconfigured_api_key: Option<SecretString>,
    /// Whether a 401 triggers one silent reauthentication and replay.
    pub reauthentication_enabled: bool,
    /// Endpoint that issues session tokens during reauthentication.
    pub auth_token_url: String,
    /// File backing the durable credential store.
    pub credentials_path: PathBuf,
    /// Maximum liveness attempts for bounded health probes.
    pub health_max_attempts: u32,
    /// Fixed delay between liveness attempts in milliseconds.
    pub health_retry_delay_ms: u64,
    /// Time limit of a single liveness attempt in milliseconds.
    pub health_attempt_timeout_ms: u64,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables (with defaults):
    /// - `COGNEE_LOCAL_API_URL` (default: `http://localhost:8000`)
    /// - `COGNEE_CLOUD_API_URL` (default: `https://api.cognee.ai`)
    /// - `COGNEE_MCP_API_URL` (default: `http://localhost:8001`)
    /// - `COGNEE_API_KEY` (default: unset)
    /// - `COGNEE_REAUTH_ENABLED` (default: `false`)
    /// - `COGNEE_AUTH_TOKEN_URL` (default: `{COGNEE_LOCAL_API_URL}/auth/token`)
    /// - `COGNEE_CREDENTIALS_PATH` (default: `./data/credentials.json`)
    /// - `HEALTH_MAX_ATTEMPTS` (default: `5`)
    /// - `HEALTH_RETRY_DELAY_MS` (default: `1000`)
    /// - `HEALTH_ATTEMPT_TIMEOUT_MS` (default: `5000`)
    /// - `LOG_LEVEL` (default: `info`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a numeric or boolean variable cannot be
    /// parsed, or if any value fails validation (see [`validate_config`]).
    #[must_use = "configuration should be used"]
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let local_base_url =
            std::env::var("COGNEE_LOCAL_API_URL").unwrap_or_else(|_| DEFAULT_LOCAL_BASE_URL.into());
        let cloud_base_url =
            std::env::var("COGNEE_CLOUD_API_URL").unwrap_or_else(|_| DEFAULT_CLOUD_BASE_URL.into());
        let mcp_base_url =
            std::env::var("COGNEE_MCP_API_URL").unwrap_or_else(|_| DEFAULT_MCP_BASE_URL.into());

        let preconfigured_api_key = std::env::var("COGNEE_API_KEY")
            .ok()
            .map(SecretString::new);

        let reauthentication_enabled = parse_env_bool("COGNEE_REAUTH_ENABLED", false)?;

        let health_max_attempts = parse_env_u32("HEALTH_MAX_ATTEMPTS", DEFAULT_HEALTH_MAX_ATTEMPTS)?;
        let health_retry_delay_ms =
            parse_env_u64("HEALTH_RETRY_DELAY_MS", DEFAULT_HEALTH_RETRY_DELAY_MS)?;
        let health_attempt_timeout_ms =
            parse_env_u64("HEALTH_ATTEMPT_TIMEOUT_MS", DEFAULT_HEALTH_ATTEMPT_TIMEOUT_MS)?;

        let credentials_path = std::env::var("COGNEE_CREDENTIALS_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_CREDENTIALS_PATH), PathBuf::from);

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into());

        let mut config = Self {
            preconfigured_api_key,
            reauthentication_enabled,
            credentials_path,
            health_max_attempts,
            health_retry_delay_ms,
            health_attempt_timeout_ms,
            log_level,
            ..Self::default()
        }
        .with_cloud_base_url(cloud_base_url)
        .with_mcp_base_url(mcp_base_url)
        .with_local_base_url(local_base_url);

        if let Ok(url) = std::env::var("COGNEE_AUTH_TOKEN_URL") {
            config.auth_token_url = url;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Set the local base URL.
    ///
    /// The auth token URL follows the local base URL.
    #[must_use]
    pub fn with_local_base_url(mut self, url: impl Into<String>) -> Self {
        self.local_base_url = normalize_base_url(url);
        self.auth_token_url = format!("{}/auth/token", self.local_base_url);
        self
    }

    /// Set the cloud base URL.
    #[must_use]
    pub fn with_cloud_base_url(mut self, url: impl Into<String>) -> Self {
        self.cloud_base_url = normalize_base_url(url);
        self
    }

    /// Set the MCP base URL.
    #[must_use]
    pub fn with_mcp_base_url(mut self, url: impl Into<String>) -> Self {
        self.mcp_base_url = normalize_base_url(url);
        self
    }

    /// Set the preconfigured API key.
    #[must_use]
    pub fn with_preconfigured_api_key(mut self, key: SecretString) -> Self {
        self.preconfigured_api_key = Some(key);
        self
    }

    /// Enable or disable silent reauthentication.
    #[must_use]
    pub const fn with_reauthentication(mut self, enabled: bool) -> Self {
        self.reauthentication_enabled = enabled;
        self
    }

    /// Set the auth token URL.
    #[must_use]
    pub fn with_auth_token_url(mut self, url: impl Into<String>) -> Self {
        self.auth_token_url = url.into();
        self
    }

    /// Set the bounded health probe policy.
    #[must_use]
    pub const fn with_health_policy(mut self, max_attempts: u32, retry_delay_ms: u64) -> Self {
        self.health_max_attempts = max_attempts;
        self.health_retry_delay_ms = retry_delay_ms;
        self
    }

    /// Set the time limit of a single liveness attempt.
    #[must_use]
    pub const fn with_health_attempt_timeout(mut self, timeout_ms: u64) -> Self {
        self.health_attempt_timeout_ms = timeout_ms;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_base_url: DEFAULT_LOCAL_BASE_URL.to_string(),
            cloud_base_url: DEFAULT_CLOUD_BASE_URL.to_string(),
            mcp_base_url: DEFAULT_MCP_BASE_URL.to_string(),
            preconfigured_api_key: None,
            reauthentication_enabled: false,
            auth_token_url: format!("{DEFAULT_LOCAL_BASE_URL}/auth/token"),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            health_max_attempts: DEFAULT_HEALTH_MAX_ATTEMPTS,
            health_retry_delay_ms: DEFAULT_HEALTH_RETRY_DELAY_MS,
            health_attempt_timeout_ms: DEFAULT_HEALTH_ATTEMPT_TIMEOUT_MS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn normalize_base_url(url: impl Into<String>) -> String {
    url.into().trim().trim_end_matches('/').to_string()
}

/// Parse an environment variable as u64, using a default if not set.
fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as u32, using a default if not set.
fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as a boolean flag.
fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        match val.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                var: name.into(),
                reason: "must be true or false".into(),
            }),
        }
    })
}
