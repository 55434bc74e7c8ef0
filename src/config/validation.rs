//! Configuration validation.
//!
//! This module provides validation logic for configuration values,
//! ensuring they are within acceptable ranges.

use reqwest::Url;

use super::Config;
use crate::error::ConfigError;

/// Minimum number of liveness attempts.
pub const MIN_HEALTH_ATTEMPTS: u32 = 1;

/// Maximum number of liveness attempts.
pub const MAX_HEALTH_ATTEMPTS: u32 = 20;

/// Maximum delay between liveness attempts in milliseconds (1 minute).
pub const MAX_HEALTH_RETRY_DELAY_MS: u64 = 60_000;

/// Minimum time limit of a single liveness attempt in milliseconds.
pub const MIN_HEALTH_ATTEMPT_TIMEOUT_MS: u64 = 1;

/// Maximum time limit of a single liveness attempt in milliseconds (1 minute).
pub const MAX_HEALTH_ATTEMPT_TIMEOUT_MS: u64 = 60_000;

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if any value is out of range:
/// - every base URL and the auth token URL must be an absolute `http(s)` URL
/// - `COGNEE_API_KEY` must not be empty when set
/// - `HEALTH_MAX_ATTEMPTS` must be between 1 and 20
/// - `HEALTH_RETRY_DELAY_MS` must not exceed 60000
/// - `HEALTH_ATTEMPT_TIMEOUT_MS` must be between 1 and 60000
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_url("COGNEE_LOCAL_API_URL", &config.local_base_url)?;
    validate_url("COGNEE_CLOUD_API_URL", &config.cloud_base_url)?;
    validate_url("COGNEE_MCP_API_URL", &config.mcp_base_url)?;
    validate_url("COGNEE_AUTH_TOKEN_URL", &config.auth_token_url)?;

    if config
        .preconfigured_api_key
        .as_ref()
        .is_some_and(|key| key.expose().trim().is_empty())
    {
        return Err(ConfigError::InvalidValue {
            var: "COGNEE_API_KEY".into(),
            reason: "must not be empty when set".into(),
        });
    }

    if !(MIN_HEALTH_ATTEMPTS..=MAX_HEALTH_ATTEMPTS).contains(&config.health_max_attempts) {
        return Err(ConfigError::InvalidValue {
            var: "HEALTH_MAX_ATTEMPTS".into(),
            reason: format!("must be between {MIN_HEALTH_ATTEMPTS} and {MAX_HEALTH_ATTEMPTS}"),
        });
    }

    if config.health_retry_delay_ms > MAX_HEALTH_RETRY_DELAY_MS {
        return Err(ConfigError::InvalidValue {
            var: "HEALTH_RETRY_DELAY_MS".into(),
            reason: format!("must be at most {MAX_HEALTH_RETRY_DELAY_MS} ms"),
        });
    }

    if !(MIN_HEALTH_ATTEMPT_TIMEOUT_MS..=MAX_HEALTH_ATTEMPT_TIMEOUT_MS)
        .contains(&config.health_attempt_timeout_ms)
    {
        return Err(ConfigError::InvalidValue {
            var: "HEALTH_ATTEMPT_TIMEOUT_MS".into(),
            reason: format!(
                "must be between {MIN_HEALTH_ATTEMPT_TIMEOUT_MS} and {MAX_HEALTH_ATTEMPT_TIMEOUT_MS} ms"
            ),
        });
    }

    Ok(())
}

fn validate_url(var: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        var: var.into(),
        reason: format!("not a valid URL: {e}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            var: var.into(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::SecretString;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_local_url() {
        let config = Config::default().with_local_base_url("localhost");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var, .. } if var == "COGNEE_LOCAL_API_URL"));
    }

    #[test]
    fn test_unsupported_scheme() {
        let config = Config::default().with_cloud_base_url("ftp://cloud.example.com");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var, reason } if var == "COGNEE_CLOUD_API_URL" && reason.contains("ftp")
        ));
    }

    #[test]
    fn test_invalid_auth_token_url() {
        let config = Config::default().with_auth_token_url("/auth/token");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var, .. } if var == "COGNEE_AUTH_TOKEN_URL"));
    }

    #[test]
    fn test_blank_api_key() {
        let config = Config::default().with_preconfigured_api_key(SecretString::new("  "));
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var, .. } if var == "COGNEE_API_KEY"));
    }

    #[test]
    fn test_attempts_zero() {
        let config = Config::default().with_health_policy(0, 1_000);
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var, .. } if var == "HEALTH_MAX_ATTEMPTS"));
    }

    #[test]
    fn test_attempts_too_high() {
        let config = Config::default().with_health_policy(MAX_HEALTH_ATTEMPTS + 1, 1_000);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_delay_too_high() {
        let config = Config::default().with_health_policy(5, MAX_HEALTH_RETRY_DELAY_MS + 1);
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var, .. } if var == "HEALTH_RETRY_DELAY_MS"));
    }

    #[test]
    fn test_attempt_timeout_zero() {
        let config = Config::default().with_health_attempt_timeout(0);
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { var, .. } if var == "HEALTH_ATTEMPT_TIMEOUT_MS")
        );
    }

    #[test]
    fn test_attempt_timeout_too_high() {
        let config =
            Config::default().with_health_attempt_timeout(MAX_HEALTH_ATTEMPT_TIMEOUT_MS + 1);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_boundary_values() {
        let config = Config::default().with_health_policy(MIN_HEALTH_ATTEMPTS, 0);
        assert!(validate_config(&config).is_ok());

        let config =
            Config::default().with_health_policy(MAX_HEALTH_ATTEMPTS, MAX_HEALTH_RETRY_DELAY_MS);
        assert!(validate_config(&config).is_ok());
    }
}
