//! Bounded-retry liveness probe.

use std::sync::Arc;
use std::time::Duration;

use super::types::{ApiResponse, TransportRequest};
use crate::config::{
    Config, DEFAULT_HEALTH_ATTEMPT_TIMEOUT_MS, DEFAULT_HEALTH_MAX_ATTEMPTS,
    DEFAULT_HEALTH_RETRY_DELAY_MS,
};
use crate::error::ClientError;
use crate::traits::Transport;

/// Polls a liveness endpoint with a fixed attempt count and a fixed delay.
///
/// Attempts carry no auth headers. A transport failure, a non-success
/// status and an attempt that outlives `attempt_timeout` all count as a
/// failed attempt. Total wall-clock time is bounded by
/// `max_attempts × attempt_timeout + (max_attempts - 1) × delay`.
#[derive(Clone)]
pub struct HealthProbe {
    transport: Arc<dyn Transport>,
    max_attempts: u32,
    delay: Duration,
    attempt_timeout: Duration,
}

impl HealthProbe {
    /// Create a probe with the default attempt timeout. `max_attempts` is
    /// clamped to at least one.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, max_attempts: u32, delay: Duration) -> Self {
        Self {
            transport,
            max_attempts: max_attempts.max(1),
            delay,
            attempt_timeout: Duration::from_millis(DEFAULT_HEALTH_ATTEMPT_TIMEOUT_MS),
        }
    }

    /// Set the time limit of a single attempt.
    #[must_use]
    pub const fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    /// Create a probe with the configured policy.
    #[must_use]
    pub fn from_config(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self::new(
            transport,
            config.health_max_attempts,
            Duration::from_millis(config.health_retry_delay_ms),
        )
        .with_attempt_timeout(Duration::from_millis(config.health_attempt_timeout_ms))
    }

    /// Maximum number of attempts.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay between attempts.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Time limit of a single attempt.
    #[must_use]
    pub const fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Probe `url` until it answers with a success status.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::HealthCheckExhausted`] if the final attempt
    /// fails.
    pub async fn probe(&self, url: &str) -> Result<ApiResponse, ClientError> {
        let mut attempt = 1;
        loop {
            let attempt_result = tokio::time::timeout(
                self.attempt_timeout,
                self.transport.send(TransportRequest::get(url)),
            )
            .await;

            let last_error = match attempt_result {
                Ok(Ok(response)) if response.is_success() => {
                    tracing::debug!(url = %url, attempt, "Liveness check succeeded");
                    return Ok(response);
                }
                Ok(Ok(response)) => format!("status {}", response.status),
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!(
                    "no response within {} ms",
                    self.attempt_timeout.as_millis()
                ),
            };

            if attempt >= self.max_attempts {
                tracing::error!(
                    url = %url,
                    attempts = attempt,
                    error = %last_error,
                    "Backend is not responding after multiple attempts"
                );
                return Err(ClientError::HealthCheckExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    last_error,
                });
            }

            tracing::warn!(
                url = %url,
                attempt,
                max_attempts = self.max_attempts,
                delay_ms = self.delay.as_millis(),
                error = %last_error,
                "Liveness check failed, retrying"
            );
            tokio::time::sleep(self.delay).await;
            attempt += 1;
        }
    }
}

impl Default for HealthProbe {
    fn default() -> Self {
        Self::new(
            Arc::new(super::transport::HttpTransport::new()),
            DEFAULT_HEALTH_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_HEALTH_RETRY_DELAY_MS),
        )
    }
}

impl std::fmt::Debug for HealthProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthProbe")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish_non_exhaustive()
    }
}
