//! Dual-mode API client.
//!
//! This module provides:
//! - [`ApiClient`]: the logical call surface used by application code
//! - Request dispatch with per-mode URL rewriting and auth headers
//! - One-shot silent reauthentication on `401`
//! - Bounded-retry liveness probes
//!
//! # Architecture
//!
//! ```text
//! call(path, options, mode)
//!   │
//!   ├─▶ CredentialStore::get ─▶ RequestDispatcher::prepare ─▶ Transport::send
//!   │                                                            │
//!   │            401 + reauth configured + budget left ◀─────────┤
//!   │            RetryCoordinator::recover ─▶ replay once        │
//!   │                                                            ▼
//!   └──────────────────────────────────────────────── classify ─▶ Result
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use cognee_client::client::{ApiClient, HttpTransport, RequestOptions};
//! use cognee_client::config::Config;
//! use cognee_client::credentials::MemoryStorage;
//! use cognee_client::environment::Mode;
//! use cognee_client::error::ClientError;
//!
//! let client = ApiClient::new(Config::default(), Arc::new(HttpTransport::new()));
//! client.attach_storage(Arc::new(MemoryStorage::new()));
//!
//! // Cloud calls without a key fail before any network I/O.
//! let result = tokio::runtime::Runtime::new()
//!     .unwrap()
//!     .block_on(client.call("/v1/datasets", RequestOptions::get(), Mode::Cloud));
//! assert_eq!(result.unwrap_err(), ClientError::CredentialMissing);
//!
//! client.set_credential("abc123");
//! assert_eq!(client.credential().unwrap().expose(), "abc123");
//! ```

mod dispatcher;
mod health;
mod reauth;
mod retry;
mod transport;
mod types;

pub use dispatcher::{classify, RequestDispatcher, API_KEY_HEADER};
pub use health::HealthProbe;
pub use reauth::HttpReauthenticator;
pub use retry::{RetryBudget, RetryCoordinator, RetryState, UNAUTHORIZED};
pub use transport::HttpTransport;
pub use types::{ApiResponse, RequestBody, RequestOptions, TransportError, TransportRequest};

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::config::{Config, SecretString};
use crate::credentials::{Credential, CredentialStore};
use crate::environment::{EnvironmentResolver, Mode, HEALTH_PATH};
use crate::error::ClientError;
use crate::traits::{DurableStorage, Reauthenticator, Transport};

/// Client for the self-hosted and the cloud cognee deployments.
///
/// Each client owns its credential state; retry state lives in each call.
#[derive(Debug)]
pub struct ApiClient {
    credentials: CredentialStore,
    dispatcher: RequestDispatcher,
    retry: RetryCoordinator,
    health: HealthProbe,
    mcp_base_url: String,
}

impl ApiClient {
    /// Create a client (phase one of credential initialization).
    ///
    /// When `reauthentication_enabled` is set, an [`HttpReauthenticator`]
    /// for `auth_token_url` is installed over the same transport.
    #[must_use]
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        let retry = if config.reauthentication_enabled {
            RetryCoordinator::new(Arc::new(HttpReauthenticator::new(
                Arc::clone(&transport),
                &config.auth_token_url,
            )))
        } else {
            RetryCoordinator::disabled()
        };
        Self::with_retry(config, transport, retry)
    }

    /// Create a client with a custom reauthentication mechanism.
    ///
    /// The mechanism is only used when `reauthentication_enabled` is set.
    #[must_use]
    pub fn with_reauthenticator(
        config: Config,
        transport: Arc<dyn Transport>,
        reauthenticator: Arc<dyn Reauthenticator>,
    ) -> Self {
        let retry = if config.reauthentication_enabled {
            RetryCoordinator::new(reauthenticator)
        } else {
            RetryCoordinator::disabled()
        };
        Self::with_retry(config, transport, retry)
    }

    fn with_retry(config: Config, transport: Arc<dyn Transport>, retry: RetryCoordinator) -> Self {
        let resolver = EnvironmentResolver::from_config(&config);
        let health = HealthProbe::from_config(Arc::clone(&transport), &config);

        Self {
            credentials: CredentialStore::new(config.preconfigured_api_key),
            dispatcher: RequestDispatcher::new(transport, resolver),
            retry,
            health,
            mcp_base_url: config.mcp_base_url,
        }
    }

    /// Attach durable storage (phase two of credential initialization).
    ///
    /// Call once the execution context provides a durable store. Returns
    /// `true` if a persisted key was recovered.
    pub fn attach_storage(&self, storage: Arc<dyn DurableStorage>) -> bool {
        self.credentials.hydrate(storage)
    }

    /// Issue a logical call.
    ///
    /// # Errors
    ///
    /// - [`ClientError::CredentialMissing`] for a cloud call without credentials
    /// - [`ClientError::Unreachable`] if the backend did not respond
    /// - [`ClientError::Unstructured`] for failures without server detail
    /// - [`ClientError::ServerRejected`] with the server's status and detail
    pub async fn call(
        &self,
        logical_path: &str,
        options: RequestOptions,
        mode: Mode,
    ) -> Result<ApiResponse, ClientError> {
        let span = tracing::info_span!(
            "api_call",
            call_id = %Uuid::new_v4(),
            mode = %mode,
            path = %logical_path
        );

        async {
            let mut budget = RetryBudget::new();
            let result = self
                .call_with_budget(logical_path, &options, mode, &mut budget)
                .await;
            budget.reset();
            result
        }
        .instrument(span)
        .await
    }

    async fn call_with_budget(
        &self,
        logical_path: &str,
        options: &RequestOptions,
        mode: Mode,
        budget: &mut RetryBudget,
    ) -> Result<ApiResponse, ClientError> {
        loop {
            let credential = self.credentials.get();
            let request = self
                .dispatcher
                .prepare(logical_path, options, mode, &credential)?;
            let url = request.url.clone();
            let outcome = self.dispatcher.send(request).await;

            let unauthorized = matches!(&outcome, Ok(response) if response.status == UNAUTHORIZED);
            if budget.state() == RetryState::Retrying {
                budget.complete(!unauthorized);
            }

            if unauthorized && self.retry.recover(budget, &self.credentials).await {
                continue;
            }

            return classify(&url, outcome);
        }
    }

    /// Store an API key and persist it when storage is attached.
    pub fn set_credential(&self, api_key: impl Into<String>) {
        self.credentials.set(api_key);
    }

    /// Current API key.
    #[must_use]
    pub fn credential(&self) -> Option<SecretString> {
        self.credentials.api_key()
    }

    /// Full credential snapshot.
    #[must_use]
    pub fn credential_snapshot(&self) -> Credential {
        self.credentials.get()
    }

    /// Whether the API key came from build/environment configuration.
    #[must_use]
    pub fn is_credential_from_preconfigured_source(&self) -> bool {
        self.credentials.is_from_preconfigured_source()
    }

    /// Install a session token obtained elsewhere. Not persisted.
    pub fn set_access_token(&self, token: impl Into<String>) {
        self.credentials.set_access_token(SecretString::new(token));
    }

    /// Probe the self-hosted backend with bounded retries.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::HealthCheckExhausted`] if every attempt fails.
    pub async fn check_local_health(&self) -> Result<ApiResponse, ClientError> {
        let url = self.dispatcher.resolver().liveness_url(Mode::Local);
        self.health.probe(&url).await
    }

    /// Probe the cloud backend once, through the authenticated call path.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::call`] in cloud mode.
    pub async fn check_cloud_health(&self) -> Result<ApiResponse, ClientError> {
        self.call(HEALTH_PATH, RequestOptions::get(), Mode::Cloud)
            .await
    }

    /// Probe the MCP server with bounded retries.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::HealthCheckExhausted`] if every attempt fails.
    pub async fn check_mcp_health(&self) -> Result<ApiResponse, ClientError> {
        let url = format!("{}{HEALTH_PATH}", self.mcp_base_url);
        self.health.probe(&url).await
    }

    /// URL resolver in use.
    #[must_use]
    pub const fn resolver(&self) -> &EnvironmentResolver {
        self.dispatcher.resolver()
    }

    /// Whether a `401` triggers a silent refresh.
    #[must_use]
    pub const fn is_reauthentication_enabled(&self) -> bool {
        self.retry.is_enabled()
    }
}
