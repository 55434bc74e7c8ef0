//! Session-token refresh over HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::dispatcher::classify;
use super::types::TransportRequest;
use crate::config::SecretString;
use crate::error::ClientError;
use crate::traits::{Reauthenticator, Transport};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Fetches a session token from `GET {token_url}`.
///
/// The endpoint answers `{"access_token": "..."}`.
#[derive(Clone)]
pub struct HttpReauthenticator {
    transport: Arc<dyn Transport>,
    token_url: String,
}

impl HttpReauthenticator {
    /// Create a reauthenticator for `token_url`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, token_url: impl Into<String>) -> Self {
        Self {
            transport,
            token_url: token_url.into(),
        }
    }

    /// Token endpoint.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

#[async_trait]
impl Reauthenticator for HttpReauthenticator {
    async fn reauthenticate(&self) -> Result<SecretString, ClientError> {
        tracing::debug!(url = %self.token_url, "Requesting session token");

        let outcome = self
            .transport
            .send(TransportRequest::get(&self.token_url))
            .await;
        let response = classify(&self.token_url, outcome)?;
        let token: TokenResponse = response.json()?;

        SecretString::non_blank(token.access_token).ok_or_else(|| ClientError::InvalidResponse {
            message: "empty access_token".into(),
        })
    }
}

impl std::fmt::Debug for HttpReauthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpReauthenticator")
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}
