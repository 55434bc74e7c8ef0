//! Test utilities and fixtures.
//!
//! This module provides shared testing infrastructure:
//! - A scripted [`Transport`] that records every request it receives
//! - Configuration fixtures
//!
//! Only compiled for tests (`#[cfg(test)]`).

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::client::{ApiResponse, TransportError, TransportRequest};
use crate::config::Config;
use crate::traits::Transport;

/// Configuration with the given base URLs and a fast health policy.
///
/// # Example
///
/// ```ignore
/// let config = config_for("http://local", "https://cloud");
/// assert_eq!(config.local_base_url, "http://local");
/// ```
#[must_use]
pub fn config_for(local: &str, cloud: &str) -> Config {
    Config::default()
        .with_local_base_url(local)
        .with_cloud_base_url(cloud)
        .with_health_policy(3, 10)
}

/// Handle to the requests seen by a [`recording_transport`].
#[derive(Debug, Clone, Default)]
pub struct RecordedRequests {
    inner: Arc<Mutex<Vec<TransportRequest>>>,
}

impl RecordedRequests {
    /// Drain all recorded requests in arrival order.
    pub fn take(&self) -> Vec<TransportRequest> {
        std::mem::take(&mut *self.inner.lock())
    }

    /// Number of requests recorded so far.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    fn push(&self, request: TransportRequest) {
        self.inner.lock().push(request);
    }
}

struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    recorded: RecordedRequests,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<ApiResponse, TransportError> {
        let url = request.url.clone();
        self.recorded.push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request to {url}"))
    }
}

/// Transport that answers with `responses` in order and records requests.
///
/// Panics if more requests arrive than responses were scripted.
///
/// # Example
///
/// ```ignore
/// let (transport, recorded) = recording_transport(vec![Ok(ApiResponse::new(200, "{}"))]);
/// let client = ApiClient::new(config_for("http://local", "https://cloud"), transport);
/// client.call("/v1/test", RequestOptions::get(), Mode::Local).await.unwrap();
/// assert_eq!(recorded.len(), 1);
/// ```
#[must_use]
pub fn recording_transport(
    responses: Vec<Result<ApiResponse, TransportError>>,
) -> (Arc<dyn Transport>, RecordedRequests) {
    let recorded = RecordedRequests::default();
    let transport = ScriptedTransport {
        responses: Mutex::new(responses.into()),
        recorded: recorded.clone(),
    };
    (Arc::new(transport), recorded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_transport_replays_in_order() {
        let (transport, recorded) = recording_transport(vec![
            Ok(ApiResponse::new(503, "starting")),
            Err(TransportError::Unreachable {
                message: "refused".into(),
            }),
        ]);

        let first = transport.send(TransportRequest::get("http://a")).await;
        let second = transport.send(TransportRequest::get("http://b")).await;

        assert_eq!(first.unwrap().status, 503);
        assert!(second.is_err());
        let urls: Vec<String> = recorded.take().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["http://a", "http://b"]);
        assert_eq!(recorded.len(), 0);
    }

    #[test]
    fn test_config_for_sets_urls() {
        let config = config_for("http://local/", "https://cloud");
        assert_eq!(config.local_base_url, "http://local");
        assert_eq!(config.cloud_base_url, "https://cloud");
        assert_eq!(config.auth_token_url, "http://local/auth/token");
    }
}
