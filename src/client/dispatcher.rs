//! Single-attempt request dispatch.
//!
//! This module provides:
//! - Credential precondition checks
//! - Auth header assembly per [`Mode`]
//! - Merging of caller-supplied headers
//! - Classification of transport and server failures

#![allow(clippy::missing_errors_doc)]

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use super::types::{ApiResponse, RequestOptions, TransportError, TransportRequest};
use crate::credentials::Credential;
use crate::environment::{EnvironmentResolver, Mode};
use crate::error::ClientError;
use crate::traits::Transport;

/// Header carrying the API key on cloud calls without a session (`X-Api-Key`).
pub const API_KEY_HEADER: &str = "x-api-key";

/// Builds, sends and classifies one physical request.
///
/// The dispatcher only reads credentials; it never mutates them.
#[derive(Clone)]
pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    resolver: EnvironmentResolver,
}

impl RequestDispatcher {
    /// Create a dispatcher.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, resolver: EnvironmentResolver) -> Self {
        Self {
            transport,
            resolver,
        }
    }

    /// URL resolver used for every call.
    #[must_use]
    pub const fn resolver(&self) -> &EnvironmentResolver {
        &self.resolver
    }

    /// Resolve the URL and assemble headers.
    ///
    /// Fails with [`ClientError::CredentialMissing`] before any I/O when a
    /// cloud call has neither an API key nor a session token.
    pub fn prepare(
        &self,
        logical_path: &str,
        options: &RequestOptions,
        mode: Mode,
        credential: &Credential,
    ) -> Result<TransportRequest, ClientError> {
        let mut headers = auth_headers(mode, credential)?;

        for name in options.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in &options.headers {
            headers.append(name.clone(), value.clone());
        }

        let endpoint = self.resolver.resolve(mode, logical_path);

        Ok(TransportRequest {
            method: options.method.clone(),
            url: endpoint.url,
            headers,
            body: options.body.clone(),
        })
    }

    /// Send a prepared request without classifying the outcome.
    pub async fn send(&self, request: TransportRequest) -> Result<ApiResponse, TransportError> {
        tracing::debug!(method = %request.method, url = %request.url, "Dispatching request");
        self.transport.send(request).await
    }

    /// Prepare, send and classify a single attempt.
    pub async fn dispatch(
        &self,
        logical_path: &str,
        options: &RequestOptions,
        mode: Mode,
        credential: &Credential,
    ) -> Result<ApiResponse, ClientError> {
        let request = self.prepare(logical_path, options, mode, credential)?;
        let url = request.url.clone();
        let outcome = self.send(request).await;
        classify(&url, outcome)
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// Turn a raw outcome into the caller-facing result.
///
/// - unreachable host: [`ClientError::Unreachable`]
/// - error status with a JSON `detail`: [`ClientError::ServerRejected`], untouched
/// - anything else that failed: [`ClientError::Unstructured`]
pub fn classify(
    url: &str,
    outcome: Result<ApiResponse, TransportError>,
) -> Result<ApiResponse, ClientError> {
    match outcome {
        Ok(response) if response.is_success() => Ok(response),
        Ok(response) => {
            if let Some(detail) = response.error_detail() {
                tracing::debug!(url = %url, status = response.status, "Server rejected request");
                Err(ClientError::ServerRejected {
                    status: response.status,
                    detail,
                })
            } else {
                tracing::warn!(url = %url, status = response.status, "Error response without detail");
                Err(ClientError::Unstructured {
                    message: format!("server responded with status {}", response.status),
                })
            }
        }
        Err(TransportError::Unreachable { message }) => {
            tracing::warn!(url = %url, error = %message, "Server unreachable");
            Err(ClientError::Unreachable {
                url: url.to_string(),
            })
        }
        Err(TransportError::Failed { message }) => {
            tracing::warn!(url = %url, error = %message, "Request failed");
            Err(ClientError::Unstructured { message })
        }
    }
}

/// Auth headers for a mode.
///
/// A session token always wins. Without one, cloud calls send the API key
/// and local calls send no auth header at all.
fn auth_headers(mode: Mode, credential: &Credential) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();

    if let Some(token) = credential.usable_access_token() {
        let value = header_value(AUTHORIZATION.as_str(), &format!("Bearer {}", token.expose()))?;
        headers.insert(AUTHORIZATION, value);
        return Ok(headers);
    }

    match mode {
        Mode::Cloud => {
            let key = credential
                .usable_api_key()
                .ok_or(ClientError::CredentialMissing)?;
            headers.insert(API_KEY_HEADER, header_value(API_KEY_HEADER, key.expose())?);
        }
        Mode::Local => {}
    }

    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ClientError> {
    let mut value = HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::SecretString;
    use crate::credentials::CredentialSource;
    use crate::traits::MockTransport;
    use serde_json::json;

    const LOCAL: &str = "http://localhost:8000";
    const CLOUD: &str = "https://api.cognee.ai";

    fn dispatcher(transport: MockTransport) -> RequestDispatcher {
        RequestDispatcher::new(Arc::new(transport), EnvironmentResolver::new(LOCAL, CLOUD))
    }

    fn with_key(key: &str) -> Credential {
        Credential {
            api_key: Some(SecretString::new(key)),
            access_token: None,
            source: CredentialSource::UserEntered,
        }
    }

    fn with_token(token: &str) -> Credential {
        Credential {
            api_key: Some(SecretString::new("abc123")),
            access_token: Some(SecretString::new(token)),
            source: CredentialSource::UserEntered,
        }
    }

    #[test]
    fn test_cloud_without_credential_fails_before_io() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);

        let err = dispatcher(transport)
            .prepare("/v1/datasets", &RequestOptions::get(), Mode::Cloud, &Credential::unset())
            .unwrap_err();
        assert_eq!(err, ClientError::CredentialMissing);
    }

    #[tokio::test]
    async fn test_dispatch_cloud_without_credential_issues_no_request() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);

        let result = dispatcher(transport)
            .dispatch("/v1/datasets", &RequestOptions::get(), Mode::Cloud, &Credential::unset())
            .await;
        assert_eq!(result.unwrap_err(), ClientError::CredentialMissing);
    }

    #[test]
    fn test_cloud_with_empty_key_is_missing() {
        let err = dispatcher(MockTransport::new())
            .prepare("/v1/datasets", &RequestOptions::get(), Mode::Cloud, &with_key(""))
            .unwrap_err();
        assert_eq!(err, ClientError::CredentialMissing);
    }

    #[test]
    fn test_cloud_uses_api_key_header() {
        let request = dispatcher(MockTransport::new())
            .prepare("/v1/datasets", &RequestOptions::get(), Mode::Cloud, &with_key("abc123"))
            .unwrap();

        assert_eq!(request.url, "https://api.cognee.ai/api/datasets");
        assert_eq!(request.headers.get(API_KEY_HEADER).unwrap(), "abc123");
        assert!(request.headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_cloud_with_session_uses_bearer() {
        let request = dispatcher(MockTransport::new())
            .prepare("/v1/datasets", &RequestOptions::get(), Mode::Cloud, &with_token("tok"))
            .unwrap();

        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert!(request.headers.get(API_KEY_HEADER).is_none());
    }

    #[test]
    fn test_cloud_with_session_only_is_allowed() {
        let credential = Credential {
            api_key: None,
            access_token: Some(SecretString::new("tok")),
            source: CredentialSource::Unset,
        };
        let request = dispatcher(MockTransport::new())
            .prepare("/v1/datasets", &RequestOptions::get(), Mode::Cloud, &credential)
            .unwrap();
        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
    }

    #[test]
    fn test_local_without_token_omits_authorization() {
        let request = dispatcher(MockTransport::new())
            .prepare("/v1/test", &RequestOptions::get(), Mode::Local, &Credential::unset())
            .unwrap();

        assert_eq!(request.url, "http://localhost:8000/api/v1/test");
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_local_ignores_api_key() {
        let request = dispatcher(MockTransport::new())
            .prepare("/v1/test", &RequestOptions::get(), Mode::Local, &with_key("abc123"))
            .unwrap();
        assert!(request.headers.get(API_KEY_HEADER).is_none());
    }

    #[test]
    fn test_local_with_token_uses_bearer() {
        let request = dispatcher(MockTransport::new())
            .prepare("/v1/test", &RequestOptions::get(), Mode::Local, &with_token("tok"))
            .unwrap();
        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
    }

    #[test]
    fn test_caller_headers_are_merged_on_top() {
        let options = RequestOptions::post()
            .with_header("X-Api-Key", "override")
            .unwrap()
            .with_header("Content-Type", "text/plain")
            .unwrap()
            .with_text("hello");

        let request = dispatcher(MockTransport::new())
            .prepare("/v1/add", &options, Mode::Cloud, &with_key("abc123"))
            .unwrap();

        assert_eq!(request.headers.get_all(API_KEY_HEADER).iter().count(), 1);
        assert_eq!(request.headers.get(API_KEY_HEADER).unwrap(), "override");
        assert_eq!(request.headers.get("content-type").unwrap(), "text/plain");
        assert_eq!(request.method, reqwest::Method::POST);
        assert!(request.body.is_some());
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let err = dispatcher(MockTransport::new())
            .prepare("/v1/datasets", &RequestOptions::get(), Mode::Cloud, &with_key("bad\nkey"))
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidHeader { name, .. } if name == API_KEY_HEADER));
    }

    #[test]
    fn test_classify_success_passes_through() {
        let response = ApiResponse::new(200, "[]");
        assert_eq!(classify("u", Ok(response.clone())).unwrap(), response);
    }

    #[test]
    fn test_classify_server_rejected_keeps_detail() {
        let err = classify(
            "u",
            Ok(ApiResponse::new(409, r#"{"detail": "Dataset exists"}"#)),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ClientError::ServerRejected {
                status: 409,
                detail: json!("Dataset exists"),
            }
        );
    }

    #[test]
    fn test_classify_missing_detail_is_unstructured() {
        let err = classify("u", Ok(ApiResponse::new(502, "Bad Gateway"))).unwrap_err();
        match err {
            ClientError::Unstructured { message } => assert!(message.contains("502")),
            other => panic!("Wrong error type: {other:?}"),
        }
    }

    #[test]
    fn test_classify_unreachable() {
        let err = classify(
            "http://localhost:8000/api/v1/datasets",
            Err(TransportError::Unreachable {
                message: "connection refused".into(),
            }),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ClientError::Unreachable {
                url: "http://localhost:8000/api/v1/datasets".into()
            }
        );
    }

    #[test]
    fn test_classify_other_transport_failure() {
        let err = classify(
            "u",
            Err(TransportError::Failed {
                message: "connection reset".into(),
            }),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ClientError::Unstructured {
                message: "connection reset".into()
            }
        );
    }

    #[tokio::test]
    async fn test_dispatch_sends_prepared_request() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.url == "https://api.cognee.ai/api/datasets"
                    && request.headers.get(API_KEY_HEADER).is_some_and(|v| v == "abc123")
            })
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, r#"[{"id": "ds-1"}]"#)));

        let response = dispatcher(transport)
            .dispatch("/v1/datasets", &RequestOptions::get(), Mode::Cloud, &with_key("abc123"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }
}
