//! `reqwest`-backed [`Transport`].

#![allow(clippy::missing_errors_doc)]

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;

use super::types::{ApiResponse, RequestBody, TransportError, TransportRequest};
use crate::traits::Transport;

/// HTTP transport over a shared `reqwest::Client`.
///
/// No per-request timeout is configured; a call runs until the server
/// answers or the connection fails.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with a default `reqwest::Client`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport around an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<ApiResponse, TransportError> {
        let start = Instant::now();
        let url = request.url;

        let mut builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers);

        builder = match request.body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Text(text)) => builder.body(text),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            let elapsed_ms = start.elapsed().as_millis();
            tracing::debug!(url = %url, elapsed_ms, error = %e, "HTTP request failed");
            if e.is_connect() {
                TransportError::Unreachable {
                    message: e.to_string(),
                }
            } else {
                TransportError::Failed {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        tracing::debug!(
            url = %url,
            status,
            elapsed_ms = start.elapsed().as_millis(),
            "HTTP response received"
        );

        let body = response.text().await.map_err(|e| TransportError::Failed {
            message: format!("Failed to read response body: {e}"),
        })?;

        Ok(ApiResponse::new(status, body))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};
    use reqwest::Method;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new();
        let response = transport
            .send(TransportRequest::get(format!("{}/health", server.uri())))
            .await
            .unwrap();

        assert_eq!(response, ApiResponse::new(200, "ok"));
    }

    #[tokio::test]
    async fn test_send_json_body_with_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/datasets"))
            .and(header("x-trace", "t-1"))
            .and(body_json(json!({"name": "papers"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "ds-1"})))
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert("x-trace", HeaderValue::from_static("t-1"));
        let request = TransportRequest {
            method: Method::POST,
            url: format!("{}/api/v1/datasets", server.uri()),
            headers,
            body: Some(RequestBody::Json(json!({"name": "papers"}))),
        };

        let response = HttpTransport::new().send(request).await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.json::<serde_json::Value>().unwrap()["id"], "ds-1");
    }

    #[tokio::test]
    async fn test_send_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(body_string("raw notes"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let request = TransportRequest {
            method: Method::PUT,
            url: format!("{}/api/v1/notes", server.uri()),
            headers: HeaderMap::new(),
            body: Some(RequestBody::Text("raw notes".into())),
        };

        let response = HttpTransport::new().send(request).await.unwrap();
        assert_eq!(response.status, 204);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_not_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let response = HttpTransport::new()
            .send(TransportRequest::get(server.uri()))
            .await
            .unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.body, "boom");
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/health", listener.local_addr().unwrap());
        drop(listener);

        let err = HttpTransport::new()
            .send(TransportRequest::get(url))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Unreachable { .. }));
    }
}
