//! Request and response types shared by the dispatcher, the transport and
//! the health probe.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::ClientError;

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// JSON document, sent with `content-type: application/json`.
    Json(serde_json::Value),
    /// Raw text, sent as-is.
    Text(String),
}

/// Caller-supplied options of a logical call.
///
/// Headers set here are merged on top of the computed auth header, so a
/// caller can override it by name.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method.
    pub method: Method,
    /// Extra headers.
    pub headers: HeaderMap,
    /// Optional body.
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    /// Create options for the given method with no headers and no body.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// `GET` with no body.
    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    /// `POST` with no body.
    #[must_use]
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    /// `PUT` with no body.
    #[must_use]
    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    /// `DELETE` with no body.
    #[must_use]
    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Add a header.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidHeader`] if the name or value is not a
    /// valid HTTP header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ClientError> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ClientError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attach a text body.
    #[must_use]
    pub fn with_text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// A fully resolved request handed to the [`Transport`](crate::traits::Transport).
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Physical URL.
    pub url: String,
    /// Final headers, auth included.
    pub headers: HeaderMap,
    /// Optional body.
    pub body: Option<RequestBody>,
}

impl TransportRequest {
    /// Unauthenticated `GET`, used by liveness probes.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Response returned to callers, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw body.
    pub body: String,
}

impl ApiResponse {
    /// Create a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Body as text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidResponse`] if the body is not valid JSON
    /// for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::InvalidResponse {
            message: format!("Failed to parse response: {e}"),
        })
    }

    /// The `detail` field of a JSON error body, if any.
    #[must_use]
    pub fn error_detail(&self) -> Option<serde_json::Value> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        match value {
            serde_json::Value::Object(mut map) => map.remove("detail"),
            _ => None,
        }
    }
}

/// Failures where no response was received.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The host did not accept the connection.
    #[error("connection failed: {message}")]
    Unreachable {
        /// Description from the HTTP stack.
        message: String,
    },

    /// Any other failure before a response arrived.
    #[error("request failed: {message}")]
    Failed {
        /// Description from the HTTP stack.
        message: String,
    },
}
