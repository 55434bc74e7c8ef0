//! Error types for the cognee client.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level application errors
//! - [`ClientError`]: Errors surfaced by API calls and health probes
//! - [`StorageError`]: Durable credential storage errors
//! - [`ConfigError`]: Configuration errors
//!
//! All errors implement `Send + Sync` for async compatibility.

use thiserror::Error;

/// Top-level application error.
///
/// Used by the binary to unify the error paths of configuration and
/// API calls. Storage failures never reach it; the credential store logs
/// them and keeps the in-memory value.
#[derive(Debug, Error)]
pub enum AppError {
    /// API client error.
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors returned by [`ApiClient`](crate::client::ApiClient) calls.
///
/// Only `CredentialMissing`, `Unreachable` and `Unstructured` are produced by
/// the client itself. `ServerRejected` carries the server's own status and
/// detail untouched so the caller can branch on them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A cloud call was attempted with neither an API key nor a session token.
    #[error("An API key is required to call the cloud deployment. Please set one first.")]
    CredentialMissing,

    /// The target host did not respond.
    #[error("Could not connect to {url}. Please make sure the cognee server is running.")]
    Unreachable {
        /// The URL that could not be reached.
        url: String,
    },

    /// The failure carried no structured error detail.
    #[error("No connection to the server: {message}")]
    Unstructured {
        /// Description of the underlying failure.
        message: String,
    },

    /// The server answered with a non-success status and a structured detail.
    #[error("Server rejected request with status {status}: {detail}")]
    ServerRejected {
        /// HTTP status code.
        status: u16,
        /// The `detail` payload returned by the server.
        detail: serde_json::Value,
    },

    /// Every bounded liveness attempt failed.
    #[error("Health check against {url} failed after {attempts} attempts: {last_error}")]
    HealthCheckExhausted {
        /// The liveness URL that was probed.
        url: String,
        /// Number of attempts made.
        attempts: u32,
        /// Description of the final failure.
        last_error: String,
    },

    /// A caller-supplied or credential-derived header could not be encoded.
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Why the header was rejected.
        reason: String,
    },

    /// A response body could not be decoded.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of the decoding failure.
        message: String,
    },
}

impl ClientError {
    /// Returns true if this is a server-side authorization rejection.
    ///
    /// Callers typically re-prompt for credentials when this is set.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::ServerRejected { status: 401, .. })
    }

    /// Returns the HTTP status for server rejections.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ServerRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Durable storage errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Reading the backing store failed.
    #[error("Failed to read {path}: {message}")]
    ReadFailed {
        /// Location of the store.
        path: String,
        /// Description of the failure.
        message: String,
    },

    /// Writing the backing store failed.
    #[error("Failed to write {path}: {message}")]
    WriteFailed {
        /// Location of the store.
        path: String,
        /// Description of the failure.
        message: String,
    },

    /// The backing store exists but is not valid.
    #[error("Corrupt store {path}: {message}")]
    Corrupt {
        /// Location of the store.
        path: String,
        /// Description of the problem.
        message: String,
    },
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}
