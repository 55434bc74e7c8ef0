//! Trait definitions for injected capabilities.
//!
//! This module defines traits for:
//! - [`Transport`]: the network call underneath every request
//! - [`DurableStorage`]: the client-side store that persists the API key
//! - [`Reauthenticator`]: the silent session-token refresh
//!
//! # Mocking
//!
//! All traits are annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates mock implementations automatically for testing.
//!
//! # Example
//!
//! ```
//! use cognee_client::credentials::MemoryStorage;
//! use cognee_client::traits::DurableStorage;
//!
//! let storage = MemoryStorage::new();
//! storage.store("cognee.apiKey", "abc123").unwrap();
//! assert_eq!(storage.load("cognee.apiKey").unwrap().as_deref(), Some("abc123"));
//! ```

use async_trait::async_trait;

use crate::client::{ApiResponse, TransportError, TransportRequest};
use crate::config::SecretString;
use crate::error::{ClientError, StorageError};

/// Network transport trait.
///
/// Implementations execute exactly one request and report connect-level
/// failures separately from other failures. A non-success HTTP status is a
/// successful transport call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a single request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if no response was received.
    async fn send(&self, request: TransportRequest) -> Result<ApiResponse, TransportError>;
}

/// Durable key/value storage for credentials.
///
/// A context without persistent storage uses a no-op implementation;
/// callers never need to know why storage is absent.
#[cfg_attr(test, mockall::automock)]
pub trait DurableStorage: Send + Sync {
    /// Read a named entry.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be read.
    fn load(&self, entry: &str) -> Result<Option<String>, StorageError>;

    /// Write a named entry.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be written.
    fn store(&self, entry: &str, value: &str) -> Result<(), StorageError>;

    /// Whether values written here survive a restart.
    fn is_persistent(&self) -> bool {
        true
    }
}

/// Session-token refresh mechanism.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Reauthenticator: Send + Sync {
    /// Acquire a fresh session token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if no token could be obtained.
    async fn reauthenticate(&self) -> Result<SecretString, ClientError>;
}
