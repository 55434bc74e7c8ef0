//! Credential state and its durable persistence.
//!
//! [`CredentialStore`] is the only shared mutable state of a client. The API
//! key is persisted through an injected [`DurableStorage`](crate::traits::DurableStorage);
//! the session token never leaves memory.

mod storage;
mod store;

pub use storage::{FileStorage, MemoryStorage, NoopStorage};
pub use store::{Credential, CredentialSource, CredentialStore, API_KEY_ENTRY};
