//! In-memory credential state with write-through persistence of the API key.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use super::storage::NoopStorage;
use crate::config::SecretString;
use crate::traits::DurableStorage;

/// Name of the durable entry holding the plain-text API key.
pub const API_KEY_ENTRY: &str = "cognee.apiKey";

/// Where the active API key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialSource {
    /// Build-time / environment configuration.
    Environment,
    /// Entered at runtime (now or in an earlier session).
    UserEntered,
    /// No key yet.
    Unset,
}

/// Snapshot of the client's credentials.
///
/// `api_key` authenticates cloud calls; `access_token` is a session token
/// used as a bearer credential. Only `api_key` is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Long-lived API key.
    pub api_key: Option<SecretString>,
    /// Short-lived session token, memory-only.
    pub access_token: Option<SecretString>,
    /// Origin of `api_key`.
    pub source: CredentialSource,
}

impl Credential {
    /// A credential with nothing set.
    #[must_use]
    pub const fn unset() -> Self {
        Self {
            api_key: None,
            access_token: None,
            source: CredentialSource::Unset,
        }
    }

    /// The API key, if non-empty.
    #[must_use]
    pub fn usable_api_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref().filter(|key| !key.is_empty())
    }

    /// The session token, if non-empty.
    #[must_use]
    pub fn usable_access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref().filter(|token| !token.is_empty())
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::unset()
    }
}

/// Shared credential state of one client.
///
/// Initialization is two-phase:
/// 1. [`CredentialStore::new`] takes the preconfigured key, if any.
/// 2. [`CredentialStore::hydrate`] attaches durable storage once the
///    execution context provides it and fills the key only if phase 1 (or an
///    explicit [`set`](CredentialStore::set)) left it unset.
///
/// Reads never touch storage and never wait on storage I/O. Writers that
/// persist the key are serialized so memory and storage end up holding the
/// same value.
pub struct CredentialStore {
    state: RwLock<Credential>,
    storage: RwLock<Arc<dyn DurableStorage>>,
    persist_lock: Mutex<()>,
}

impl CredentialStore {
    /// Phase one: seed from a preconfigured key. Blank keys count as absent.
    #[must_use]
    pub fn new(preconfigured_api_key: Option<SecretString>) -> Self {
        let api_key = preconfigured_api_key.and_then(|key| SecretString::non_blank(key.expose()));
        let source = if api_key.is_some() {
            CredentialSource::Environment
        } else {
            CredentialSource::Unset
        };

        Self {
            state: RwLock::new(Credential {
                api_key,
                access_token: None,
                source,
            }),
            storage: RwLock::new(Arc::new(NoopStorage)),
            persist_lock: Mutex::new(()),
        }
    }

    /// Phase two: attach durable storage and recover a persisted key.
    ///
    /// Returns `true` if the key was filled from storage. A key that is
    /// already present is never replaced. A key entered before storage was
    /// available is written through now.
    pub fn hydrate(&self, storage: Arc<dyn DurableStorage>) -> bool {
        let _persisting = self.persist_lock.lock();
        *self.storage.write() = Arc::clone(&storage);

        let current = self.get();
        if let Some(key) = current.api_key.as_ref() {
            if current.source == CredentialSource::UserEntered {
                persist(storage.as_ref(), key);
            }
            tracing::debug!(source = ?current.source, "Credential already set, skipping hydration");
            return false;
        }

        let stored = match storage.load(API_KEY_ENTRY) {
            Ok(value) => value.and_then(SecretString::non_blank),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted credential");
                None
            }
        };
        let Some(key) = stored else {
            return false;
        };

        let mut state = self.state.write();
        if state.api_key.is_some() {
            return false;
        }
        state.api_key = Some(key);
        state.source = CredentialSource::UserEntered;
        tracing::debug!("Credential hydrated from durable storage");
        true
    }

    /// Current credential. Never blocks on I/O.
    #[must_use]
    pub fn get(&self) -> Credential {
        self.state.read().clone()
    }

    /// Current API key.
    #[must_use]
    pub fn api_key(&self) -> Option<SecretString> {
        self.state.read().api_key.clone()
    }

    /// Replace the API key and write it through to durable storage.
    ///
    /// A failed write is logged; the in-memory key is updated regardless.
    pub fn set(&self, api_key: impl Into<String>) {
        let key = SecretString::new(api_key);
        let _persisting = self.persist_lock.lock();
        {
            let mut state = self.state.write();
            state.api_key = Some(key.clone());
            state.source = CredentialSource::UserEntered;
        }

        let storage = Arc::clone(&self.storage.read());
        if !storage.is_persistent() {
            tracing::debug!("No durable storage attached, credential kept in memory only");
        }
        persist(storage.as_ref(), &key);
    }

    /// Install a session token. Memory-only.
    pub fn set_access_token(&self, token: SecretString) {
        self.state.write().access_token = Some(token);
    }

    /// Current session token.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.state.read().access_token.clone()
    }

    /// Whether the active key came from build/environment configuration.
    #[must_use]
    pub fn is_from_preconfigured_source(&self) -> bool {
        self.state.read().source == CredentialSource::Environment
    }

    /// Whether the attached storage survives restarts.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.storage.read().is_persistent()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("state", &*self.state.read())
            .field("persistent", &self.is_persistent())
            .finish()
    }
}

fn persist(storage: &dyn DurableStorage, key: &SecretString) {
    if let Err(e) = storage.store(API_KEY_ENTRY, key.expose()) {
        tracing::warn!(error = %e, "Failed to persist credential, keeping it in memory only");
    }
}
