//! One-shot reauthentication on authentication failure.
//!
//! Each top-level call owns a fresh [`RetryBudget`]; nothing here is shared
//! between calls, so concurrent calls cannot consume each other's retry.
//!
//! ```text
//! Idle ──begin──▶ Retrying ──replay ok──▶ Idle
//!                     │
//!                     └──reauth/replay failed──▶ Exhausted ──reset──▶ Idle
//! ```

use std::sync::Arc;

use crate::credentials::CredentialStore;
use crate::traits::Reauthenticator;

/// HTTP status that triggers reauthentication.
pub const UNAUTHORIZED: u16 = 401;

/// Retry state of a single call chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// No refresh attempted yet.
    Idle,
    /// A refresh has been made and the call is being replayed.
    Retrying,
    /// The single permitted refresh was spent without success.
    Exhausted,
}

/// Per-call retry bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBudget {
    state: RetryState,
    refreshes: u32,
}

impl RetryBudget {
    /// Fresh budget for a new top-level call.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: RetryState::Idle,
            refreshes: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> RetryState {
        self.state
    }

    /// Number of refreshes performed for this call.
    #[must_use]
    pub const fn refreshes(&self) -> u32 {
        self.refreshes
    }

    /// Claim the single refresh. Returns `false` once it has been used.
    pub fn begin(&mut self) -> bool {
        if self.state != RetryState::Idle || self.refreshes > 0 {
            return false;
        }
        self.state = RetryState::Retrying;
        self.refreshes += 1;
        true
    }

    /// Record the outcome of the replayed call.
    pub fn complete(&mut self, succeeded: bool) {
        if self.state == RetryState::Retrying {
            self.state = if succeeded {
                RetryState::Idle
            } else {
                RetryState::Exhausted
            };
        }
    }

    /// Return to `Idle` once the top-level call resolves.
    pub fn reset(&mut self) {
        if self.state != RetryState::Idle {
            tracing::trace!(state = ?self.state, "Resetting retry budget");
        }
        *self = Self::new();
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::new()
    }
}

/// Decides whether an authentication failure gets one silent refresh.
///
/// Inactive (never refreshes) when no [`Reauthenticator`] is configured.
#[derive(Clone, Default)]
pub struct RetryCoordinator {
    reauthenticator: Option<Arc<dyn Reauthenticator>>,
}

impl RetryCoordinator {
    /// Coordinator that never refreshes.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            reauthenticator: None,
        }
    }

    /// Coordinator backed by a reauthentication mechanism.
    #[must_use]
    pub fn new(reauthenticator: Arc<dyn Reauthenticator>) -> Self {
        Self {
            reauthenticator: Some(reauthenticator),
        }
    }

    /// Whether reauthentication is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.reauthenticator.is_some()
    }

    /// Handle an authentication failure.
    ///
    /// Returns `true` if a fresh session token was installed in `credentials`
    /// and the caller should replay the call once. Returns `false` when
    /// disabled, when the budget is already spent, or when the refresh fails.
    pub async fn recover(&self, budget: &mut RetryBudget, credentials: &CredentialStore) -> bool {
        let Some(reauthenticator) = self.reauthenticator.as_ref() else {
            return false;
        };

        if !budget.begin() {
            tracing::debug!(state = ?budget.state(), "Retry budget spent, surfacing failure");
            return false;
        }

        match reauthenticator.reauthenticate().await {
            Ok(token) => {
                tracing::info!("Session token refreshed, replaying request");
                credentials.set_access_token(token);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reauthentication failed");
                budget.complete(false);
                false
            }
        }
    }
}

impl std::fmt::Debug for RetryCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryCoordinator")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
