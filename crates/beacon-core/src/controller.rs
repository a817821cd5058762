//! Lifecycle Controller - per-key imperative transitions and the guarded
//! `run` protocol.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::domain::{LifecycleState, OpKey};
use crate::registry::StateRegistry;
use crate::scope::DisposalToken;

/// Disposable capability bound to one key and one registry.
///
/// Carries no state beyond the key binding; recreate freely. All writes go
/// through the scope's disposal token, so a torn-down scope never sees
/// late transitions.
#[derive(Clone)]
pub struct Controller {
    key: OpKey,
    registry: Arc<StateRegistry>,
    token: DisposalToken,
}

impl Controller {
    pub(crate) fn new(key: OpKey, registry: Arc<StateRegistry>, token: DisposalToken) -> Self {
        Self {
            key,
            registry,
            token,
        }
    }

    pub fn key(&self) -> &OpKey {
        &self.key
    }

    fn write(&self, state: LifecycleState) {
        if !self.token.is_active() {
            // StaleWriteIgnored: documented silent behavior, not an error.
            debug!(key = %self.key, state = %state, "stale write ignored after teardown");
            return;
        }
        self.registry.set(&self.key, state);
    }

    /// Mark the operation in flight. Idempotent: beginning while already
    /// loading is an observable no-op.
    pub fn begin(&self) {
        self.write(LifecycleState::Loading);
    }

    /// Mark the operation completed without error.
    pub fn settle(&self) {
        self.write(LifecycleState::Settled);
    }

    /// Mark the operation failed.
    pub fn fail(&self) {
        self.write(LifecycleState::Error);
    }

    /// Run `task` with automatic transition bracketing.
    ///
    /// `begin()` executes HERE, in the function body, before the returned
    /// future is even constructed. Futures are lazy, so an `async fn` would
    /// defer the write until first poll and break the contract that
    /// `get(key)` reads `Loading` immediately after the call.
    ///
    /// If `delay` is positive, the future sleeps that long before starting
    /// `task` (lets a UI show the loading state for a minimum perceivable
    /// time, or stagger kickoff).
    ///
    /// The task's outcome passes through unchanged: `Ok` settles, `Err`
    /// fails, neither is wrapped, swallowed, or retried. After scope
    /// teardown the settle/fail write is skipped but the outcome is still
    /// returned.
    // `use<..>` keeps the future free of the `&self` borrow so callers can
    // spawn it or hold it across the controller's lifetime.
    pub fn run<F, Fut, T, E>(
        &self,
        task: F,
        delay: Option<Duration>,
    ) -> impl Future<Output = Result<T, E>> + use<F, Fut, T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.begin();

        let key = self.key.clone();
        let registry = Arc::clone(&self.registry);
        let token = self.token.clone();

        async move {
            if let Some(delay) = delay
                && !delay.is_zero()
            {
                tokio::time::sleep(delay).await;
            }

            let outcome = task().await;

            if token.is_active() {
                let state = match &outcome {
                    Ok(_) => LifecycleState::Settled,
                    Err(_) => LifecycleState::Error,
                };
                registry.set(&key, state);
            } else {
                debug!(key = %key, "stale write ignored after teardown");
            }

            outcome
        }
    }
}
