//! AsyncSlot - controller 経由の fetch と直近の結果の保持

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use crate::controller::Controller;

/// Pairs a [`Controller`] with storage for the last completion, so a
/// consumer can re-read `data`/`error` between observations without
/// re-running the operation.
///
/// Success stores `data`; failure stores `error`; neither clears the
/// other (stale data stays visible next to a fresh error, which is what a
/// UI showing "last good value + failure banner" wants).
pub struct AsyncSlot<T, E> {
    controller: Controller,
    data: Mutex<Option<T>>,
    error: Mutex<Option<E>>,
}

impl<T, E> AsyncSlot<T, E> {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            data: Mutex::new(None),
            error: Mutex::new(None),
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Run `task` through the controller (full transition bracketing,
    /// optional delay), retain a copy of its outcome, and pass the outcome
    /// through unchanged.
    pub async fn fetch<F, Fut>(&self, task: F, delay: Option<Duration>) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Clone,
        E: Clone,
    {
        match self.controller.run(task, delay).await {
            Ok(value) => {
                *self.data.lock().expect("slot mutex poisoned") = Some(value.clone());
                Ok(value)
            }
            Err(err) => {
                *self.error.lock().expect("slot mutex poisoned") = Some(err.clone());
                Err(err)
            }
        }
    }
}

impl<T: Clone, E> AsyncSlot<T, E> {
    /// Last successful value, if any.
    pub fn data(&self) -> Option<T> {
        self.data.lock().expect("slot mutex poisoned").clone()
    }
}

impl<T, E: Clone> AsyncSlot<T, E> {
    /// Last failure, if any.
    pub fn error(&self) -> Option<E> {
        self.error.lock().expect("slot mutex poisoned").clone()
    }
}
