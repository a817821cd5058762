//! State Registry - key → lifecycle state の共有マッピング
//!
//! # 設計
//! - 書き込みはマージ: あるキーの更新が他のキーのエントリを消すことはない
//! - unset は「エントリ不在」であり、保存される値ではない
//! - `set` は return 前に、そのキーの購読者全員へ同期通知する
//!
//! Mutation and notification are synchronous (no `.await` inside
//! `get`/`set`/`subscribe`); the mutex exists only so one scope can be
//! shared across tokio tasks, the same way the in-memory stores in this
//! workspace share their state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{LifecycleState, OpKey};
use crate::observability::StateCounts;

type SubscriberFn = Arc<dyn Fn(Option<LifecycleState>) + Send + Sync>;

/// Handle returned by [`StateRegistry::subscribe`]; pass back to
/// [`StateRegistry::unsubscribe`] to stop notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    key: OpKey,
    id: u64,
}

impl Subscription {
    pub fn key(&self) -> &OpKey {
        &self.key
    }
}

/// One stored entry. `updated_at` is observability metadata (status dumps);
/// it never participates in state logic.
#[derive(Debug, Clone)]
struct Entry {
    state: LifecycleState,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct RegistryInner {
    entries: HashMap<OpKey, Entry>,
    subscribers: HashMap<OpKey, Vec<(u64, SubscriberFn)>>,
    next_subscription_id: u64,
}

/// Shared mapping from [`OpKey`] to [`LifecycleState`], owned by one
/// coordination scope.
///
/// Readers get `None` for keys never written (the unset state). Writers
/// merge one key at a time; concurrent writers to disjoint keys never lose
/// each other's entries.
#[derive(Default)]
pub struct StateRegistry {
    inner: Mutex<RegistryInner>,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `key`, or `None` if the key was never written.
    pub fn get(&self, key: &OpKey) -> Option<LifecycleState> {
        let inner = self.inner.lock().expect("registry mutex poisoned");
        inner.entries.get(key).map(|entry| entry.state)
    }

    /// When `key` last transitioned, or `None` if it never did.
    pub fn updated_at(&self, key: &OpKey) -> Option<DateTime<Utc>> {
        let inner = self.inner.lock().expect("registry mutex poisoned");
        inner.entries.get(key).map(|entry| entry.updated_at)
    }

    /// Merge-write one key's state and synchronously notify its subscribers
    /// before returning.
    ///
    /// Callbacks run outside the map lock (we snapshot the subscriber list
    /// first), so a callback may re-enter `get` without deadlocking.
    pub fn set(&self, key: &OpKey, state: LifecycleState) {
        let to_notify: Vec<SubscriberFn> = {
            let mut inner = self.inner.lock().expect("registry mutex poisoned");
            inner.entries.insert(
                key.clone(),
                Entry {
                    state,
                    updated_at: Utc::now(),
                },
            );
            inner
                .subscribers
                .get(key)
                .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default()
        };

        debug!(key = %key, state = %state, "state transition");

        for callback in to_notify {
            callback(Some(state));
        }
    }

    /// Register `callback` to fire on every future transition of `key`.
    ///
    /// The callback never fires for other keys; per-key notifications arrive
    /// in `set`-call order.
    pub fn subscribe(
        &self,
        key: &OpKey,
        callback: impl Fn(Option<LifecycleState>) + Send + Sync + 'static,
    ) -> Subscription {
        let mut inner = self.inner.lock().expect("registry mutex poisoned");
        let id = inner.next_subscription_id;
        inner.next_subscription_id += 1;
        inner
            .subscribers
            .entry(key.clone())
            .or_default()
            .push((id, Arc::new(callback)));
        Subscription {
            key: key.clone(),
            id,
        }
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        let mut inner = self.inner.lock().expect("registry mutex poisoned");
        if let Some(subs) = inner.subscribers.get_mut(&subscription.key) {
            subs.retain(|(id, _)| *id != subscription.id);
        }
    }

    /// Number of keys with a recorded state (unset keys are not counted).
    pub fn len(&self) -> usize {
        let inner = self.inner.lock().expect("registry mutex poisoned");
        inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts by state for status views.
    pub fn counts(&self) -> StateCounts {
        let inner = self.inner.lock().expect("registry mutex poisoned");
        let mut counts = StateCounts::default();
        for entry in inner.entries.values() {
            match entry.state {
                LifecycleState::Loading => counts.loading += 1,
                LifecycleState::Settled => counts.settled += 1,
                LifecycleState::Error => counts.error += 1,
            }
        }
        counts
    }
}
