//! Loader View-Model - per-key read-only projection of the registry.

use std::sync::Arc;

use serde::Serialize;

use crate::controller::Controller;
use crate::domain::{LifecycleState, OpKey};
use crate::registry::{StateRegistry, Subscription};

/// Snapshot of one key's state with its derived predicates.
///
/// Pure projection: recomputed from the registry on every observation,
/// never cached. Exactly one predicate is true for any state, unset
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoaderView {
    pub key: OpKey,
    pub state: Option<LifecycleState>,
}

impl LoaderView {
    pub fn project(key: OpKey, state: Option<LifecycleState>) -> Self {
        Self { key, state }
    }

    /// Key never touched; distinct from every explicit state.
    pub fn is_unset(&self) -> bool {
        self.state.is_none()
    }

    pub fn is_loading(&self) -> bool {
        self.state == Some(LifecycleState::Loading)
    }

    pub fn is_settled(&self) -> bool {
        self.state == Some(LifecycleState::Settled)
    }

    pub fn is_error(&self) -> bool {
        self.state == Some(LifecycleState::Error)
    }
}

/// Per-key read handle over a scope's registry.
#[derive(Clone)]
pub struct Loader {
    key: OpKey,
    registry: Arc<StateRegistry>,
}

impl Loader {
    pub(crate) fn new(key: OpKey, registry: Arc<StateRegistry>) -> Self {
        Self { key, registry }
    }

    pub fn key(&self) -> &OpKey {
        &self.key
    }

    pub fn state(&self) -> Option<LifecycleState> {
        self.registry.get(&self.key)
    }

    /// Fresh projection of the current state.
    pub fn view(&self) -> LoaderView {
        LoaderView::project(self.key.clone(), self.state())
    }

    /// Forward a registry subscription filtered to this loader's key.
    pub fn subscribe(
        &self,
        callback: impl Fn(Option<LifecycleState>) + Send + Sync + 'static,
    ) -> Subscription {
        self.registry.subscribe(&self.key, callback)
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.registry.unsubscribe(subscription);
    }
}

/// The `{ loader, controller }` pair a consumer works with.
pub struct Handle {
    pub loader: Loader,
    pub controller: Controller,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;
    use rstest::rstest;

    #[rstest]
    #[case(None, [true, false, false, false])]
    #[case(Some(LifecycleState::Loading), [false, true, false, false])]
    #[case(Some(LifecycleState::Settled), [false, false, true, false])]
    #[case(Some(LifecycleState::Error), [false, false, false, true])]
    fn exactly_one_predicate_is_true(
        #[case] state: Option<LifecycleState>,
        #[case] expected: [bool; 4],
    ) {
        let key = OpKey::derive("job", None).unwrap();
        let view = LoaderView::project(key, state);

        let predicates = [
            view.is_unset(),
            view.is_loading(),
            view.is_settled(),
            view.is_error(),
        ];
        assert_eq!(predicates, expected);
        assert_eq!(predicates.iter().filter(|p| **p).count(), 1);
    }

    #[test]
    fn view_is_recomputed_on_every_observation() {
        let scope = Scope::new();
        let handle = scope.handle("job", None).unwrap();

        assert!(handle.loader.view().is_unset());

        handle.controller.begin();
        assert!(handle.loader.view().is_loading());

        handle.controller.settle();
        assert!(handle.loader.view().is_settled());
    }

    #[test]
    fn loader_subscription_sees_its_key_only() {
        let scope = Scope::new();
        let loader = scope.loader("watched", None).unwrap();

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_by_cb = Arc::clone(&seen);
        loader.subscribe(move |state| seen_by_cb.lock().unwrap().push(state));

        scope.controller("other", None).unwrap().begin();
        scope.controller("watched", None).unwrap().settle();

        assert_eq!(*seen.lock().unwrap(), vec![Some(LifecycleState::Settled)]);
    }

    #[test]
    fn views_serialize_for_status_dumps() {
        let key = OpKey::derive("job", None).unwrap();
        let view = LoaderView::project(key, Some(LifecycleState::Loading));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["key"], "job");
        assert_eq!(json["state"], "loading");
    }
}
