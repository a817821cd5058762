//! Consumption Binding - rendering 層が実装する契約
//!
//! # 状態機械
//! `UNSET → LOADING → {SETTLED, ERROR}`、以降の run/begin で
//! `SETTLED/ERROR → LOADING` に戻る循環機械（初期状態 UNSET）。
//!
//! # 責務
//! - 状態へ「入った」瞬間にコールバック発火
//!   （loading-started / loading-ended / error）
//! - 状態ごとのコンテンツ選択（per-consumer override → scope default →
//!   built-in fallback）
//! - 選択結果を [`TransitionFrame`] として外部のトランジション機構へ渡す

mod async_slot;
mod content;
mod transition;

pub use self::async_slot::AsyncSlot;
pub use self::content::Content;
pub use self::transition::{
    DEFAULT_TRANSITION_DURATION, DEFAULT_TRANSITION_NAME, NoopTransition, Transition,
    TransitionFrame,
};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::LifecycleState;
use crate::loader::{Loader, LoaderView};
use crate::registry::Subscription;
use crate::scope::ScopeOptions;

type Callback = Box<dyn Fn() + Send + Sync>;

/// Per-consumer overrides and state-entry callbacks.
///
/// Every `None` falls back to the scope default, then to the built-in
/// fallback.
#[derive(Default)]
pub struct ConsumerOptions {
    pub loading_content: Option<Content>,
    pub error_content: Option<Content>,
    pub transition_name: Option<String>,
    pub transition_duration: Option<Duration>,
    pub on_loading_start: Option<Callback>,
    pub on_loading_end: Option<Callback>,
    pub on_error: Option<Callback>,
    /// Whether unset shows the normal content (pre-mounted, the default) or
    /// the loading content instead.
    pub treat_unset_as_mounted: Option<bool>,
}

impl ConsumerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading_content(mut self, content: Content) -> Self {
        self.loading_content = Some(content);
        self
    }

    pub fn error_content(mut self, content: Content) -> Self {
        self.error_content = Some(content);
        self
    }

    pub fn transition_name(mut self, name: impl Into<String>) -> Self {
        self.transition_name = Some(name.into());
        self
    }

    pub fn transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration = Some(duration);
        self
    }

    pub fn on_loading_start(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_loading_start = Some(Box::new(callback));
        self
    }

    pub fn on_loading_end(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_loading_end = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn treat_unset_as_mounted(mut self, mounted: bool) -> Self {
        self.treat_unset_as_mounted = Some(mounted);
        self
    }
}

/// Binds one [`Loader`] to content, callbacks, and the scope defaults.
///
/// `observe()` is the whole contract: read the view-model, fire the
/// state-entry callbacks, resolve content, emit a frame for the transition
/// mechanism. A rendering layer calls it on every registry notification
/// (or lets [`Consumer::attach`] wire that up).
pub struct Consumer {
    loader: Loader,
    content: Content,
    options: ConsumerOptions,
    defaults: ScopeOptions,
    last_seen: Mutex<Option<LifecycleState>>,
}

impl Consumer {
    pub fn new(
        loader: Loader,
        content: Content,
        options: ConsumerOptions,
        defaults: ScopeOptions,
    ) -> Self {
        Self {
            loader,
            content,
            options,
            defaults,
            // The binding's state machine starts at unset.
            last_seen: Mutex::new(None),
        }
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// One observation: callbacks on state entry, then the resolved frame.
    pub fn observe(&self) -> TransitionFrame {
        let view = self.loader.view();
        self.note_entry(view.state);

        TransitionFrame {
            state_key: view.state,
            class_name: self.class_name(),
            timeout: self.timeout(),
            content: self.select_content(&view),
        }
    }

    /// Observe and hand the frame to `transition`.
    pub async fn render(&self, transition: &dyn Transition) -> TransitionFrame {
        let frame = self.observe();
        transition.play(frame.clone()).await;
        frame
    }

    /// Subscribe `consumer` to its key so every registry write triggers an
    /// observation (and therefore the callbacks) synchronously.
    pub fn attach(consumer: &Arc<Self>) -> Subscription {
        let observer = Arc::clone(consumer);
        consumer.loader.subscribe(move |_| {
            observer.observe();
        })
    }

    /// Fire the matching callback when (and only when) the state changes.
    fn note_entry(&self, state: Option<LifecycleState>) {
        {
            let mut last_seen = self.last_seen.lock().expect("consumer mutex poisoned");
            if *last_seen == state {
                return;
            }
            *last_seen = state;
        }

        let callback = match state {
            Some(LifecycleState::Loading) => self.options.on_loading_start.as_ref(),
            Some(LifecycleState::Settled) => self.options.on_loading_end.as_ref(),
            Some(LifecycleState::Error) => self.options.on_error.as_ref(),
            None => None,
        };
        if let Some(callback) = callback {
            callback();
        }
    }

    fn loading_content(&self) -> Content {
        self.options
            .loading_content
            .clone()
            .or_else(|| self.defaults.default_loading_content.clone())
            .unwrap_or_else(Content::loading_fallback)
    }

    fn select_content(&self, view: &LoaderView) -> Content {
        match view.state {
            Some(LifecycleState::Loading) => self.loading_content(),
            // Error falls back to the normal content; `Content::Empty` is
            // the normal content's own empty fallback.
            Some(LifecycleState::Error) => self
                .options
                .error_content
                .clone()
                .unwrap_or_else(|| self.content.clone()),
            Some(LifecycleState::Settled) => self.content.clone(),
            None => {
                if self.options.treat_unset_as_mounted.unwrap_or(true) {
                    self.content.clone()
                } else {
                    self.loading_content()
                }
            }
        }
    }

    fn class_name(&self) -> String {
        self.options
            .transition_name
            .clone()
            .or_else(|| self.defaults.default_transition_name.clone())
            .unwrap_or_else(|| DEFAULT_TRANSITION_NAME.to_string())
    }

    fn timeout(&self) -> Duration {
        self.options
            .transition_duration
            .or(self.defaults.default_transition_duration)
            .unwrap_or(DEFAULT_TRANSITION_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_callback(counter: &Arc<AtomicUsize>) -> impl Fn() + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn unset_shows_normal_content_by_default() {
        let scope = Scope::new();
        let consumer = scope
            .consumer("job", None, Content::text("ready"), ConsumerOptions::new())
            .unwrap();

        let frame = consumer.observe();
        assert_eq!(frame.state_key, None);
        assert_eq!(frame.content, Content::text("ready"));
    }

    #[test]
    fn unset_can_be_treated_as_loading() {
        let scope = Scope::new();
        let consumer = scope
            .consumer(
                "job",
                None,
                Content::text("ready"),
                ConsumerOptions::new().treat_unset_as_mounted(false),
            )
            .unwrap();

        assert_eq!(consumer.observe().content, Content::loading_fallback());
    }

    #[test]
    fn loading_content_resolution_order() {
        let scope = Scope::with_options(ScopeOptions {
            default_loading_content: Some(Content::text("scope spinner")),
            ..ScopeOptions::default()
        });
        scope.controller("job", None).unwrap().begin();

        // Per-consumer override wins.
        let overridden = scope
            .consumer(
                "job",
                None,
                Content::text("ready"),
                ConsumerOptions::new().loading_content(Content::text("local spinner")),
            )
            .unwrap();
        assert_eq!(overridden.observe().content, Content::text("local spinner"));

        // Then the scope default.
        let scoped = scope
            .consumer("job", None, Content::text("ready"), ConsumerOptions::new())
            .unwrap();
        assert_eq!(scoped.observe().content, Content::text("scope spinner"));

        // Then the built-in fallback.
        let bare_scope = Scope::new();
        bare_scope.controller("job", None).unwrap().begin();
        let bare = bare_scope
            .consumer("job", None, Content::text("ready"), ConsumerOptions::new())
            .unwrap();
        assert_eq!(bare.observe().content, Content::loading_fallback());
    }

    #[test]
    fn error_content_falls_back_to_normal_content() {
        let scope = Scope::new();
        scope.controller("job", None).unwrap().fail();

        let with_error_view = scope
            .consumer(
                "job",
                None,
                Content::text("ready"),
                ConsumerOptions::new().error_content(Content::text("broken")),
            )
            .unwrap();
        assert_eq!(with_error_view.observe().content, Content::text("broken"));

        let without_error_view = scope
            .consumer("job", None, Content::text("ready"), ConsumerOptions::new())
            .unwrap();
        assert_eq!(
            without_error_view.observe().content,
            Content::text("ready")
        );

        let no_content_at_all = scope
            .consumer("job", None, Content::Empty, ConsumerOptions::new())
            .unwrap();
        assert_eq!(no_content_at_all.observe().content, Content::Empty);
    }

    #[test]
    fn transition_name_and_duration_resolution_order() {
        let scope = Scope::with_options(ScopeOptions {
            default_transition_name: Some("slide".to_string()),
            default_transition_duration: Some(Duration::from_millis(150)),
            ..ScopeOptions::default()
        });

        let scoped = scope
            .consumer("job", None, Content::Empty, ConsumerOptions::new())
            .unwrap();
        let frame = scoped.observe();
        assert_eq!(frame.class_name, "slide");
        assert_eq!(frame.timeout, Duration::from_millis(150));

        let overridden = scope
            .consumer(
                "job",
                None,
                Content::Empty,
                ConsumerOptions::new()
                    .transition_name("pop")
                    .transition_duration(Duration::from_millis(10)),
            )
            .unwrap();
        let frame = overridden.observe();
        assert_eq!(frame.class_name, "pop");
        assert_eq!(frame.timeout, Duration::from_millis(10));

        let bare = Scope::new()
            .consumer("job", None, Content::Empty, ConsumerOptions::new())
            .unwrap();
        let frame = bare.observe();
        assert_eq!(frame.class_name, DEFAULT_TRANSITION_NAME);
        assert_eq!(frame.timeout, DEFAULT_TRANSITION_DURATION);
    }

    #[test]
    fn callbacks_fire_on_state_entry_not_on_reobservation() {
        let scope = Scope::new();
        let starts = Arc::new(AtomicUsize::new(0));
        let ends = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));

        let consumer = scope
            .consumer(
                "job",
                None,
                Content::Empty,
                ConsumerOptions::new()
                    .on_loading_start(counter_callback(&starts))
                    .on_loading_end(counter_callback(&ends))
                    .on_error(counter_callback(&errors)),
            )
            .unwrap();
        let controller = scope.controller("job", None).unwrap();

        consumer.observe(); // unset: nothing fires
        assert_eq!(starts.load(Ordering::SeqCst), 0);

        controller.begin();
        consumer.observe();
        consumer.observe(); // same state again: no second fire
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        controller.settle();
        consumer.observe();
        assert_eq!(ends.load(Ordering::SeqCst), 1);

        // The machine cycles: a new run re-enters loading.
        controller.begin();
        consumer.observe();
        assert_eq!(starts.load(Ordering::SeqCst), 2);

        controller.fail();
        consumer.observe();
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn attached_consumer_observes_on_every_write() {
        let scope = Scope::new();
        let starts = Arc::new(AtomicUsize::new(0));
        let ends = Arc::new(AtomicUsize::new(0));

        let consumer = Arc::new(
            scope
                .consumer(
                    "job",
                    None,
                    Content::Empty,
                    ConsumerOptions::new()
                        .on_loading_start(counter_callback(&starts))
                        .on_loading_end(counter_callback(&ends)),
                )
                .unwrap(),
        );
        let _subscription = Consumer::attach(&consumer);

        let controller = scope.controller("job", None).unwrap();
        controller
            .run(|| async { Ok::<_, String>(()) }, None)
            .await
            .unwrap();

        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn render_hands_the_frame_to_the_transition() {
        let scope = Scope::new();
        scope.controller("job", None).unwrap().settle();

        let consumer = scope
            .consumer("job", None, Content::text("ready"), ConsumerOptions::new())
            .unwrap();

        let frame = consumer.render(&NoopTransition).await;
        assert_eq!(frame.state_key, Some(LifecycleState::Settled));
        assert_eq!(frame.content, Content::text("ready"));
    }
}
