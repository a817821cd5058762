//! Coordination Scope - レジストリと設定を所有する境界
//!
//! # 設計
//! - 明示的に構築するスコープオブジェクト。プロセス全体の singleton は持たない
//! - 独立した複数スコープが共存でき、状態を共有しない
//! - teardown（明示呼び出しまたは Drop）で disposal token を失効させ、
//!   以降の state 書き込みを抑止する（実行中のタスク自体は止めない）

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use crate::consumer::{Consumer, ConsumerOptions, Content};
use crate::controller::Controller;
use crate::domain::{ConfigError, OpKey};
use crate::loader::{Handle, Loader};
use crate::observability::StateCounts;
use crate::registry::StateRegistry;

/// Name used for keys generated by [`Scope::anonymous_key`].
const ANONYMOUS_NAME: &str = "anon";

/// Scope-wide defaults for consumers bound to this scope. Any per-consumer
/// value overrides these.
#[derive(Debug, Clone, Default)]
pub struct ScopeOptions {
    pub default_loading_content: Option<Content>,
    pub default_transition_name: Option<String>,
    pub default_transition_duration: Option<Duration>,
}

/// Shared "still alive" flag for one scope.
///
/// Controllers check it before every registry write; after teardown the
/// write is dropped silently (the task's own outcome is unaffected).
#[derive(Debug, Clone)]
pub struct DisposalToken(Arc<AtomicBool>);

impl DisposalToken {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn revoke(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One coordination boundary: a [`StateRegistry`], scope-wide defaults, and
/// the disposal token every bound controller shares.
pub struct Scope {
    registry: Arc<StateRegistry>,
    options: ScopeOptions,
    token: DisposalToken,
    anonymous_counter: AtomicU32,
}

impl Scope {
    /// Open a scope with default options and an empty registry.
    pub fn new() -> Self {
        Self::with_options(ScopeOptions::default())
    }

    pub fn with_options(options: ScopeOptions) -> Self {
        Self {
            registry: Arc::new(StateRegistry::new()),
            options,
            token: DisposalToken::new(),
            anonymous_counter: AtomicU32::new(0),
        }
    }

    pub fn registry(&self) -> &Arc<StateRegistry> {
        &self.registry
    }

    pub fn options(&self) -> &ScopeOptions {
        &self.options
    }

    pub fn token(&self) -> &DisposalToken {
        &self.token
    }

    /// Imperative transitions for `(name, index)`.
    ///
    /// Cheap: carries only the key binding, so recreating one on every
    /// observation is fine.
    pub fn controller(&self, name: &str, index: Option<u32>) -> Result<Controller, ConfigError> {
        let key = OpKey::derive(name, index)?;
        Ok(Controller::new(
            key,
            Arc::clone(&self.registry),
            self.token.clone(),
        ))
    }

    /// Read-only projection handle for `(name, index)`.
    pub fn loader(&self, name: &str, index: Option<u32>) -> Result<Loader, ConfigError> {
        let key = OpKey::derive(name, index)?;
        Ok(Loader::new(key, Arc::clone(&self.registry)))
    }

    /// The `{ loader, controller }` pair for `(name, index)`.
    pub fn handle(&self, name: &str, index: Option<u32>) -> Result<Handle, ConfigError> {
        Ok(Handle {
            loader: self.loader(name, index)?,
            controller: self.controller(name, index)?,
        })
    }

    /// Consumer binding for `(name, index)` rendering `content`, with this
    /// scope's defaults attached.
    pub fn consumer(
        &self,
        name: &str,
        index: Option<u32>,
        content: Content,
        options: ConsumerOptions,
    ) -> Result<Consumer, ConfigError> {
        Ok(Consumer::new(
            self.loader(name, index)?,
            content,
            options,
            self.options.clone(),
        ))
    }

    /// Stable key for an operation the caller did not name.
    ///
    /// Scope-local counter, so each call yields a fresh key that stays
    /// stable for the operation's lifetime. Keys look like `anon__0`,
    /// `anon__1`, ...
    pub fn anonymous_key(&self) -> OpKey {
        let index = self.anonymous_counter.fetch_add(1, Ordering::Relaxed);
        OpKey::derive(ANONYMOUS_NAME, Some(index))
            .expect("anonymous name contains no separator")
    }

    pub fn counts(&self) -> StateCounts {
        self.registry.counts()
    }

    /// Stop accepting state writes from every controller bound to this
    /// scope. In-flight tasks keep running; their settle/fail writes are
    /// dropped, their results still reach their callers.
    pub fn teardown(&self) {
        self.token.revoke();
    }

    pub fn is_torn_down(&self) -> bool {
        !self.token.is_active()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.token.revoke();
    }
}
