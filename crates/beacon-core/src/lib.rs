//! beacon-core
//!
//! Keyed async-operation lifecycle tracking: a shared registry maps
//! operation keys to lifecycle states, controllers drive transitions from
//! asynchronous work, and loaders/consumers observe a key's state to
//! decide what to show.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（key, state, errors）
//! - **registry**: 共有レジストリ（merge 書き込み + 同期購読通知）
//! - **scope**: Coordination Scope（レジストリ + 設定 + disposal token）
//! - **controller**: per-key の遷移操作と `run` プロトコル
//! - **loader**: per-key の read-only projection（view-model）
//! - **consumer**: rendering 層向けの Consumption Binding
//! - **observability**: 状態カウントのスナップショット

pub mod consumer;
pub mod controller;
pub mod domain;
pub mod loader;
pub mod observability;
pub mod registry;
pub mod scope;

pub use self::consumer::{
    AsyncSlot, Consumer, ConsumerOptions, Content, NoopTransition, Transition, TransitionFrame,
};
pub use self::controller::Controller;
pub use self::domain::{ConfigError, KEY_SEPARATOR, LifecycleState, OpKey};
pub use self::loader::{Handle, Loader, LoaderView};
pub use self::observability::StateCounts;
pub use self::registry::{StateRegistry, Subscription};
pub use self::scope::{DisposalToken, Scope, ScopeOptions};
