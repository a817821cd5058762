//! Domain model (キー、状態、エラー型).
//!
//! - **key**: Operation Key の導出（name + optional index → canonical string）
//! - **state**: Lifecycle State（Loading / Settled / Error、UNSET はエントリ不在）
//! - **errors**: エラー型（ConfigError）

pub mod errors;
pub mod key;
pub mod state;

pub use self::errors::ConfigError;
pub use self::key::{KEY_SEPARATOR, OpKey};
pub use self::state::LifecycleState;
