//! Lifecycle State - 追跡対象オペレーションの状態
//!
//! # 状態遷移
//! - unset: レジストリにエントリなし（`Option::None` で表現、保存されない）
//! - loading: 実行中
//! - settled: 正常完了（コンテンツ表示可能）
//! - error: 失敗

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored state of one tracked operation.
///
/// "Unset" is deliberately NOT a variant: it is the absence of a registry
/// entry, surfaced as `Option<LifecycleState>` = `None` at every read
/// boundary. The registry never stores an unset entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Loading,
    Settled,
    Error,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Loading => "loading",
            LifecycleState::Settled => "settled",
            LifecycleState::Error => "error",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_can_be_serialized() {
        let serialized = serde_json::to_string(&LifecycleState::Settled).unwrap();
        assert_eq!(serialized, "\"settled\"");

        let deserialized: LifecycleState = serde_json::from_str("\"loading\"").unwrap();
        assert_eq!(deserialized, LifecycleState::Loading);
    }

    #[test]
    fn display_matches_as_str() {
        for state in [
            LifecycleState::Loading,
            LifecycleState::Settled,
            LifecycleState::Error,
        ] {
            assert_eq!(state.to_string(), state.as_str());
        }
    }
}
