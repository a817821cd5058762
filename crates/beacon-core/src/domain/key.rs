//! Operation Key - 追跡対象オペレーションの正規化された識別子
//!
//! # 導出ルール
//! - index なし → key は name そのまま
//! - index あり → `{name}__{index}`（separator は固定文字列 `"__"`)
//!
//! # 単射性
//! name に separator を含めることを禁止することで、異なる (name, index)
//! ペアが同じ key に衝突しないことを保証します。
//! 負の index は `u32` により型レベルで排除されます。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ConfigError;

/// Separator between `name` and decimal `index` in a derived key.
///
/// Reserved: names containing it are rejected so derivation stays injective
/// (`"a__1"` with no index must not collide with `("a", 1)`).
pub const KEY_SEPARATOR: &str = "__";

/// Canonical string identity of one tracked operation.
///
/// Construct through [`OpKey::derive`]; the inner string is guaranteed to
/// have come from a valid `(name, index)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpKey(String);

impl OpKey {
    /// Derive the canonical key for `(name, index)`.
    ///
    /// Deterministic and injective: equal pairs always produce equal keys,
    /// distinct pairs never collide.
    pub fn derive(name: &str, index: Option<u32>) -> Result<Self, ConfigError> {
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if name.contains(KEY_SEPARATOR) {
            return Err(ConfigError::ReservedSeparator {
                name: name.to_string(),
            });
        }

        Ok(match index {
            Some(index) => Self(format!("{name}{KEY_SEPARATOR}{index}")),
            None => Self(name.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
