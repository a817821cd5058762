use serde::{Deserialize, Serialize};

/// Currency for mounted content.
///
/// The core decides WHICH content a consumer mounts per state; what a
/// content value actually renders as is the presentation layer's business,
/// so this stays a lightweight label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    /// Nothing mounted (the built-in error fallback).
    #[default]
    Empty,
    Text(String),
}

impl Content {
    pub fn text(value: impl Into<String>) -> Self {
        Content::Text(value.into())
    }

    /// Built-in fallback shown while loading when neither the consumer nor
    /// the scope provides loading content.
    pub fn loading_fallback() -> Self {
        Content::Text("Loading...".to_string())
    }
}
