use thiserror::Error;

/// Invalid key-derivation input.
///
/// Surfaced synchronously to the caller; fatal to that call only. Task
/// failures are NOT represented here: the task error type is caller-defined
/// and passes through [`Controller::run`](crate::controller::Controller::run)
/// unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("operation name {name:?} contains the reserved separator \"__\"")]
    ReservedSeparator { name: String },

    #[error("operation name must not be empty")]
    EmptyName,
}
