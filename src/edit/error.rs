use std::path::PathBuf;
use thiserror::Error;

/// Failures while resolving a selector or writing a tree back.
///
/// Selector variants carry the 1-based number of the step that failed.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("step {step}: key {key:?} not found")]
    KeyNotFound { step: usize, key: String },

    #[error("step {step}: index {index} out of range for list of {len}")]
    IndexOutOfRange { step: usize, index: i64, len: usize },

    #[error("step {step}: {token:?} is not a list index")]
    NotAListIndex { step: usize, token: String },

    #[error("step {step}: cannot descend into {kind} value")]
    NotAContainer { step: usize, kind: &'static str },

    #[error("set and delete need a non-empty selector")]
    NullSelector,

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
