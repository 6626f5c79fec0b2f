use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    /// JSON output requires byte strings to be valid UTF-8.
    #[error("byte string is not valid utf-8")]
    NotUtf8,

    /// The value has no representation in the requested output mode.
    #[error("cannot render {0} value here")]
    Unrepresentable(&'static str),
}
