use crate::bencode::BencodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetainfoError {
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    #[error("invalid torrent at {path}: {reason}")]
    Invalid { path: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub(super) fn invalid(path: impl Into<String>, reason: impl Into<String>) -> MetainfoError {
    MetainfoError::Invalid {
        path: path.into(),
        reason: reason.into(),
    }
}
