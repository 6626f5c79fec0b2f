use thiserror::Error;

/// Errors that can occur during bencode decoding.
///
/// Every variant carries the byte offset at which the deviation from the
/// canonical grammar was detected. Encoding has no error cases; it writes
/// into an in-memory buffer.
///
/// # Examples
///
/// ```
/// use btkit::bencode::{decode, BencodeError};
///
/// // Truncated input
/// let result = decode(b"i42");
/// assert!(matches!(result, Err(BencodeError::UnexpectedEof(_))));
///
/// // Non-canonical integer (leading zero)
/// let result = decode(b"i007e");
/// assert!(matches!(result, Err(BencodeError::InvalidInteger { .. })));
///
/// // Trailing data
/// let result = decode(b"i42eextra");
/// assert!(matches!(result, Err(BencodeError::TrailingData(4))));
/// ```
#[derive(Debug, Error)]
pub enum BencodeError {
    /// Input ended before a complete value was parsed.
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEof(usize),

    /// Integer body does not match `0 | -?[1-9][0-9]*`, or overflows i64.
    #[error("invalid integer at byte {at}: {reason}")]
    InvalidInteger { at: usize, reason: &'static str },

    /// Byte string length prefix is zero-padded or overflows.
    #[error("invalid string length at byte {0}")]
    InvalidLength(usize),

    /// Encountered a byte that fits no grammar rule at this position.
    #[error("unexpected byte {byte:#04x} at byte {at}")]
    UnexpectedByte { at: usize, byte: u8 },

    /// Dictionary key is not a byte string.
    #[error("dictionary key is not a string at byte {0}")]
    KeyType(usize),

    /// Dictionary key repeats or sorts below its predecessor.
    #[error("dictionary key out of order at byte {0}")]
    KeyOrder(usize),

    /// Extra data exists after the bencode value.
    #[error("trailing data after value at byte {0}")]
    TrailingData(usize),

    /// Recursion limit (64 levels) exceeded to prevent stack overflow.
    #[error("nesting too deep at byte {0}")]
    NestingTooDeep(usize),
}
