use bytes::Bytes;
use std::collections::BTreeMap;

/// A bencode value.
///
/// Bencode has four data types: integers, byte strings, lists, and
/// dictionaries. Byte strings are raw bytes and carry no encoding; a value
/// decoded from a torrent file may well contain strings that are not UTF-8.
///
/// Dictionaries are kept in a `BTreeMap` keyed by raw bytes, so iteration
/// (and therefore encoding) always happens in the canonical ascending key
/// order.
///
/// # Examples
///
/// ```
/// use btkit::bencode::{decode, Value};
///
/// let tree = decode(b"d5:filesl4:spame6:lengthi42ee").unwrap();
/// assert_eq!(tree.kind(), "dictionary");
/// assert_eq!(tree.get(b"length").and_then(Value::as_integer), Some(42));
/// assert_eq!(tree.get(b"files").and_then(Value::as_list).map(Vec::len), Some(1));
/// assert_eq!(tree.get(b"missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A signed 64-bit integer.
    Integer(i64),
    /// A byte string (may or may not be valid UTF-8).
    Bytes(Bytes),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A dictionary with byte string keys, iterated in ascending key order.
    Dict(BTreeMap<Bytes, Value>),
}

impl Value {
    /// Creates a byte string value from UTF-8 text.
    pub fn string(text: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(text.as_bytes()))
    }

    /// A short name for the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Bytes(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dictionary",
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    /// Returns the value as a byte string, if it is one.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        if let Value::Bytes(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Returns the value as UTF-8 text.
    ///
    /// `None` when the value is not a byte string, and also when it is one
    /// whose bytes do not decode as UTF-8; callers that must tell the two
    /// cases apart (the JSON emitter, filename validation) go through
    /// [`Value::as_bytes`] and decode themselves.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()?).ok()
    }

    /// Returns the value as a list, if it is one.
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        if let Value::List(items) = self {
            Some(items)
        } else {
            None
        }
    }

    /// Returns the value as a mutable list, if it is one.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        if let Value::List(items) = self {
            Some(items)
        } else {
            None
        }
    }

    /// Returns the value as a dictionary reference, if it is one.
    pub fn as_dict(&self) -> Option<&BTreeMap<Bytes, Value>> {
        if let Value::Dict(entries) = self {
            Some(entries)
        } else {
            None
        }
    }

    /// Returns the value as a mutable dictionary, if it is one.
    pub fn as_dict_mut(&mut self) -> Option<&mut BTreeMap<Bytes, Value>> {
        if let Value::Dict(entries) = self {
            Some(entries)
        } else {
            None
        }
    }

    /// Looks up a key in this value if it is a dictionary.
    ///
    /// `None` covers both a non-dictionary value and an absent key; torrent
    /// validation distinguishes them with [`Value::kind`] when building its
    /// error paths.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        match self {
            Value::Dict(entries) => entries.get(key),
            _ => None,
        }
    }
}
