use std::collections::BTreeMap;

use bytes::Bytes;

use super::error::BencodeError;
use super::value::Value;

const MAX_DEPTH: usize = 64;

/// Decodes a bencode value from a byte slice.
///
/// The decoder is strict: it accepts exactly the canonical encoding, so a
/// successful decode re-encodes to the input byte-for-byte. Anything else is
/// rejected: zero-padded or signed-`+` integers, `-0`, zero-padded string
/// length prefixes, dictionary keys that are not strings or not strictly
/// ascending, and trailing bytes after the value.
///
/// # Errors
///
/// Returns an error carrying the byte offset of the first deviation if:
/// - The input is empty or truncated ([`BencodeError::UnexpectedEof`])
/// - The input is not canonical bencode
/// - The nesting depth exceeds 64 levels ([`BencodeError::NestingTooDeep`])
/// - There is data after the value ([`BencodeError::TrailingData`])
///
/// # Examples
///
/// ```
/// use btkit::bencode::decode;
///
/// let int = decode(b"i42e").unwrap();
/// assert_eq!(int.as_integer(), Some(42));
///
/// let string = decode(b"5:hello").unwrap();
/// assert_eq!(string.as_str(), Some("hello"));
///
/// let dict = decode(b"d3:cow3:moo4:spam4:eggse").unwrap();
/// assert_eq!(dict.get(b"cow").and_then(|v| v.as_str()), Some("moo"));
/// ```
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    let mut pos = 0;
    let value = decode_value(data, &mut pos, 0)?;

    if pos != data.len() {
        return Err(BencodeError::TrailingData(pos));
    }

    Ok(value)
}

fn decode_value(data: &[u8], pos: &mut usize, depth: usize) -> Result<Value, BencodeError> {
    if depth > MAX_DEPTH {
        return Err(BencodeError::NestingTooDeep(*pos));
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof(data.len()));
    }

    match data[*pos] {
        b'i' => decode_integer(data, pos),
        b'l' => decode_list(data, pos, depth),
        b'd' => decode_dict(data, pos, depth),
        b'0'..=b'9' => Ok(Value::Bytes(decode_bytes(data, pos)?)),
        byte => Err(BencodeError::UnexpectedByte { at: *pos, byte }),
    }
}

fn decode_integer(data: &[u8], pos: &mut usize) -> Result<Value, BencodeError> {
    *pos += 1;

    let start = *pos;
    while *pos < data.len() && data[*pos] != b'e' {
        *pos += 1;
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof(data.len()));
    }

    let body = &data[start..*pos];
    let invalid = |reason| BencodeError::InvalidInteger { at: start, reason };

    if body.is_empty() {
        return Err(invalid("empty"));
    }

    // Canonical form is 0 | -?[1-9][0-9]*; a leading '+' falls out of the
    // all-digits check below.
    let digits = if body[0] == b'-' { &body[1..] } else { body };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid("not a decimal integer"));
    }
    if digits[0] == b'0' && digits.len() > 1 {
        return Err(invalid("leading zero"));
    }
    if body[0] == b'-' && digits == b"0" {
        return Err(invalid("negative zero"));
    }

    let text = std::str::from_utf8(body).map_err(|_| invalid("not a decimal integer"))?;
    let value: i64 = text.parse().map_err(|_| invalid("out of range"))?;

    *pos += 1;
    Ok(Value::Integer(value))
}

fn decode_bytes(data: &[u8], pos: &mut usize) -> Result<Bytes, BencodeError> {
    let start = *pos;
    while *pos < data.len() && data[*pos].is_ascii_digit() {
        *pos += 1;
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof(data.len()));
    }
    if data[*pos] != b':' {
        return Err(BencodeError::UnexpectedByte {
            at: *pos,
            byte: data[*pos],
        });
    }

    let len_digits = &data[start..*pos];
    if len_digits[0] == b'0' && len_digits.len() > 1 {
        return Err(BencodeError::InvalidLength(start));
    }

    let len_text =
        std::str::from_utf8(len_digits).map_err(|_| BencodeError::InvalidLength(start))?;
    let len: usize = len_text
        .parse()
        .map_err(|_| BencodeError::InvalidLength(start))?;

    *pos += 1;

    if len > data.len() - *pos {
        return Err(BencodeError::UnexpectedEof(data.len()));
    }

    let bytes = Bytes::copy_from_slice(&data[*pos..*pos + len]);
    *pos += len;

    Ok(bytes)
}

fn decode_list(data: &[u8], pos: &mut usize, depth: usize) -> Result<Value, BencodeError> {
    *pos += 1;
    let mut list = Vec::new();

    while *pos < data.len() && data[*pos] != b'e' {
        list.push(decode_value(data, pos, depth + 1)?);
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof(data.len()));
    }

    *pos += 1;
    Ok(Value::List(list))
}

fn decode_dict(data: &[u8], pos: &mut usize, depth: usize) -> Result<Value, BencodeError> {
    *pos += 1;
    let mut dict = BTreeMap::new();
    let mut last_key: Option<Bytes> = None;

    while *pos < data.len() && data[*pos] != b'e' {
        let key_at = *pos;
        if !data[key_at].is_ascii_digit() {
            return Err(BencodeError::KeyType(key_at));
        }

        let key = decode_bytes(data, pos)?;
        if let Some(prev) = &last_key {
            if key <= *prev {
                return Err(BencodeError::KeyOrder(key_at));
            }
        }

        let value = decode_value(data, pos, depth + 1)?;
        dict.insert(key.clone(), value);
        last_key = Some(key);
    }

    if *pos >= data.len() {
        return Err(BencodeError::UnexpectedEof(data.len()));
    }

    *pos += 1;
    Ok(Value::Dict(dict))
}
