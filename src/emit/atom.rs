use chrono::DateTime;

use super::error::EmitError;
use crate::bencode::Value;

/// Renders a single atom as raw output bytes, with no trailing newline.
///
/// A byte string passes through untouched. An integer becomes its decimal
/// form, or, when `timestamp` is set, an ISO-8601 UTC instant
/// (`YYYY-MM-DDTHH:MM:SS`) interpreted from Unix seconds. Lists and
/// dictionaries have no atom form.
pub fn atom(value: &Value, timestamp: bool) -> Result<Vec<u8>, EmitError> {
    match value {
        Value::Bytes(b) => Ok(b.to_vec()),
        Value::Integer(i) => {
            if timestamp {
                let instant = DateTime::from_timestamp(*i, 0)
                    .ok_or(EmitError::Unrepresentable("out-of-range timestamp"))?;
                Ok(instant
                    .format("%Y-%m-%dT%H:%M:%S")
                    .to_string()
                    .into_bytes())
            } else {
                Ok(i.to_string().into_bytes())
            }
        }
        Value::List(_) => Err(EmitError::Unrepresentable("list")),
        Value::Dict(_) => Err(EmitError::Unrepresentable("dictionary")),
    }
}
