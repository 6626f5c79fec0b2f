use super::error::EmitError;
use crate::bencode::Value;

/// Renders a decoded tree as JSON.
///
/// Dictionary keys come out in ascending order. Byte strings are decoded as
/// UTF-8; a string that is not valid UTF-8 has no JSON form and fails with
/// [`EmitError::NotUtf8`]. Printable ASCII is emitted literally; `"` and
/// `\`, the named control escapes, and everything else (including all
/// non-ASCII code points) use JSON escape sequences.
pub fn jsonify(value: &Value) -> Result<String, EmitError> {
    let mut out = String::new();
    render(value, &mut out)?;
    Ok(out)
}

fn render(value: &Value, out: &mut String) -> Result<(), EmitError> {
    match value {
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Bytes(b) => render_string(b, out)?,
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                render(item, out)?;
            }
            out.push(']');
        }
        Value::Dict(dict) => {
            out.push('{');
            for (i, (key, item)) in dict.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                render_string(key, out)?;
                out.push(':');
                render(item, out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn render_string(bytes: &[u8], out: &mut String) -> Result<(), EmitError> {
    let text = std::str::from_utf8(bytes).map_err(|_| EmitError::NotUtf8)?;

    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' '..='\u{7e}' => out.push(c),
            _ => escape_code_point(c, out),
        }
    }
    out.push('"');
    Ok(())
}

fn escape_code_point(c: char, out: &mut String) {
    let cp = c as u32;
    if cp <= 0xffff {
        out.push_str(&format!("\\u{:04x}", cp));
    } else {
        // Outside the BMP JSON needs a surrogate pair.
        let cp = cp - 0x10000;
        out.push_str(&format!(
            "\\u{:04x}\\u{:04x}",
            0xd800 + (cp >> 10),
            0xdc00 + (cp & 0x3ff)
        ));
    }
}
