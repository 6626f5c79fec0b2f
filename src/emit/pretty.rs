use crate::bencode::Value;

/// Bytes shown of a string before it is cut off with `...`.
const STRING_PREVIEW: usize = 50;

/// Renders a human-readable indented dump of a decoded tree.
///
/// Dictionaries and lists open with a `dict`/`list` header followed by one
/// `"key": value` or `index: value` line per entry, indented two spaces per
/// depth. Byte strings are printed in a printable-escape form and cut off
/// with `...` past 50 bytes.
///
/// # Examples
///
/// ```
/// use btkit::bencode::decode;
/// use btkit::emit::pretty;
///
/// let tree = decode(b"d3:cow3:moo4:spaml4:eggsi7eee").unwrap();
/// assert_eq!(pretty(&tree), "\
/// dict
///   \"cow\": \"moo\"
///   \"spam\": list
///     0: \"eggs\"
///     1: 7");
/// ```
pub fn pretty(value: &Value) -> String {
    let mut out = String::new();
    render(value, 0, &mut out);
    out
}

fn render(value: &Value, depth: usize, out: &mut String) {
    match value {
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Bytes(b) => quote(b, out),
        Value::List(items) => {
            out.push_str("list");
            for (i, item) in items.iter().enumerate() {
                newline(depth + 1, out);
                out.push_str(&i.to_string());
                out.push_str(": ");
                render(item, depth + 1, out);
            }
        }
        Value::Dict(dict) => {
            out.push_str("dict");
            for (key, item) in dict {
                newline(depth + 1, out);
                quote(key, out);
                out.push_str(": ");
                render(item, depth + 1, out);
            }
        }
    }
}

fn newline(depth: usize, out: &mut String) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn quote(bytes: &[u8], out: &mut String) {
    out.push('"');
    for &b in bytes.iter().take(STRING_PREVIEW) {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    if bytes.len() > STRING_PREVIEW {
        out.push_str("...");
    }
    out.push('"');
}
