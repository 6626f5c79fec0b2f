use super::value::Value;

/// Encodes a value into its canonical bencode form.
///
/// Dictionaries iterate in ascending key order, so the output is the unique
/// canonical spelling of the value and `encode` inverts `decode` on any
/// input the decoder accepts. Encoding writes straight into an in-memory
/// buffer and cannot fail.
///
/// # Examples
///
/// ```
/// use btkit::bencode::{decode, encode};
///
/// let input = b"d3:cow3:moo4:spam4:eggse";
/// let tree = decode(input).unwrap();
/// assert_eq!(encode(&tree), input);
/// ```
pub fn encode(value: &Value) -> Vec<u8> {
    let mut encoder = Encoder::default();
    encoder.value(value);
    encoder.out
}

#[derive(Default)]
struct Encoder {
    out: Vec<u8>,
}

impl Encoder {
    fn value(&mut self, value: &Value) {
        match value {
            Value::Integer(n) => {
                self.out.push(b'i');
                self.decimal(*n);
                self.out.push(b'e');
            }
            Value::Bytes(bytes) => self.string(bytes),
            Value::List(items) => {
                self.out.push(b'l');
                for item in items {
                    self.value(item);
                }
                self.out.push(b'e');
            }
            Value::Dict(dict) => {
                self.out.push(b'd');
                for (key, item) in dict {
                    self.string(key);
                    self.value(item);
                }
                self.out.push(b'e');
            }
        }
    }

    fn string(&mut self, bytes: &[u8]) {
        self.decimal(bytes.len() as i64);
        self.out.push(b':');
        self.out.extend_from_slice(bytes);
    }

    fn decimal(&mut self, n: i64) {
        self.out.extend_from_slice(n.to_string().as_bytes());
    }
}
