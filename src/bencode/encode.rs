use super::value::Value;

/// Encodes a value into its canonical bencode form.
///
/// Dictionary entries are written in ascending byte order of their keys,
/// which is what makes the info hash reproducible across encoders. Lists
/// and byte strings keep their order.
///
/// # Examples
///
/// ```
/// use torrent_probe::bencode::{encode, Value};
///
/// assert_eq!(encode(&Value::Integer(-42)), b"i-42e");
/// assert_eq!(encode(&Value::string("spam")), b"4:spam");
/// assert_eq!(
///     encode(&Value::List(vec![Value::Integer(1), Value::string("two")])),
///     b"li1e3:twoe"
/// );
/// ```
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_into(value, &mut buf);
    buf
}

fn encode_into(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Integer(i) => {
            buf.push(b'i');
            buf.extend_from_slice(i.to_string().as_bytes());
            buf.push(b'e');
        }
        Value::Bytes(b) => encode_bytes(b, buf),
        Value::List(items) => {
            buf.push(b'l');
            for item in items {
                encode_into(item, buf);
            }
            buf.push(b'e');
        }
        Value::Dict(entries) => {
            // BTreeMap<Bytes, _> iterates in raw byte order.
            buf.push(b'd');
            for (key, val) in entries {
                encode_bytes(key, buf);
                encode_into(val, buf);
            }
            buf.push(b'e');
        }
    }
}

fn encode_bytes(bytes: &[u8], buf: &mut Vec<u8>) {
    buf.extend_from_slice(bytes.len().to_string().as_bytes());
    buf.push(b':');
    buf.extend_from_slice(bytes);
}
