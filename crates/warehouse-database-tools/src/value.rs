//! Helpers shared by the backend value decoders

use serde_json::Value;
use std::fmt::Write;

/// Renders binary data the way PostgreSQL prints `bytea`: `\x` followed by hex
pub(crate) fn bytes_to_hex(bytes: &[u8]) -> Value {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("\\x");
    for b in bytes {
        // Writing to a String cannot fail
        let _ = write!(out, "{:02x}", b);
    }
    Value::String(out)
}

/// Placeholder for a value whose type has no JSON rendering
pub(crate) fn unsupported(type_name: &str) -> Value {
    Value::String(format!("<{}>", type_name))
}
