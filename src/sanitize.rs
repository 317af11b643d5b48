//! Cell value sanitization
//!
//! Every value read from an artifact database passes through [`sanitize`]
//! before it is stored. The conversion is total: text that is not valid UTF-8
//! and blobs that are not text are replaced by marker strings, so records can
//! always be logged, tabulated and serialized.
//!
//! | Raw value              | Result                                   |
//! |------------------------|------------------------------------------|
//! | valid UTF-8 text       | unchanged                                |
//! | invalid UTF-8 text     | `<Encoding error in text data>`          |
//! | blob, valid UTF-8      | decoded text                             |
//! | blob > 100 bytes       | `<Binary data: N bytes>`                 |
//! | blob <= 100 bytes      | `<Hex: {first 50 hex chars}...>`         |
//! | null / integer / real  | unchanged, typed                         |

use rusqlite::types::ValueRef;

use crate::artifact::CellValue;

/// Marker substituted for text columns holding invalid UTF-8
pub const ENCODING_ERROR_MARKER: &str = "<Encoding error in text data>";

/// Blobs longer than this are summarized by size instead of hex prefix
pub const BINARY_SUMMARY_THRESHOLD: usize = 100;

/// Number of hex characters kept in a short-blob marker
pub const HEX_PREFIX_CHARS: usize = 50;

/// Convert one raw SQLite value into a display-safe value
pub fn sanitize(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(f) => CellValue::Real(f),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => CellValue::Text(text.to_string()),
            Err(_) => CellValue::Marker(ENCODING_ERROR_MARKER.to_string()),
        },
        ValueRef::Blob(bytes) => sanitize_blob(bytes),
    }
}

/// Sanitize a byte sequence that came back as a blob
pub fn sanitize_blob(bytes: &[u8]) -> CellValue {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return CellValue::Text(text.to_string());
    }
    CellValue::Marker(binary_marker(bytes))
}

/// Marker text for undecodable bytes
pub fn binary_marker(bytes: &[u8]) -> String {
    if bytes.len() > BINARY_SUMMARY_THRESHOLD {
        return format!("<Binary data: {} bytes>", bytes.len());
    }

    let encoded = hex::encode(bytes);
    if encoded.len() > HEX_PREFIX_CHARS {
        format!("<Hex: {}...>", &encoded[..HEX_PREFIX_CHARS])
    } else {
        format!("<Hex: {}>", encoded)
    }
}
