//! Shared payload fixtures.
//!
//! The same small XML documents every blob-store suite stores, sized so
//! the byte-range assertions (46-byte object, 6-byte head, 5-byte tail)
//! line up across tests.

use std::collections::HashMap;

use bytes::Bytes;
use stratus_object::BlobRecord;

/// Render the apples XML document for `name`.
pub fn apples_xml(name: &str) -> String {
    format!("<apples><apple name=\"{name}\"></apple> </apples>")
}

/// The canonical 46-byte test payload.
pub fn test_string() -> String {
    apples_xml("apple")
}

/// Five payloads under root-level keys.
pub fn five_strings() -> HashMap<&'static str, String> {
    HashMap::from([
        ("one", apples_xml("apple")),
        ("two", apples_xml("bear")),
        ("three", apples_xml("candy")),
        ("four", apples_xml("dogma")),
        ("five", apples_xml("emma")),
    ])
}

/// Five payloads under `path/`-prefixed keys.
pub fn five_strings_under_path() -> HashMap<&'static str, String> {
    HashMap::from([
        ("path/1", apples_xml("apple")),
        ("path/2", apples_xml("bear")),
        ("path/3", apples_xml("candy")),
        ("path/4", apples_xml("dogma")),
        ("path/5", apples_xml("emma")),
    ])
}

/// A `text/xml` record holding [`test_string`] under `key`.
pub fn test_blob(key: impl Into<String>) -> BlobRecord {
    BlobRecord::new(key, Bytes::from(test_string())).with_content_type("text/xml")
}
