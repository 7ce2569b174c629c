//! Host-native values exchanged with the sandbox.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// HostValue
// ============================================================================

/// A value living on the host side of the boundary.
///
/// Only the shapes the bindings actually exchange are representable:
/// strings, byte buffers, string-to-string maps (request headers),
/// small numbers, and flat objects (socket events, HTTP failures).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HostValue {
    /// Unsigned number, used for object tags and status codes.
    Number(u32),
    /// UTF-8 string.
    String(String),
    /// Raw byte buffer.
    Bytes(Vec<u8>),
    /// String-to-string mapping.
    Map(BTreeMap<String, String>),
    /// Object with named fields.
    Object(BTreeMap<String, HostValue>),
}

// ============================================================================
// Constructors
// ============================================================================

impl HostValue {
    /// Creates a string value.
    #[inline]
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Creates a byte buffer value.
    #[inline]
    #[must_use]
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(value.into())
    }

    /// Creates a map value from key/value pairs.
    #[must_use]
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Creates an object value from named fields.
    #[must_use]
    pub fn object<K>(fields: impl IntoIterator<Item = (K, HostValue)>) -> Self
    where
        K: Into<String>,
    {
        Self::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl HostValue {
    /// Returns a short name of the value kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    /// Returns a field of an object value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&HostValue> {
        match self {
            Self::Object(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Returns a numeric field of an object value.
    #[must_use]
    pub fn field_u32(&self, name: &str) -> Option<u32> {
        match self.field(name) {
            Some(Self::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string contents, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the buffer contents, if this is a byte buffer.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl HostValue {
    /// Consumes the value as a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedValue`] for any other kind.
    pub fn into_string(self) -> Result<String> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(Error::unexpected_value("string", other.kind())),
        }
    }

    /// Consumes the value as a byte buffer.
    ///
    /// Strings are accepted and yield their UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedValue`] for any other kind.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(b) => Ok(b),
            Self::String(s) => Ok(s.into_bytes()),
            other => Err(Error::unexpected_value("bytes", other.kind())),
        }
    }

    /// Consumes the value as a string map.
    ///
    /// An empty object is accepted as an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedValue`] for any other kind.
    pub fn into_map(self) -> Result<BTreeMap<String, String>> {
        match self {
            Self::Map(m) => Ok(m),
            Self::Object(fields) if fields.is_empty() => Ok(BTreeMap::new()),
            other => Err(Error::unexpected_value("map", other.kind())),
        }
    }

    /// Serializes the value to JSON, for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<String> for HostValue {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for HostValue {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<u8>> for HostValue {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<u32> for HostValue {
    #[inline]
    fn from(value: u32) -> Self {
        Self::Number(value)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_fields() {
        let value = HostValue::object([
            ("type", HostValue::Number(1)),
            ("data", HostValue::bytes([1u8, 2, 3])),
        ]);

        assert_eq!(value.field_u32("type"), Some(1));
        assert_eq!(
            value.field("data").and_then(HostValue::as_bytes),
            Some(&[1u8, 2, 3][..])
        );
        assert_eq!(value.field("missing"), None);
    }

    #[test]
    fn test_into_string_rejects_bytes() {
        let err = HostValue::bytes(vec![1]).into_string().unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedValue {
                expected: "string",
                found: "bytes"
            }
        ));
    }

    #[test]
    fn test_into_bytes_accepts_string() {
        let bytes = HostValue::string("hi").into_bytes().expect("bytes");
        assert_eq!(bytes, b"hi");
    }

    #[test]
    fn test_into_map_accepts_empty_object() {
        let map = HostValue::Object(BTreeMap::new()).into_map().expect("map");
        assert!(map.is_empty());
    }

    #[test]
    fn test_to_json() {
        let json = HostValue::string("x").to_json().expect("json");
        assert_eq!(json, r#"{"kind":"string","value":"x"}"#);
    }
}
