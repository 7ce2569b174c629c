//! Socket event and payload types.
//!
//! Events are produced by transport callbacks and drained by polling.
//!
//! # Boundary Form
//!
//! Events cross the boundary as flat objects:
//!
//! ```json
//! { "type": 1, "data": [1, 2, 3] }
//! ```
//!
//! | Code | Event | `data` |
//! |------|-------|--------|
//! | 0 | [`SocketEvent::Connected`] | |
//! | 1 | [`SocketEvent::DataReceived`] | byte buffer |
//! | 2 | [`SocketEvent::Error`] | string |
//! | 3 | [`SocketEvent::Closed`] | |
//! | 4 | [`SocketEvent::TextReceived`] | string |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::boundary::HostValue;
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

const CONNECTED: u32 = 0;
const DATA_RECEIVED: u32 = 1;
const SOCKET_ERROR: u32 = 2;
const CLOSED: u32 = 3;
const TEXT_RECEIVED: u32 = 4;

// ============================================================================
// SocketEvent
// ============================================================================

/// A lifecycle event of the active socket connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum SocketEvent {
    /// The connection is open.
    Connected,
    /// A binary frame arrived.
    DataReceived(Vec<u8>),
    /// A text frame arrived.
    TextReceived(String),
    /// The connection reported an error, or a send failed.
    Error(String),
    /// The connection is closed.
    Closed,
}

impl SocketEvent {
    /// Creates an error event from anything displayable.
    #[inline]
    #[must_use]
    pub fn error(message: impl ToString) -> Self {
        Self::Error(message.to_string())
    }

    /// Returns the numeric tag used at the boundary.
    #[must_use]
    pub const fn type_code(&self) -> u32 {
        match self {
            Self::Connected => CONNECTED,
            Self::DataReceived(_) => DATA_RECEIVED,
            Self::Error(_) => SOCKET_ERROR,
            Self::Closed => CLOSED,
            Self::TextReceived(_) => TEXT_RECEIVED,
        }
    }

    /// Returns `true` for events that end the connection.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Encodes the event as a boundary object.
    #[must_use]
    pub fn into_host_value(self) -> HostValue {
        let type_field = ("type", HostValue::Number(self.type_code()));
        match self {
            Self::Connected | Self::Closed => HostValue::object([type_field]),
            Self::DataReceived(data) => {
                HostValue::object([type_field, ("data", HostValue::Bytes(data))])
            }
            Self::Error(message) | Self::TextReceived(message) => {
                HostValue::object([type_field, ("data", HostValue::String(message))])
            }
        }
    }

    /// Decodes a boundary object back into an event.
    ///
    /// This is the reading side a sandboxed caller performs after
    /// dereferencing the handle returned by `ws_try_recv`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedValue`] if the object is malformed or
    /// carries an unknown type code.
    pub fn from_host_value(value: &HostValue) -> Result<Self> {
        let code = value
            .field_u32("type")
            .ok_or_else(|| Error::unexpected_value("socket event", value.kind()))?;

        let data = || {
            value
                .field("data")
                .ok_or_else(|| Error::unexpected_value("event data", "nothing"))
        };

        match code {
            CONNECTED => Ok(Self::Connected),
            DATA_RECEIVED => {
                let data = data()?;
                data.as_bytes()
                    .map(|b| Self::DataReceived(b.to_vec()))
                    .ok_or_else(|| Error::unexpected_value("bytes", data.kind()))
            }
            SOCKET_ERROR | TEXT_RECEIVED => {
                let data = data()?;
                let text = data
                    .as_str()
                    .ok_or_else(|| Error::unexpected_value("string", data.kind()))?
                    .to_string();
                Ok(if code == SOCKET_ERROR {
                    Self::Error(text)
                } else {
                    Self::TextReceived(text)
                })
            }
            CLOSED => Ok(Self::Closed),
            _ => Err(Error::unexpected_value("socket event type", "unknown code")),
        }
    }
}

// ============================================================================
// Payload
// ============================================================================

/// Outgoing frame contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Sent as a binary frame.
    Binary(Vec<u8>),
    /// Sent as a text frame.
    Text(String),
}

impl Payload {
    /// Returns the payload length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Binary(b) => b.len(),
            Self::Text(t) => t.len(),
        }
    }

    /// Returns `true` if the payload is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the payload into raw bytes.
    #[inline]
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Binary(b) => b,
            Self::Text(t) => t.into_bytes(),
        }
    }
}

impl TryFrom<HostValue> for Payload {
    type Error = Error;

    /// Byte buffers become binary frames, strings become text frames.
    fn try_from(value: HostValue) -> Result<Self> {
        match value {
            HostValue::Bytes(b) => Ok(Self::Binary(b)),
            HostValue::String(s) => Ok(Self::Text(s)),
            other => Err(Error::unexpected_value("bytes or string", other.kind())),
        }
    }
}

impl From<Vec<u8>> for Payload {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

impl From<&[u8]> for Payload {
    #[inline]
    fn from(value: &[u8]) -> Self {
        Self::Binary(value.to_vec())
    }
}

impl From<String> for Payload {
    #[inline]
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Payload {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes() {
        assert_eq!(SocketEvent::Connected.type_code(), 0);
        assert_eq!(SocketEvent::DataReceived(vec![]).type_code(), 1);
        assert_eq!(SocketEvent::error("x").type_code(), 2);
        assert_eq!(SocketEvent::Closed.type_code(), 3);
        assert_eq!(SocketEvent::TextReceived(String::new()).type_code(), 4);
    }

    #[test]
    fn test_only_closed_is_terminal() {
        assert!(SocketEvent::Closed.is_terminal());
        assert!(!SocketEvent::error("x").is_terminal());
        assert!(!SocketEvent::Connected.is_terminal());
    }

    #[test]
    fn test_data_event_boundary_form() {
        let value = SocketEvent::DataReceived(vec![1, 2, 3]).into_host_value();
        assert_eq!(value.field_u32("type"), Some(1));
        assert_eq!(
            value.field("data").and_then(HostValue::as_bytes),
            Some(&[1u8, 2, 3][..])
        );

        let decoded = SocketEvent::from_host_value(&value).expect("decode");
        assert_eq!(decoded, SocketEvent::DataReceived(vec![1, 2, 3]));
    }

    #[test]
    fn test_error_event_carries_message() {
        let value = SocketEvent::error("socket is not connected").into_host_value();
        assert_eq!(
            value.field("data").and_then(HostValue::as_str),
            Some("socket is not connected")
        );
    }

    #[test]
    fn test_decode_rejects_unknown_code() {
        let value = HostValue::object([("type", HostValue::Number(17))]);
        assert!(SocketEvent::from_host_value(&value).is_err());
    }

    #[test]
    fn test_decode_rejects_missing_data() {
        let value = HostValue::object([("type", HostValue::Number(1))]);
        assert!(SocketEvent::from_host_value(&value).is_err());
    }

    #[test]
    fn test_payload_from_host_value() {
        let binary = Payload::try_from(HostValue::bytes(vec![7u8])).expect("binary");
        assert_eq!(binary, Payload::Binary(vec![7]));

        let text = Payload::try_from(HostValue::string("hello")).expect("text");
        assert_eq!(text, Payload::Text("hello".into()));

        assert!(Payload::try_from(HostValue::Number(1)).is_err());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&SocketEvent::TextReceived("hi".into())).expect("json");
        assert_eq!(json, r#"{"type":"textReceived","data":"hi"}"#);
    }
}
