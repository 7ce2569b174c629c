//! Names of the calls the bridge exposes to the sandboxed caller.
//!
//! | Import | Arguments | Returns |
//! |--------|-----------|---------|
//! | `ws_connect` | address handle | 0 |
//! | `ws_send` | payload handle | 0 |
//! | `ws_close` | | 0 |
//! | `ws_try_recv` | | event handle or -1 |
//! | `http_make_request` | method, url, body, headers | request id |
//! | `http_try_recv` | request id | body handle, failure handle or -1 |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// ============================================================================
// Import
// ============================================================================

/// One call of the boundary surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Import {
    /// Open a socket connection.
    WsConnect,
    /// Send a frame on the open connection.
    WsSend,
    /// Close the connection.
    WsClose,
    /// Poll the next socket event.
    WsTryRecv,
    /// Start an HTTP request.
    HttpMakeRequest,
    /// Poll an HTTP result.
    HttpTryRecv,
}

impl Import {
    /// Every import, in registration order.
    pub const ALL: [Self; 6] = [
        Self::WsConnect,
        Self::WsSend,
        Self::WsClose,
        Self::WsTryRecv,
        Self::HttpMakeRequest,
        Self::HttpTryRecv,
    ];

    /// Returns the import name the caller links against.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WsConnect => "ws_connect",
            Self::WsSend => "ws_send",
            Self::WsClose => "ws_close",
            Self::WsTryRecv => "ws_try_recv",
            Self::HttpMakeRequest => "http_make_request",
            Self::HttpTryRecv => "http_try_recv",
        }
    }

    /// Returns the number of `i32` arguments the import takes.
    #[inline]
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::WsClose | Self::WsTryRecv => 0,
            Self::WsConnect | Self::WsSend | Self::HttpTryRecv => 1,
            Self::HttpMakeRequest => 4,
        }
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Import {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|import| import.name() == name)
            .ok_or_else(|| Error::unknown_import(name))
    }
}

impl TryFrom<&str> for Import {
    type Error = Error;

    #[inline]
    fn try_from(name: &str) -> Result<Self, Self::Error> {
        name.parse()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for import in Import::ALL {
            assert_eq!(import.name().parse::<Import>().ok(), Some(import));
        }
    }

    #[test]
    fn test_unknown_import() {
        let err = Import::try_from("ws_open").unwrap_err();
        assert!(matches!(err, Error::UnknownImport { ref name } if name == "ws_open"));
    }

    #[test]
    fn test_arity() {
        assert_eq!(Import::HttpMakeRequest.arity(), 4);
        assert_eq!(Import::WsTryRecv.arity(), 0);
        assert_eq!(Import::WsSend.arity(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(Import::HttpTryRecv.to_string(), "http_try_recv");
    }
}
