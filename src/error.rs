//! Error types for pollnet.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use pollnet::{Bridge, Result};
//!
//! fn example(bridge: &mut Bridge) -> Result<()> {
//!     let address = bridge.handles_mut().wrap_string("wss://example.test/ws");
//!     bridge.ws_connect(address)?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Boundary | [`Error::InvalidHandle`], [`Error::UnexpectedValue`], [`Error::UnknownMethod`], [`Error::UnknownImport`], [`Error::ArgumentCount`] |
//! | Connection | [`Error::Connection`], [`Error::NotConnected`], [`Error::ConnectionClosed`] |
//! | Request | [`Error::RequestIdsExhausted`], [`Error::Request`] |
//! | Framing | [`Error::FrameTooLarge`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`], [`Error::Http`], [`Error::Url`], [`Error::Utf8`] |
//!
//! Socket failures never reach callers as `Err`: the session turns them
//! into [`SocketEvent::Error`](crate::SocketEvent::Error) entries. HTTP
//! failures surface as [`HttpFailure`](crate::HttpFailure) results.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;
use std::string::FromUtf8Error;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::http::HttpFailure;
use crate::identifiers::Handle;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when bridge configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Boundary Errors
    // ========================================================================
    /// Handle does not refer to a stored value.
    ///
    /// Returned when a handle was never issued or was already consumed.
    #[error("Invalid handle: {handle}")]
    InvalidHandle {
        /// The offending handle.
        handle: Handle,
    },

    /// Stored value has the wrong kind for the call.
    #[error("Unexpected value: expected {expected}, found {found}")]
    UnexpectedValue {
        /// Kind the call expected.
        expected: &'static str,
        /// Kind that was actually stored.
        found: &'static str,
    },

    /// HTTP method code outside `0..=3`.
    #[error("Unknown HTTP method code: {code}")]
    UnknownMethod {
        /// The unrecognized code.
        code: i32,
    },

    /// Import name not provided by the bridge.
    #[error("Unknown import: {name}")]
    UnknownImport {
        /// The unrecognized import name.
        name: String,
    },

    /// Import invoked with the wrong number of arguments.
    #[error("Import {import} expects {expected} arguments, got {actual}")]
    ArgumentCount {
        /// Import name.
        import: &'static str,
        /// Expected argument count.
        expected: usize,
        /// Provided argument count.
        actual: usize,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Connection could not be opened.
    ///
    /// Returned when the address is malformed or the scheme is unsupported.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Operation requires an open connection.
    #[error("Socket is not connected")]
    NotConnected,

    /// Connection closed while the operation was in progress.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Request Errors
    // ========================================================================
    /// Every correlation id has been handed out.
    ///
    /// Ids are never reused, so the tracker cannot issue more requests.
    #[error("Request ids exhausted")]
    RequestIdsExhausted,

    /// HTTP request finished without a usable body.
    #[error("Request failed: {0}")]
    Request(#[from] HttpFailure),

    // ========================================================================
    // Framing Errors
    // ========================================================================
    /// Length-prefixed frame exceeds the configured maximum.
    #[error("Frame of {len} bytes exceeds limit of {max} bytes")]
    FrameTooLarge {
        /// Announced frame length.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parse error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Response body is not valid UTF-8.
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid handle error.
    #[inline]
    pub fn invalid_handle(handle: Handle) -> Self {
        Self::InvalidHandle { handle }
    }

    /// Creates an unexpected value error.
    #[inline]
    pub fn unexpected_value(expected: &'static str, found: &'static str) -> Self {
        Self::UnexpectedValue { expected, found }
    }

    /// Creates an unknown method error.
    #[inline]
    pub fn unknown_method(code: i32) -> Self {
        Self::UnknownMethod { code }
    }

    /// Creates an unknown import error.
    #[inline]
    pub fn unknown_import(name: impl Into<String>) -> Self {
        Self::UnknownImport { name: name.into() }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a frame too large error.
    #[inline]
    pub fn frame_too_large(len: usize, max: usize) -> Self {
        Self::FrameTooLarge { len, max }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error was caused by bad values crossing the
    /// sandbox boundary.
    #[inline]
    #[must_use]
    pub fn is_boundary_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidHandle { .. }
                | Self::UnexpectedValue { .. }
                | Self::UnknownMethod { .. }
                | Self::UnknownImport { .. }
                | Self::ArgumentCount { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::NotConnected
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
