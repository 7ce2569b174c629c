//! Request description and the typed client-side API.
//!
//! # Example
//!
//! ```ignore
//! use pollnet::{Method, RequestBuilder, ResponseType};
//!
//! let pending = RequestBuilder::new("https://example.test/scores")
//!     .method(Method::Post)
//!     .header("Content-Type", "application/json")
//!     .body(r#"{"score":42}"#)
//!     .response_type(ResponseType::Text)
//!     .send(&mut tracker)?;
//!
//! // Later, once per frame:
//! if let Some(result) = pending.try_recv(&mut tracker) {
//!     println!("{:?}", result?);
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::{Method, RequestTracker};

// ============================================================================
// HttpRequest
// ============================================================================

/// Everything a transport needs to perform one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Header name/value pairs, in insertion order.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Body,
}

impl HttpRequest {
    /// Creates a request with no headers and no body.
    #[inline]
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Body::Empty,
        }
    }
}

// ============================================================================
// Body
// ============================================================================

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl Body {
    /// Returns `true` for [`Body::Empty`].
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<String> for Body {
    /// An empty string means no body.
    fn from(value: String) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// How the response body should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Decode as UTF-8 text.
    #[default]
    Text,
    /// Keep raw bytes.
    Bytes,
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePayload {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl ResponsePayload {
    /// Returns the payload as bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }
}

// ============================================================================
// RequestBuilder
// ============================================================================

/// Fluent construction of an [`HttpRequest`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    request: HttpRequest,
    response_type: ResponseType,
}

impl RequestBuilder {
    /// Starts a `GET` request to `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            request: HttpRequest::new(Method::Get, url),
            response_type: ResponseType::default(),
        }
    }

    /// Sets the method.
    #[inline]
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.request.method = method;
        self
    }

    /// Appends a header.
    #[inline]
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    #[inline]
    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.request.body = body.into();
        self
    }

    /// Sets how the response body is decoded.
    #[inline]
    #[must_use]
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Returns the request without sending it.
    #[inline]
    #[must_use]
    pub fn build(self) -> HttpRequest {
        self.request
    }

    /// Sends the request through `tracker`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestIdsExhausted`] if the tracker is out of ids.
    pub fn send(self, tracker: &mut RequestTracker) -> Result<PendingRequest> {
        let id = tracker.make_request(self.request)?;
        Ok(PendingRequest {
            id,
            response_type: self.response_type,
        })
    }
}

// ============================================================================
// PendingRequest
// ============================================================================

/// A request in flight, polled for its decoded result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    id: RequestId,
    response_type: ResponseType,
}

impl PendingRequest {
    /// Returns the correlation id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Takes the result, if the request has finished.
    ///
    /// Yields `Some` exactly once.
    pub fn try_recv(&self, tracker: &mut RequestTracker) -> Option<Result<ResponsePayload>> {
        let outcome = tracker.poll_result(self.id)?;
        Some(outcome.map_err(Error::from).and_then(|body| self.decode(body)))
    }

    fn decode(&self, body: Vec<u8>) -> Result<ResponsePayload> {
        match self.response_type {
            ResponseType::Text => Ok(ResponsePayload::Text(String::from_utf8(body)?)),
            ResponseType::Bytes => Ok(ResponsePayload::Bytes(body)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
