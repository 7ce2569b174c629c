//! pollnet - Polling network bridge for sandboxed callers.
//!
//! This library lets code that cannot block or receive callbacks (a
//! sandboxed module driven by a frame loop) use WebSockets and HTTP.
//!
//! # Architecture
//!
//! The bridge follows a host/sandbox model:
//!
//! - **Host (Rust)**: Owns connections, runs I/O on a tokio runtime
//! - **Sandbox (caller)**: Passes integers and handles, polls for results
//!
//! Key design principles:
//!
//! - Every call returns immediately; completions are polled
//! - Socket events are delivered in arrival order, each exactly once
//! - HTTP results are keyed by a correlation id and delivered once
//! - `-1` means "nothing ready" at the boundary
//!
//! # Quick Start
//!
//! ```no_run
//! use pollnet::{Bridge, Marshaller, Result, SocketEvent};
//!
//! fn main() -> Result<()> {
//!     let mut bridge = Bridge::builder().build()?;
//!
//!     let address = bridge.handles_mut().wrap_string("wss://example.test/ws");
//!     bridge.ws_connect(address)?;
//!
//!     loop {
//!         let handle = bridge.ws_try_recv();
//!         if handle.is_none() {
//!             break;
//!         }
//!         let value = bridge.handles_mut().consume(handle)?;
//!         println!("{:?}", SocketEvent::from_host_value(&value)?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`boundary`] | Handle table and host values |
//! | [`bridge`] | [`Bridge`], builder and options |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`http`] | Request tracker and `reqwest` transport |
//! | [`identifiers`] | Handle and request id wrappers |
//! | [`socket`] | Socket session and WebSocket/TCP transports |

// ============================================================================
// Modules
// ============================================================================

/// Boundary marshalling.
///
/// Values the sandbox cannot represent live in a [`HandleTable`].
pub mod boundary;

/// Host-binding layer.
///
/// Use [`Bridge::builder()`] to create a configured bridge.
pub mod bridge;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// HTTP request tracking.
pub mod http;

/// Type-safe identifiers.
///
/// Newtype wrappers keep handles and request ids apart.
pub mod identifiers;

/// Socket session and transports.
pub mod socket;

// ============================================================================
// Re-exports
// ============================================================================

// Boundary types
pub use boundary::{HandleTable, HostValue, Marshaller};

// Bridge types
pub use bridge::{Bridge, BridgeBuilder, CRATE_VERSION, HttpOptions, Import, SocketOptions};

// Error types
pub use error::{Error, Result};

// HTTP types
pub use http::{
    Body, Completion, HttpFailure, HttpRequest, HttpTransport, Method, PendingRequest,
    RequestBuilder, RequestOutcome, RequestTracker, ReqwestTransport, ResponsePayload,
    ResponseType,
};

// Identifier types
pub use identifiers::{Handle, NONE_SENTINEL, RequestId};

// Socket types
pub use socket::{
    EventSink, NativeSocketTransport, Payload, ReadyState, SocketConnection, SocketEvent,
    SocketSession, SocketTransport,
};
