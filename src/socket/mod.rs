//! Socket session and transports.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  connect/send/close   ┌──────────────────┐
//! │ SocketSession│──────────────────────►│ SocketConnection │
//! │              │                       │ (tokio task)     │
//! │  EventQueue  │◄──────────────────────│  EventSink       │
//! └──────────────┘   Connected/Data/...  └──────────────────┘
//!        ▲
//!        │ poll_next_event()
//!     caller
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `event` | [`SocketEvent`] and [`Payload`] |
//! | `queue` | Generation-scoped FIFO |
//! | `session` | [`SocketSession`] |
//! | `transport` | Transport traits and ready state |
//! | `native` | Scheme-dispatching tokio transport |
//! | `websocket` | `ws://` / `wss://` connection |
//! | `tcp` | `tcp://` connection with framing |
//! | `framing` | Length-prefixed frame codec |

// ============================================================================
// Submodules
// ============================================================================

/// Socket events and outgoing payloads.
pub mod event;

/// Length-prefixed frame codec.
pub mod framing;

/// Native transport dispatching on address scheme.
pub mod native;

/// Ordered event queue.
pub mod queue;

/// The socket session.
pub mod session;

/// Raw TCP connection.
pub mod tcp;

/// Transport traits.
pub mod transport;

/// WebSocket connection.
pub mod websocket;

#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Re-exports
// ============================================================================

pub use event::{Payload, SocketEvent};
pub use native::NativeSocketTransport;
pub use queue::{EventHandler, EventQueue, EventSink};
pub use session::SocketSession;
pub use transport::{ReadyState, SharedReadyState, SocketConnection, SocketTransport};
