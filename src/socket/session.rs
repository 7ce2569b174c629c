//! The socket session: one logical connection and its event queue.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Error;

use super::queue::EventQueue;
use super::transport::{ReadyState, SocketConnection, SocketTransport};
use super::{Payload, SocketEvent};

// ============================================================================
// SocketSession
// ============================================================================

/// Owns at most one active connection and buffers its events.
///
/// Every operation returns immediately. Failures of the connection itself
/// (handshake errors, failed sends) are never returned to the caller; they
/// are queued as [`SocketEvent::Error`] and observed by polling.
///
/// # Example
///
/// ```ignore
/// let mut session = SocketSession::new(transport);
/// session.connect("wss://example.test/ws");
///
/// loop {
///     while let Some(event) = session.poll_next_event() {
///         match event {
///             SocketEvent::Connected => session.send(vec![1, 2, 3]),
///             SocketEvent::DataReceived(data) => println!("{data:?}"),
///             SocketEvent::Closed => return,
///             _ => {}
///         }
///     }
///     // ... do other work for this frame
/// }
/// ```
pub struct SocketSession {
    /// Opens new connections.
    transport: Box<dyn SocketTransport>,
    /// Events of the active connection.
    queue: EventQueue,
    /// Active connection, if any.
    connection: Option<Box<dyn SocketConnection>>,
    /// Address of the active connection.
    address: Option<String>,
}

impl SocketSession {
    /// Creates a session with no connection.
    #[must_use]
    pub fn new(transport: impl SocketTransport + 'static) -> Self {
        Self::with_boxed_transport(Box::new(transport))
    }

    /// Creates a session from a boxed transport.
    #[must_use]
    pub fn with_boxed_transport(transport: Box<dyn SocketTransport>) -> Self {
        Self {
            transport,
            queue: EventQueue::new(),
            connection: None,
            address: None,
        }
    }

    /// Opens a connection to `address`, replacing the current one.
    ///
    /// Undelivered events of the previous connection are discarded and the
    /// previous connection is closed; its late callbacks are ignored.
    /// If the transport rejects the address outright, an `Error` event
    /// followed by `Closed` is queued.
    pub fn connect(&mut self, address: impl Into<String>) {
        let address = address.into();

        if let Some(mut previous) = self.connection.take() {
            debug!(
                previous = self.address.as_deref().unwrap_or_default(),
                "Closing previous connection"
            );
            previous.close();
        }

        let sink = self.queue.reset();
        debug!(%address, generation = sink.generation(), "Connecting");

        match self.transport.open(&address, sink.clone()) {
            Ok(connection) => self.connection = Some(connection),
            Err(e) => {
                warn!(%address, error = %e, "Connection rejected");
                sink.push(SocketEvent::error(&e));
                sink.push(SocketEvent::Closed);
            }
        }

        self.address = Some(address);
    }

    /// Sends a payload on the active connection.
    ///
    /// Byte buffers go out as binary frames, strings as text frames.
    /// Failures are queued as `Error` events.
    pub fn send(&mut self, payload: impl Into<Payload>) {
        let payload = payload.into();

        let result = match self.connection.as_mut() {
            Some(connection) => connection.send(payload),
            None => Err(Error::NotConnected),
        };

        if let Err(e) = result {
            warn!(error = %e, "Error sending data");
            self.queue.sink().push(SocketEvent::error(&e));
        }
    }

    /// Requests closure of the active connection.
    ///
    /// `Closed` is queued later by the transport, not by this call.
    pub fn close(&mut self) {
        match self.connection.as_mut() {
            Some(connection) => {
                debug!(
                    address = self.address.as_deref().unwrap_or_default(),
                    "Closing connection by request"
                );
                connection.close();
            }
            None => debug!("Close requested with no active connection"),
        }
    }

    /// Removes and returns the oldest undelivered event.
    ///
    /// Delivering `Closed` releases the finished connection.
    #[inline]
    pub fn poll_next_event(&mut self) -> Option<SocketEvent> {
        let event = self.queue.pop()?;

        if event.is_terminal() && self.connection.take().is_some() {
            debug!(
                address = self.address.as_deref().unwrap_or_default(),
                "Connection finished, handle released"
            );
        }

        Some(event)
    }

    /// Returns the number of undelivered events.
    #[inline]
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Returns the state of the active connection.
    ///
    /// [`ReadyState::Closed`] when there is none.
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        self.connection
            .as_ref()
            .map_or(ReadyState::Closed, |c| c.ready_state())
    }

    /// Returns `true` if the active connection is open.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    /// Returns the address of the most recent `connect`.
    #[inline]
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Delivers events to `handler` instead of queueing them.
    ///
    /// Events queued before the handler was installed stay pollable.
    pub fn set_event_handler<F>(&self, handler: F)
    where
        F: Fn(SocketEvent) + Send + Sync + 'static,
    {
        self.queue.set_handler(Arc::new(handler));
    }

    /// Removes the handler installed by [`set_event_handler`](Self::set_event_handler).
    pub fn clear_event_handler(&self) {
        self.queue.clear_handler();
    }
}

// ============================================================================
// Tests
// ============================================================================
