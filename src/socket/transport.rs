//! Socket transport seam.
//!
//! A [`SocketTransport`] opens connections; each [`SocketConnection`]
//! reports its lifecycle through the [`EventSink`] it was opened with.
//! Opening and sending never block: progress is observed by polling the
//! session's queue.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::{Error, Result};

use super::{EventSink, Payload};

// ============================================================================
// Traits
// ============================================================================

/// Opens socket connections.
pub trait SocketTransport: Send {
    /// Starts connecting to `address`.
    ///
    /// Must return immediately. `Connected`, `Error` and `Closed` events
    /// are delivered later through `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is rejected up front (malformed,
    /// unsupported scheme). The session turns it into queued events.
    fn open(&self, address: &str, sink: EventSink) -> Result<Box<dyn SocketConnection>>;
}

/// A single connection opened by a [`SocketTransport`].
pub trait SocketConnection: Send {
    /// Queues `payload` for sending.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] while the connection is still opening
    /// - [`Error::ConnectionClosed`] once it is closing or closed
    fn send(&mut self, payload: Payload) -> Result<()>;

    /// Requests closure. `Closed` is delivered later by the transport.
    fn close(&mut self);

    /// Returns the current lifecycle state.
    fn ready_state(&self) -> ReadyState;
}

// ============================================================================
// ReadyState
// ============================================================================

/// Connection lifecycle, following the WebSocket `readyState` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReadyState {
    /// Handshake in progress.
    Connecting = 0,
    /// Open and able to send.
    Open = 1,
    /// Close requested.
    Closing = 2,
    /// Closed or failed.
    Closed = 3,
}

impl ReadyState {
    #[inline]
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }

    /// Checks whether a payload may be sent in this state.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] while connecting
    /// - [`Error::ConnectionClosed`] while closing or closed
    pub fn check_sendable(self) -> Result<()> {
        match self {
            Self::Open => Ok(()),
            Self::Connecting => Err(Error::NotConnected),
            Self::Closing | Self::Closed => Err(Error::ConnectionClosed),
        }
    }
}

/// Ready state shared between a connection handle and its I/O task.
#[derive(Debug, Clone)]
pub struct SharedReadyState(Arc<AtomicU8>);

impl SharedReadyState {
    /// Creates a state starting at [`ReadyState::Connecting`].
    #[must_use]
    pub fn connecting() -> Self {
        Self(Arc::new(AtomicU8::new(ReadyState::Connecting as u8)))
    }

    /// Reads the current state.
    #[inline]
    #[must_use]
    pub fn get(&self) -> ReadyState {
        ReadyState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Stores a new state.
    #[inline]
    pub fn set(&self, state: ReadyState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Moves from [`ReadyState::Connecting`] to [`ReadyState::Open`].
    ///
    /// Returns `false` if a close was requested during the handshake,
    /// leaving the state untouched.
    #[must_use]
    pub fn open_if_connecting(&self) -> bool {
        self.0
            .compare_exchange(
                ReadyState::Connecting as u8,
                ReadyState::Open as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

// ============================================================================
// Tests
// ============================================================================
