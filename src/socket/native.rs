//! Native socket transport selected by address scheme.
//!
//! | Scheme | Connection |
//! |--------|------------|
//! | `ws://`, `wss://` | [`WebSocketConnection`] |
//! | `tcp://host:port` | [`TcpConnection`] (length-prefixed frames) |

// ============================================================================
// Imports
// ============================================================================

use tokio::runtime::Handle;
use tracing::debug;
use url::Url;

use crate::bridge::SocketOptions;
use crate::error::{Error, Result};

use super::tcp::TcpConnection;
use super::transport::{SocketConnection, SocketTransport};
use super::websocket::WebSocketConnection;
use super::EventSink;

// ============================================================================
// NativeSocketTransport
// ============================================================================

/// Opens WebSocket and TCP connections on a tokio runtime.
#[derive(Debug, Clone)]
pub struct NativeSocketTransport {
    /// Runtime the connection tasks are spawned on.
    runtime: Handle,
    /// Socket configuration.
    options: SocketOptions,
}

impl NativeSocketTransport {
    /// Creates a transport spawning onto `runtime`.
    #[inline]
    #[must_use]
    pub fn new(runtime: Handle, options: SocketOptions) -> Self {
        Self { runtime, options }
    }

    /// Returns the socket configuration.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &SocketOptions {
        &self.options
    }
}

impl SocketTransport for NativeSocketTransport {
    fn open(&self, address: &str, sink: EventSink) -> Result<Box<dyn SocketConnection>> {
        let url = Url::parse(address)?;

        match url.scheme() {
            "ws" | "wss" => {
                debug!(%address, "Opening WebSocket connection");
                Ok(Box::new(WebSocketConnection::spawn(
                    &self.runtime,
                    address.to_string(),
                    sink,
                    self.options.tcp_nodelay,
                )))
            }

            "tcp" => {
                let authority = tcp_authority(&url)?;
                debug!(%authority, "Opening TCP connection");
                Ok(Box::new(TcpConnection::spawn(
                    &self.runtime,
                    authority,
                    sink,
                    self.options.tcp_nodelay,
                    self.options.max_frame_len,
                )))
            }

            other => Err(Error::connection(format!("unsupported scheme: {other}"))),
        }
    }
}

/// Extracts `host:port` from a `tcp://` URL.
fn tcp_authority(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::connection(format!("missing host in {url}")))?;
    let port = url
        .port()
        .ok_or_else(|| Error::connection(format!("missing port in {url}")))?;
    Ok(format!("{host}:{port}"))
}

// ============================================================================
// Tests
// ============================================================================
