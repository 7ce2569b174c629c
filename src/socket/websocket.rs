//! WebSocket connection over `tokio-tungstenite`.
//!
//! # Event Loop
//!
//! Each connection spawns one task that:
//!
//! - performs the handshake and reports `Connected` or `Error` + `Closed`
//! - forwards binary and text frames as events
//! - writes outgoing payloads received from the handle
//! - sends a close frame when asked, then reports `Closed`

// ============================================================================
// Imports
// ============================================================================

use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async_with_config;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};

use super::transport::{ReadyState, SharedReadyState, SocketConnection};
use super::{EventSink, Payload, SocketEvent};

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Write a frame.
    Send(Payload),
    /// Send a close frame and stop.
    Close,
}

// ============================================================================
// WebSocketConnection
// ============================================================================

/// Handle to a WebSocket connection driven by a background task.
pub struct WebSocketConnection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Lifecycle state (shared with event loop).
    state: SharedReadyState,
}

impl WebSocketConnection {
    /// Spawns the event loop on `runtime` and returns immediately.
    pub(crate) fn spawn(
        runtime: &Handle,
        address: String,
        sink: EventSink,
        tcp_nodelay: bool,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let state = SharedReadyState::connecting();

        runtime.spawn(Self::run_event_loop(
            address,
            sink,
            state.clone(),
            command_rx,
            tcp_nodelay,
        ));

        Self { command_tx, state }
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        address: String,
        sink: EventSink,
        state: SharedReadyState,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        tcp_nodelay: bool,
    ) {
        let ws_stream = match connect_async_with_config(address.as_str(), None, tcp_nodelay).await
        {
            Ok((stream, _response)) => stream,
            Err(e) => {
                let e = Error::from(e);
                warn!(%address, error = %e, "WebSocket handshake failed");
                state.set(ReadyState::Closed);
                sink.push(SocketEvent::error(&e));
                sink.push(SocketEvent::Closed);
                return;
            }
        };

        let (mut ws_write, mut ws_read) = ws_stream.split();

        if !state.open_if_connecting() {
            debug!(%address, "Close requested during handshake");
            let _ = ws_write.close().await;
            state.set(ReadyState::Closed);
            sink.push(SocketEvent::Closed);
            return;
        }

        debug!(%address, "WebSocket connected");
        sink.push(SocketEvent::Connected);

        loop {
            tokio::select! {
                // Incoming frames
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Binary(data))) => {
                            trace!(len = data.len(), "Binary frame received");
                            sink.push(SocketEvent::DataReceived(data.to_vec()));
                        }

                        Some(Ok(Message::Text(text))) => {
                            trace!(len = text.len(), "Text frame received");
                            sink.push(SocketEvent::TextReceived(text.as_str().to_owned()));
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            let e = Error::from(e);
                            warn!(error = %e, "WebSocket error");
                            sink.push(SocketEvent::error(&e));
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Ping, Pong, raw frames
                        Some(Ok(_)) => {}
                    }
                }

                // Commands from the session
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send(payload)) => {
                            let message = match payload {
                                Payload::Binary(data) => Message::Binary(data.into()),
                                Payload::Text(text) => Message::Text(text.into()),
                            };

                            if let Err(e) = ws_write.send(message).await {
                                let e = Error::from(e);
                                warn!(error = %e, "Failed to send frame");
                                sink.push(SocketEvent::error(&e));
                            }
                        }

                        Some(ConnectionCommand::Close) => {
                            debug!("Closing WebSocket by request");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Connection handle dropped");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }
            }
        }

        state.set(ReadyState::Closed);
        sink.push(SocketEvent::Closed);

        debug!(%address, "Event loop terminated");
    }
}

impl SocketConnection for WebSocketConnection {
    fn send(&mut self, payload: Payload) -> Result<()> {
        self.state.get().check_sendable()?;
        self.command_tx
            .send(ConnectionCommand::Send(payload))
            .map_err(|_| Error::ConnectionClosed)
    }

    fn close(&mut self) {
        if matches!(self.state.get(), ReadyState::Closed) {
            return;
        }
        self.state.set(ReadyState::Closing);
        let _ = self.command_tx.send(ConnectionCommand::Close);
    }

    fn ready_state(&self) -> ReadyState {
        self.state.get()
    }
}
