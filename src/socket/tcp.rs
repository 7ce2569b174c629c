//! Raw TCP connection with length-prefixed frames.
//!
//! Reading runs on its own task because [`read_frame`] is not cancel-safe;
//! the writer loop selects between outgoing commands and reader completion.

// ============================================================================
// Imports
// ============================================================================

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};

use super::framing::{read_frame, write_frame};
use super::transport::{ReadyState, SharedReadyState, SocketConnection};
use super::{EventSink, Payload, SocketEvent};

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the writer loop.
enum ConnectionCommand {
    /// Write a frame.
    Send(Payload),
    /// Shut the stream down and stop.
    Close,
}

// ============================================================================
// TcpConnection
// ============================================================================

/// Handle to a framed TCP connection driven by background tasks.
pub struct TcpConnection {
    /// Channel for sending commands to the writer loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Lifecycle state (shared with the tasks).
    state: SharedReadyState,
}

impl TcpConnection {
    /// Spawns the connection tasks on `runtime` and returns immediately.
    ///
    /// `authority` is a `host:port` pair.
    pub(crate) fn spawn(
        runtime: &Handle,
        authority: String,
        sink: EventSink,
        tcp_nodelay: bool,
        max_frame_len: usize,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let state = SharedReadyState::connecting();

        runtime.spawn(Self::run(
            authority,
            sink,
            state.clone(),
            command_rx,
            tcp_nodelay,
            max_frame_len,
        ));

        Self { command_tx, state }
    }

    async fn run(
        authority: String,
        sink: EventSink,
        state: SharedReadyState,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        tcp_nodelay: bool,
        max_frame_len: usize,
    ) {
        let stream = match TcpStream::connect(authority.as_str()).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(%authority, error = %e, "TCP connect failed");
                state.set(ReadyState::Closed);
                sink.push(SocketEvent::error(&e));
                sink.push(SocketEvent::Closed);
                return;
            }
        };

        if let Err(e) = stream.set_nodelay(tcp_nodelay) {
            warn!(error = %e, "Failed to set TCP_NODELAY");
        }

        let (read_half, mut write_half) = stream.into_split();

        if !state.open_if_connecting() {
            debug!(%authority, "Close requested while connecting");
            let _ = write_half.shutdown().await;
            state.set(ReadyState::Closed);
            sink.push(SocketEvent::Closed);
            return;
        }

        debug!(%authority, "TCP connected");
        sink.push(SocketEvent::Connected);

        let mut reader = tokio::spawn(Self::read_loop(read_half, sink.clone(), max_frame_len));

        loop {
            tokio::select! {
                _ = &mut reader => {
                    debug!("TCP reader finished");
                    break;
                }

                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send(payload)) => {
                            let data = payload.into_bytes();
                            if let Err(e) = write_frame(&mut write_half, &data).await {
                                warn!(error = %e, "Failed to send frame");
                                sink.push(SocketEvent::error(&e));
                            }
                        }

                        Some(ConnectionCommand::Close) | None => {
                            debug!("Closing TCP connection");
                            reader.abort();
                            let _ = write_half.shutdown().await;
                            break;
                        }
                    }
                }
            }
        }

        state.set(ReadyState::Closed);
        sink.push(SocketEvent::Closed);

        debug!(%authority, "TCP connection terminated");
    }

    /// Reads frames until end of stream or error.
    async fn read_loop(mut read_half: OwnedReadHalf, sink: EventSink, max_frame_len: usize) {
        loop {
            match read_frame(&mut read_half, max_frame_len).await {
                Ok(Some(frame)) => {
                    trace!(len = frame.len(), "Frame received");
                    sink.push(SocketEvent::DataReceived(frame));
                }
                Ok(None) => {
                    debug!("TCP stream ended");
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "TCP read failed");
                    sink.push(SocketEvent::error(&e));
                    return;
                }
            }
        }
    }
}

impl SocketConnection for TcpConnection {
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
