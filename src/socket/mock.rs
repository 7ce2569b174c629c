//! Scripted socket transport for unit tests.
//!
//! Records every open, send and close; tests drive the "callbacks" by
//! pushing through the recorded sinks.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};

use super::transport::{ReadyState, SharedReadyState, SocketConnection, SocketTransport};
use super::{EventSink, Payload, SocketEvent};

/// One connection opened through the mock.
pub(crate) struct MockRecord {
    pub address: String,
    pub sink: EventSink,
    pub state: SharedReadyState,
    pub sent: Vec<Payload>,
    pub close_requested: bool,
}

#[derive(Clone, Default)]
pub(crate) struct MockSocketTransport {
    records: Arc<Mutex<Vec<MockRecord>>>,
    reject: Arc<Mutex<Option<String>>>,
}

impl MockSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `open` fail with a connection error.
    pub fn reject_next(&self, message: &str) {
        *self.reject.lock() = Some(message.to_string());
    }

    pub fn connection_count(&self) -> usize {
        self.records.lock().len()
    }

    pub fn address(&self, index: usize) -> String {
        self.records.lock()[index].address.clone()
    }

    pub fn sink(&self, index: usize) -> EventSink {
        self.records.lock()[index].sink.clone()
    }

    /// Simulates the open callback.
    pub fn simulate_open(&self, index: usize) {
        let sink = {
            let records = self.records.lock();
            records[index].state.set(ReadyState::Open);
            records[index].sink.clone()
        };
        sink.push(SocketEvent::Connected);
    }

    /// Simulates the close callback.
    pub fn simulate_close(&self, index: usize) {
        let sink = {
            let records = self.records.lock();
            records[index].state.set(ReadyState::Closed);
            records[index].sink.clone()
        };
        sink.push(SocketEvent::Closed);
    }

    /// Simulates an incoming frame or error.
    pub fn simulate(&self, index: usize, event: SocketEvent) {
        self.sink(index).push(event);
    }

    pub fn sent(&self, index: usize) -> Vec<Payload> {
        self.records.lock()[index].sent.clone()
    }

    pub fn close_requested(&self, index: usize) -> bool {
        self.records.lock()[index].close_requested
    }
}

impl SocketTransport for MockSocketTransport {
    fn open(&self, address: &str, sink: EventSink) -> Result<Box<dyn SocketConnection>> {
        if let Some(message) = self.reject.lock().take() {
            return Err(Error::connection(message));
        }

        let state = SharedReadyState::connecting();
        let mut records = self.records.lock();
        records.push(MockRecord {
            address: address.to_string(),
            sink,
            state: state.clone(),
            sent: Vec::new(),
            close_requested: false,
        });

        Ok(Box::new(MockConnection {
            records: Arc::clone(&self.records),
            index: records.len() - 1,
            state,
        }))
    }
}

struct MockConnection {
    records: Arc<Mutex<Vec<MockRecord>>>,
    index: usize,
    state: SharedReadyState,
}

impl SocketConnection for MockConnection {
    fn send(&mut self, payload: Payload) -> Result<()> {
        self.state.get().check_sendable()?;
        self.records.lock()[self.index].sent.push(payload);
        Ok(())
    }

    fn close(&mut self) {
        self.state.set(ReadyState::Closing);
        self.records.lock()[self.index].close_requested = true;
    }

    fn ready_state(&self) -> ReadyState {
        self.state.get()
    }
}
