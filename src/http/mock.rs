//! Scripted HTTP transport for unit tests.
//!
//! Holds every dispatched request's [`Completion`] until the test decides
//! how it finishes.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::identifiers::RequestId;

use super::{Completion, HttpRequest, HttpTransport};

#[derive(Default)]
struct MockState {
    requests: Vec<HttpRequest>,
    completions: FxHashMap<RequestId, Completion>,
}

#[derive(Clone, Default)]
pub(crate) struct MockHttpTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockHttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    pub fn request(&self, index: usize) -> HttpRequest {
        self.state.lock().requests[index].clone()
    }

    /// Simulates a response for `id`.
    pub fn complete(&self, id: RequestId, status: u16, body: Vec<u8>) {
        let completion = self.state.lock().completions.remove(&id);
        if let Some(completion) = completion {
            completion.finish(status, body);
        }
    }

    /// Simulates a network failure for `id`.
    pub fn fail(&self, id: RequestId, message: &str) {
        let completion = self.state.lock().completions.remove(&id);
        if let Some(completion) = completion {
            completion.fail(message);
        }
    }
}

impl HttpTransport for MockHttpTransport {
    fn dispatch(&self, request: HttpRequest, completion: Completion) {
        let mut state = self.state.lock();
        state.requests.push(request);
        state.completions.insert(completion.id(), completion);
    }
}
