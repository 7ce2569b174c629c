//! Request tracker: correlation ids and the pending result table.
//!
//! Each request gets the next id (0, 1, 2, ...) and runs independently.
//! The transport reports back through a [`Completion`], which stores the
//! outcome under that id. Polling removes the outcome, so every result is
//! delivered at most once.
//!
//! | Slot | `poll_result` |
//! |------|---------------|
//! | absent (in flight, never issued, or already polled) | `None` |
//! | `Ok(body)` (status 200) | `Some(Ok(body))`, then absent |
//! | `Err(failure)` (other status or transport error) | `Some(Err(failure))`, then absent |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::boundary::HostValue;
use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::transport::HttpTransport;
use super::HttpRequest;

// ============================================================================
// Constants
// ============================================================================

/// The only status treated as success.
pub const SUCCESS_STATUS: u16 = 200;

// ============================================================================
// Types
// ============================================================================

/// Result of a finished request: the body, or why there is none.
pub type RequestOutcome = StdResult<Vec<u8>, HttpFailure>;

/// Map of request ids to finished, unpolled outcomes.
type ResultTable = FxHashMap<RequestId, RequestOutcome>;

// ============================================================================
// HttpFailure
// ============================================================================

/// Why a request produced no body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpFailure {
    /// The server answered with a status other than 200.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The request never produced a response.
    #[error("Transport failure: {0}")]
    Transport(String),
}

impl HttpFailure {
    /// Returns the response status, if a response arrived.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status(status) => Some(*status),
            Self::Transport(_) => None,
        }
    }

    /// Encodes the failure as a boundary object.
    ///
    /// `status` is 0 for transport failures.
    #[must_use]
    pub fn into_host_value(self) -> HostValue {
        let status = u32::from(self.status().unwrap_or_default());
        HostValue::object([
            ("status", HostValue::Number(status)),
            ("error", HostValue::String(self.to_string())),
        ])
    }
}

// ============================================================================
// Completion
// ============================================================================

/// One-shot reporter handed to the transport for a single request.
#[derive(Debug)]
pub struct Completion {
    /// Request this completion belongs to.
    id: RequestId,
    /// Result table (shared with the tracker).
    results: Arc<Mutex<ResultTable>>,
}

impl Completion {
    /// Returns the request id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Reports a response.
    ///
    /// Status 200 stores `body`; anything else stores a
    /// [`HttpFailure::Status`].
    pub fn finish(self, status: u16, body: Vec<u8>) {
        if status == SUCCESS_STATUS {
            trace!(id = %self.id, len = body.len(), "Request completed");
            self.store(Ok(body));
        } else {
            warn!(id = %self.id, status, "Request failed with status");
            self.store(Err(HttpFailure::Status(status)));
        }
    }

    /// Reports a transport-level failure.
    pub fn fail(self, message: impl ToString) {
        let message = message.to_string();
        warn!(id = %self.id, error = %message, "Failed to make a request");
        self.store(Err(HttpFailure::Transport(message)));
    }

    fn store(self, outcome: RequestOutcome) {
        self.results.lock().insert(self.id, outcome);
    }
}

// ============================================================================
// RequestTracker
// ============================================================================

/// Issues HTTP requests and hands back each result by id.
pub struct RequestTracker {
    /// Starts requests.
    transport: Box<dyn HttpTransport>,
    /// Next id to hand out; `None` once the id space is exhausted.
    next_id: Option<RequestId>,
    /// Finished, unpolled outcomes (shared with completions).
    results: Arc<Mutex<ResultTable>>,
}

impl RequestTracker {
    /// Creates a tracker whose first id is 0.
    #[must_use]
    pub fn new(transport: impl HttpTransport + 'static) -> Self {
        Self::with_boxed_transport(Box::new(transport))
    }

    /// Creates a tracker from a boxed transport.
    #[must_use]
    pub fn with_boxed_transport(transport: Box<dyn HttpTransport>) -> Self {
        Self {
            transport,
            next_id: Some(RequestId::FIRST),
            results: Arc::new(Mutex::new(ResultTable::default())),
        }
    }

    /// Starts `request` and returns its correlation id immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestIdsExhausted`] after `i32::MAX` requests,
    /// since ids are never reused.
    pub fn make_request(&mut self, request: HttpRequest) -> Result<RequestId> {
        let id = self.next_id.ok_or(Error::RequestIdsExhausted)?;
        self.next_id = id.next();

        debug!(%id, method = %request.method, url = %request.url, "Making request");

        let completion = Completion {
            id,
            results: Arc::clone(&self.results),
        };
        self.transport.dispatch(request, completion);

        Ok(id)
    }

    /// Takes the outcome of request `id`, if it has finished.
    ///
    /// Returns `None` while in flight, for ids never issued, and for every
    /// poll after the outcome was taken.
    pub fn poll_result(&mut self, id: RequestId) -> Option<RequestOutcome> {
        let outcome = self.results.lock().remove(&id);
        if outcome.is_some() {
            trace!(%id, "Result delivered");
        }
        outcome
    }

    /// Returns the number of finished results nobody has polled yet.
    #[inline]
    #[must_use]
    pub fn pending_results(&self) -> usize {
        self.results.lock().len()
    }

    /// Returns the id the next request will receive.
    #[inline]
    #[must_use]
    pub fn next_id(&self) -> Option<RequestId> {
        self.next_id
    }
}

// ============================================================================
// Tests
// ============================================================================
