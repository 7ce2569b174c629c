//! HTTP transport seam.

use super::{Completion, HttpRequest};

/// Performs HTTP requests on behalf of a [`RequestTracker`](super::RequestTracker).
pub trait HttpTransport: Send {
    /// Starts `request` and returns immediately.
    ///
    /// The transport must eventually call [`Completion::finish`] or
    /// [`Completion::fail`], unless the request hangs forever.
    fn dispatch(&self, request: HttpRequest, completion: Completion);
}
