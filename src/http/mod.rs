//! HTTP request tracking.
//!
//! Requests are fire-and-poll: [`RequestTracker::make_request`] returns a
//! correlation id at once, and [`RequestTracker::poll_result`] hands back
//! the outcome exactly once after the transport finishes.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `method` | [`Method`] and its boundary codes |
//! | `request` | [`HttpRequest`], [`RequestBuilder`], [`PendingRequest`] |
//! | `tracker` | [`RequestTracker`], [`Completion`], [`HttpFailure`] |
//! | `transport` | [`HttpTransport`] seam |
//! | `client` | [`ReqwestTransport`] |

// ============================================================================
// Submodules
// ============================================================================

/// `reqwest`-backed transport.
pub mod client;

/// HTTP methods.
pub mod method;

/// Request description and typed client API.
pub mod request;

/// Correlation ids and result table.
pub mod tracker;

/// Transport trait.
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::ReqwestTransport;
pub use method::Method;
pub use request::{
    Body, HttpRequest, PendingRequest, RequestBuilder, ResponsePayload, ResponseType,
};
pub use tracker::{Completion, HttpFailure, RequestOutcome, RequestTracker, SUCCESS_STATUS};
pub use transport::HttpTransport;
