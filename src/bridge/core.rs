//! The boundary surface exposed to a sandboxed caller.
//!
//! The [`Bridge`] owns the handle table, the socket session and the
//! request tracker. Every call takes and returns plain integers or
//! handles, and none of them blocks.
//!
//! # Example
//!
//! ```no_run
//! use pollnet::{Bridge, Marshaller, SocketEvent};
//!
//! # fn example() -> pollnet::Result<()> {
//! let mut bridge = Bridge::builder().build()?;
//!
//! let address = bridge.handles_mut().wrap_string("wss://example.test/ws");
//! bridge.ws_connect(address)?;
//!
//! // Once per frame:
//! let handle = bridge.ws_try_recv();
//! if !handle.is_none() {
//!     let value = bridge.handles_mut().consume(handle)?;
//!     let event = SocketEvent::from_host_value(&value)?;
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tokio::runtime::Runtime;
use tracing::{debug, trace};

use crate::boundary::{HostValue, Marshaller};
use crate::error::{Error, Result};
use crate::http::{Body, HttpRequest, Method, RequestTracker};
use crate::identifiers::{Handle, RequestId};
use crate::socket::{Payload, SocketSession};

use super::builder::BridgeBuilder;
use super::imports::Import;

// ============================================================================
// Constants
// ============================================================================

/// Version of the boundary protocol the bridge speaks.
pub const CRATE_VERSION: u32 = 1;

/// Return value of calls that produce nothing.
const UNIT: i32 = 0;

// ============================================================================
// Bridge
// ============================================================================

/// Host-side half of the polling bridge.
///
/// The bridge is single-threaded from the caller's point of view: all
/// calls take `&mut self`. Transport callbacks run on the runtime and
/// only touch the shared event queue and result table.
pub struct Bridge {
    /// Value store for boundary arguments and results.
    handles: Box<dyn Marshaller>,
    /// Socket session.
    session: SocketSession,
    /// HTTP request tracker.
    tracker: RequestTracker,
    /// Runtime owned by the bridge, if it was built outside of one.
    runtime: Option<Runtime>,
}

impl Drop for Bridge {
    fn drop(&mut self) {
        // Never block: the bridge may be dropped inside async code.
        if let Some(runtime) = self.runtime.take() {
            debug!("Shutting down owned runtime");
            runtime.shutdown_background();
        }
    }
}

// ============================================================================
// Bridge - Display
// ============================================================================

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("address", &self.session.address())
            .field("ready_state", &self.session.ready_state())
            .field("pending_events", &self.session.pending_events())
            .field("pending_results", &self.tracker.pending_results())
            .field("owns_runtime", &self.owns_runtime())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Bridge - Construction
// ============================================================================

impl Bridge {
    /// Creates a configuration builder for the bridge.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pollnet::Bridge;
    ///
    /// # fn example() -> pollnet::Result<()> {
    /// let bridge = Bridge::builder().build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    #[must_use]
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    /// Assembles a bridge from its parts.
    pub(crate) fn new(
        handles: Box<dyn Marshaller>,
        session: SocketSession,
        tracker: RequestTracker,
        runtime: Option<Runtime>,
    ) -> Self {
        Self {
            handles,
            session,
            tracker,
            runtime,
        }
    }

    /// Returns the boundary protocol version.
    #[inline]
    #[must_use]
    pub const fn crate_version() -> u32 {
        CRATE_VERSION
    }
}

// ============================================================================
// Bridge - Socket Calls
// ============================================================================

impl Bridge {
    /// Opens a socket connection to the address stored under `address`.
    ///
    /// Connection failures arrive later as `Error` then `Closed` events.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHandle`] if `address` holds no value
    /// - [`Error::UnexpectedValue`] if the value is not a string
    pub fn ws_connect(&mut self, address: Handle) -> Result<()> {
        let address = self.handles.consume_string(address)?;
        self.session.connect(address);
        Ok(())
    }

    /// Sends the byte buffer or string stored under `payload`.
    ///
    /// Send failures arrive later as `Error` events.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHandle`] if `payload` holds no value
    /// - [`Error::UnexpectedValue`] if the value is neither bytes nor string
    pub fn ws_send(&mut self, payload: Handle) -> Result<()> {
        let value = self.handles.consume(payload)?;
        let payload = Payload::try_from(value)?;
        trace!(len = payload.len(), "Boundary send");
        self.session.send(payload);
        Ok(())
    }

    /// Requests closure of the socket connection.
    #[inline]
    pub fn ws_close(&mut self) {
        self.session.close();
    }

    /// Moves the oldest socket event into the handle table.
    ///
    /// Returns [`Handle::NONE`] when no event is pending.
    pub fn ws_try_recv(&mut self) -> Handle {
        match self.session.poll_next_event() {
            Some(event) => self.handles.wrap(event.into_host_value()),
            None => Handle::NONE,
        }
    }
}

// ============================================================================
// Bridge - HTTP Calls
// ============================================================================

impl Bridge {
    /// Starts an HTTP request and returns its correlation id.
    ///
    /// `body` may hold a string (empty means no body) or a byte buffer.
    /// `headers` holds a string map. Either may be [`Handle::NONE`].
    /// All handles are consumed even when the call fails.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownMethod`] if `method` is outside `0..=3`
    /// - [`Error::InvalidHandle`] or [`Error::UnexpectedValue`] for a bad handle
    /// - [`Error::RequestIdsExhausted`] if no id is left
    pub fn http_make_request(
        &mut self,
        method: i32,
        url: Handle,
        body: Handle,
        headers: Handle,
    ) -> Result<RequestId> {
        let url = self.handles.consume_string(url);
        let body = self.consume_body(body);
        let headers = self.consume_headers(headers);

        let mut request = HttpRequest::new(Method::try_from(method)?, url?);
        request.body = body?;
        request.headers = headers?;

        let id = self.tracker.make_request(request)?;
        debug!(%id, method, "Boundary request started");
        Ok(id)
    }

    /// Moves the result of request `id` into the handle table.
    ///
    /// Returns a byte buffer handle for a 200 response, a failure object
    /// handle (`status`, `error`) for anything else, and
    /// [`Handle::NONE`] while pending or after the result was taken.
    pub fn http_try_recv(&mut self, id: i32) -> Handle {
        match self.tracker.poll_result(RequestId::new(id)) {
            Some(Ok(body)) => self.handles.wrap(HostValue::Bytes(body)),
            Some(Err(failure)) => {
                debug!(id, error = %failure, "Boundary request failed");
                self.handles.wrap(failure.into_host_value())
            }
            None => Handle::NONE,
        }
    }

    /// Takes the request body stored under `handle`.
    fn consume_body(&mut self, handle: Handle) -> Result<Body> {
        if handle.is_none() {
            return Ok(Body::Empty);
        }

        match self.handles.consume(handle)? {
            HostValue::String(text) => Ok(Body::from(text)),
            HostValue::Bytes(bytes) => Ok(Body::Bytes(bytes)),
            other => Err(Error::unexpected_value("string or bytes", other.kind())),
        }
    }

    /// Takes the header map stored under `handle`.
    fn consume_headers(&mut self, handle: Handle) -> Result<Vec<(String, String)>> {
        if handle.is_none() {
            return Ok(Vec::new());
        }

        Ok(self.handles.consume(handle)?.into_map()?.into_iter().collect())
    }
}

// ============================================================================
// Bridge - Dispatch
// ============================================================================

impl Bridge {
    /// Invokes `import` with raw `i32` arguments.
    ///
    /// Calls without a result return 0; polling calls return a handle or
    /// -1; `http_make_request` returns the id.
    ///
    /// # Errors
    ///
    /// - [`Error::ArgumentCount`] if `args` does not match the import's arity
    /// - any error of the invoked call
    pub fn call(&mut self, import: Import, args: &[i32]) -> Result<i32> {
        if args.len() != import.arity() {
            return Err(Error::ArgumentCount {
                import: import.name(),
                expected: import.arity(),
                actual: args.len(),
            });
        }

        trace!(%import, ?args, "Boundary call");

        match (import, args) {
            (Import::WsConnect, &[address]) => self.ws_connect(address.into()).map(|()| UNIT),
            (Import::WsSend, &[payload]) => self.ws_send(payload.into()).map(|()| UNIT),
            (Import::WsClose, _) => {
                self.ws_close();
                Ok(UNIT)
            }
            (Import::WsTryRecv, _) => Ok(self.ws_try_recv().raw()),
            (Import::HttpMakeRequest, &[method, url, body, headers]) => self
                .http_make_request(method, url.into(), body.into(), headers.into())
                .map(RequestId::raw),
            (Import::HttpTryRecv, &[id]) => Ok(self.http_try_recv(id).raw()),
            _ => Err(Error::ArgumentCount {
                import: import.name(),
                expected: import.arity(),
                actual: args.len(),
            }),
        }
    }
}

// ============================================================================
// Bridge - Accessors
// ============================================================================

impl Bridge {
    /// Returns the handle table.
    #[inline]
    #[must_use]
    pub fn handles(&self) -> &dyn Marshaller {
        self.handles.as_ref()
    }

    /// Returns the handle table mutably, for wrapping arguments and
    /// consuming results.
    #[inline]
    pub fn handles_mut(&mut self) -> &mut dyn Marshaller {
        self.handles.as_mut()
    }

    /// Returns the socket session.
    #[inline]
    #[must_use]
    pub fn session(&self) -> &SocketSession {
        &self.session
    }

    /// Returns the socket session mutably.
    #[inline]
    pub fn session_mut(&mut self) -> &mut SocketSession {
        &mut self.session
    }

    /// Returns the request tracker.
    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    /// Returns the request tracker mutably, for the typed client API.
    #[inline]
    pub fn tracker_mut(&mut self) -> &mut RequestTracker {
        &mut self.tracker
    }

    /// Returns `true` if the bridge started its own runtime.
    #[inline]
    #[must_use]
    pub fn owns_runtime(&self) -> bool {
        self.runtime.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use crate::http::mock::MockHttpTransport;
    use crate::identifiers::NONE_SENTINEL;
    use crate::socket::SocketEvent;
    use crate::socket::mock::MockSocketTransport;

    fn bridge() -> (Bridge, MockSocketTransport, MockHttpTransport) {
        let sockets = MockSocketTransport::new();
        let http = MockHttpTransport::new();
        let bridge = Bridge::builder()
            .socket_transport(sockets.clone())
            .http_transport(http.clone())
            .build()
            .expect("build");
        (bridge, sockets, http)
    }

    fn recv_event(bridge: &mut Bridge) -> Option<SocketEvent> {
        let handle = bridge.ws_try_recv();
        if handle.is_none() {
            return None;
        }
        let value = bridge.handles_mut().consume(handle).expect("event value");
        Some(SocketEvent::from_host_value(&value).expect("event"))
    }

    #[test]
    fn test_crate_version() {
        assert_eq!(Bridge::crate_version(), 1);
    }

    #[test]
    fn test_connect_open_then_binary_message() {
        let (mut bridge, sockets, _) = bridge();

        let address = bridge.handles_mut().wrap_string("wss://example.test/ws");
        bridge.ws_connect(address).expect("connect");
        assert_eq!(sockets.address(0), "wss://example.test/ws");

        sockets.simulate_open(0);
        sockets.simulate(0, SocketEvent::DataReceived(vec![1, 2, 3]));

        assert_eq!(recv_event(&mut bridge), Some(SocketEvent::Connected));
        assert_eq!(
            recv_event(&mut bridge),
            Some(SocketEvent::DataReceived(vec![1, 2, 3]))
        );
        assert_eq!(bridge.ws_try_recv().raw(), NONE_SENTINEL);
    }

    #[test]
    fn test_connect_consumes_address_handle() {
        let (mut bridge, _, _) = bridge();

        let address = bridge.handles_mut().wrap_string("wss://example.test/ws");
        bridge.ws_connect(address).expect("connect");

        let err = bridge.ws_connect(address).unwrap_err();
        assert!(matches!(err, Error::InvalidHandle { .. }));
    }

    #[test]
    fn test_connect_rejects_non_string() {
        let (mut bridge, sockets, _) = bridge();

        let address = bridge.handles_mut().wrap_bytes(b"wss://");
        let err = bridge.ws_connect(address).unwrap_err();
        assert!(matches!(err, Error::UnexpectedValue { .. }));
        assert_eq!(sockets.connection_count(), 0);
    }

    #[test]
    fn test_send_bytes_and_string() {
        let (mut bridge, sockets, _) = bridge();

        let address = bridge.handles_mut().wrap_string("wss://example.test/ws");
        bridge.ws_connect(address).expect("connect");
        sockets.simulate_open(0);

        let bytes = bridge.handles_mut().wrap_bytes(&[7, 8]);
        bridge.ws_send(bytes).expect("send bytes");
        let text = bridge.handles_mut().wrap_string("hi");
        bridge.ws_send(text).expect("send text");

        assert_eq!(
            sockets.sent(0),
            vec![Payload::Binary(vec![7, 8]), Payload::Text("hi".into())]
        );
        assert!(bridge.handles().get(bytes).is_none());
        assert!(bridge.handles().get(text).is_none());
    }

    #[test]
    fn test_send_without_connection_queues_error() {
        let (mut bridge, _, _) = bridge();

        let bytes = bridge.handles_mut().wrap_bytes(&[1]);
        bridge.ws_send(bytes).expect("send");

        assert!(matches!(recv_event(&mut bridge), Some(SocketEvent::Error(_))));
    }

    #[test]
    fn test_close_is_forwarded() {
        let (mut bridge, sockets, _) = bridge();

        let address = bridge.handles_mut().wrap_string("wss://example.test/ws");
        bridge.ws_connect(address).expect("connect");
        bridge.ws_close();

        assert!(sockets.close_requested(0));
    }

    #[test]
    fn test_request_ids_and_single_delivery() {
        let (mut bridge, _, http) = bridge();

        let url = bridge.handles_mut().wrap_string("https://example.test/x");
        let body = bridge.handles_mut().wrap_string("");
        let headers = bridge.handles_mut().wrap(HostValue::Map(BTreeMap::new()));
        let first = bridge
            .http_make_request(Method::Get.code(), url, body, headers)
            .expect("request");
        assert_eq!(first.raw(), 0);

        let url = bridge.handles_mut().wrap_string("https://example.test/x");
        let second = bridge
            .http_make_request(Method::Get.code(), url, Handle::NONE, Handle::NONE)
            .expect("request");
        assert_eq!(second.raw(), 1);

        http.complete(first, 200, vec![9, 9]);

        let handle = bridge.http_try_recv(0);
        let value = bridge.handles_mut().consume(handle).expect("body");
        assert_eq!(value, HostValue::Bytes(vec![9, 9]));

        assert!(bridge.http_try_recv(0).is_none());
        assert!(bridge.http_try_recv(1).is_none());
    }

    #[test]
    fn test_request_fields_reach_transport() {
        let (mut bridge, _, http) = bridge();

        let url = bridge.handles_mut().wrap_string("https://example.test/scores");
        let body = bridge.handles_mut().wrap_string("{\"score\":1}");
        let headers = bridge
            .handles_mut()
            .wrap(HostValue::map([("Content-Type", "application/json")]));
        bridge
            .http_make_request(Method::Post.code(), url, body, headers)
            .expect("request");

        let request = http.request(0);
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "https://example.test/scores");
        assert_eq!(request.body, Body::Text("{\"score\":1}".into()));
        assert_eq!(
            request.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn test_unknown_method_consumes_handles() {
        let (mut bridge, _, http) = bridge();

        let url = bridge.handles_mut().wrap_string("https://example.test/x");
        let err = bridge
            .http_make_request(9, url, Handle::NONE, Handle::NONE)
            .unwrap_err();

        assert!(matches!(err, Error::UnknownMethod { code: 9 }));
        assert!(bridge.handles().get(url).is_none());
        assert_eq!(http.request_count(), 0);
    }

    #[test]
    fn test_failure_object_is_delivered_once() {
        let (mut bridge, _, http) = bridge();

        let url = bridge.handles_mut().wrap_string("https://example.test/missing");
        let id = bridge
            .http_make_request(Method::Get.code(), url, Handle::NONE, Handle::NONE)
            .expect("request");
        http.complete(id, 404, b"not found".to_vec());

        let handle = bridge.http_try_recv(id.raw());
        let value = bridge.handles_mut().consume(handle).expect("failure");
        assert_eq!(value.field_u32("status"), Some(404));
        assert!(value.field("error").and_then(HostValue::as_str).is_some());

        assert!(bridge.http_try_recv(id.raw()).is_none());
    }

    #[test]
    fn test_transport_failure_has_zero_status() {
        let (mut bridge, _, http) = bridge();

        let url = bridge.handles_mut().wrap_string("https://example.test/x");
        let id = bridge
            .http_make_request(Method::Delete.code(), url, Handle::NONE, Handle::NONE)
            .expect("request");
        http.fail(id, "connection refused");

        let handle = bridge.http_try_recv(id.raw());
        let value = bridge.handles_mut().consume(handle).expect("failure");
        assert_eq!(value.field_u32("status"), Some(0));
    }

    #[test]
    fn test_call_dispatch() {
        let (mut bridge, sockets, http) = bridge();

        let address = bridge.handles_mut().wrap_string("wss://example.test/ws");
        assert_eq!(bridge.call(Import::WsConnect, &[address.raw()]).expect("connect"), 0);
        assert_eq!(bridge.call(Import::WsTryRecv, &[]).expect("poll"), NONE_SENTINEL);

        sockets.simulate_open(0);
        let handle = bridge.call(Import::WsTryRecv, &[]).expect("poll");
        assert_ne!(handle, NONE_SENTINEL);

        let url = bridge.handles_mut().wrap_string("https://example.test/x");
        let id = bridge
            .call(
                Import::HttpMakeRequest,
                &[Method::Get.code(), url.raw(), NONE_SENTINEL, NONE_SENTINEL],
            )
            .expect("request");
        assert_eq!(id, 0);
        assert_eq!(http.request_count(), 1);

        assert_eq!(bridge.call(Import::HttpTryRecv, &[id]).expect("poll"), NONE_SENTINEL);
        assert_eq!(bridge.call(Import::WsClose, &[]).expect("close"), 0);
    }

    #[test]
    fn test_call_checks_arity() {
        let (mut bridge, _, _) = bridge();

        let err = bridge.call(Import::HttpTryRecv, &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::ArgumentCount {
                import: "http_try_recv",
                expected: 1,
                actual: 0
            }
        ));
    }
}
