//! Builder pattern for bridge configuration.
//!
//! Provides a fluent API for configuring and creating [`Bridge`] instances.
//!
//! # Example
//!
//! ```no_run
//! use pollnet::{Bridge, SocketOptions};
//!
//! # fn example() -> pollnet::Result<()> {
//! let bridge = Bridge::builder()
//!     .socket_options(SocketOptions::new().with_tcp_nodelay(false))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tokio::runtime::{Builder as RuntimeBuilder, Handle, Runtime};
use tracing::debug;

use crate::boundary::{HandleTable, Marshaller};
use crate::error::{Error, Result};
use crate::http::{HttpTransport, ReqwestTransport, RequestTracker};
use crate::socket::{NativeSocketTransport, SocketSession, SocketTransport};

use super::core::Bridge;
use super::options::{HttpOptions, SocketOptions};

// ============================================================================
// Constants
// ============================================================================

/// Thread name of the runtime a bridge creates for itself.
const RUNTIME_THREAD_NAME: &str = "pollnet-io";

// ============================================================================
// BridgeBuilder
// ============================================================================

/// Builder for configuring a [`Bridge`] instance.
///
/// Use [`Bridge::builder()`] to create a new builder.
#[derive(Default)]
pub struct BridgeBuilder {
    /// Runtime for native transports.
    runtime: Option<Handle>,
    /// Socket options.
    socket_options: SocketOptions,
    /// HTTP options.
    http_options: HttpOptions,
    /// Replacement socket transport.
    socket_transport: Option<Box<dyn SocketTransport>>,
    /// Replacement HTTP transport.
    http_transport: Option<Box<dyn HttpTransport>>,
    /// Replacement marshaller.
    marshaller: Option<Box<dyn Marshaller>>,
}

impl fmt::Debug for BridgeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeBuilder")
            .field("has_runtime", &self.runtime.is_some())
            .field("socket_options", &self.socket_options)
            .field("http_options", &self.http_options)
            .field("custom_socket_transport", &self.socket_transport.is_some())
            .field("custom_http_transport", &self.http_transport.is_some())
            .field("custom_marshaller", &self.marshaller.is_some())
            .finish()
    }
}

// ============================================================================
// BridgeBuilder Implementation
// ============================================================================

impl BridgeBuilder {
    /// Creates a new bridge builder with default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs native transports on an existing tokio runtime.
    ///
    /// Without a handle the bridge uses the runtime it is built on, or
    /// owns a multi-thread runtime when built outside of one.
    #[inline]
    #[must_use]
    pub fn runtime_handle(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Sets socket options.
    #[inline]
    #[must_use]
    pub fn socket_options(mut self, options: SocketOptions) -> Self {
        self.socket_options = options;
        self
    }

    /// Sets HTTP options.
    #[inline]
    #[must_use]
    pub fn http_options(mut self, options: HttpOptions) -> Self {
        self.http_options = options;
        self
    }

    /// Replaces the native socket transport.
    #[inline]
    #[must_use]
    pub fn socket_transport(mut self, transport: impl SocketTransport + 'static) -> Self {
        self.socket_transport = Some(Box::new(transport));
        self
    }

    /// Replaces the `reqwest` HTTP transport.
    #[inline]
    #[must_use]
    pub fn http_transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.http_transport = Some(Box::new(transport));
        self
    }

    /// Replaces the default [`HandleTable`].
    #[inline]
    #[must_use]
    pub fn marshaller(mut self, marshaller: impl Marshaller + 'static) -> Self {
        self.marshaller = Some(Box::new(marshaller));
        self
    }

    /// Builds the bridge with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if socket or HTTP options are invalid
    /// - [`Error::Io`] if the bridge's own runtime cannot be started
    /// - [`Error::Http`] if the HTTP client cannot be built
    pub fn build(self) -> Result<Bridge> {
        self.socket_options.validate()?;
        self.http_options.validate()?;

        let needs_runtime = self.socket_transport.is_none() || self.http_transport.is_none();
        let (handle, owned) = match (self.runtime, needs_runtime) {
            (Some(handle), _) => (Some(handle), None),
            (None, true) => match Handle::try_current() {
                Ok(handle) => (Some(handle), None),
                Err(_) => {
                    let runtime = Self::start_runtime()?;
                    (Some(runtime.handle().clone()), Some(runtime))
                }
            },
            (None, false) => (None, None),
        };

        let socket_transport: Box<dyn SocketTransport> = match (self.socket_transport, &handle) {
            (Some(transport), _) => transport,
            (None, Some(handle)) => Box::new(NativeSocketTransport::new(
                handle.clone(),
                self.socket_options,
            )),
            (None, None) => return Err(Error::config("no runtime for the socket transport")),
        };

        let http_transport: Box<dyn HttpTransport> = match (self.http_transport, &handle) {
            (Some(transport), _) => transport,
            (None, Some(handle)) => {
                Box::new(ReqwestTransport::new(handle.clone(), &self.http_options)?)
            }
            (None, None) => return Err(Error::config("no runtime for the HTTP transport")),
        };

        let marshaller = self
            .marshaller
            .unwrap_or_else(|| Box::new(HandleTable::new()));

        debug!(owns_runtime = owned.is_some(), "Bridge built");

        Ok(Bridge::new(
            marshaller,
            SocketSession::with_boxed_transport(socket_transport),
            RequestTracker::with_boxed_transport(http_transport),
            owned,
        ))
    }
}

// ============================================================================
// Runtime
// ============================================================================

impl BridgeBuilder {
    /// Starts the runtime a bridge owns when no handle was supplied.
    fn start_runtime() -> Result<Runtime> {
        let runtime = RuntimeBuilder::new_multi_thread()
            .enable_all()
            .thread_name(RUNTIME_THREAD_NAME)
            .build()?;
        Ok(runtime)
    }
}

// ============================================================================
// Tests
// ============================================================================
