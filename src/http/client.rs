//! HTTP transport backed by `reqwest`.

// ============================================================================
// Imports
// ============================================================================

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::runtime::Handle;
use tracing::trace;

use crate::bridge::HttpOptions;
use crate::error::{Error, Result};

use super::{Body, Completion, HttpRequest, HttpTransport};

// ============================================================================
// ReqwestTransport
// ============================================================================

/// Runs each request as a task on a tokio runtime.
///
/// No timeout is applied: a request that never answers stays pending.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// Pooled HTTP client.
    client: Client,
    /// Runtime the request tasks are spawned on.
    runtime: Handle,
}

impl ReqwestTransport {
    /// Creates a transport configured from `options`.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if a default header is not a valid header
    /// - [`Error::Http`] if the client cannot be built
    pub fn new(runtime: Handle, options: &HttpOptions) -> Result<Self> {
        let mut builder = Client::builder();

        if let Some(ref user_agent) = options.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        if !options.default_headers.is_empty() {
            builder = builder.default_headers(Self::header_map(&options.default_headers)?);
        }

        Ok(Self::with_client(runtime, builder.build()?))
    }

    /// Creates a transport around an existing client.
    #[inline]
    #[must_use]
    pub fn with_client(runtime: Handle, client: Client) -> Self {
        Self { client, runtime }
    }

    /// Converts header pairs into a header map.
    fn header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::config(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::config(format!("invalid header value for {name}: {e}")))?;
            map.append(name, value);
        }
        Ok(map)
    }

    /// Builds the reqwest request. Invalid URLs and headers surface when sent.
    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(request.method.into(), request.url.as_str());

        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        match request.body {
            Body::Empty => builder,
            Body::Text(text) => builder.body(text),
            Body::Bytes(bytes) => builder.body(bytes),
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn dispatch(&self, request: HttpRequest, completion: Completion) {
        let builder = self.build_request(request);

        self.runtime.spawn(async move {
            let response = match builder.send().await {
                Ok(response) => response,
                Err(e) => {
                    completion.fail(e);
                    return;
                }
            };

            let status = response.status().as_u16();
            trace!(id = %completion.id(), status, "Response headers received");

            match response.bytes().await {
                Ok(body) => completion.finish(status, body.to_vec()),
                Err(e) => completion.fail(e),
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
