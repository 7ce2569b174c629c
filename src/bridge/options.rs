//! Socket and HTTP transport options.
//!
//! # Example
//!
//! ```ignore
//! use pollnet::{HttpOptions, SocketOptions};
//!
//! let socket = SocketOptions::new()
//!     .with_tcp_nodelay(false)
//!     .with_max_frame_len(1 << 20);
//!
//! let http = HttpOptions::new()
//!     .with_user_agent("my-game/1.0")
//!     .with_header("X-Client", "desktop");
//! ```

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default upper bound for a length-prefixed TCP frame (16 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

// ============================================================================
// SocketOptions
// ============================================================================

/// Options applied to every socket connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketOptions {
    /// Disable Nagle's algorithm on the underlying TCP stream.
    pub tcp_nodelay: bool,

    /// Largest frame accepted on `tcp://` connections, in bytes.
    pub max_frame_len: usize,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tcp_nodelay: true,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    /// Sets whether `TCP_NODELAY` is enabled.
    #[inline]
    #[must_use]
    pub const fn with_tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }

    /// Sets the largest accepted TCP frame.
    #[inline]
    #[must_use]
    pub const fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `max_frame_len` is zero or does not
    /// fit the 4-byte length prefix.
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_len == 0 {
            return Err(Error::config("max_frame_len must be greater than zero"));
        }

        if u32::try_from(self.max_frame_len).is_err() {
            return Err(Error::config(format!(
                "max_frame_len {} does not fit a 4-byte length prefix",
                self.max_frame_len
            )));
        }

        Ok(())
    }
}

// ============================================================================
// HttpOptions
// ============================================================================

/// Options applied to every HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpOptions {
    /// `User-Agent` header sent with each request.
    pub user_agent: Option<String>,

    /// Headers sent with each request, before per-request headers.
    pub default_headers: Vec<(String, String)>,
}

impl HttpOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            user_agent: None,
            default_headers: Vec::new(),
        }
    }

    /// Sets the `User-Agent` header.
    #[inline]
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Adds a default header.
    #[inline]
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a default header has an empty name.
    pub fn validate(&self) -> Result<()> {
        if let Some((_, value)) = self.default_headers.iter().find(|(name, _)| name.is_empty()) {
            return Err(Error::config(format!(
                "default header with value {value:?} has an empty name"
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
