//! Type-safe identifiers crossing the sandbox boundary.
//!
//! Newtype wrappers keep opaque value handles and HTTP correlation ids
//! from being mixed up, even though both travel as plain integers.
//!
//! | Type | Raw | Meaning |
//! |------|-----|---------|
//! | [`Handle`] | `i32` | Opaque reference to a value stored in the [`HandleTable`](crate::HandleTable) |
//! | [`RequestId`] | `i32` | Correlation id returned by `http_make_request` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Raw sentinel returned by both polling calls when nothing is ready.
pub const NONE_SENTINEL: i32 = -1;

// ============================================================================
// Handle
// ============================================================================

/// Opaque handle to a value held by the host.
///
/// Handles are non-negative; [`Handle::NONE`] (`-1`) is reserved for
/// "no value ready yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(i32);

impl Handle {
    /// The "nothing available" sentinel.
    pub const NONE: Self = Self(NONE_SENTINEL);

    /// Wraps a raw handle value.
    #[inline]
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw value passed across the boundary.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Returns `true` if this is the "nothing available" sentinel.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == NONE_SENTINEL
    }
}

impl From<i32> for Handle {
    #[inline]
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// RequestId
// ============================================================================

/// Correlation id of an HTTP request.
///
/// Allocated by the [`RequestTracker`](crate::RequestTracker) starting at 0
/// and never reused within its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(i32);

impl RequestId {
    /// The first id handed out by a fresh tracker.
    pub const FIRST: Self = Self(0);

    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw id passed across the boundary.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Returns the id following this one, or `None` once the id space is
    /// exhausted.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }
}

impl From<i32> for RequestId {
    #[inline]
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
