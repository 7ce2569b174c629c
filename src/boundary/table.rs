//! Handle table backing the boundary convention.
//!
//! Values passed into the host are *consumed*: reading a handle removes
//! the value. Values returned to the sandbox are *wrapped*: stored under a
//! fresh handle that the sandbox dereferences later and then releases.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::Handle;

use super::HostValue;

// ============================================================================
// Marshaller
// ============================================================================

/// Converts values across the host/sandbox call boundary.
///
/// Hosts that already own an object table can implement this trait and
/// hand it to [`BridgeBuilder::marshaller`](crate::BridgeBuilder::marshaller);
/// otherwise [`HandleTable`] is used.
pub trait Marshaller: Send {
    /// Removes and returns the value behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if nothing is stored under `handle`.
    fn consume(&mut self, handle: Handle) -> Result<HostValue>;

    /// Stores `value` and returns a handle the sandbox can dereference.
    fn wrap(&mut self, value: HostValue) -> Handle;

    /// Borrows the value behind `handle` without consuming it.
    fn get(&self, handle: Handle) -> Option<&HostValue>;

    /// Drops the value behind `handle`, if any.
    fn release(&mut self, handle: Handle) {
        let _ = self.consume(handle);
    }

    /// Wraps a string.
    fn wrap_string(&mut self, value: &str) -> Handle {
        self.wrap(HostValue::string(value))
    }

    /// Wraps a byte buffer.
    fn wrap_bytes(&mut self, value: &[u8]) -> Handle {
        self.wrap(HostValue::bytes(value))
    }

    /// Consumes a handle expected to hold a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] or [`Error::UnexpectedValue`].
    fn consume_string(&mut self, handle: Handle) -> Result<String> {
        self.consume(handle)?.into_string()
    }
}

// ============================================================================
// HandleTable
// ============================================================================

/// Default [`Marshaller`]: a map from handle to value.
///
/// Handles start at 0 and count upward. After `i32::MAX` they wrap back to
/// 0, skipping handles that are still live. `-1` is never issued.
#[derive(Debug, Default)]
pub struct HandleTable {
    /// Stored values.
    values: FxHashMap<Handle, HostValue>,
    /// Next candidate handle.
    next: i32,
}

impl HandleTable {
    /// Creates an empty table.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live handles.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no handles are live.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Allocates the next free handle.
    fn allocate(&mut self) -> Handle {
        loop {
            let candidate = Handle::new(self.next);
            self.next = self.next.checked_add(1).unwrap_or(0);
            if !self.values.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

impl Marshaller for HandleTable {
    fn consume(&mut self, handle: Handle) -> Result<HostValue> {
        let value = self
            .values
            .remove(&handle)
            .ok_or_else(|| Error::invalid_handle(handle))?;
        trace!(%handle, kind = value.kind(), "Consumed handle");
        Ok(value)
    }

    fn wrap(&mut self, value: HostValue) -> Handle {
        let handle = self.allocate();
        trace!(%handle, kind = value.kind(), "Wrapped value");
        self.values.insert(handle, value);
        handle
    }

    fn get(&self, handle: Handle) -> Option<&HostValue> {
        self.values.get(&handle)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_then_consume_is_one_shot() {
        let mut table = HandleTable::new();
        let handle = table.wrap_string("wss://example.test/ws");

        assert_eq!(
            table.consume_string(handle).expect("string"),
            "wss://example.test/ws"
        );
        assert!(matches!(
            table.consume(handle),
            Err(Error::InvalidHandle { .. })
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn test_handles_are_sequential() {
        let mut table = HandleTable::new();
        assert_eq!(table.wrap_bytes(&[1]).raw(), 0);
        assert_eq!(table.wrap_bytes(&[2]).raw(), 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_wraparound_skips_live_handles() {
        let mut table = HandleTable::new();
        let zero = table.wrap_string("keep");
        table.next = i32::MAX;

        assert_eq!(table.wrap_string("a").raw(), i32::MAX);
        // 0 is still live, so allocation moves on to 1.
        assert_eq!(table.wrap_string("b").raw(), 1);
        assert_eq!(table.get(zero).and_then(HostValue::as_str), Some("keep"));
    }

    #[test]
    fn test_release() {
        let mut table = HandleTable::new();
        let handle = table.wrap_bytes(&[9]);
        table.release(handle);
        assert!(table.get(handle).is_none());
    }
}
