//! Boundary marshalling between host and sandbox.
//!
//! The sandbox can only pass integers. Anything richer (strings, byte
//! buffers, header maps, event objects) travels as an opaque [`Handle`]
//! into a table owned by the host.
//!
//! | Direction | Operation | Semantics |
//! |-----------|-----------|-----------|
//! | Sandbox → Host | [`Marshaller::consume`] | Decodes and removes the value (one-shot) |
//! | Host → Sandbox | [`Marshaller::wrap`] | Stores the value under a fresh handle |
//!
//! [`Handle`]: crate::Handle

// ============================================================================
// Submodules
// ============================================================================

/// Handle table and the marshaller trait.
pub mod table;

/// Host-native value representation.
pub mod value;

// ============================================================================
// Re-exports
// ============================================================================

pub use table::{HandleTable, Marshaller};
pub use value::HostValue;
