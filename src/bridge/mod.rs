//! Host-binding layer.
//!
//! This module provides the main entry point for a sandboxed caller.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Bridge`] | The six boundary calls plus raw dispatch |
//! | [`BridgeBuilder`] | Fluent configuration builder |
//! | [`Import`] | Names of the boundary calls |
//! | [`SocketOptions`] | Socket transport options |
//! | [`HttpOptions`] | HTTP transport options |
//!
//! # Example
//!
//! ```no_run
//! use pollnet::{Bridge, Import};
//!
//! # fn example() -> pollnet::Result<()> {
//! let mut bridge = Bridge::builder().build()?;
//!
//! for import in Import::ALL {
//!     println!("registering {import} ({} args)", import.arity());
//! }
//!
//! let event = bridge.call(Import::WsTryRecv, &[])?;
//! assert_eq!(event, -1);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for bridge configuration.
pub mod builder;

/// Core bridge implementation.
pub mod core;

/// Boundary call names.
pub mod imports;

/// Socket and HTTP options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::BridgeBuilder;
pub use self::core::{Bridge, CRATE_VERSION};
pub use imports::Import;
pub use options::{DEFAULT_MAX_FRAME_LEN, HttpOptions, SocketOptions};
