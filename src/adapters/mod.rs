//! # Adapters
//!
//! Implementations of the port traits.
//!
//! - Native: `sapf.so` loaded at runtime
//! - Memory: scripted doubles for tests and replays
//! - Python bindings (when enabled)

pub mod memory;
pub mod native;

#[cfg(feature = "python")]
pub mod python;
