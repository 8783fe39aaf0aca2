//! # Step Result
//!
//! The record `reset` and `step` return by value across the FFI boundary.
//!
//! ```text
//! StepResult (16 bytes, align 8)
//! ├── reward: f32   @ 0
//! ├── done:   i32   @ 4   (0 = running, anything else = done)
//! └── node:   i64   @ 8
//! ```

use serde::{Deserialize, Serialize};

/// Identifier of a node in the sapf graph
pub type NodeId = i64;

/// Result record returned by the native library
///
/// Field order and widths must match the C layout exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StepResult {
    /// Scalar reward for the transition
    pub reward: f32,

    /// Termination flag as the library encodes it
    pub done: i32,

    /// Node the environment is at after the transition
    pub node: NodeId,
}

impl StepResult {
    /// Create a non-terminal record
    pub fn new(reward: f32, node: NodeId) -> Self {
        Self { reward, done: 0, node }
    }

    /// Create a terminal record
    pub fn terminal(reward: f32, node: NodeId) -> Self {
        Self { reward, done: 1, node }
    }

    /// Whether the episode ended with this record
    pub fn is_done(&self) -> bool {
        self.done != 0
    }
}
