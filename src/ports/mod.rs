//! # Ports
//!
//! Trait contracts between the engine and the adapters.
//!
//! - `Environment` - init / reset / step / graph
//! - `Accumulator` - add

use crate::core::{Export, NodeId, SapfResult, StepResult};

/// A steppable environment
///
/// Implemented by the native library and by in-memory doubles.
pub trait Environment {
    /// Configure the environment before the first reset
    fn init(&mut self, config: &str) -> SapfResult<()>;

    /// Start a new episode
    fn reset(&mut self) -> SapfResult<StepResult>;

    /// Move to `node`
    fn step(&mut self, node: NodeId) -> SapfResult<StepResult>;

    /// Serialized form of the environment graph
    fn graph(&mut self) -> SapfResult<String>;

    /// Exports this environment can serve
    fn exports(&self) -> Vec<Export>;
}

/// Integer accumulator exposed by the library as `add`
pub trait Accumulator {
    fn add(&mut self, value: i32) -> SapfResult<i32>;
}
