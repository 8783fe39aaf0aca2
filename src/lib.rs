//! # sapf
//!
//! Typed runtime bindings to the sapf native environment library.
//!
//! sapf ships as a prebuilt shared object. It exports five C-ABI symbols:
//! `add`, `init`, `reset`, `step` and `graph`. This crate loads it at runtime,
//! declares each signature exactly once, and wraps the unsafe calls in a
//! checked, idiomatic API. What the library computes is its own business.
//! Rewards, done flags and node ids are passed through untouched.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         sapf                                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  CORE (plain data)                                          │
//! │    StepResult, Export, SapfConfig, SapfError                │
//! │                                                              │
//! │  PORTS (trait contracts)                                     │
//! │    Environment, Accumulator                                 │
//! │                                                              │
//! │  ADAPTERS (swappable implementations)                       │
//! │    Native: sapf.so via libloading                           │
//! │    Memory: scripted doubles                                 │
//! │    API: Python bindings                                      │
//! │                                                              │
//! │  ENGINE (orchestration)                                      │
//! │    Session, Policy, Episode                                 │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sapf::{FollowNode, SapfConfig, Session};
//!
//! let config = SapfConfig::new("./sapf.so").with_init("config").with_max_steps(100);
//! let mut session = Session::open(config)?;
//!
//! let episode = session.run_episode(&mut FollowNode)?;
//! println!("{} steps, return {}", episode.len(), episode.total_reward);
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Core domain - plain data, no native calls
/// Contains: StepResult, Export, SapfConfig, SapfError
pub mod core;

/// Port definitions - trait contracts for adapters
/// Contains: Environment trait, Accumulator trait
pub mod ports;

/// Adapter implementations - swappable components
/// Contains: native, memory, python submodules
pub mod adapters;

/// Engine - orchestration layer
/// Contains: Session, Policy
pub mod engine;

// ============================================================================
// PYTHON BINDINGS (when enabled)
// ============================================================================

#[cfg(feature = "python")]
pub use adapters::python::*;

// ============================================================================
// RE-EXPORTS (public API)
// ============================================================================

// Core types
pub use crate::core::{Export, NodeId, SapfConfig, SapfError, SapfResult, StepResult};

// Port traits
pub use crate::ports::{Accumulator, Environment};

// Adapters
pub use crate::adapters::memory::{RunningTotal, ScriptedEnvironment};
pub use crate::adapters::native::NativeLibrary;

// Engine
pub use crate::engine::{Episode, FixedNode, FollowNode, Outcome, Policy, Session, Transition};
