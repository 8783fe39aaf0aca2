//! # Engine
//!
//! The orchestration layer that wires everything together.
//!
//! This is where:
//! - Configuration is applied
//! - An environment adapter is connected to the Environment port
//! - Episodes are tracked and driven by a policy

mod policy;
mod session;

pub use policy::{FixedNode, FollowNode, Policy};
pub use session::{Episode, Outcome, Session, Transition};
