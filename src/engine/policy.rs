//! # Policies
//!
//! Pick the next node from the last record.

use crate::core::{NodeId, StepResult};

/// Chooses the node to step to
pub trait Policy {
    fn next_node(&mut self, last: &StepResult) -> NodeId;
}

/// Step to whatever node the last record reported
#[derive(Debug, Clone, Copy, Default)]
pub struct FollowNode;

impl Policy for FollowNode {
    fn next_node(&mut self, last: &StepResult) -> NodeId {
        last.node
    }
}

/// Always step to the same node
#[derive(Debug, Clone, Copy)]
pub struct FixedNode(pub NodeId);

impl Policy for FixedNode {
    fn next_node(&mut self, _last: &StepResult) -> NodeId {
        self.0
    }
}

impl<F> Policy for F
where
    F: FnMut(&StepResult) -> NodeId,
{
    fn next_node(&mut self, last: &StepResult) -> NodeId {
        self(last)
    }
}
