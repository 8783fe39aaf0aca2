//! # Memory Adapters
//!
//! In-memory stand-ins for the native library.
//!
//! Good for:
//! - Testing the engine without `sapf.so`
//! - Replaying a recorded episode

use std::collections::VecDeque;

use crate::core::{Export, NodeId, SapfResult, StepResult};
use crate::ports::{Accumulator, Environment};

/// Scripted environment
///
/// `reset` returns the scripted reset record and rewinds the step script.
/// Each `step` pops the next scripted record. Once the script is exhausted,
/// `step` returns a terminal record with zero reward at the requested node.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEnvironment {
    /// Record returned by every reset
    reset_result: StepResult,

    /// Full step script, replayed after each reset
    script: Vec<StepResult>,

    /// Remaining steps of the current episode
    pending: VecDeque<StepResult>,

    /// Graph string returned by `graph`
    graph: String,

    /// Every `init` argument received
    init_calls: Vec<String>,

    /// Every node passed to `step`
    actions: Vec<NodeId>,

    /// Number of resets seen
    resets: usize,
}

impl ScriptedEnvironment {
    /// Create with a reset record and a step script
    pub fn new(reset_result: StepResult, script: Vec<StepResult>) -> Self {
        Self {
            reset_result,
            pending: script.iter().copied().collect(),
            script,
            ..Self::default()
        }
    }

    /// Set the graph string
    pub fn with_graph(mut self, graph: impl Into<String>) -> Self {
        self.graph = graph.into();
        self
    }

    pub fn init_calls(&self) -> &[String] {
        &self.init_calls
    }

    pub fn actions(&self) -> &[NodeId] {
        &self.actions
    }

    pub fn resets(&self) -> usize {
        self.resets
    }
}

impl Environment for ScriptedEnvironment {
    fn init(&mut self, config: &str) -> SapfResult<()> {
        self.init_calls.push(config.to_owned());
        Ok(())
    }

    fn reset(&mut self) -> SapfResult<StepResult> {
        self.resets += 1;
        self.pending = self.script.iter().copied().collect();
        Ok(self.reset_result)
    }

    fn step(&mut self, node: NodeId) -> SapfResult<StepResult> {
        self.actions.push(node);
        Ok(self
            .pending
            .pop_front()
            .unwrap_or_else(|| StepResult::terminal(0.0, node)))
    }

    fn graph(&mut self) -> SapfResult<String> {
        Ok(self.graph.clone())
    }

    fn exports(&self) -> Vec<Export> {
        Export::ENVIRONMENT.to_vec()
    }
}

/// Running-sum accumulator
///
/// Each `add` folds its argument into the total and returns the new total.
/// Wraps on overflow.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningTotal {
    total: i32,
}

impl RunningTotal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(total: i32) -> Self {
        Self { total }
    }

    pub fn total(&self) -> i32 {
        self.total
    }
}

impl Accumulator for RunningTotal {
    fn add(&mut self, value: i32) -> SapfResult<i32> {
        self.total = self.total.wrapping_add(value);
        Ok(self.total)
    }
}
