//! # Session
//!
//! The main sapf orchestrator.
//!
//! This struct wires together:
//! - An environment (Environment port)
//! - Configuration
//! - Episode bookkeeping
//!
//! And exposes a single API for driving episodes.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapters::native::NativeLibrary;
use crate::core::{Export, NodeId, SapfConfig, SapfError, SapfResult, StepResult};
use crate::ports::Environment;

use super::policy::Policy;

/// One step of an episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Node the policy chose
    pub node: NodeId,

    /// What the environment returned
    pub result: StepResult,
}

/// How an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The environment reported done
    Done,
    /// `max_steps` was reached first
    Truncated,
}

/// A completed episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub initial: StepResult,
    pub transitions: Vec<Transition>,
    pub total_reward: f64,
    pub outcome: Outcome,
}

impl Episode {
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Node the episode ended at
    pub fn final_node(&self) -> NodeId {
        self.transitions
            .last()
            .map(|t| t.result.node)
            .unwrap_or(self.initial.node)
    }
}

#[derive(Debug, Clone, Copy)]
struct EpisodeState {
    steps: u64,
    total_reward: f64,
    last: StepResult,
}

/// The main sapf session
pub struct Session {
    /// Configuration
    config: SapfConfig,

    /// Environment backend (Environment port)
    env: Box<dyn Environment>,

    /// Whether `init` has run
    initialized: bool,

    /// Current episode, if any
    episode: Option<EpisodeState>,
}

impl Session {
    /// Open the native library named by the config
    pub fn open(config: SapfConfig) -> SapfResult<Self> {
        config.validate()?;
        let native = NativeLibrary::open_requiring(&config.library_path, &config.required_exports)?;
        Ok(Self::with_environment(config, Box::new(native)))
    }

    /// Create with a custom environment
    pub fn with_environment(config: SapfConfig, env: Box<dyn Environment>) -> Self {
        Self {
            config,
            env,
            initialized: false,
            episode: None,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &SapfConfig {
        &self.config
    }

    /// Exports the environment serves
    pub fn exports(&self) -> Vec<Export> {
        self.env.exports()
    }

    // ========================================================================
    // EPISODE OPERATIONS
    // ========================================================================

    /// Run `init` once, with the configured argument
    ///
    /// No-op when already initialized or when no init argument is configured.
    pub fn init(&mut self) -> SapfResult<()> {
        if self.initialized {
            return Ok(());
        }
        if let Some(arg) = &self.config.init {
            debug!(arg = %arg, "initializing environment");
            self.env.init(arg)?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Start a new episode
    pub fn reset(&mut self) -> SapfResult<StepResult> {
        self.init()?;

        self.episode = None;
        let result = self.env.reset()?;
        self.episode = Some(EpisodeState {
            steps: 0,
            total_reward: 0.0,
            last: result,
        });

        debug!(node = result.node, done = result.is_done(), "episode reset");
        Ok(result)
    }

    /// Step the current episode to `node`
    pub fn step(&mut self, node: NodeId) -> SapfResult<StepResult> {
        let state = self.episode.as_mut().ok_or(SapfError::NoEpisode)?;

        if state.last.is_done() {
            return Err(SapfError::EpisodeDone {
                node: state.last.node,
            });
        }
        if let Some(limit) = self.config.max_steps {
            if state.steps >= limit {
                return Err(SapfError::StepLimit { limit });
            }
        }

        let result = self.env.step(node)?;
        state.steps += 1;
        state.total_reward += f64::from(result.reward);
        state.last = result;

        Ok(result)
    }

    /// Run a full episode, choosing nodes with `policy`
    ///
    /// Without `max_steps` this only returns once the environment reports done.
    pub fn run_episode<P: Policy>(&mut self, policy: &mut P) -> SapfResult<Episode> {
        let initial = self.reset()?;
        let mut transitions = Vec::new();
        let mut last = initial;

        let outcome = loop {
            if last.is_done() {
                break Outcome::Done;
            }
            if self.at_step_limit() {
                break Outcome::Truncated;
            }

            let node = policy.next_node(&last);
            last = self.step(node)?;
            transitions.push(Transition { node, result: last });
        };

        let episode = Episode {
            initial,
            transitions,
            total_reward: self.total_reward(),
            outcome,
        };

        info!(
            steps = episode.len(),
            total_reward = episode.total_reward,
            outcome = ?episode.outcome,
            final_node = episode.final_node(),
            "episode finished"
        );

        Ok(episode)
    }

    fn at_step_limit(&self) -> bool {
        match self.config.max_steps {
            Some(limit) => self.steps() >= limit,
            None => false,
        }
    }

    // ========================================================================
    // GRAPH OPERATIONS
    // ========================================================================

    /// Serialized environment graph, as returned by the library
    pub fn graph(&mut self) -> SapfResult<String> {
        self.env.graph()
    }

    /// Environment graph parsed as JSON
    pub fn graph_json(&mut self) -> SapfResult<serde_json::Value> {
        let graph = self.graph()?;
        serde_json::from_str(&graph).map_err(SapfError::GraphJson)
    }

    // ========================================================================
    // STATS
    // ========================================================================

    /// Steps taken in the current episode
    pub fn steps(&self) -> u64 {
        self.episode.map(|e| e.steps).unwrap_or(0)
    }

    /// Sum of step rewards in the current episode
    pub fn total_reward(&self) -> f64 {
        self.episode.map(|e| e.total_reward).unwrap_or(0.0)
    }

    /// Last record from the environment
    pub fn last(&self) -> Option<StepResult> {
        self.episode.map(|e| e.last)
    }

    /// Whether the current episode is done
    pub fn is_done(&self) -> bool {
        self.episode.map(|e| e.last.is_done()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::adapters::memory::ScriptedEnvironment;
    use crate::engine::policy::{FixedNode, FollowNode};

    fn create_test_env() -> ScriptedEnvironment {
        ScriptedEnvironment::new(
            StepResult::new(0.25, 0),
            vec![
                StepResult::new(1.0, 1),
                StepResult::new(2.0, 2),
                StepResult::terminal(3.0, 3),
            ],
        )
        .with_graph(r#"{"nodes": [0, 1, 2, 3], "edges": [[0, 1], [1, 2], [2, 3]]}"#)
    }

    fn create_test_session(config: SapfConfig) -> Session {
        Session::with_environment(config, Box::new(create_test_env()))
    }

    #[test]
    fn test_step_before_reset() {
        let mut session = create_test_session(SapfConfig::default());

        assert!(matches!(session.step(1), Err(SapfError::NoEpisode)));
        assert_eq!(session.steps(), 0);
        assert!(session.last().is_none());
        assert!(!session.is_done());
    }

    #[test]
    fn test_reset_and_step_accumulate() {
        let mut session = create_test_session(SapfConfig::default());

        let initial = session.reset().unwrap();
        assert_eq!(initial.node, 0);
        assert_eq!(session.total_reward(), 0.0);

        session.step(1).unwrap();
        session.step(2).unwrap();

        assert_eq!(session.steps(), 2);
        assert_eq!(session.total_reward(), 3.0);
        assert_eq!(session.last(), Some(StepResult::new(2.0, 2)));
    }

    #[test]
    fn test_step_after_done() {
        let mut session = create_test_session(SapfConfig::default());

        session.reset().unwrap();
        session.step(1).unwrap();
        session.step(2).unwrap();
        let last = session.step(3).unwrap();
        assert!(last.is_done());
        assert!(session.is_done());

        let err = session.step(4).unwrap_err();
        assert!(matches!(err, SapfError::EpisodeDone { node: 3 }));

        session.reset().unwrap();
        assert!(!session.is_done());
        assert_eq!(session.steps(), 0);
    }

    /// Reset fails while `fail` is set
    struct FlakyReset {
        fail: Rc<Cell<bool>>,
        inner: ScriptedEnvironment,
    }

    impl Environment for FlakyReset {
        fn init(&mut self, config: &str) -> SapfResult<()> {
            self.inner.init(config)
        }

        fn reset(&mut self) -> SapfResult<StepResult> {
            if self.fail.get() {
                return Err(SapfError::MissingSymbol(Export::Reset));
            }
            self.inner.reset()
        }

        fn step(&mut self, node: NodeId) -> SapfResult<StepResult> {
            self.inner.step(node)
        }

        fn graph(&mut self) -> SapfResult<String> {
            self.inner.graph()
        }

        fn exports(&self) -> Vec<Export> {
            self.inner.exports()
        }
    }

    #[test]
    fn test_failed_reset_drops_previous_episode() {
        let fail = Rc::new(Cell::new(false));
        let env = FlakyReset {
            fail: Rc::clone(&fail),
            inner: create_test_env(),
        };
        let mut session = Session::with_environment(SapfConfig::default(), Box::new(env));

        session.reset().unwrap();
        session.step(1).unwrap();
        assert_eq!(session.steps(), 1);

        fail.set(true);
        assert!(session.reset().is_err());

        assert!(matches!(session.step(2), Err(SapfError::NoEpisode)));
        assert_eq!(session.steps(), 0);
        assert_eq!(session.total_reward(), 0.0);
        assert!(session.last().is_none());
    }

    #[test]
    fn test_step_limit() {
        let mut session = create_test_session(SapfConfig::default().with_max_steps(1));

        session.reset().unwrap();
        session.step(1).unwrap();

        let err = session.step(2).unwrap_err();
        assert!(matches!(err, SapfError::StepLimit { limit: 1 }));
    }

    /// Shares init calls with the test after the session takes ownership
    struct SharedInit {
        calls: Rc<RefCell<Vec<String>>>,
        inner: ScriptedEnvironment,
    }

    impl Environment for SharedInit {
        fn init(&mut self, config: &str) -> SapfResult<()> {
            self.calls.borrow_mut().push(config.to_owned());
            Ok(())
        }

        fn reset(&mut self) -> SapfResult<StepResult> {
            self.inner.reset()
        }

        fn step(&mut self, node: NodeId) -> SapfResult<StepResult> {
            self.inner.step(node)
        }

        fn graph(&mut self) -> SapfResult<String> {
            self.inner.graph()
        }

        fn exports(&self) -> Vec<Export> {
            self.inner.exports()
        }
    }

    #[test]
    fn test_init_runs_once_with_configured_arg() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let env = SharedInit {
            calls: Rc::clone(&calls),
            inner: create_test_env(),
        };
        let config = SapfConfig::default().with_init("maze-4x4");
        let mut session = Session::with_environment(config, Box::new(env));

        session.init().unwrap();
        session.reset().unwrap();
        session.reset().unwrap();

        assert_eq!(*calls.borrow(), vec!["maze-4x4".to_string()]);
    }

    #[test]
    fn test_reset_runs_init() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let env = SharedInit {
            calls: Rc::clone(&calls),
            inner: create_test_env(),
        };
        let mut session =
            Session::with_environment(SapfConfig::default().with_init("grid"), Box::new(env));

        session.reset().unwrap();

        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_init_skipped_without_arg() {
        let mut session = create_test_session(SapfConfig::default());
        assert!(session.init().is_ok());
        assert!(session.reset().is_ok());
    }

    #[test]
    fn test_run_episode_until_done() {
        let mut session = create_test_session(SapfConfig::default());

        let episode = session.run_episode(&mut FollowNode).unwrap();

        assert_eq!(episode.outcome, Outcome::Done);
        assert_eq!(episode.len(), 3);
        assert_eq!(episode.initial, StepResult::new(0.25, 0));
        assert_eq!(episode.total_reward, 6.0);
        assert_eq!(episode.final_node(), 3);

        // FollowNode steps to the node of the previous record
        let chosen: Vec<NodeId> = episode.transitions.iter().map(|t| t.node).collect();
        assert_eq!(chosen, vec![0, 1, 2]);
    }

    #[test]
    fn test_run_episode_truncated() {
        let mut session = create_test_session(SapfConfig::default().with_max_steps(2));

        let episode = session.run_episode(&mut FixedNode(7)).unwrap();

        assert_eq!(episode.outcome, Outcome::Truncated);
        assert_eq!(episode.len(), 2);
        assert!(episode.transitions.iter().all(|t| t.node == 7));
        assert_eq!(episode.total_reward, 3.0);
    }

    #[test]
    fn test_run_episode_terminal_reset() {
        let env = ScriptedEnvironment::new(StepResult::terminal(0.0, 5), vec![]);
        let mut session = Session::with_environment(SapfConfig::default(), Box::new(env));

        let episode = session.run_episode(&mut FollowNode).unwrap();

        assert_eq!(episode.outcome, Outcome::Done);
        assert!(episode.is_empty());
        assert_eq!(episode.final_node(), 5);
    }

    #[test]
    fn test_run_episode_with_closure() {
        let mut session = create_test_session(SapfConfig::default());

        let mut policy = |last: &StepResult| last.node + 10;
        let episode = session.run_episode(&mut policy).unwrap();

        assert_eq!(episode.transitions[0].node, 10);
    }

    #[test]
    fn test_episode_serializes() {
        let mut session = create_test_session(SapfConfig::default().with_max_steps(1));
        let episode = session.run_episode(&mut FollowNode).unwrap();

        let json = serde_json::to_value(&episode).unwrap();
        assert_eq!(json["outcome"], "truncated");
        assert_eq!(json["transitions"][0]["result"]["node"], 1);

        let restored: Episode = serde_json::from_value(json).unwrap();
        assert_eq!(restored, episode);
    }

    #[test]
    fn test_graph_json() {
        let mut session = create_test_session(SapfConfig::default());

        let graph = session.graph_json().unwrap();
        assert_eq!(graph["nodes"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_graph_json_rejects_non_json() {
        let env = ScriptedEnvironment::default().with_graph("digraph { a -> b }");
        let mut session = Session::with_environment(SapfConfig::default(), Box::new(env));

        assert_eq!(session.graph().unwrap(), "digraph { a -> b }");
        assert!(matches!(session.graph_json(), Err(SapfError::GraphJson(_))));
    }

    #[test]
    fn test_open_validates_config() {
        let err = Session::open(SapfConfig::default().with_max_steps(0)).err().unwrap();
        assert!(matches!(err, SapfError::Config(_)));
    }

    #[test]
    fn test_open_missing_library() {
        let err = Session::open(SapfConfig::new("/nonexistent/sapf.so")).err().unwrap();
        assert!(matches!(err, SapfError::Library { .. }));
    }
}
