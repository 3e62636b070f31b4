//! Temporal-difference control algorithms
//!
//! Every algorithm is driven the same way. [`ControlAlgorithm::act`] is
//! called once per environment step with an [`AgentStep`]; the agent learns
//! from the previous `(state, action)` pair and returns the next action, or
//! `None` once the episode has terminated.

use std::fmt::Debug;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tdlab_core::{AlgorithmKind, Result};

pub mod actor_critic;
pub mod double;
pub mod dynaq;
pub mod one_step;
pub mod sarsa_n;
pub mod true_online;

pub use actor_critic::ActorCritic;
pub use double::{DoubleRule, DoubleTd, Estimator};
pub use dynaq::DynaQ;
pub use one_step::{Bootstrap, OneStepTd};
pub use sarsa_n::SarsaN;
pub use true_online::TrueSarsaLambda;

/// One call's worth of environment feedback
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgentStep<'a> {
    /// A non-terminal state. `reward` is the reward that led here and is
    /// ignored on the first call of an episode.
    Observe {
        /// Reward for the previous action
        reward: f64,
        /// Current state
        state: &'a [f64],
    },
    /// The previous action ended the episode
    Terminal {
        /// Final reward
        reward: f64,
    },
}

impl<'a> AgentStep<'a> {
    /// Build a step from the classic `(reward, state, done)` triple
    ///
    /// Returns `None` for a non-terminal step without a state.
    #[must_use]
    pub fn from_parts(reward: f64, state: Option<&'a [f64]>, done: bool) -> Option<Self> {
        match (done, state) {
            (true, _) => Some(Self::Terminal { reward }),
            (false, Some(state)) => Some(Self::Observe { reward, state }),
            (false, None) => None,
        }
    }

    /// Reward carried by this step
    #[must_use]
    pub fn reward(&self) -> f64 {
        match *self {
            Self::Observe { reward, .. } | Self::Terminal { reward } => reward,
        }
    }
}

/// Where an agent is within its episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// No state seen since the last episode reset
    AwaitingFirstObservation,
    /// A previous `(state, action)` pair is pending an update
    Transitioning,
    /// A terminal step has been processed
    Terminated,
}

/// Common interface of every control agent
pub trait ControlAlgorithm: Send + Debug {
    /// Which algorithm this is
    fn kind(&self) -> AlgorithmKind;

    /// Discard everything learned; exploration returns to its initial state
    fn reset(&mut self);

    /// Start a new episode: forget the pending transition, zero traces and
    /// decay exploration
    fn reset_episode(&mut self);

    /// Process one step and pick the next action
    ///
    /// With `learning` false no parameter changes and Q-based agents act
    /// greedily.
    fn act(&mut self, step: AgentStep<'_>, learning: bool) -> Result<Option<usize>>;

    /// Greedy action for `state` under the current estimate
    fn greedy_action(&mut self, state: &[f64]) -> Result<usize>;

    /// Episode position
    fn lifecycle(&self) -> Lifecycle;

    /// Current exploration rate, if the agent explores with one
    fn epsilon(&self) -> Option<f64>;
}

/// `(state, action)` awaiting its update
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pending {
    pub state: Vec<f64>,
    pub action: usize,
}

/// Per-episode bookkeeping shared by the single-step agents
#[derive(Debug, Clone)]
pub(crate) struct EpisodeState {
    pending: Option<Pending>,
    lifecycle: Lifecycle,
}

impl EpisodeState {
    pub fn new() -> Self {
        Self {
            pending: None,
            lifecycle: Lifecycle::AwaitingFirstObservation,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn pending(&self) -> Option<&Pending> {
        self.pending.as_ref()
    }

    pub fn advance(&mut self, state: &[f64], action: usize) {
        self.pending = Some(Pending {
            state: state.to_vec(),
            action,
        });
        self.lifecycle = Lifecycle::Transitioning;
    }

    pub fn terminate(&mut self) {
        self.pending = None;
        self.lifecycle = Lifecycle::Terminated;
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

/// Agent random source: seeded when a seed is configured
pub(crate) fn agent_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}
