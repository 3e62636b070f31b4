//! Double estimators: Double Sarsa and Double Q-learning
//!
//! Two independent action-value functions are kept. Behaviour follows their
//! sum; each update picks one of them at random to move, bootstrapping from
//! the other.

use rand::rngs::StdRng;
use rand::Rng;
use tdlab_core::{AlgorithmKind, Result};

use super::{AgentStep, ControlAlgorithm, EpisodeState, Lifecycle};
use crate::exploration::ExplorationPolicy;
use crate::q_function::QFunction;

/// Bootstrap rule of a double estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleRule {
    /// `Q_other(s', a')` for the chosen action
    Sarsa,
    /// `Q_other(s', argmax_b Q_this(s', b))`
    QLearning,
}

/// One of the two estimators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimator {
    /// First table
    First,
    /// Second table
    Second,
}

impl Estimator {
    /// The other estimator
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// Double Sarsa / Double Q-learning agent
#[derive(Debug)]
pub struct DoubleTd {
    rule: DoubleRule,
    q: [Box<dyn QFunction>; 2],
    policy: ExplorationPolicy,
    alpha: f64,
    gamma: f64,
    episode: EpisodeState,
    rng: StdRng,
}

impl DoubleTd {
    /// Create an agent from two freshly built estimators
    #[must_use]
    pub fn new(
        rule: DoubleRule,
        first: Box<dyn QFunction>,
        second: Box<dyn QFunction>,
        policy: ExplorationPolicy,
        alpha: f64,
        gamma: f64,
        rng: StdRng,
    ) -> Self {
        Self {
            rule,
            q: [first, second],
            policy,
            alpha,
            gamma,
            episode: EpisodeState::new(),
            rng,
        }
    }

    /// One of the estimators
    #[must_use]
    pub fn estimator(&self, which: Estimator) -> &dyn QFunction {
        self.q[which.index()].as_ref()
    }

    fn combined_values(&self, state: &[f64]) -> Result<Vec<f64>> {
        let first = self.q[0].values(state)?;
        let second = self.q[1].values(state)?;
        Ok(first.iter().zip(&second).map(|(a, b)| a + b).collect())
    }

    /// Update `update` towards a target evaluated by `evaluate`
    ///
    /// `next` is the successor state with the action chosen there, or `None`
    /// on termination.
    fn learn_on(
        &mut self,
        update: Estimator,
        evaluate: Estimator,
        reward: f64,
        next: Option<(&[f64], usize)>,
    ) -> Result<()> {
        let Some(prev) = self.episode.pending() else {
            return Ok(());
        };

        let target = match next {
            None => reward,
            Some((state, action)) => {
                let bootstrap_action = match self.rule {
                    DoubleRule::Sarsa => action,
                    DoubleRule::QLearning => {
                        let own = self.q[update.index()].values(state)?;
                        self.policy.greedy(&own, &mut self.rng)
                    }
                };
                reward + self.gamma * self.q[evaluate.index()].value(state, bootstrap_action)?
            }
        };

        self.q[update.index()].update(&prev.state, prev.action, target, self.alpha, self.gamma)
    }

    fn pick_estimator(&mut self) -> Estimator {
        if self.rng.gen_bool(0.5) {
            Estimator::First
        } else {
            Estimator::Second
        }
    }
}

impl ControlAlgorithm for DoubleTd {
    fn kind(&self) -> AlgorithmKind {
        match self.rule {
            DoubleRule::Sarsa => AlgorithmKind::DoubleSarsa,
            DoubleRule::QLearning => AlgorithmKind::DoubleQlearning,
        }
    }

    fn reset(&mut self) {
        self.q.iter_mut().for_each(|q| q.reset());
        self.policy.reset();
        self.episode.clear();
    }

    fn reset_episode(&mut self) {
        self.episode.clear();
        self.q.iter_mut().for_each(|q| q.reset_episode());
        self.policy.reset_episode();
    }

    fn act(&mut self, step: AgentStep<'_>, learning: bool) -> Result<Option<usize>> {
        match step {
            AgentStep::Observe { reward, state } => {
                let combined = self.combined_values(state)?;
                let action = self.policy.choose(&combined, learning, &mut self.rng);
                if learning && self.episode.pending().is_some() {
                    let update = self.pick_estimator();
                    self.learn_on(update, update.other(), reward, Some((state, action)))?;
                }
                self.episode.advance(state, action);
                Ok(Some(action))
            }
            AgentStep::Terminal { reward } => {
                if learning && self.episode.pending().is_some() {
                    let update = self.pick_estimator();
                    self.learn_on(update, update.other(), reward, None)?;
                }
                self.episode.terminate();
                Ok(None)
            }
        }
    }

    fn greedy_action(&mut self, state: &[f64]) -> Result<usize> {
        let combined = self.combined_values(state)?;
        Ok(self.policy.greedy(&combined, &mut self.rng))
    }

    fn lifecycle(&self) -> Lifecycle {
        self.episode.lifecycle()
    }

    fn epsilon(&self) -> Option<f64> {
        Some(self.policy.epsilon())
    }
}
