//! True online Sarsa(λ) with a dutch trace over linear features

use rand::rngs::StdRng;
use tdlab_core::{AlgorithmKind, Result};

use super::{AgentStep, ControlAlgorithm, EpisodeState, Lifecycle};
use crate::exploration::ExplorationPolicy;
use crate::q_function::{LinearQFunction, QFunction};

/// True online Sarsa(λ) agent
///
/// Holds the previous step's bootstrap estimate `Q_old`, zeroed at every
/// episode start along with the trace.
#[derive(Debug)]
pub struct TrueSarsaLambda {
    q: LinearQFunction,
    policy: ExplorationPolicy,
    alpha: f64,
    gamma: f64,
    q_old: f64,
    episode: EpisodeState,
    rng: StdRng,
}

impl TrueSarsaLambda {
    /// Create an agent; `q` must carry a dutch trace
    #[must_use]
    pub fn new(
        q: LinearQFunction,
        policy: ExplorationPolicy,
        alpha: f64,
        gamma: f64,
        rng: StdRng,
    ) -> Self {
        Self {
            q,
            policy,
            alpha,
            gamma,
            q_old: 0.0,
            episode: EpisodeState::new(),
            rng,
        }
    }

    /// Action-value estimate
    #[must_use]
    pub fn q_function(&self) -> &LinearQFunction {
        &self.q
    }

    fn learn(&mut self, target: f64) -> Result<()> {
        if let Some(prev) = self.episode.pending() {
            self.q.true_online_update(
                &prev.state,
                prev.action,
                target,
                self.alpha,
                self.gamma,
                self.q_old,
            )?;
        }
        Ok(())
    }
}

impl ControlAlgorithm for TrueSarsaLambda {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::TrueSarsaLambda
    }

    fn reset(&mut self) {
        self.q.reset();
        self.policy.reset();
        self.episode.clear();
        self.q_old = 0.0;
    }

    fn reset_episode(&mut self) {
        self.episode.clear();
        self.q.reset_episode();
        self.policy.reset_episode();
        self.q_old = 0.0;
    }

    fn act(&mut self, step: AgentStep<'_>, learning: bool) -> Result<Option<usize>> {
        match step {
            AgentStep::Observe { reward, state } => {
                let q_next = self.q.values(state)?;
                let action = self.policy.choose(&q_next, learning, &mut self.rng);
                if learning && self.episode.pending().is_some() {
                    self.learn(reward + self.gamma * q_next[action])?;
                    self.q_old = q_next[action];
                }
                self.episode.advance(state, action);
                Ok(Some(action))
            }
            AgentStep::Terminal { reward } => {
                if learning {
                    self.learn(reward)?;
                }
                self.episode.terminate();
                Ok(None)
            }
        }
    }

    fn greedy_action(&mut self, state: &[f64]) -> Result<usize> {
        let q = self.q.values(state)?;
        Ok(self.policy.greedy(&q, &mut self.rng))
    }

    fn lifecycle(&self) -> Lifecycle {
        self.episode.lifecycle()
    }

    fn epsilon(&self) -> Option<f64> {
        Some(self.policy.epsilon())
    }
}
