//! n-step Sarsa
//!
//! Pending `(state, action)` pairs wait in a window together with the rewards
//! that followed them. Once the window holds `n` pairs, the oldest is updated
//! towards `Σ γ^i r_i + γ^n Q(s, a)`. At termination every pending pair is
//! flushed with the rewards actually observed, so shorter horizons close the
//! episode.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use tdlab_core::{AlgorithmKind, RLError, Result};
use tracing::trace;

use super::{AgentStep, ControlAlgorithm, Lifecycle, Pending};
use crate::exploration::ExplorationPolicy;
use crate::q_function::QFunction;
use crate::utils::discounted_sum;

/// n-step Sarsa agent
#[derive(Debug)]
pub struct SarsaN {
    n: usize,
    q: Box<dyn QFunction>,
    policy: ExplorationPolicy,
    alpha: f64,
    gamma: f64,
    window: VecDeque<Pending>,
    rewards: VecDeque<f64>,
    lifecycle: Lifecycle,
    rng: StdRng,
}

impl SarsaN {
    /// Create an agent with horizon `n` (at least 1)
    pub fn new(
        n: usize,
        q: Box<dyn QFunction>,
        policy: ExplorationPolicy,
        alpha: f64,
        gamma: f64,
        rng: StdRng,
    ) -> Result<Self> {
        if n == 0 {
            return Err(RLError::config("n-step horizon must be at least 1"));
        }
        Ok(Self {
            n,
            q,
            policy,
            alpha,
            gamma,
            window: VecDeque::with_capacity(n),
            rewards: VecDeque::with_capacity(n),
            lifecycle: Lifecycle::AwaitingFirstObservation,
            rng,
        })
    }

    /// Horizon
    #[must_use]
    pub fn horizon(&self) -> usize {
        self.n
    }

    /// Action-value estimate
    #[must_use]
    pub fn q_function(&self) -> &dyn QFunction {
        self.q.as_ref()
    }

    /// Number of pairs awaiting their update
    #[must_use]
    pub fn pending(&self) -> usize {
        self.window.len()
    }

    fn update_front(&mut self, tail: f64) -> Result<()> {
        if let Some(front) = self.window.front() {
            let target = discounted_sum(&self.rewards, self.gamma) + tail;
            self.q
                .update(&front.state, front.action, target, self.alpha, self.gamma)?;
        }
        Ok(())
    }

    fn pop_front(&mut self) {
        self.window.pop_front();
        self.rewards.pop_front();
    }

    fn clear_window(&mut self) {
        self.window.clear();
        self.rewards.clear();
    }
}

impl ControlAlgorithm for SarsaN {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::SarsaN
    }

    fn reset(&mut self) {
        self.q.reset();
        self.policy.reset();
        self.clear_window();
        self.lifecycle = Lifecycle::AwaitingFirstObservation;
    }

    fn reset_episode(&mut self) {
        self.clear_window();
        self.lifecycle = Lifecycle::AwaitingFirstObservation;
        self.q.reset_episode();
        self.policy.reset_episode();
    }

    fn act(&mut self, step: AgentStep<'_>, learning: bool) -> Result<Option<usize>> {
        match step {
            AgentStep::Observe { reward, state } => {
                let q_next = self.q.values(state)?;
                let action = self.policy.choose(&q_next, learning, &mut self.rng);

                if !self.window.is_empty() {
                    self.rewards.push_back(reward);
                }
                if self.window.len() == self.n {
                    if learning {
                        let gamma_n = self.gamma.powi(i32::try_from(self.n).unwrap_or(i32::MAX));
                        self.update_front(gamma_n * q_next[action])?;
                    }
                    self.pop_front();
                }

                self.window.push_back(Pending {
                    state: state.to_vec(),
                    action,
                });
                self.lifecycle = Lifecycle::Transitioning;
                Ok(Some(action))
            }
            AgentStep::Terminal { reward } => {
                if !self.window.is_empty() {
                    self.rewards.push_back(reward);
                }
                trace!(pending = self.window.len(), "Flushing n-step window");
                while !self.window.is_empty() {
                    if learning {
                        self.update_front(0.0)?;
                    }
                    self.pop_front();
                }
                self.lifecycle = Lifecycle::Terminated;
                Ok(None)
            }
        }
    }

    fn greedy_action(&mut self, state: &[f64]) -> Result<usize> {
        let q = self.q.values(state)?;
        Ok(self.policy.greedy(&q, &mut self.rng))
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn epsilon(&self) -> Option<f64> {
        Some(self.policy.epsilon())
    }
}
