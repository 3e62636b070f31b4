//! One-step TD control: Sarsa, Expected Sarsa, Q-learning and Sarsa(λ)
//!
//! The four share everything but the bootstrap term. Sarsa(λ) is Sarsa over
//! a traced action-value function.

use rand::rngs::StdRng;
use tdlab_core::{AlgorithmKind, Result};

use super::{AgentStep, ControlAlgorithm, EpisodeState, Lifecycle};
use crate::exploration::ExplorationPolicy;
use crate::q_function::QFunction;

/// How the successor state's value enters the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// `Q(s', a')` for the action actually chosen
    Sarsa,
    /// `Σ π(b|s') Q(s', b)` under the exploration policy
    Expected,
    /// `max_b Q(s', b)`
    Greedy,
}

/// Single-estimator one-step TD agent
#[derive(Debug)]
pub struct OneStepTd {
    kind: AlgorithmKind,
    bootstrap: Bootstrap,
    q: Box<dyn QFunction>,
    policy: ExplorationPolicy,
    alpha: f64,
    gamma: f64,
    episode: EpisodeState,
    rng: StdRng,
}

impl OneStepTd {
    /// Create an agent; `kind` only labels it
    #[must_use]
    pub fn new(
        kind: AlgorithmKind,
        bootstrap: Bootstrap,
        q: Box<dyn QFunction>,
        policy: ExplorationPolicy,
        alpha: f64,
        gamma: f64,
        rng: StdRng,
    ) -> Self {
        Self {
            kind,
            bootstrap,
            q,
            policy,
            alpha,
            gamma,
            episode: EpisodeState::new(),
            rng,
        }
    }

    /// Bootstrap rule
    #[must_use]
    pub fn bootstrap(&self) -> Bootstrap {
        self.bootstrap
    }

    /// Action-value estimate
    #[must_use]
    pub fn q_function(&self) -> &dyn QFunction {
        self.q.as_ref()
    }

    fn successor_value(&mut self, q_next: &[f64], next_action: usize) -> f64 {
        match self.bootstrap {
            Bootstrap::Sarsa => q_next[next_action],
            Bootstrap::Expected => self
                .policy
                .distribution(q_next, &mut self.rng)
                .iter()
                .zip(q_next)
                .map(|(p, q)| p * q)
                .sum(),
            Bootstrap::Greedy => q_next.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    fn learn(&mut self, target: f64) -> Result<()> {
        if let Some(prev) = self.episode.pending() {
            self.q
                .update(&prev.state, prev.action, target, self.alpha, self.gamma)?;
        }
        Ok(())
    }
}

impl ControlAlgorithm for OneStepTd {
    fn kind(&self) -> AlgorithmKind {
        self.kind
    }

    fn reset(&mut self) {
        self.q.reset();
        self.policy.reset();
        self.episode.clear();
    }

    fn reset_episode(&mut self) {
        self.episode.clear();
        self.q.reset_episode();
        self.policy.reset_episode();
    }

    fn act(&mut self, step: AgentStep<'_>, learning: bool) -> Result<Option<usize>> {
        match step {
            AgentStep::Observe { reward, state } => {
                let q_next = self.q.values(state)?;
                let action = self.policy.choose(&q_next, learning, &mut self.rng);
                if learning && self.episode.pending().is_some() {
                    let target = reward + self.gamma * self.successor_value(&q_next, action);
                    self.learn(target)?;
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

#[cfg(test)]
mod tests {
    use super::super::testing::{epsilon_greedy, softmax, tabular_q, walk};
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    fn agent(bootstrap: Bootstrap) -> OneStepTd {
        OneStepTd::new(
            AlgorithmKind::Sarsa,
            bootstrap,
            tabular_q(2),
            epsilon_greedy(0.0),
            0.5,
            0.9,
            StdRng::seed_from_u64(1),
        )
    }

    #[test]
    fn test_first_reward_ignored_and_terminal_target() {
        let mut agent = agent(Bootstrap::Sarsa);
        let a0 = agent
            .act(AgentStep::Observe { reward: 100.0, state: &[0.1, 0.1] }, true)
            .unwrap()
            .unwrap();
        assert_eq!(agent.lifecycle(), Lifecycle::Transitioning);
        assert_eq!(agent.q_function().values(&[0.1, 0.1]).unwrap(), vec![0.0, 0.0]);

        assert_eq!(agent.act(AgentStep::Terminal { reward: 2.0 }, true).unwrap(), None);
        assert_eq!(agent.lifecycle(), Lifecycle::Terminated);
        assert_abs_diff_eq!(agent.q_function().value(&[0.1, 0.1], a0).unwrap(), 1.0);
    }

    #[test]
    fn test_bootstrap_targets() {
        for (bootstrap, expected) in [
            (Bootstrap::Sarsa, 0.5 * (1.0 + 0.9 * 4.0)),
            (Bootstrap::Greedy, 0.5 * (1.0 + 0.9 * 4.0)),
            (Bootstrap::Expected, 0.5 * (1.0 + 0.9 * 4.0)),
        ] {
            let mut agent = agent(bootstrap);
            // seed Q at the successor so that action 1 is clearly greedy
            agent.q.update(&[0.9, 0.9], 1, 8.0, 0.5, 0.9).unwrap();

            let a0 = agent
                .act(AgentStep::Observe { reward: 0.0, state: &[0.1, 0.1] }, true)
                .unwrap()
                .unwrap();
            let a1 = agent
                .act(AgentStep::Observe { reward: 1.0, state: &[0.9, 0.9] }, true)
                .unwrap()
                .unwrap();
            assert_eq!(a1, 1);
            assert_abs_diff_eq!(
                agent.q_function().value(&[0.1, 0.1], a0).unwrap(),
                expected,
                epsilon = 1e-12
            );
        }
    }

    /// Q(s0, a0) after one transition into a successor whose values are [0, 4]
    fn expected_sarsa_update(policy: ExplorationPolicy) -> f64 {
        let mut agent = OneStepTd::new(
            AlgorithmKind::ExpectedSarsa,
            Bootstrap::Expected,
            tabular_q(2),
            policy,
            0.5,
            0.9,
            StdRng::seed_from_u64(3),
        );
        agent.q.update(&[0.9, 0.9], 1, 8.0, 0.5, 0.9).unwrap();
        assert_eq!(agent.q_function().values(&[0.9, 0.9]).unwrap(), vec![0.0, 4.0]);

        let a0 = agent
            .act(AgentStep::Observe { reward: 0.0, state: &[0.1, 0.1] }, true)
            .unwrap()
            .unwrap();
        agent
            .act(AgentStep::Observe { reward: 1.0, state: &[0.9, 0.9] }, true)
            .unwrap();
        agent.q_function().value(&[0.1, 0.1], a0).unwrap()
    }

    #[test]
    fn test_expected_sarsa_weights_successor_by_epsilon_greedy() {
        // π(s') = [0.25, 0.75], so the expectation is 3 rather than the max of 4
        let value = expected_sarsa_update(epsilon_greedy(0.5));
        assert_abs_diff_eq!(value, 0.5 * (1.0 + 0.9 * 3.0), epsilon = 1e-12);
        assert!((value - 0.5 * (1.0 + 0.9 * 4.0)).abs() > 0.1);
    }

    #[test]
    fn test_expected_sarsa_weights_successor_by_softmax() {
        let p_greedy = 4.0_f64.exp() / (1.0 + 4.0_f64.exp());
        let value = expected_sarsa_update(softmax(1.0));
        assert_abs_diff_eq!(value, 0.5 * (1.0 + 0.9 * 4.0 * p_greedy), epsilon = 1e-12);
        assert!((value - 0.5 * (1.0 + 0.9 * 4.0)).abs() > 0.01);
    }

    #[test]
    fn test_not_learning_leaves_estimate() {
        let mut agent = agent(Bootstrap::Greedy);
        for s in walk() {
            agent.act(AgentStep::Observe { reward: 1.0, state: &s }, false).unwrap();
        }
        agent.act(AgentStep::Terminal { reward: 5.0 }, false).unwrap();
        for s in walk() {
            assert_eq!(agent.q_function().values(&s).unwrap(), vec![0.0, 0.0]);
        }
    }

    #[test]
    fn test_reset_episode_decays_and_reset_restores() {
        let mut agent = OneStepTd::new(
            AlgorithmKind::Qlearning,
            Bootstrap::Greedy,
            tabular_q(2),
            epsilon_greedy(0.5),
            0.5,
            1.0,
            StdRng::seed_from_u64(4),
        );
        agent.reset_episode();
        assert_abs_diff_eq!(agent.epsilon().unwrap(), 0.45);
        agent.act(AgentStep::Observe { reward: 0.0, state: &[0.2, 0.2] }, true).unwrap();
        agent.act(AgentStep::Terminal { reward: 1.0 }, true).unwrap();

        agent.reset();
        assert_eq!(agent.epsilon(), Some(0.5));
        assert_eq!(agent.lifecycle(), Lifecycle::AwaitingFirstObservation);
        assert_eq!(agent.q_function().values(&[0.2, 0.2]).unwrap(), vec![0.0, 0.0]);
        assert_eq!(agent.kind(), AlgorithmKind::Qlearning);
    }
}
