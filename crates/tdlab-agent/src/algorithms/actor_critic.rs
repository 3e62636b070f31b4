//! One-step actor-critic with linear function approximation

use rand::rngs::StdRng;
use tdlab_core::{AlgorithmKind, Result};

use super::{AgentStep, ControlAlgorithm, EpisodeState, Lifecycle};
use crate::policy::LinearSoftmaxPolicy;
use crate::v_function::LinearVFunction;

/// One-step actor-critic agent
///
/// The critic is a linear state-value estimate; the actor is a linear softmax
/// policy. Both move along the same TD error `r + γV(s') − V(s)`. Actions are
/// always sampled from the actor, learning or not.
#[derive(Debug)]
pub struct ActorCritic {
    critic: LinearVFunction,
    actor: LinearSoftmaxPolicy,
    alpha_w: f64,
    alpha_theta: f64,
    gamma: f64,
    episode: EpisodeState,
    rng: StdRng,
}

impl ActorCritic {
    /// Create an agent
    #[must_use]
    pub fn new(
        critic: LinearVFunction,
        actor: LinearSoftmaxPolicy,
        alpha_w: f64,
        alpha_theta: f64,
        gamma: f64,
        rng: StdRng,
    ) -> Self {
        Self {
            critic,
            actor,
            alpha_w,
            alpha_theta,
            gamma,
            episode: EpisodeState::new(),
            rng,
        }
    }

    /// State-value estimate
    #[must_use]
    pub fn critic(&self) -> &LinearVFunction {
        &self.critic
    }

    /// Softmax policy
    #[must_use]
    pub fn actor(&self) -> &LinearSoftmaxPolicy {
        &self.actor
    }

    fn learn(&mut self, target: f64) -> Result<()> {
        if let Some(prev) = self.episode.pending() {
            let td_error = target - self.critic.value(&prev.state)?;
            self.critic.update(&prev.state, td_error, self.alpha_w)?;
            self.actor
                .update(&prev.state, prev.action, td_error, self.alpha_theta)?;
        }
        Ok(())
    }
}

impl ControlAlgorithm for ActorCritic {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::ActorCritic
    }

    fn reset(&mut self) {
        self.critic.reset();
        self.actor.reset();
        self.episode.clear();
    }

    fn reset_episode(&mut self) {
        self.episode.clear();
    }

    fn act(&mut self, step: AgentStep<'_>, learning: bool) -> Result<Option<usize>> {
        match step {
            AgentStep::Observe { reward, state } => {
                if learning && self.episode.pending().is_some() {
                    let target = reward + self.gamma * self.critic.value(state)?;
                    self.learn(target)?;
                }
                let action = self.actor.sample(state, &mut self.rng)?;
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
        self.actor.greedy(state, &mut self.rng)
    }

    fn lifecycle(&self) -> Lifecycle {
        self.episode.lifecycle()
    }

    fn epsilon(&self) -> Option<f64> {
        None
    }
}
