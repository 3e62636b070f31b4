//! Dyna-Q: Q-learning plus replayed planning updates

use rand::rngs::StdRng;
use tdlab_core::{AlgorithmKind, Result, Transition};

use super::{AgentStep, ControlAlgorithm, EpisodeState, Lifecycle};
use crate::buffer::PlanningModel;
use crate::exploration::ExplorationPolicy;
use crate::q_function::QFunction;

/// Dyna-Q agent
///
/// Every real transition is learned from once, stored in a bounded model and
/// followed by `plan_rep` Q-learning updates on transitions drawn from the
/// model uniformly with replacement.
#[derive(Debug)]
pub struct DynaQ {
    q: Box<dyn QFunction>,
    policy: ExplorationPolicy,
    alpha: f64,
    gamma: f64,
    plan_rep: usize,
    model: PlanningModel,
    episode: EpisodeState,
    rng: StdRng,
}

impl DynaQ {
    /// Create an agent with a model of capacity `model_size`
    pub fn new(
        q: Box<dyn QFunction>,
        policy: ExplorationPolicy,
        alpha: f64,
        gamma: f64,
        plan_rep: usize,
        model_size: usize,
        rng: StdRng,
    ) -> Result<Self> {
        Ok(Self {
            q,
            policy,
            alpha,
            gamma,
            plan_rep,
            model: PlanningModel::new(model_size)?,
            episode: EpisodeState::new(),
            rng,
        })
    }

    /// Action-value estimate
    #[must_use]
    pub fn q_function(&self) -> &dyn QFunction {
        self.q.as_ref()
    }

    /// Transition model
    #[must_use]
    pub fn model(&self) -> &PlanningModel {
        &self.model
    }

    fn learn_and_plan(&mut self, transition: Transition) -> Result<()> {
        q_learning_update(self.q.as_mut(), &transition, self.alpha, self.gamma)?;
        self.model.push(transition);
        for _ in 0..self.plan_rep {
            if let Some(sampled) = self.model.sample(&mut self.rng) {
                q_learning_update(self.q.as_mut(), sampled, self.alpha, self.gamma)?;
            }
        }
        Ok(())
    }
}

fn q_learning_update(
    q: &mut dyn QFunction,
    transition: &Transition,
    alpha: f64,
    gamma: f64,
) -> Result<()> {
    let target = match &transition.next_state {
        Some(next) => {
            let best = q.values(next)?.into_iter().fold(f64::NEG_INFINITY, f64::max);
            transition.reward + gamma * best
        }
        None => transition.reward,
    };
    q.update(&transition.state, transition.action, target, alpha, gamma)
}

impl ControlAlgorithm for DynaQ {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Dynaq
    }

    fn reset(&mut self) {
        self.q.reset();
        self.policy.reset();
        self.model.clear();
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
                if learning {
                    if let Some(prev) = self.episode.pending() {
                        let transition =
                            Transition::new(prev.state.clone(), prev.action, reward, state.to_vec());
                        self.learn_and_plan(transition)?;
                    }
                }
                self.episode.advance(state, action);
                Ok(Some(action))
            }
            AgentStep::Terminal { reward } => {
                if learning {
                    if let Some(prev) = self.episode.pending() {
                        let transition = Transition::terminal(prev.state.clone(), prev.action, reward);
                        self.learn_and_plan(transition)?;
                    }
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
