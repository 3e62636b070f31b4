//! Exploration policies over a row of action values
//!
//! Three families are supported: epsilon-greedy, Boltzmann (softmax) and
//! max-Boltzmann. Epsilon decays once per episode and is restored by a full
//! reset.

use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};
use tdlab_core::{ExplorationConfig, PolicyKind};
use tracing::trace;

use crate::utils::{argmax_random_tie, ExponentialSchedule};

/// Action-selection rule with an episode-decayed epsilon
#[derive(Debug, Clone)]
pub struct ExplorationPolicy {
    kind: PolicyKind,
    temperature: f64,
    schedule: ExponentialSchedule,
}

impl ExplorationPolicy {
    /// Create a policy; epsilon starts at its configured initial value
    #[must_use]
    pub fn new(config: &ExplorationConfig) -> Self {
        Self {
            kind: config.policy,
            temperature: config.temperature,
            schedule: ExponentialSchedule::new(
                config.epsilon,
                config.min_epsilon,
                config.epsilon_decay,
            ),
        }
    }

    /// Policy family
    #[must_use]
    pub fn kind(&self) -> PolicyKind {
        self.kind
    }

    /// Current epsilon
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.schedule.value()
    }

    /// Restore the initial epsilon
    pub fn reset(&mut self) {
        self.schedule.reset();
    }

    /// Decay epsilon at an episode boundary
    pub fn reset_episode(&mut self) {
        let epsilon = self.schedule.step();
        trace!(epsilon, "Epsilon decayed");
    }

    /// Greedy choice among `q`, ties broken uniformly
    pub fn greedy<R: Rng + ?Sized>(&self, q: &[f64], rng: &mut R) -> usize {
        argmax_random_tie(q, rng)
    }

    /// Exploratory choice among `q`
    pub fn select<R: Rng + ?Sized>(&self, q: &[f64], rng: &mut R) -> usize {
        let epsilon = self.epsilon();
        match self.kind {
            PolicyKind::EpsilonGreedy => {
                if rng.gen::<f64>() < epsilon {
                    rng.gen_range(0..q.len())
                } else {
                    self.greedy(q, rng)
                }
            }
            PolicyKind::Softmax => sample_index(&boltzmann(q, self.temperature), rng),
            PolicyKind::MaxBoltzmann => {
                if rng.gen::<f64>() < epsilon {
                    sample_index(&boltzmann(q, self.temperature), rng)
                } else {
                    self.greedy(q, rng)
                }
            }
        }
    }

    /// [`select`](Self::select) when learning, [`greedy`](Self::greedy) otherwise
    pub fn choose<R: Rng + ?Sized>(&self, q: &[f64], learning: bool, rng: &mut R) -> usize {
        if learning {
            self.select(q, rng)
        } else {
            self.greedy(q, rng)
        }
    }

    /// Probability of each action under [`select`](Self::select)
    ///
    /// The greedy mass goes to a single maximiser chosen with `rng`, so the
    /// result sums to one and matches one draw of the selection rule.
    pub fn distribution<R: Rng + ?Sized>(&self, q: &[f64], rng: &mut R) -> Vec<f64> {
        let epsilon = self.epsilon();
        #[allow(clippy::cast_precision_loss)]
        let n = q.len() as f64;
        match self.kind {
            PolicyKind::EpsilonGreedy => {
                let mut probs = vec![epsilon / n; q.len()];
                probs[self.greedy(q, rng)] += 1.0 - epsilon;
                probs
            }
            PolicyKind::Softmax => boltzmann(q, self.temperature),
            PolicyKind::MaxBoltzmann => {
                let mut probs: Vec<f64> = boltzmann(q, self.temperature)
                    .into_iter()
                    .map(|p| p * epsilon)
                    .collect();
                probs[self.greedy(q, rng)] += 1.0 - epsilon;
                probs
            }
        }
    }
}

/// Boltzmann distribution `exp(q/T) / Σ exp(q/T)`
///
/// The temperature is raised as needed so that `max(q)/T` stays below
/// `ln(f64::MAX)`. Exponents are taken relative to `max(q)`, which leaves the
/// distribution unchanged. A sum that is zero or NaN yields the uniform
/// distribution.
#[must_use]
pub fn boltzmann(q: &[f64], temperature: f64) -> Vec<f64> {
    let ln_max = f64::MAX.ln();
    let max_q = q.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let temperature = if max_q / temperature > ln_max {
        trace!(max_q, temperature, "Clamping Boltzmann temperature");
        max_q / ln_max
    } else {
        temperature
    };

    let exps: Vec<f64> = q
        .iter()
        .map(|v| ((v - max_q) / temperature).exp())
        .collect();
    let sum: f64 = exps.iter().sum();
    if sum == 0.0 || sum.is_nan() {
        trace!(sum, "Degenerate Boltzmann sum, falling back to uniform");
        #[allow(clippy::cast_precision_loss)]
        let uniform = 1.0 / q.len() as f64;
        return vec![uniform; q.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// Draw an index with the given weights; uniform if the weights are unusable
pub(crate) fn sample_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    match WeightedIndex::new(weights) {
        Ok(dist) => dist.sample(rng),
        Err(_) => rng.gen_range(0..weights.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(policy: PolicyKind, epsilon: f64) -> ExplorationConfig {
        ExplorationConfig {
            policy,
            epsilon,
            epsilon_decay: 0.5,
            min_epsilon: 0.1,
            temperature: 1.0,
        }
    }

    #[test]
    fn test_epsilon_schedule() {
        let mut policy = ExplorationPolicy::new(&config(PolicyKind::EpsilonGreedy, 0.8));
        assert_eq!(policy.epsilon(), 0.8);
        policy.reset_episode();
        assert_abs_diff_eq!(policy.epsilon(), 0.4);
        policy.reset_episode();
        policy.reset_episode();
        assert_abs_diff_eq!(policy.epsilon(), 0.1);
        policy.reset();
        assert_eq!(policy.epsilon(), 0.8);
    }

    #[test]
    fn test_epsilon_greedy_distribution() {
        let mut rng = StdRng::seed_from_u64(0);
        let policy = ExplorationPolicy::new(&config(PolicyKind::EpsilonGreedy, 0.3));
        let probs = policy.distribution(&[0.0, 2.0, 1.0], &mut rng);
        assert_abs_diff_eq!(probs[0], 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(probs[1], 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_max_boltzmann_distribution_sums_to_one() {
        let mut rng = StdRng::seed_from_u64(0);
        let policy = ExplorationPolicy::new(&config(PolicyKind::MaxBoltzmann, 0.5));
        let probs = policy.distribution(&[1.0, 3.0, -2.0, 0.5], &mut rng);
        assert_abs_diff_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(probs[1] > 0.5);
    }

    #[test]
    fn test_boltzmann_guards_overflow() {
        let probs = boltzmann(&[1e308, 0.0], 0.4);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert_abs_diff_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-12);

        let uniform = boltzmann(&[-1e308, -1e308], 1e-3);
        assert_eq!(uniform, vec![0.5, 0.5]);

        let nan = boltzmann(&[f64::NAN, f64::NAN], 0.4);
        assert_eq!(nan, vec![0.5, 0.5]);
    }

    #[test]
    fn test_boltzmann_keeps_preferences_when_clamped() {
        // 300 / 0.4 exceeds ln(f64::MAX), so the temperature is clamped
        let probs = boltzmann(&[300.0, 299.0], 0.4);
        assert!(probs[0] > 0.5, "{probs:?}");
        assert_abs_diff_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-12);

        let probs = boltzmann(&[1000.0, 0.0, 999.0], 0.4);
        assert!(probs[0] > probs[2] && probs[2] > probs[1], "{probs:?}");
        assert_abs_diff_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_boltzmann_matches_closed_form() {
        let probs = boltzmann(&[1.0, 2.0], 0.5);
        let expected = 1.0 / (1.0 + 2.0_f64.exp());
        assert_abs_diff_eq!(probs[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_greedy_when_not_learning() {
        let mut rng = StdRng::seed_from_u64(11);
        let policy = ExplorationPolicy::new(&config(PolicyKind::EpsilonGreedy, 1.0));
        for _ in 0..50 {
            assert_eq!(policy.choose(&[0.0, 0.0, 4.0], false, &mut rng), 2);
        }
    }

    #[test]
    fn test_softmax_select_covers_actions() {
        let mut rng = StdRng::seed_from_u64(5);
        let policy = ExplorationPolicy::new(&config(PolicyKind::Softmax, 0.0));
        let mut counts = [0_usize; 2];
        for _ in 0..400 {
            counts[policy.select(&[0.0, 0.5], &mut rng)] += 1;
        }
        assert!(counts[0] > 50 && counts[1] > counts[0]);
    }
}
