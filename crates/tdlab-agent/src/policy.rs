//! Linear softmax policy used as an actor
//!
//! Action preferences are `θ[a] · x(s)`; probabilities are their softmax.

use ndarray::{Array1, Array2};
use rand::Rng;
use tdlab_coding::Discretizer;
use tdlab_core::Result;

use crate::exploration::sample_index;
use crate::utils::argmax_random_tie;

/// Softmax over linear action preferences
#[derive(Debug)]
pub struct LinearSoftmaxPolicy {
    discretizer: Box<dyn Discretizer>,
    theta: Array2<f64>,
}

impl LinearSoftmaxPolicy {
    /// Create a uniform policy (zero preferences)
    #[must_use]
    pub fn new(discretizer: Box<dyn Discretizer>, n_actions: usize) -> Self {
        let size = discretizer.coding_size();
        Self {
            discretizer,
            theta: Array2::zeros((n_actions, size)),
        }
    }

    /// Number of actions
    #[must_use]
    pub fn num_actions(&self) -> usize {
        self.theta.nrows()
    }

    /// Preference matrix, one row per action
    #[must_use]
    pub fn theta(&self) -> &Array2<f64> {
        &self.theta
    }

    /// `π(· | state)`
    pub fn probabilities(&self, state: &[f64]) -> Result<Array1<f64>> {
        let x = self.discretizer.features(state)?;
        Ok(softmax(&self.theta.dot(&x)))
    }

    /// Draw an action from `π(· | state)`
    pub fn sample<R: Rng + ?Sized>(&self, state: &[f64], rng: &mut R) -> Result<usize> {
        let probs = self.probabilities(state)?.to_vec();
        Ok(sample_index(&probs, rng))
    }

    /// Most probable action, ties broken uniformly
    pub fn greedy<R: Rng + ?Sized>(&self, state: &[f64], rng: &mut R) -> Result<usize> {
        let probs = self.probabilities(state)?.to_vec();
        Ok(argmax_random_tie(&probs, rng))
    }

    /// Policy-gradient step `θ ← θ + alpha · td_error · ∇ln π(action | state)`
    ///
    /// The log-likelihood gradient is `(1 − π(a))·x` on the taken action's
    /// row and `−π(b)·x` on every other row `b`.
    pub fn update(&mut self, state: &[f64], action: usize, td_error: f64, alpha: f64) -> Result<()> {
        let x = self.discretizer.features(state)?;
        let probs = softmax(&self.theta.dot(&x));
        for (b, mut row) in self.theta.outer_iter_mut().enumerate() {
            let grad = if b == action { 1.0 - probs[b] } else { -probs[b] };
            row.scaled_add(alpha * td_error * grad, &x);
        }
        Ok(())
    }

    /// Zero the preferences
    pub fn reset(&mut self) {
        self.theta.fill(0.0);
    }
}

fn softmax(preferences: &Array1<f64>) -> Array1<f64> {
    let max = preferences.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let exps = preferences.mapv(|v| (v - max).exp());
    let sum = exps.sum();
    if sum.is_finite() && sum > 0.0 {
        exps / sum
    } else {
        #[allow(clippy::cast_precision_loss)]
        let uniform = 1.0 / preferences.len() as f64;
        Array1::from_elem(preferences.len(), uniform)
    }
}
