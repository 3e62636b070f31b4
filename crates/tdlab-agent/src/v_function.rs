//! Linear state-value estimate used as a critic

use ndarray::Array1;
use tdlab_coding::Discretizer;
use tdlab_core::Result;

/// `V(s) = w · x(s)`
#[derive(Debug)]
pub struct LinearVFunction {
    discretizer: Box<dyn Discretizer>,
    weights: Array1<f64>,
}

impl LinearVFunction {
    /// Create a zeroed estimate over the discretizer's features
    #[must_use]
    pub fn new(discretizer: Box<dyn Discretizer>) -> Self {
        let size = discretizer.coding_size();
        Self {
            discretizer,
            weights: Array1::zeros(size),
        }
    }

    /// `V(state)`
    pub fn value(&self, state: &[f64]) -> Result<f64> {
        Ok(self.weights.dot(&self.discretizer.features(state)?))
    }

    /// `w ← w + alpha · td_error · x(state)`
    pub fn update(&mut self, state: &[f64], td_error: f64, alpha: f64) -> Result<()> {
        let x = self.discretizer.features(state)?;
        self.weights.scaled_add(alpha * td_error, &x);
        Ok(())
    }

    /// Weight vector
    #[must_use]
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Zero the weights
    pub fn reset(&mut self) {
        self.weights.fill(0.0);
    }
}
