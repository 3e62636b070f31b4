//! Polynomial basis: products of raw per-dimension powers

use ndarray::Array1;
use tdlab_core::{ensure_dims, RLError, Result};

use crate::discretizer::grid_points;
use crate::Discretizer;

/// Polynomial coder
///
/// The state is not normalized, so large raw values dominate the features.
#[derive(Debug, Clone)]
pub struct PolynomialBasis {
    dims: usize,
    powers: Vec<Vec<i32>>,
}

impl PolynomialBasis {
    /// Build a coder with powers `0..orders[i]` along dimension `i`
    pub fn new(orders: &[usize]) -> Result<Self> {
        if orders.is_empty() || orders.contains(&0) {
            return Err(RLError::config("polynomial orders must be positive"));
        }
        let powers = grid_points(orders)
            .into_iter()
            .map(|p| p.into_iter().map(|k| i32::try_from(k).unwrap_or(i32::MAX)).collect())
            .collect();

        Ok(Self {
            dims: orders.len(),
            powers,
        })
    }
}

impl Discretizer for PolynomialBasis {
    fn arity(&self) -> usize {
        self.dims
    }

    fn coding_size(&self) -> usize {
        self.powers.len()
    }

    fn features(&self, state: &[f64]) -> Result<Array1<f64>> {
        ensure_dims(self.dims, state.len())?;
        Ok(self
            .powers
            .iter()
            .map(|p| p.iter().zip(state).map(|(&k, x)| x.powi(k)).product())
            .collect())
    }
}
