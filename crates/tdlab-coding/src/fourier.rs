//! Fourier cosine basis over the range-normalized state

use std::f64::consts::PI;

use ndarray::Array1;
use tdlab_core::{ensure_dims, FeatureRange, Result};

use crate::discretizer::{check_layout, grid_points};
use crate::Discretizer;

/// Fourier basis coder
#[derive(Debug, Clone)]
pub struct FourierBasis {
    offsets: Vec<f64>,
    widths: Vec<f64>,
    /// Order vectors, one per feature
    coefficients: Vec<Vec<usize>>,
}

impl FourierBasis {
    /// Build a Fourier coder with orders `0..orders[i]` along dimension `i`
    ///
    /// In `simple` mode only order vectors with at most one nonzero entry are
    /// kept, giving an additive basis of `Σ orders − (dims − 1)` features.
    pub fn new(ranges: &[FeatureRange], orders: &[usize], simple: bool) -> Result<Self> {
        check_layout(ranges, orders)?;

        let mut coefficients = grid_points(orders);
        if simple {
            coefficients.retain(|c| c.iter().filter(|&&k| k != 0).count() <= 1);
        }

        Ok(Self {
            offsets: ranges.iter().map(|r| r.0).collect(),
            widths: ranges.iter().map(|r| r.1 - r.0).collect(),
            coefficients,
        })
    }
}

impl Discretizer for FourierBasis {
    fn arity(&self) -> usize {
        self.offsets.len()
    }

    fn coding_size(&self) -> usize {
        self.coefficients.len()
    }

    fn features(&self, state: &[f64]) -> Result<Array1<f64>> {
        ensure_dims(self.offsets.len(), state.len())?;

        let normalized: Vec<f64> = state
            .iter()
            .zip(self.offsets.iter().zip(&self.widths))
            .map(|(x, (o, w))| (x - o) / w)
            .collect();

        Ok(self
            .coefficients
            .iter()
            .map(|c| {
                let phase: f64 = c.iter().zip(&normalized).map(|(&k, x)| k as f64 * x).sum();
                (phase * PI).cos()
            })
            .collect())
    }
}
