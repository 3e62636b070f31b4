//! Radial-basis coding with Gaussian bumps on an even center grid

use ndarray::Array1;
use tdlab_core::{ensure_dims, FeatureRange, Result};

use crate::discretizer::{check_layout, grid_points, linspace};
use crate::Discretizer;

/// Gaussian RBF coder
#[derive(Debug, Clone)]
pub struct RadialBasis {
    /// Centers per dimension, one per bin midpoint
    centers: Vec<Vec<f64>>,
    /// `2σ²` per dimension, σ being the bin width
    denominators: Vec<f64>,
    /// Index into `centers` for every center combination (full mode)
    combinations: Vec<Vec<usize>>,
    simple: bool,
}

impl RadialBasis {
    /// Build an RBF coder with `centers` bumps per dimension
    pub fn new(ranges: &[FeatureRange], centers: &[usize], simple: bool) -> Result<Self> {
        check_layout(ranges, centers)?;

        let grid = ranges
            .iter()
            .zip(centers)
            .map(|(&(low, high), &n)| {
                linspace(low, high, 2 * n + 1)
                    .into_iter()
                    .skip(1)
                    .step_by(2)
                    .take(n)
                    .collect()
            })
            .collect();

        let denominators = ranges
            .iter()
            .zip(centers)
            .map(|(&(low, high), &n)| {
                let sigma = (high - low) / n as f64;
                2.0 * sigma * sigma
            })
            .collect();

        let combinations = if simple { Vec::new() } else { grid_points(centers) };

        Ok(Self {
            centers: grid,
            denominators,
            combinations,
            simple,
        })
    }

    fn bump(x: f64, center: f64, denominator: f64) -> f64 {
        (-(x - center).powi(2) / denominator).exp()
    }
}

impl Discretizer for RadialBasis {
    fn arity(&self) -> usize {
        self.centers.len()
    }

    fn coding_size(&self) -> usize {
        if self.simple {
            self.centers.iter().map(Vec::len).sum()
        } else {
            self.combinations.len()
        }
    }

    fn features(&self, state: &[f64]) -> Result<Array1<f64>> {
        ensure_dims(self.centers.len(), state.len())?;

        if self.simple {
            let out: Vec<f64> = state
                .iter()
                .zip(&self.centers)
                .zip(&self.denominators)
                .flat_map(|((&x, centers), &d)| centers.iter().map(move |&c| Self::bump(x, c, d)))
                .collect();
            return Ok(Array1::from(out));
        }

        Ok(self
            .combinations
            .iter()
            .map(|combo| {
                let exponent: f64 = combo
                    .iter()
                    .enumerate()
                    .map(|(i, &k)| (state[i] - self.centers[i][k]).powi(2) / self.denominators[i])
                    .sum();
                (-exponent).exp()
            })
            .collect())
    }
}
