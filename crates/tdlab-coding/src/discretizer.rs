//! The discretizer contract and helpers shared by every basis scheme

use std::fmt::Debug;

use ndarray::{Array1, Dimension, IxDyn};
use tdlab_core::{ensure_dims, FeatureRange, RLError, Result};

/// Bin position along every dimension for one tiling
pub type TileIndex = Vec<usize>;

/// Output of a discretizer
#[derive(Debug, Clone, PartialEq)]
pub enum Coding {
    /// One index tuple per tiling (tabular mode)
    Indices(Vec<TileIndex>),
    /// Real-valued feature vector (linear mode)
    Features(Array1<f64>),
}

/// Which form of [`Coding`] to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingMode {
    /// Index tuples, one per tiling
    Tabular,
    /// Dense feature vector
    Vector,
}

/// Deterministic mapping from a raw state vector to a coding
///
/// Implementations hold only construction-time data, so two discretizers
/// built from the same parameters code every state identically.
pub trait Discretizer: Send + Sync + Debug {
    /// Number of state dimensions accepted
    fn arity(&self) -> usize;

    /// Number of tilings (1 for everything except tile coding)
    fn tilings(&self) -> usize {
        1
    }

    /// Length of the feature vector
    fn coding_size(&self) -> usize;

    /// Per-tiling index tuples for table lookup
    fn indices(&self, state: &[f64]) -> Result<Vec<TileIndex>> {
        let _ = state;
        Err(RLError::config(format!(
            "{self:?} produces continuous features and cannot index a table"
        )))
    }

    /// Feature vector for linear approximation
    fn features(&self, state: &[f64]) -> Result<Array1<f64>>;

    /// Code a state in the requested form
    fn encode(&self, state: &[f64], mode: CodingMode) -> Result<Coding> {
        match mode {
            CodingMode::Tabular => self.indices(state).map(Coding::Indices),
            CodingMode::Vector => self.features(state).map(Coding::Features),
        }
    }
}

/// `n` evenly spaced points from `low` to `high` inclusive
pub(crate) fn linspace(low: f64, high: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![low],
        _ => {
            let step = (high - low) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { high } else { low + step * i as f64 })
                .collect()
        }
    }
}

/// Index of the bin holding `x`, given increasing interior separators
///
/// Values below the first separator land in bin 0 and values at or above the
/// last one land in the last bin, so out-of-range samples clamp to the edges.
pub(crate) fn digitize(x: f64, separators: &[f64]) -> usize {
    separators.partition_point(|s| *s <= x)
}

/// Row-major flat offset of `index` inside a grid of shape `shape`
pub(crate) fn flat_index(index: &[usize], shape: &[usize]) -> usize {
    index
        .iter()
        .zip(shape)
        .fold(0, |offset, (i, n)| offset * n + i)
}

/// Every point of the integer grid `shape`, last dimension varying fastest
pub(crate) fn grid_points(shape: &[usize]) -> Vec<Vec<usize>> {
    ndarray::indices(IxDyn(shape))
        .into_iter()
        .map(|point| point.slice().to_vec())
        .collect()
}

/// Shared construction-time validation of ranges against granularity
pub(crate) fn check_layout(ranges: &[FeatureRange], granularity: &[usize]) -> Result<()> {
    ensure_dims(ranges.len(), granularity.len())?;
    if granularity.is_empty() {
        return Err(RLError::config("at least one state dimension is required"));
    }
    if granularity.contains(&0) {
        return Err(RLError::config("granularity entries must be positive"));
    }
    if let Some((low, high)) = ranges.iter().find(|(l, h)| !(l.is_finite() && h.is_finite() && l < h)) {
        return Err(RLError::config(format!(
            "feature range [{low}, {high}] must be finite and non-empty"
        )));
    }
    Ok(())
}

/// Write a one-hot block of length `len` with `hot` set, into `out`
pub(crate) fn push_one_hot(out: &mut Vec<f64>, len: usize, hot: usize) {
    let start = out.len();
    out.resize(start + len, 0.0);
    out[start + hot] = 1.0;
}
