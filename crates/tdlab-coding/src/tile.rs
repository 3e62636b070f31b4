//! Tile coding with asymmetrically offset tilings (Sutton & Barto, 2018, §9.5.4)

use ndarray::Array1;
use tdlab_core::{ensure_dims, FeatureRange, RLError, Result};

use crate::discretizer::{check_layout, digitize, flat_index, linspace, push_one_hot};
use crate::{Discretizer, TileIndex};

/// Separators of every tiling: `[tiling][dimension][separator]`
pub type Tilings = Vec<Vec<Vec<f64>>>;

/// Smallest valid tiling count for `dims` dimensions
///
/// The count must be a power of two no smaller than four per dimension.
#[must_use]
pub fn default_tilings(dims: usize) -> usize {
    (4 * dims.max(1)).next_power_of_two()
}

/// Check a tiling count against the dimensionality
pub fn validate_tilings(tilings: usize, dims: usize) -> Result<()> {
    if tilings < 4 * dims {
        return Err(RLError::config(format!(
            "number of tilings {tilings} too small for {dims} dimensions (need at least {})",
            4 * dims
        )));
    }
    if !tilings.is_power_of_two() {
        return Err(RLError::config(format!(
            "number of tilings {tilings} is not a power of 2"
        )));
    }
    Ok(())
}

/// Separators for every tiling along every dimension
///
/// Each tiling starts as the same template with bins `tilings` slices wide,
/// where a slice is `range / ((bins - 1) * tilings + 1)`. Tiling `t` is then
/// displaced by `t * (2i + 1) mod tilings` slices along dimension `i` and the
/// whole set is pulled back by `tilings - 1` slices so that the union covers
/// the range.
#[must_use]
pub fn create_tilings(ranges: &[FeatureRange], tilings: usize, bins: &[usize]) -> Tilings {
    let slices: Vec<f64> = ranges
        .iter()
        .zip(bins)
        .map(|(&(low, high), &n)| (high - low) / ((n - 1) * tilings + 1) as f64)
        .collect();

    let template: Vec<Vec<f64>> = bins
        .iter()
        .map(|&n| linspace(0.0, (tilings * n) as f64, n + 1)[1..n].to_vec())
        .collect();

    let pullback = -((tilings - 1) as f64);

    (0..tilings)
        .map(|t| {
            template
                .iter()
                .enumerate()
                .map(|(i, seps)| {
                    let shift = ((t * (2 * i + 1)) % tilings) as f64;
                    let (low, _) = ranges[i];
                    seps.iter()
                        .map(|s| (s + shift) * slices[i] + low + pullback * slices[i])
                        .collect()
                })
                .collect()
        })
        .collect()
}

/// Multi-tiling coder
#[derive(Debug, Clone)]
pub struct TileCoding {
    tilings: Tilings,
    bins: Vec<usize>,
    simple: bool,
}

impl TileCoding {
    /// Build `tilings` offset tilings over `ranges` with `bins` per dimension
    pub fn new(ranges: &[FeatureRange], tilings: usize, bins: &[usize], simple: bool) -> Result<Self> {
        check_layout(ranges, bins)?;
        validate_tilings(tilings, ranges.len())?;

        Ok(Self {
            tilings: create_tilings(ranges, tilings, bins),
            bins: bins.to_vec(),
            simple,
        })
    }

    fn block_size(&self) -> usize {
        if self.simple {
            self.bins.iter().sum()
        } else {
            self.bins.iter().product()
        }
    }
}

impl Discretizer for TileCoding {
    fn arity(&self) -> usize {
        self.bins.len()
    }

    fn tilings(&self) -> usize {
        self.tilings.len()
    }

    fn coding_size(&self) -> usize {
        self.block_size() * self.tilings.len()
    }

    fn indices(&self, state: &[f64]) -> Result<Vec<TileIndex>> {
        ensure_dims(self.bins.len(), state.len())?;
        Ok(self
            .tilings
            .iter()
            .map(|tiling| {
                state
                    .iter()
                    .zip(tiling)
                    .map(|(&x, seps)| digitize(x, seps))
                    .collect()
            })
            .collect())
    }

    fn features(&self, state: &[f64]) -> Result<Array1<f64>> {
        let codings = self.indices(state)?;
        let mut out = Vec::with_capacity(self.coding_size());
        for tile in &codings {
            if self.simple {
                for (&hot, &len) in tile.iter().zip(&self.bins) {
                    push_one_hot(&mut out, len, hot);
                }
            } else {
                push_one_hot(&mut out, self.block_size(), flat_index(tile, &self.bins));
            }
        }
        Ok(Array1::from(out))
    }
}
