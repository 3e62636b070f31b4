//! State aggregation: even bins along every dimension

use ndarray::Array1;
use tdlab_core::{ensure_dims, FeatureRange, Result};

use crate::discretizer::{check_layout, digitize, flat_index, linspace, push_one_hot};
use crate::{Discretizer, TileIndex};

/// Bin coder over a fixed box
#[derive(Debug, Clone)]
pub struct Aggregating {
    /// Interior separators per dimension
    separators: Vec<Vec<f64>>,
    /// Bins per dimension
    bins: Vec<usize>,
    /// Concatenate per-dimension one-hot blocks instead of one joint block
    simple: bool,
}

impl Aggregating {
    /// Build a bin coder; `simple` selects the separable vector form
    pub fn new(ranges: &[FeatureRange], bins: &[usize], simple: bool) -> Result<Self> {
        check_layout(ranges, bins)?;

        let separators = ranges
            .iter()
            .zip(bins)
            .map(|(&(low, high), &n)| {
                let edges = linspace(low, high, n + 1);
                edges[1..n].to_vec()
            })
            .collect();

        Ok(Self {
            separators,
            bins: bins.to_vec(),
            simple,
        })
    }

    fn bin_of(&self, state: &[f64]) -> Result<TileIndex> {
        ensure_dims(self.bins.len(), state.len())?;
        Ok(state
            .iter()
            .zip(&self.separators)
            .map(|(&x, seps)| digitize(x, seps))
            .collect())
    }
}

impl Discretizer for Aggregating {
    fn arity(&self) -> usize {
        self.bins.len()
    }

    fn coding_size(&self) -> usize {
        if self.simple {
            self.bins.iter().sum()
        } else {
            self.bins.iter().product()
        }
    }

    fn indices(&self, state: &[f64]) -> Result<Vec<TileIndex>> {
        Ok(vec![self.bin_of(state)?])
    }

    fn features(&self, state: &[f64]) -> Result<Array1<f64>> {
        let bin = self.bin_of(state)?;
        let mut out = Vec::with_capacity(self.coding_size());
        if self.simple {
            for (&hot, &len) in bin.iter().zip(&self.bins) {
                push_one_hot(&mut out, len, hot);
            }
        } else {
            push_one_hot(&mut out, self.coding_size(), flat_index(&bin, &self.bins));
        }
        Ok(Array1::from(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tdlab_core::RLError;

    #[test]
    fn test_bins_and_clamping() {
        let coder = Aggregating::new(&[(0.0, 1.0), (-2.0, 2.0)], &[4, 2], false).unwrap();
        assert_eq!(coder.indices(&[0.1, -1.0]).unwrap(), vec![vec![0, 0]]);
        assert_eq!(coder.indices(&[0.5, 0.0]).unwrap(), vec![vec![2, 1]]);
        assert_eq!(coder.indices(&[-9.0, 9.0]).unwrap(), vec![vec![0, 1]]);
        assert_eq!(coder.indices(&[1.0, 2.0]).unwrap(), vec![vec![3, 1]]);
    }

    #[test]
    fn test_vector_forms() {
        let joint = Aggregating::new(&[(0.0, 1.0), (0.0, 1.0)], &[2, 3], false).unwrap();
        let x = joint.features(&[0.9, 0.5]).unwrap();
        assert_eq!(x.len(), 6);
        assert_eq!(x[4], 1.0);
        assert_eq!(x.sum(), 1.0);

        let simple = Aggregating::new(&[(0.0, 1.0), (0.0, 1.0)], &[2, 3], true).unwrap();
        let x = simple.features(&[0.9, 0.5]).unwrap();
        assert_eq!(x.to_vec(), vec![0.0, 1.0, 0.0, 1.0, 0.0]);
        assert_eq!(simple.indices(&[0.9, 0.5]).unwrap(), joint.indices(&[0.9, 0.5]).unwrap());
    }

    #[test]
    fn test_arity_checked_per_sample() {
        let coder = Aggregating::new(&[(0.0, 1.0), (0.0, 1.0)], &[4, 4], false).unwrap();
        assert!(matches!(
            coder.features(&[0.5]),
            Err(RLError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    proptest! {
        #[test]
        fn prop_upper_boundary_hits_last_bin(
            low0 in -100.0f64..100.0, width0 in 0.01f64..100.0,
            low1 in -100.0f64..100.0, width1 in 0.01f64..100.0,
            g0 in 1usize..12, g1 in 1usize..12,
        ) {
            let ranges = [(low0, low0 + width0), (low1, low1 + width1)];
            let coder = Aggregating::new(&ranges, &[g0, g1], false).unwrap();
            let idx = coder.indices(&[ranges[0].1, ranges[1].1]).unwrap();
            prop_assert_eq!(&idx[0], &vec![g0 - 1, g1 - 1]);
            let idx = coder.indices(&[ranges[0].0, ranges[1].0]).unwrap();
            prop_assert_eq!(&idx[0], &vec![0, 0]);
        }
    }
}
