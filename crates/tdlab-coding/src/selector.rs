//! Coding selector: validates a request and builds the matching discretizer

use serde::{Deserialize, Serialize};
use tdlab_core::{ensure_dims, BoxSpace, FeatureRange, RLError, Representation, Result, Scheme};
use tracing::debug;

use crate::{
    default_tilings, Aggregating, Discretizer, FourierBasis, PolynomialBasis, RadialBasis,
    TileCoding,
};

/// Serializable description of a discretizer
///
/// Building the same spec twice yields discretizers that code every state
/// identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodingSpec {
    /// Basis scheme
    pub scheme: Scheme,
    /// Per-dimension `(low, high)` ranges
    pub ranges: Vec<FeatureRange>,
    /// Bins/tiles/centers/orders per dimension
    pub granularity: Vec<usize>,
    /// Tiling count; only read by tiled schemes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilings: Option<usize>,
}

impl CodingSpec {
    /// Spec with the default tiling count for tiled schemes
    #[must_use]
    pub fn new(scheme: Scheme, ranges: Vec<FeatureRange>, granularity: Vec<usize>) -> Self {
        let tilings = scheme.is_tiled().then(|| default_tilings(ranges.len()));
        Self {
            scheme,
            ranges,
            granularity,
            tilings,
        }
    }

    /// Number of tilings the built discretizer will report
    #[must_use]
    pub fn tiling_count(&self) -> usize {
        if self.scheme.is_tiled() {
            self.tilings.unwrap_or_else(|| default_tilings(self.ranges.len()))
        } else {
            1
        }
    }

    /// Feature-vector length, computed without building anything
    #[must_use]
    pub fn coding_size(&self) -> usize {
        let product: usize = self.granularity.iter().product();
        let sum: usize = self.granularity.iter().sum();
        match self.scheme {
            Scheme::Aggregating | Scheme::Rbf | Scheme::Fourier | Scheme::Polynomial => product,
            Scheme::AggregatingSimple | Scheme::RbfSimple => sum,
            Scheme::Tile => product * self.tiling_count(),
            Scheme::TileSimple => sum * self.tiling_count(),
            Scheme::FourierSimple => sum + 1 - self.granularity.len(),
        }
    }

    /// Build the discretizer
    pub fn build(&self) -> Result<Box<dyn Discretizer>> {
        let ranges = &self.ranges;
        let g = &self.granularity;
        let discretizer: Box<dyn Discretizer> = match self.scheme {
            Scheme::Aggregating => Box::new(Aggregating::new(ranges, g, false)?),
            Scheme::AggregatingSimple => Box::new(Aggregating::new(ranges, g, true)?),
            Scheme::Tile => Box::new(TileCoding::new(ranges, self.tiling_count(), g, false)?),
            Scheme::TileSimple => Box::new(TileCoding::new(ranges, self.tiling_count(), g, true)?),
            Scheme::Rbf => Box::new(RadialBasis::new(ranges, g, false)?),
            Scheme::RbfSimple => Box::new(RadialBasis::new(ranges, g, true)?),
            Scheme::Fourier => Box::new(FourierBasis::new(ranges, g, false)?),
            Scheme::FourierSimple => Box::new(FourierBasis::new(ranges, g, true)?),
            Scheme::Polynomial => {
                ensure_dims(ranges.len(), g.len())?;
                Box::new(PolynomialBasis::new(g)?)
            }
        };
        debug!(
            scheme = %self.scheme,
            tilings = discretizer.tilings(),
            coding_size = discretizer.coding_size(),
            "built discretizer"
        );
        Ok(discretizer)
    }
}

/// Selector output
#[derive(Debug)]
pub struct SelectedCoding {
    /// Number of tilings (1 unless tile coding)
    pub tilings: usize,
    /// Feature-vector length
    pub coding_size: usize,
    /// The discretizer itself
    pub discretizer: Box<dyn Discretizer>,
    /// Spec the discretizer was built from
    pub spec: CodingSpec,
}

/// Build a discretizer for `space` under the given representation
///
/// Tabular representations accept only the aggregating and tile schemes,
/// since continuous bases cannot address a finite table.
pub fn select_coding(
    space: &BoxSpace,
    representation: Representation,
    scheme: Scheme,
    granularity: &[usize],
) -> Result<SelectedCoding> {
    ensure_dims(space.dim(), granularity.len())?;

    if representation == Representation::Tabular && !scheme.is_tabular() {
        return Err(RLError::config(format!(
            "only aggregating / tile codings can be used for tabular representation, got {scheme}"
        )));
    }

    let spec = CodingSpec::new(scheme, space.feature_ranges(), granularity.to_vec());
    let discretizer = spec.build()?;

    Ok(SelectedCoding {
        tilings: discretizer.tilings(),
        coding_size: discretizer.coding_size(),
        discretizer,
        spec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodingMode;

    fn unit_square() -> BoxSpace {
        BoxSpace::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap()
    }

    fn sample_points() -> Vec<[f64; 2]> {
        (0..100)
            .map(|i| {
                let t = f64::from(i) / 99.0;
                [t, (t * 7.3).fract()]
            })
            .collect()
    }

    #[test]
    fn test_sizes_match_built_discretizers() {
        let space = unit_square();
        for scheme in [
            Scheme::Aggregating,
            Scheme::AggregatingSimple,
            Scheme::Tile,
            Scheme::TileSimple,
            Scheme::Rbf,
            Scheme::RbfSimple,
            Scheme::Fourier,
            Scheme::FourierSimple,
            Scheme::Polynomial,
        ] {
            let selected =
                select_coding(&space, Representation::LinearApprox, scheme, &[4, 3]).unwrap();
            assert_eq!(selected.coding_size, selected.spec.coding_size(), "{scheme}");
            let x = selected.discretizer.features(&[0.3, 0.6]).unwrap();
            assert_eq!(x.len(), selected.coding_size, "{scheme}");
        }
    }

    #[test]
    fn test_tile_selection_uses_power_of_two_tilings() {
        let selected =
            select_coding(&unit_square(), Representation::Tabular, Scheme::Tile, &[4, 4]).unwrap();
        assert_eq!(selected.tilings, 8);
        assert_eq!(selected.coding_size, 128);
    }

    #[test]
    fn test_tabular_rejects_continuous_bases() {
        for scheme in [Scheme::Rbf, Scheme::Fourier, Scheme::Polynomial, Scheme::FourierSimple] {
            let err = select_coding(&unit_square(), Representation::Tabular, scheme, &[4, 4])
                .unwrap_err();
            assert!(matches!(err, RLError::Configuration(_)));
        }
    }

    #[test]
    fn test_selector_failures() {
        assert!(matches!(
            select_coding(&unit_square(), Representation::Tabular, Scheme::Aggregating, &[4]),
            Err(RLError::DimensionMismatch { expected: 2, actual: 1 })
        ));
        let wide = BoxSpace::new(vec![0.0; 3], vec![1.0; 3]).unwrap();
        assert!(matches!(
            select_coding(&wide, Representation::LinearApprox, Scheme::Rbf, &[4, 4]),
            Err(RLError::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_spec_round_trip_codes_identically() {
        let space = BoxSpace::new(vec![-1.2, -0.07], vec![0.6, 0.07]).unwrap();
        for scheme in [Scheme::Tile, Scheme::Rbf, Scheme::FourierSimple, Scheme::Aggregating] {
            let selected =
                select_coding(&space, Representation::LinearApprox, scheme, &[5, 4]).unwrap();
            let json = serde_json::to_string(&selected.spec).unwrap();
            let rebuilt: CodingSpec = serde_json::from_str(&json).unwrap();
            assert_eq!(rebuilt, selected.spec);
            let twin = rebuilt.build().unwrap();

            for [u, v] in sample_points() {
                let state = [-1.2 + 1.8 * u, -0.07 + 0.14 * v];
                assert_eq!(
                    selected.discretizer.encode(&state, CodingMode::Vector).unwrap(),
                    twin.encode(&state, CodingMode::Vector).unwrap()
                );
                if scheme.is_tabular() {
                    assert_eq!(
                        selected.discretizer.indices(&state).unwrap(),
                        twin.indices(&state).unwrap()
                    );
                }
            }
        }
    }
}
