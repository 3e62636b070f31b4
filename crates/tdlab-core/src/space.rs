//! Observation and action spaces

use serde::{Deserialize, Serialize};

use crate::{RLError, Result};

/// Closed interval `(low, high)` covered by one state dimension
pub type FeatureRange = (f64, f64);

/// Box space (continuous space with per-dimension bounds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpace {
    /// Lower bounds for each dimension
    pub low: Vec<f64>,
    /// Upper bounds for each dimension
    pub high: Vec<f64>,
}

impl BoxSpace {
    /// Create a new box space
    pub fn new(low: Vec<f64>, high: Vec<f64>) -> Result<Self> {
        if low.len() != high.len() {
            return Err(RLError::DimensionMismatch {
                expected: low.len(),
                actual: high.len(),
            });
        }
        if let Some(i) = low.iter().zip(&high).position(|(l, h)| l > h) {
            return Err(RLError::InvalidSpace(format!(
                "dimension {i} has low {} above high {}",
                low[i], high[i]
            )));
        }
        Ok(Self { low, high })
    }

    /// Number of dimensions
    #[must_use]
    pub fn dim(&self) -> usize {
        self.low.len()
    }

    /// Whether every bound is finite
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.low.iter().chain(&self.high).all(|b| b.is_finite())
    }

    /// Per-dimension `(low, high)` pairs
    #[must_use]
    pub fn feature_ranges(&self) -> Vec<FeatureRange> {
        self.low.iter().copied().zip(self.high.iter().copied()).collect()
    }

    /// Check if a point lies inside the box
    #[must_use]
    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.low.len()
            && point
                .iter()
                .zip(&self.low)
                .zip(&self.high)
                .all(|((x, l), h)| x >= l && x <= h)
    }
}

/// Discrete space of `n` actions labelled `0..n`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteSpace {
    /// Number of discrete actions
    pub n: usize,
}

impl DiscreteSpace {
    /// Create a new discrete space
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// Check if an action index is valid
    #[must_use]
    pub fn contains(&self, action: usize) -> bool {
        action < self.n
    }
}

/// Any space an environment can expose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Space {
    /// Finite set of actions/observations
    Discrete(DiscreteSpace),
    /// Continuous bounded box
    Box(BoxSpace),
}

impl Space {
    /// Require a finite discrete space
    pub fn as_discrete(&self) -> Result<&DiscreteSpace> {
        match self {
            Self::Discrete(space) if space.n > 0 => Ok(space),
            Self::Discrete(_) => Err(RLError::InvalidSpace("discrete space is empty".into())),
            Self::Box(_) => Err(RLError::InvalidSpace(
                "action space of environment is not discrete".into(),
            )),
        }
    }

    /// Require a bounded continuous box
    pub fn as_bounded_box(&self) -> Result<&BoxSpace> {
        match self {
            Self::Box(space) if space.is_bounded() => Ok(space),
            Self::Box(_) => Err(RLError::InvalidSpace(
                "observation space of environment is not bounded".into(),
            )),
            Self::Discrete(_) => Err(RLError::InvalidSpace(
                "observation space of environment is not continuous".into(),
            )),
        }
    }
}

impl From<BoxSpace> for Space {
    fn from(space: BoxSpace) -> Self {
        Self::Box(space)
    }
}

impl From<DiscreteSpace> for Space {
    fn from(space: DiscreteSpace) -> Self {
        Self::Discrete(space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_box_validation() {
        assert!(matches!(
            BoxSpace::new(vec![0.0], vec![1.0, 2.0]),
            Err(RLError::DimensionMismatch { expected: 1, actual: 2 })
        ));
        assert!(BoxSpace::new(vec![1.0], vec![0.0]).is_err());
    }

    #[test]
    fn test_space_requirements() {
        let unbounded: Space = BoxSpace::new(vec![0.0, f64::NEG_INFINITY], vec![1.0, 1.0])
            .unwrap()
            .into();
        assert!(unbounded.as_bounded_box().is_err());
        assert!(unbounded.as_discrete().is_err());

        let actions: Space = DiscreteSpace::new(3).into();
        assert_eq!(actions.as_discrete().unwrap().n, 3);
        assert!(actions.as_bounded_box().is_err());
        assert!(Space::Discrete(DiscreteSpace::new(0)).as_discrete().is_err());
    }

    #[test]
    fn test_discrete_contains() {
        let actions = DiscreteSpace::new(3);
        assert!(actions.contains(0) && actions.contains(2));
        assert!(!actions.contains(3));
    }

    proptest! {
        #[test]
        fn prop_interior_points_inside(t in 0.0f64..=1.0, lo in -10.0f64..0.0, width in 0.1f64..10.0) {
            let space = BoxSpace::new(vec![lo, lo], vec![lo + width, lo + 2.0 * width]).unwrap();
            prop_assert!(space.contains(&[lo + t * width, lo + 2.0 * t * width]));
            prop_assert!(!space.contains(&[lo + width + 0.1, lo]));
            prop_assert!(!space.contains(&[lo]));
        }
    }
}
