//! Eligibility traces
//!
//! A trace has the same shape as the parameters it assigns credit to: a full
//! table per tiling in tabular mode, or one weight row (shared by every
//! action) in linear mode. Traces are zeroed at every episode start.

use ndarray::{Array, Array1, Dimension, IxDyn};
use serde::{Deserialize, Serialize};
use tdlab_core::TraceKind;

/// Trace law plus its decay rate λ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSettings {
    /// Update law
    pub kind: TraceKind,
    /// Decay rate λ
    pub lambda: f64,
}

impl TraceSettings {
    /// Create trace settings
    #[must_use]
    pub fn new(kind: TraceKind, lambda: f64) -> Self {
        Self { kind, lambda }
    }
}

/// Decaying credit accumulator shaped like the parameters it shadows
#[derive(Debug, Clone)]
pub struct EligibilityTrace<D: Dimension> {
    settings: TraceSettings,
    z: Array<f64, D>,
}

impl<D: Dimension> EligibilityTrace<D> {
    /// Zero trace of the given shape
    pub fn new(settings: TraceSettings, shape: D) -> Self {
        Self {
            settings,
            z: Array::zeros(shape),
        }
    }

    /// Update law
    pub fn kind(&self) -> TraceKind {
        self.settings.kind
    }

    /// Current trace values
    pub fn values(&self) -> &Array<f64, D> {
        &self.z
    }

    /// Zero every entry
    pub fn reset(&mut self) {
        self.z.fill(0.0);
    }

    /// Scale every entry by `γλ`
    pub fn decay(&mut self, gamma: f64) {
        let factor = gamma * self.settings.lambda;
        self.z.mapv_inplace(|v| v * factor);
    }
}

impl EligibilityTrace<IxDyn> {
    /// Mark a visited table cell: +1 when accumulating, set to 1 when replacing
    pub fn visit(&mut self, index: &[usize]) {
        let cell = &mut self.z[IxDyn(index)];
        match self.settings.kind {
            TraceKind::Replacing => *cell = 1.0,
            TraceKind::Accumulating | TraceKind::Dutch => *cell += 1.0,
        }
    }
}

impl EligibilityTrace<ndarray::Ix1> {
    /// Add a feature vector
    pub fn accumulate(&mut self, features: &Array1<f64>) {
        self.z += features;
    }

    /// Dutch update `z ← γλz + (1 − αγλ·zᵀx)·x`
    pub fn dutch(&mut self, features: &Array1<f64>, alpha: f64, gamma: f64) {
        let gl = gamma * self.settings.lambda;
        let correction = 1.0 - alpha * gl * self.z.dot(features);
        self.z.mapv_inplace(|v| v * gl);
        self.z.scaled_add(correction, features);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr1, Ix1};

    #[test]
    fn test_accumulating_vs_replacing_cells() {
        let mut acc = EligibilityTrace::new(
            TraceSettings::new(TraceKind::Accumulating, 0.5),
            IxDyn(&[2, 2]),
        );
        let mut rep = EligibilityTrace::new(
            TraceSettings::new(TraceKind::Replacing, 0.5),
            IxDyn(&[2, 2]),
        );
        for trace in [&mut acc, &mut rep] {
            trace.visit(&[0, 1]);
            trace.visit(&[0, 1]);
        }
        assert_eq!(acc.values()[IxDyn(&[0, 1])], 2.0);
        assert_eq!(rep.values()[IxDyn(&[0, 1])], 1.0);

        acc.decay(0.5);
        assert_abs_diff_eq!(acc.values()[IxDyn(&[0, 1])], 0.5);
        acc.reset();
        assert_eq!(acc.values().sum(), 0.0);
    }

    #[test]
    fn test_dutch_from_zero_is_the_features() {
        let mut trace =
            EligibilityTrace::new(TraceSettings::new(TraceKind::Dutch, 0.9), Ix1(3));
        let x = arr1(&[1.0, 0.0, 1.0]);
        trace.dutch(&x, 0.1, 1.0);
        assert_eq!(trace.values(), &x);

        // second visit: 0.9·z + (1 − 0.1·0.9·2)·x
        trace.dutch(&x, 0.1, 1.0);
        assert_abs_diff_eq!(trace.values()[0], 0.9 + 0.82, epsilon = 1e-12);
        assert_abs_diff_eq!(trace.values()[1], 0.0);
    }
}
