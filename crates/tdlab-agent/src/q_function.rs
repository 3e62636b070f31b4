//! Action-value function approximators
//!
//! Two storages sit behind [`QFunction`]:
//! - [`TabularQFunction`]: one table per tiling, indexed by bin tuple plus
//!   action. Values are averaged over tilings.
//! - [`LinearQFunction`]: one weight row per action, dotted with the state's
//!   feature vector.
//!
//! Either may carry an eligibility trace; see [`TraceSettings`].

use std::fmt::Debug;

use ndarray::{Array1, Array2, ArrayD, Ix1, IxDyn};
use tdlab_coding::{Discretizer, SelectedCoding};
use tdlab_core::{ensure_dims, RLError, Representation, Result, TraceKind};
use tracing::debug;

use crate::trace::{EligibilityTrace, TraceSettings};

/// Estimate of `Q(s, a)` over a discrete action set
pub trait QFunction: Send + Debug {
    /// Number of actions
    fn num_actions(&self) -> usize;

    /// `Q(state, action)`
    fn value(&self, state: &[f64], action: usize) -> Result<f64>;

    /// `Q(state, ·)` for every action
    fn values(&self, state: &[f64]) -> Result<Vec<f64>>;

    /// Move `Q(state, action)` towards `target`
    ///
    /// `gamma` is only consulted by traced estimators, for the trace decay.
    fn update(
        &mut self,
        state: &[f64],
        action: usize,
        target: f64,
        alpha: f64,
        gamma: f64,
    ) -> Result<()>;

    /// Zero every learned quantity, traces included
    fn reset(&mut self);

    /// Zero traces; weights are kept
    fn reset_episode(&mut self);
}

fn check_action(action: usize, n_actions: usize) -> Result<()> {
    if action < n_actions {
        Ok(())
    } else {
        Err(RLError::InvalidAction(format!(
            "action {action} out of range for {n_actions} actions"
        )))
    }
}

/// Table-backed action values, one table per tiling
#[derive(Debug)]
pub struct TabularQFunction {
    discretizer: Box<dyn Discretizer>,
    n_actions: usize,
    tables: Vec<ArrayD<f64>>,
    traces: Option<Vec<EligibilityTrace<IxDyn>>>,
}

impl TabularQFunction {
    /// Create zeroed tables of shape `granularity × n_actions`
    ///
    /// Dutch traces are rejected: they need a feature vector.
    pub fn new(
        discretizer: Box<dyn Discretizer>,
        granularity: &[usize],
        n_actions: usize,
        trace: Option<TraceSettings>,
    ) -> Result<Self> {
        ensure_dims(discretizer.arity(), granularity.len())?;
        if n_actions == 0 {
            return Err(RLError::config("at least one action is required"));
        }
        if matches!(trace, Some(t) if t.kind == TraceKind::Dutch) {
            return Err(RLError::config(
                "dutch traces are only available with linear approximation",
            ));
        }

        let mut shape = granularity.to_vec();
        shape.push(n_actions);
        let tilings = discretizer.tilings();
        let tables = vec![ArrayD::zeros(IxDyn(&shape)); tilings];
        let traces = trace.map(|settings| {
            (0..tilings)
                .map(|_| EligibilityTrace::new(settings, IxDyn(&shape)))
                .collect()
        });

        Ok(Self {
            discretizer,
            n_actions,
            tables,
            traces,
        })
    }

    /// Per-tiling tables
    #[must_use]
    pub fn tables(&self) -> &[ArrayD<f64>] {
        &self.tables
    }

    fn cells(&self, state: &[f64], action: usize) -> Result<Vec<Vec<usize>>> {
        Ok(self
            .discretizer
            .indices(state)?
            .into_iter()
            .map(|mut index| {
                index.push(action);
                index
            })
            .collect())
    }
}

impl QFunction for TabularQFunction {
    fn num_actions(&self) -> usize {
        self.n_actions
    }

    fn value(&self, state: &[f64], action: usize) -> Result<f64> {
        check_action(action, self.n_actions)?;
        let cells = self.cells(state, action)?;
        let total: f64 = self
            .tables
            .iter()
            .zip(&cells)
            .map(|(table, cell)| table[IxDyn(cell)])
            .sum();
        #[allow(clippy::cast_precision_loss)]
        Ok(total / self.tables.len() as f64)
    }

    fn values(&self, state: &[f64]) -> Result<Vec<f64>> {
        let tiles = self.discretizer.indices(state)?;
        #[allow(clippy::cast_precision_loss)]
        let tilings = self.tables.len() as f64;
        Ok((0..self.n_actions)
            .map(|action| {
                let total: f64 = self
                    .tables
                    .iter()
                    .zip(&tiles)
                    .map(|(table, tile)| {
                        let mut cell = tile.clone();
                        cell.push(action);
                        table[IxDyn(&cell)]
                    })
                    .sum();
                total / tilings
            })
            .collect())
    }

    fn update(
        &mut self,
        state: &[f64],
        action: usize,
        target: f64,
        alpha: f64,
        gamma: f64,
    ) -> Result<()> {
        check_action(action, self.n_actions)?;
        let cells = self.cells(state, action)?;

        match &mut self.traces {
            None => {
                for (table, cell) in self.tables.iter_mut().zip(&cells) {
                    let entry = &mut table[IxDyn(cell)];
                    *entry += alpha * (target - *entry);
                }
            }
            Some(traces) => {
                for ((table, trace), cell) in self.tables.iter_mut().zip(traces).zip(&cells) {
                    let delta = target - table[IxDyn(cell)];
                    trace.visit(cell);
                    table.scaled_add(alpha * delta, trace.values());
                    trace.decay(gamma);
                }
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        for table in &mut self.tables {
            table.fill(0.0);
        }
        self.reset_episode();
    }

    fn reset_episode(&mut self) {
        if let Some(traces) = &mut self.traces {
            traces.iter_mut().for_each(EligibilityTrace::reset);
        }
    }
}

/// Linear action values: `Q(s, a) = w[a] · x(s)`
#[derive(Debug)]
pub struct LinearQFunction {
    discretizer: Box<dyn Discretizer>,
    weights: Array2<f64>,
    trace: Option<EligibilityTrace<Ix1>>,
}

impl LinearQFunction {
    /// Create zeroed weights of shape `n_actions × coding_size`
    ///
    /// Replacing traces are rejected: they are defined for table cells only.
    /// One trace is shared by all actions.
    pub fn new(
        discretizer: Box<dyn Discretizer>,
        n_actions: usize,
        trace: Option<TraceSettings>,
    ) -> Result<Self> {
        if n_actions == 0 {
            return Err(RLError::config("at least one action is required"));
        }
        if matches!(trace, Some(t) if t.kind == TraceKind::Replacing) {
            return Err(RLError::config(
                "replacing traces are only available with tabular representation",
            ));
        }

        let size = discretizer.coding_size();
        Ok(Self {
            discretizer,
            weights: Array2::zeros((n_actions, size)),
            trace: trace.map(|settings| EligibilityTrace::new(settings, Ix1(size))),
        })
    }

    /// Weight matrix, one row per action
    #[must_use]
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Current trace, if any
    #[must_use]
    pub fn trace(&self) -> Option<&EligibilityTrace<Ix1>> {
        self.trace.as_ref()
    }

    /// Feature vector of `state`
    pub fn features(&self, state: &[f64]) -> Result<Array1<f64>> {
        self.discretizer.features(state)
    }

    /// True online update with a dutch trace
    ///
    /// `q_old` is the estimate the caller bootstrapped from at the previous
    /// step (zero at episode start). Requires a dutch trace.
    pub fn true_online_update(
        &mut self,
        state: &[f64],
        action: usize,
        target: f64,
        alpha: f64,
        gamma: f64,
        q_old: f64,
    ) -> Result<()> {
        check_action(action, self.weights.nrows())?;
        let trace = match &mut self.trace {
            Some(trace) if trace.kind() == TraceKind::Dutch => trace,
            _ => return Err(RLError::config("true online updates need a dutch trace")),
        };

        let x = self.discretizer.features(state)?;
        let q = self.weights.row(action).dot(&x);
        let delta = target - q;
        trace.dutch(&x, alpha, gamma);

        let mut row = self.weights.row_mut(action);
        row.scaled_add(alpha * (delta + q - q_old), trace.values());
        row.scaled_add(-alpha * (q - q_old), &x);
        Ok(())
    }
}

impl QFunction for LinearQFunction {
    fn num_actions(&self) -> usize {
        self.weights.nrows()
    }

    fn value(&self, state: &[f64], action: usize) -> Result<f64> {
        check_action(action, self.weights.nrows())?;
        let x = self.discretizer.features(state)?;
        Ok(self.weights.row(action).dot(&x))
    }

    fn values(&self, state: &[f64]) -> Result<Vec<f64>> {
        let x = self.discretizer.features(state)?;
        Ok(self.weights.dot(&x).to_vec())
    }

    fn update(
        &mut self,
        state: &[f64],
        action: usize,
        target: f64,
        alpha: f64,
        gamma: f64,
    ) -> Result<()> {
        check_action(action, self.weights.nrows())?;
        let x = self.discretizer.features(state)?;
        let delta = target - self.weights.row(action).dot(&x);

        match &mut self.trace {
            None => self.weights.row_mut(action).scaled_add(alpha * delta, &x),
            Some(trace) if trace.kind() == TraceKind::Accumulating => {
                trace.accumulate(&x);
                self.weights
                    .row_mut(action)
                    .scaled_add(alpha * delta, trace.values());
                trace.decay(gamma);
            }
            Some(_) => {
                return Err(RLError::config(
                    "dutch traces are updated through true_online_update",
                ))
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.weights.fill(0.0);
        self.reset_episode();
    }

    fn reset_episode(&mut self) {
        if let Some(trace) = &mut self.trace {
            trace.reset();
        }
    }
}

/// Build the action-value storage for a selected coding
pub fn build_q_function(
    coding: SelectedCoding,
    representation: Representation,
    n_actions: usize,
    trace: Option<TraceSettings>,
) -> Result<Box<dyn QFunction>> {
    debug!(
        %representation,
        scheme = %coding.spec.scheme,
        coding_size = coding.coding_size,
        tilings = coding.tilings,
        n_actions,
        traced = trace.is_some(),
        "Building action-value function"
    );

    Ok(match representation {
        Representation::Tabular => Box::new(TabularQFunction::new(
            coding.discretizer,
            &coding.spec.granularity,
            n_actions,
            trace,
        )?),
        Representation::LinearApprox => {
            Box::new(LinearQFunction::new(coding.discretizer, n_actions, trace)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tdlab_coding::select_coding;
    use tdlab_core::{BoxSpace, Scheme};

    fn coding(representation: Representation, scheme: Scheme) -> SelectedCoding {
        let space = BoxSpace::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        select_coding(&space, representation, scheme, &[4, 4]).unwrap()
    }

    fn all_storages(trace: Option<TraceSettings>) -> Vec<Box<dyn QFunction>> {
        vec![
            build_q_function(
                coding(Representation::Tabular, Scheme::Aggregating),
                Representation::Tabular,
                3,
                trace,
            )
            .unwrap(),
            build_q_function(
                coding(Representation::Tabular, Scheme::Tile),
                Representation::Tabular,
                3,
                trace,
            )
            .unwrap(),
            build_q_function(
                coding(Representation::LinearApprox, Scheme::Rbf),
                Representation::LinearApprox,
                3,
                trace,
            )
            .unwrap(),
            build_q_function(
                coding(Representation::LinearApprox, Scheme::Tile),
                Representation::LinearApprox,
                3,
                trace,
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_zero_after_reset() {
        for mut q in all_storages(None) {
            q.update(&[0.3, 0.6], 1, 5.0, 0.5, 1.0).unwrap();
            assert!(q.value(&[0.3, 0.6], 1).unwrap() != 0.0);
            q.reset();
            for state in [[0.0, 0.0], [0.3, 0.6], [1.0, 1.0]] {
                assert_eq!(q.values(&state).unwrap(), vec![0.0; 3]);
            }
        }
    }

    #[test]
    fn test_update_reduces_squared_error() {
        let state = [0.42, 0.17];
        let target = 2.0;
        for mut q in all_storages(None) {
            let before = (target - q.value(&state, 2).unwrap()).powi(2);
            q.update(&state, 2, target, 0.1, 1.0).unwrap();
            let after = (target - q.value(&state, 2).unwrap()).powi(2);
            assert!(after < before, "{q:?}: {after} !< {before}");
            // other actions untouched
            assert_eq!(q.value(&state, 0).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_values_match_value() {
        for mut q in all_storages(None) {
            q.update(&[0.9, 0.1], 0, 1.0, 0.5, 1.0).unwrap();
            q.update(&[0.8, 0.2], 2, -3.0, 0.5, 1.0).unwrap();
            let row = q.values(&[0.85, 0.15]).unwrap();
            for (action, v) in row.iter().enumerate() {
                assert_abs_diff_eq!(*v, q.value(&[0.85, 0.15], action).unwrap(), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_tabular_traces_spread_credit() {
        let settings = TraceSettings::new(TraceKind::Replacing, 0.9);
        let mut q = TabularQFunction::new(
            coding(Representation::Tabular, Scheme::Aggregating).discretizer,
            &[4, 4],
            2,
            Some(settings),
        )
        .unwrap();

        q.update(&[0.1, 0.1], 0, 0.0, 0.5, 1.0).unwrap();
        q.update(&[0.9, 0.9], 1, 1.0, 0.5, 1.0).unwrap();
        // the first cell still held trace 0.9 when the second delta arrived
        assert_abs_diff_eq!(q.value(&[0.1, 0.1], 0).unwrap(), 0.45, epsilon = 1e-12);
        assert_abs_diff_eq!(q.value(&[0.9, 0.9], 1).unwrap(), 0.5, epsilon = 1e-12);

        q.reset_episode();
        q.update(&[0.9, 0.9], 1, 1.0, 0.5, 1.0).unwrap();
        assert_abs_diff_eq!(q.value(&[0.1, 0.1], 0).unwrap(), 0.45, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_accumulating_trace() {
        let settings = TraceSettings::new(TraceKind::Accumulating, 0.5);
        let mut q = LinearQFunction::new(
            coding(Representation::LinearApprox, Scheme::Aggregating).discretizer,
            2,
            Some(settings),
        )
        .unwrap();

        q.update(&[0.1, 0.1], 0, 1.0, 0.5, 1.0).unwrap();
        assert_abs_diff_eq!(q.value(&[0.1, 0.1], 0).unwrap(), 0.5);
        let z = q.trace().unwrap().values();
        assert_abs_diff_eq!(z.sum(), 0.5);
    }

    #[test]
    fn test_trace_mode_mismatches_are_configuration_errors() {
        let dutch = TraceSettings::new(TraceKind::Dutch, 0.5);
        let err = TabularQFunction::new(
            coding(Representation::Tabular, Scheme::Aggregating).discretizer,
            &[4, 4],
            2,
            Some(dutch),
        )
        .unwrap_err();
        assert!(err.is_configuration());

        let replacing = TraceSettings::new(TraceKind::Replacing, 0.5);
        let err = LinearQFunction::new(
            coding(Representation::LinearApprox, Scheme::Rbf).discretizer,
            2,
            Some(replacing),
        )
        .unwrap_err();
        assert!(err.is_configuration());

        let mut q = LinearQFunction::new(
            coding(Representation::LinearApprox, Scheme::Rbf).discretizer,
            2,
            Some(dutch),
        )
        .unwrap();
        assert!(q.update(&[0.5, 0.5], 0, 1.0, 0.1, 1.0).unwrap_err().is_configuration());
        q.true_online_update(&[0.5, 0.5], 0, 1.0, 0.1, 1.0, 0.0).unwrap();
        assert!(q.value(&[0.5, 0.5], 0).unwrap() > 0.0);
    }

    #[test]
    fn test_out_of_range_action() {
        let q = LinearQFunction::new(
            coding(Representation::LinearApprox, Scheme::Fourier).discretizer,
            2,
            None,
        )
        .unwrap();
        assert!(matches!(q.value(&[0.5, 0.5], 2), Err(RLError::InvalidAction(_))));
    }
}
