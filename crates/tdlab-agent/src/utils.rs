//! Utility functions and helpers for control agents

use rand::Rng;

/// Episode-indexed exponential decay with a floor
///
/// `current` starts at `start`; every [`step`](Self::step) applies
/// `max(current · decay, floor)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialSchedule {
    /// Starting value
    pub start: f64,
    /// Minimum value
    pub floor: f64,
    /// Multiplicative decay per step
    pub decay: f64,
    current: f64,
}

impl ExponentialSchedule {
    /// Create a schedule sitting at `start`
    #[must_use]
    pub fn new(start: f64, floor: f64, decay: f64) -> Self {
        Self {
            start,
            floor,
            decay,
            current: start,
        }
    }

    /// Current value
    #[must_use]
    pub fn value(&self) -> f64 {
        self.current
    }

    /// Apply one decay step and return the new value
    pub fn step(&mut self) -> f64 {
        self.current = (self.current * self.decay).max(self.floor);
        self.current
    }

    /// Return to the starting value
    pub fn reset(&mut self) {
        self.current = self.start;
    }
}

/// Sum of `γ^i · r_i` over the given rewards
pub fn discounted_sum<'a, I>(rewards: I, gamma: f64) -> f64
where
    I: IntoIterator<Item = &'a f64>,
{
    rewards
        .into_iter()
        .zip(0_i32..)
        .map(|(r, i)| gamma.powi(i) * r)
        .sum()
}

/// Index of a maximal entry, ties broken uniformly at random
///
/// NaN entries never win unless every entry is NaN, in which case a
/// uniformly random index is returned.
pub fn argmax_random_tie<R: Rng + ?Sized>(values: &[f64], rng: &mut R) -> usize {
    let best = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let ties: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v == best)
        .map(|(i, _)| i)
        .collect();

    match ties.len() {
        0 => rng.gen_range(0..values.len()),
        1 => ties[0],
        n => ties[rng.gen_range(0..n)],
    }
}
