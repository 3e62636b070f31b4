//! Bounded transition memory for planning

use rand::Rng;
use std::collections::VecDeque;

use tdlab_core::{RLError, Result, Transition};

/// FIFO transition store sampled uniformly with replacement
///
/// Once `capacity` transitions are held, each push evicts the oldest one.
#[derive(Debug, Clone)]
pub struct PlanningModel {
    /// Buffer storage
    buffer: VecDeque<Transition>,
    /// Maximum capacity
    capacity: usize,
}

impl PlanningModel {
    /// Create an empty model holding at most `capacity` transitions
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RLError::config("planning model capacity must be positive"));
        }
        Ok(Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Record a transition, evicting the oldest one when full
    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// One uniformly drawn transition, or `None` while empty
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Transition> {
        if self.buffer.is_empty() {
            return None;
        }
        self.buffer.get(rng.gen_range(0..self.buffer.len()))
    }

    /// Stored transitions, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    /// Maximum number of stored transitions
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the current size of the buffer
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn transition(tag: f64) -> Transition {
        Transition::new(vec![tag], 0, tag, vec![tag + 1.0])
    }

    #[test]
    fn test_fifo_eviction() {
        let capacity = 20;
        let mut model = PlanningModel::new(capacity).unwrap();
        for i in 0..capacity + 50 {
            model.push(transition(f64::from(u32::try_from(i).unwrap())));
        }
        assert_eq!(model.len(), capacity);
        assert_eq!(model.capacity(), capacity);
        // the oldest 50 are gone, the rest keep insertion order
        assert!(model.iter().all(|t| t.reward >= 50.0));
        let rewards: Vec<f64> = model.iter().map(|t| t.reward).collect();
        let expected: Vec<f64> = (50..70).map(f64::from).collect();
        assert_eq!(rewards, expected);
    }

    #[test]
    fn test_sample_only_stored() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut model = PlanningModel::new(4).unwrap();
        assert!(model.sample(&mut rng).is_none());

        model.push(transition(7.0));
        model.push(Transition::terminal(vec![8.0], 1, -1.0));
        for _ in 0..20 {
            let t = model.sample(&mut rng).unwrap();
            assert!(t.reward == 7.0 || (t.reward == -1.0 && t.done()));
        }

        model.clear();
        assert!(model.is_empty());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(PlanningModel::new(0).unwrap_err().is_configuration());
    }
}
