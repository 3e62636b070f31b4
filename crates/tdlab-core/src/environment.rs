//! Environment contract consumed by the episode driver

use serde::{Deserialize, Serialize};

use crate::{Result, Space};

/// Result of a single environment step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Observation after the action
    pub observation: Vec<f64>,
    /// Reward signal
    pub reward: f64,
    /// Whether the episode reached a terminal state
    pub done: bool,
    /// Whether the episode was cut short (e.g., time limit)
    pub truncated: bool,
}

impl Step {
    /// Whether the driver should stop the episode
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.done || self.truncated
    }
}

/// Simulation stepped by the external driver
///
/// Agents never touch an environment directly; they only see the spaces at
/// construction time and the observations the driver hands them.
pub trait Environment: Send {
    /// Get the observation space
    fn observation_space(&self) -> Space;

    /// Get the action space
    fn action_space(&self) -> Space;

    /// Reset the environment and return the initial observation
    fn reset(&mut self) -> Result<Vec<f64>>;

    /// Take a step in the environment
    fn step(&mut self, action: usize) -> Result<Step>;
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn observation_space(&self) -> Space {
        (**self).observation_space()
    }

    fn action_space(&self) -> Space {
        (**self).action_space()
    }

    fn reset(&mut self) -> Result<Vec<f64>> {
        (**self).reset()
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        (**self).step(action)
    }
}
