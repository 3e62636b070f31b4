//! Environment wrappers

use tdlab_core::{Environment, Result, Space, Step};

/// Time limit wrapper
///
/// Marks the step that exhausts the budget as truncated unless the inner
/// environment already terminated on it.
#[derive(Debug, Clone)]
pub struct TimeLimit<E> {
    /// Inner environment
    pub env: E,
    /// Maximum steps
    pub max_steps: usize,
    /// Current step count
    pub steps: usize,
}

impl<E> TimeLimit<E> {
    /// Create a new time limit wrapper
    pub fn new(env: E, max_steps: usize) -> Self {
        Self {
            env,
            max_steps,
            steps: 0,
        }
    }
}

impl<E: Environment> Environment for TimeLimit<E> {
    fn observation_space(&self) -> Space {
        self.env.observation_space()
    }

    fn action_space(&self) -> Space {
        self.env.action_space()
    }

    fn reset(&mut self) -> Result<Vec<f64>> {
        self.steps = 0;
        self.env.reset()
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        let mut step = self.env.step(action)?;
        self.steps += 1;

        if self.steps >= self.max_steps && !step.done {
            step.truncated = true;
        }

        Ok(step)
    }
}
