//! Deterministic walk across the unit square

use tdlab_core::{BoxSpace, DiscreteSpace, Environment, RLError, Result, Space, Step};

/// Deterministic two-action walk on `[0, 1]²`
///
/// The walker starts at the origin. Action 0 moves by `(0.1, 0.05)` and
/// action 1 by `(0.05, 0.1)`; both coordinates are clamped to the square.
/// The episode ends when either coordinate reaches 1. Every step costs −1,
/// and leaving through the right edge (`x = 1`) pays an extra +10.
#[derive(Debug, Clone, Default)]
pub struct PlaneWalkEnv {
    position: [f64; 2],
}

impl PlaneWalkEnv {
    const MOVES: [[f64; 2]; 2] = [[0.1, 0.05], [0.05, 0.1]];

    /// Create a walker at the origin
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Environment for PlaneWalkEnv {
    fn observation_space(&self) -> Space {
        Space::Box(BoxSpace {
            low: vec![0.0, 0.0],
            high: vec![1.0, 1.0],
        })
    }

    fn action_space(&self) -> Space {
        DiscreteSpace::new(2).into()
    }

    fn reset(&mut self) -> Result<Vec<f64>> {
        self.position = [0.0, 0.0];
        Ok(self.position.to_vec())
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        let delta = Self::MOVES
            .get(action)
            .ok_or_else(|| RLError::InvalidAction(format!("Invalid action: {action}")))?;
        for (p, d) in self.position.iter_mut().zip(delta) {
            *p = (*p + d).min(1.0);
        }

        let [x, y] = self.position;
        let done = x >= 1.0 || y >= 1.0;
        let reward = if done && x >= 1.0 { 9.0 } else { -1.0 };

        Ok(Step {
            observation: self.position.to_vec(),
            reward,
            done,
            truncated: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(env: &mut PlaneWalkEnv, action: usize) -> (usize, f64) {
        env.reset().unwrap();
        let mut total = 0.0;
        for steps in 1.. {
            let step = env.step(action).unwrap();
            total += step.reward;
            if step.done {
                return (steps, total);
            }
        }
        unreachable!()
    }

    #[test]
    fn test_straight_walks_are_deterministic() {
        let mut env = PlaneWalkEnv::new();
        let (steps_right, total_right) = run(&mut env, 0);
        let (steps_up, total_up) = run(&mut env, 1);
        assert_eq!(steps_right, steps_up);
        assert!(total_right > total_up);
        assert_eq!(run(&mut env, 0), (steps_right, total_right));
    }

    #[test]
    fn test_spaces_and_invalid_action() {
        let mut env = PlaneWalkEnv::new();
        assert_eq!(env.observation_space().as_bounded_box().unwrap().dim(), 2);
        assert_eq!(env.action_space().as_discrete().unwrap().n, 2);
        assert!(matches!(env.step(2), Err(RLError::InvalidAction(_))));
    }
}
