//! Observed transitions

use serde::{Deserialize, Serialize};

/// Single `(s, a, r, s')` transition
///
/// `next_state` is `None` when the transition ended the episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// State the action was taken in
    pub state: Vec<f64>,
    /// Action taken
    pub action: usize,
    /// Reward received
    pub reward: f64,
    /// Successor state, absent on termination
    pub next_state: Option<Vec<f64>>,
}

impl Transition {
    /// Create a non-terminal transition
    #[must_use]
    pub fn new(state: Vec<f64>, action: usize, reward: f64, next_state: Vec<f64>) -> Self {
        Self {
            state,
            action,
            reward,
            next_state: Some(next_state),
        }
    }

    /// Create a transition into the terminal state
    #[must_use]
    pub fn terminal(state: Vec<f64>, action: usize, reward: f64) -> Self {
        Self {
            state,
            action,
            reward,
            next_state: None,
        }
    }

    /// Whether the episode ended with this transition
    #[must_use]
    pub fn done(&self) -> bool {
        self.next_state.is_none()
    }
}
