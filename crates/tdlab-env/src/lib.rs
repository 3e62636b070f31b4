//! Environments and experiment drivers for tdlab
//!
//! This crate provides:
//! - Environments: a deterministic plane walk plus mountain car and cart pole
//! - A time-limit wrapper and a name-keyed registry
//! - The episode driver, sequential and parallel repetitions
//! - Parameter sweeps, algorithm comparisons and greedy action maps

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action_map;
pub mod classic;
pub mod plane_walk;
pub mod registry;
pub mod runner;
pub mod sweep;
pub mod wrappers;

// Re-export environments
pub use classic::{CartPoleEnv, MountainCarEnv};
pub use plane_walk::PlaneWalkEnv;
pub use registry::{list_envs, make_env, register_env, BoxedEnv, EnvRegistry};
pub use wrappers::TimeLimit;

// Re-export drivers
pub use action_map::{default_resolution, greedy_action_map};
pub use runner::{run_episodes, run_one_episode, run_repeatedly, run_repeatedly_parallel};
pub use sweep::{compare_algorithms, grid_search, one_parameter_sweep, SweepOptions};

// Re-export core types
pub use tdlab_core::{Environment, Space, Step};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        make_env, run_episodes, run_one_episode, MountainCarEnv, PlaneWalkEnv, TimeLimit,
    };
    pub use tdlab_agent::prelude::*;
}
