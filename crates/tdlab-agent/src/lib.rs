//! Temporal-difference control agents for tdlab
//!
//! This crate provides the learning side of the laboratory:
//! - Action-value estimates: per-tiling tables or linear weights over codings
//! - Eligibility traces (accumulating, replacing, dutch)
//! - Exploration policies with episode-decayed epsilon
//! - Control algorithms: Sarsa, Expected Sarsa, n-step Sarsa, Sarsa(λ),
//!   true online Sarsa(λ), Q-learning, double estimators, Dyna-Q and a
//!   one-step actor-critic
//!
//! Agents are built from an [`AgentConfig`](tdlab_core::AgentConfig) with
//! [`build_agent`] and driven one step at a time through
//! [`ControlAlgorithm::act`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod buffer;
pub mod exploration;
pub mod factory;
pub mod policy;
pub mod q_function;
pub mod trace;
pub mod utils;
pub mod v_function;

// Re-export agents
pub use algorithms::{
    ActorCritic, AgentStep, ControlAlgorithm, DoubleTd, DynaQ, Lifecycle, OneStepTd, SarsaN,
    TrueSarsaLambda,
};
pub use factory::build_agent;

// Re-export utilities
pub use buffer::PlanningModel;
pub use exploration::{boltzmann, ExplorationPolicy};
pub use trace::{EligibilityTrace, TraceSettings};
pub use utils::ExponentialSchedule;

// Re-export approximators
pub use policy::LinearSoftmaxPolicy;
pub use q_function::{build_q_function, LinearQFunction, QFunction, TabularQFunction};
pub use v_function::LinearVFunction;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{build_agent, AgentStep, ControlAlgorithm, Lifecycle};
    pub use tdlab_core::prelude::*;
}
