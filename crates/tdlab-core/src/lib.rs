//! Core traits and types for the tdlab control laboratory
//!
//! This crate holds what every other tdlab crate agrees on: the error
//! taxonomy, observation/action spaces, the environment contract the episode
//! driver consumes, observed transitions, and the immutable agent
//! configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod environment;
pub mod error;
pub mod space;
pub mod transition;

// Re-export core traits and types
pub use config::{
    AgentConfig, AlgorithmKind, ExplorationConfig, PolicyKind, Representation, Scheme, TraceKind,
};
pub use environment::{Environment, Step};
pub use error::{ensure_dims, RLError, Result};
pub use space::{BoxSpace, DiscreteSpace, FeatureRange, Space};
pub use transition::Transition;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AgentConfig, AlgorithmKind, BoxSpace, DiscreteSpace, Environment, Representation,
        Result, Scheme, Space, Step,
    };
}
