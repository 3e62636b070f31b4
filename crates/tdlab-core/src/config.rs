//! Immutable agent configuration and the closed sets of option tags

use std::fmt;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{RLError, Result};

/// Control algorithm tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    /// One-step on-policy Sarsa
    Sarsa,
    /// Sarsa over two alternating estimators
    DoubleSarsa,
    /// Sarsa bootstrapping on the expectation under the exploration policy
    ExpectedSarsa,
    /// n-step Sarsa
    SarsaN,
    /// Sarsa with eligibility traces
    SarsaLambda,
    /// True online Sarsa(λ) with dutch traces
    TrueSarsaLambda,
    /// Off-policy Q-learning
    #[serde(alias = "q_learning")]
    Qlearning,
    /// Double Q-learning
    #[serde(alias = "double_q_learning")]
    DoubleQlearning,
    /// Q-learning plus replayed planning updates
    #[serde(alias = "dyna_q")]
    Dynaq,
    /// One-step actor-critic
    #[serde(rename = "osac", alias = "one_step_actor_critic")]
    ActorCritic,
}

/// How action values are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    /// One table per tiling, addressed by index tuples
    Tabular,
    /// Weight matrix applied to a feature vector
    #[serde(alias = "linapprox", alias = "linear")]
    LinearApprox,
}

/// State coding scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    /// Even bins over the joint grid
    #[serde(alias = "bin")]
    Aggregating,
    /// Even bins, one one-hot block per dimension
    AggregatingSimple,
    /// Offset tilings over the joint grid
    Tile,
    /// Offset tilings, one one-hot block per dimension and tiling
    TileSimple,
    /// Gaussian bumps on every center combination
    Rbf,
    /// Gaussian bumps per dimension, concatenated
    RbfSimple,
    /// Cosine basis over every order vector
    Fourier,
    /// Cosine basis over order vectors with at most one nonzero entry
    FourierSimple,
    /// Products of per-dimension powers
    Polynomial,
}

impl Scheme {
    /// Whether the scheme can address a finite table
    #[must_use]
    pub fn is_tabular(self) -> bool {
        matches!(
            self,
            Self::Aggregating | Self::AggregatingSimple | Self::Tile | Self::TileSimple
        )
    }

    /// Whether the scheme builds multiple offset tilings
    #[must_use]
    pub fn is_tiled(self) -> bool {
        matches!(self, Self::Tile | Self::TileSimple)
    }
}

/// Eligibility trace law
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    /// Add one on every visit
    Accumulating,
    /// Reset to one on every visit
    Replacing,
    /// True online trace with self-correction
    Dutch,
}

/// Exploration policy family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Uniform exploration with probability epsilon
    EpsilonGreedy,
    /// Boltzmann distribution over action values
    Softmax,
    /// Boltzmann exploration with probability epsilon
    MaxBoltzmann,
}

fn parse_tag<T: DeserializeOwned>(name: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(name.to_owned())).ok()
}

fn tag_name<T: Serialize>(tag: &T) -> String {
    match serde_json::to_value(tag) {
        Ok(serde_json::Value::String(name)) => name,
        _ => String::from("?"),
    }
}

macro_rules! impl_tag {
    ($ty:ty, $kind:literal) => {
        impl FromStr for $ty {
            type Err = RLError;

            fn from_str(name: &str) -> Result<Self> {
                parse_tag(name).ok_or_else(|| RLError::UnsupportedOption {
                    kind: $kind,
                    name: name.to_owned(),
                })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&tag_name(self))
            }
        }
    };
}

impl_tag!(AlgorithmKind, "algorithm");
impl_tag!(Representation, "representation");
impl_tag!(TraceKind, "eligibility trace");
impl_tag!(PolicyKind, "exploration policy");

impl FromStr for Scheme {
    type Err = RLError;

    fn from_str(name: &str) -> Result<Self> {
        parse_tag(name).ok_or_else(|| RLError::UnsupportedScheme(name.to_owned()))
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&tag_name(self))
    }
}

/// Parse every string-valued tag field so unknown names surface as option errors
fn check_tags(document: &serde_json::Value) -> Result<()> {
    let Some(fields) = document.as_object() else {
        return Ok(());
    };
    for (key, value) in fields {
        let Some(name) = value.as_str() else {
            continue;
        };
        match key.as_str() {
            "algorithm" => {
                name.parse::<AlgorithmKind>()?;
            }
            "representation" | "qfun_type" => {
                name.parse::<Representation>()?;
            }
            "scheme" | "coding_type" => {
                name.parse::<Scheme>()?;
            }
            "trace" | "et_type" => {
                name.parse::<TraceKind>()?;
            }
            "policy" => {
                name.parse::<PolicyKind>()?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Exploration schedule parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplorationConfig {
    /// Policy family
    pub policy: PolicyKind,
    /// Initial epsilon
    pub epsilon: f64,
    /// Multiplicative decay applied at every episode boundary
    pub epsilon_decay: f64,
    /// Floor for the decayed epsilon
    pub min_epsilon: f64,
    /// Boltzmann temperature
    pub temperature: f64,
}

/// Configuration for a control agent
///
/// Values are plain data; sweeps derive a fresh copy per trial through the
/// `with_*` methods instead of mutating a shared instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Control algorithm
    pub algorithm: AlgorithmKind,
    /// Action-value storage
    #[serde(alias = "qfun_type")]
    pub representation: Representation,
    /// State coding scheme
    #[serde(alias = "coding_type")]
    pub scheme: Scheme,
    /// Bins/tiles/centers/orders per state dimension
    #[serde(alias = "bins")]
    pub granularity: Vec<usize>,
    /// Learning rate of the value estimate (critic)
    #[serde(alias = "alpha_w")]
    pub alpha: f64,
    /// Learning rate of the actor
    #[serde(alias = "alpha_θ")]
    pub alpha_theta: f64,
    /// Discount factor
    pub gamma: f64,
    /// Horizon of n-step Sarsa
    pub n: usize,
    /// Trace decay λ
    #[serde(alias = "lambda_val")]
    pub lambda: f64,
    /// Trace law
    #[serde(alias = "et_type")]
    pub trace: TraceKind,
    /// Exploration policy family
    pub policy: PolicyKind,
    /// Initial epsilon
    pub epsilon: f64,
    /// Epsilon decay per episode
    pub epsilon_decay: f64,
    /// Epsilon floor
    pub min_epsilon: f64,
    /// Boltzmann temperature
    pub temperature: f64,
    /// Planning updates per real step (Dyna-Q)
    pub plan_rep: usize,
    /// Transition model capacity (Dyna-Q)
    pub model_size: usize,
    /// Seed for the agent's random source
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmKind::Sarsa,
            representation: Representation::LinearApprox,
            scheme: Scheme::Tile,
            granularity: vec![4, 4],
            alpha: 0.01,
            alpha_theta: 0.01,
            gamma: 1.0,
            n: 5,
            lambda: 0.5,
            trace: TraceKind::Accumulating,
            policy: PolicyKind::MaxBoltzmann,
            epsilon: 1.0,
            epsilon_decay: 0.95,
            min_epsilon: 0.00001,
            temperature: 0.4,
            plan_rep: 10,
            model_size: 500,
            seed: None,
        }
    }
}

impl AgentConfig {
    /// Parse a JSON document; missing keys keep their defaults
    ///
    /// Unknown option names fail with [`RLError::UnsupportedOption`] or
    /// [`RLError::UnsupportedScheme`], like their `FromStr` counterparts.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: serde_json::Value = serde_json::from_str(json)?;
        check_tags(&document)?;
        let config: Self = serde_json::from_value(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, msg: &str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(RLError::config(msg))
            }
        }

        check(!self.granularity.is_empty(), "granularity must name at least one dimension")?;
        check(self.granularity.iter().all(|&g| g > 0), "granularity entries must be positive")?;
        check(self.alpha > 0.0, "alpha must be positive")?;
        check(self.alpha_theta > 0.0, "alpha_theta must be positive")?;
        check((0.0..=1.0).contains(&self.gamma), "gamma must lie in [0, 1]")?;
        check((0.0..=1.0).contains(&self.lambda), "lambda must lie in [0, 1]")?;
        check(self.n >= 1, "n must be at least 1")?;
        check((0.0..=1.0).contains(&self.epsilon), "epsilon must lie in [0, 1]")?;
        check(
            self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0,
            "epsilon_decay must lie in (0, 1]",
        )?;
        check((0.0..=1.0).contains(&self.min_epsilon), "min_epsilon must lie in [0, 1]")?;
        check(self.temperature > 0.0, "temperature must be positive")?;
        check(self.model_size > 0, "model_size must be positive")
    }

    /// Exploration schedule view
    #[must_use]
    pub fn exploration(&self) -> ExplorationConfig {
        ExplorationConfig {
            policy: self.policy,
            epsilon: self.epsilon,
            epsilon_decay: self.epsilon_decay,
            min_epsilon: self.min_epsilon,
            temperature: self.temperature,
        }
    }

    /// Copy with another algorithm
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: AlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Copy with another representation
    #[must_use]
    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    /// Copy with another coding
    #[must_use]
    pub fn with_coding(mut self, scheme: Scheme, granularity: Vec<usize>) -> Self {
        self.scheme = scheme;
        self.granularity = granularity;
        self
    }

    /// Copy with other trace settings
    #[must_use]
    pub fn with_trace(mut self, trace: TraceKind, lambda: f64) -> Self {
        self.trace = trace;
        self.lambda = lambda;
        self
    }

    /// Copy with another exploration schedule
    #[must_use]
    pub fn with_exploration(mut self, exploration: ExplorationConfig) -> Self {
        self.policy = exploration.policy;
        self.epsilon = exploration.epsilon;
        self.epsilon_decay = exploration.epsilon_decay;
        self.min_epsilon = exploration.min_epsilon;
        self.temperature = exploration.temperature;
        self
    }

    /// Copy with other learning rates and discount
    #[must_use]
    pub fn with_rates(mut self, alpha: f64, alpha_theta: f64, gamma: f64) -> Self {
        self.alpha = alpha;
        self.alpha_theta = alpha_theta;
        self.gamma = gamma;
        self
    }

    /// Copy with another seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        assert_eq!("tile_simple".parse::<Scheme>().unwrap(), Scheme::TileSimple);
        assert_eq!("bin".parse::<Scheme>().unwrap(), Scheme::Aggregating);
        assert_eq!("osac".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::ActorCritic);
        assert_eq!(AlgorithmKind::DoubleQlearning.to_string(), "double_qlearning");
        assert_eq!(PolicyKind::MaxBoltzmann.to_string(), "max_boltzmann");
    }

    #[test]
    fn test_unknown_tags_fail() {
        assert!(matches!(
            "hexagon".parse::<Scheme>(),
            Err(RLError::UnsupportedScheme(name)) if name == "hexagon"
        ));
        assert!(matches!(
            "greedy_ish".parse::<PolicyKind>(),
            Err(RLError::UnsupportedOption { kind: "exploration policy", .. })
        ));
        assert!("sticky".parse::<TraceKind>().unwrap_err().is_configuration());
    }

    #[test]
    fn test_json_uses_laboratory_keys() {
        let config = AgentConfig::from_json(
            r#"{"algorithm": "sarsa_n", "qfun_type": "tabular", "coding_type": "aggregating",
                "granularity": [4, 4], "alpha_w": 0.1, "lambda_val": 0.9, "et_type": "replacing"}"#,
        )
        .unwrap();
        assert_eq!(config.algorithm, AlgorithmKind::SarsaN);
        assert_eq!(config.representation, Representation::Tabular);
        assert_eq!(config.trace, TraceKind::Replacing);
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.plan_rep, 10);
    }

    #[test]
    fn test_json_rejects_unknowns() {
        assert!(matches!(
            AgentConfig::from_json(r#"{"policy": "ucb"}"#),
            Err(RLError::UnsupportedOption { kind: "exploration policy", name }) if name == "ucb"
        ));
        assert!(matches!(
            AgentConfig::from_json(r#"{"coding_type": "hexagon"}"#),
            Err(RLError::UnsupportedScheme(name)) if name == "hexagon"
        ));
        for json in [
            r#"{"et_type": "sticky"}"#,
            r#"{"qfun_type": "neural"}"#,
            r#"{"algorithm": "ppo"}"#,
        ] {
            assert!(AgentConfig::from_json(json).unwrap_err().is_configuration(), "{json}");
        }
        assert!(AgentConfig::from_json(r#"{"warp_speed": 9}"#).is_err());
        assert!(AgentConfig::from_json(r#"{"gamma": 1.5}"#).unwrap_err().is_configuration());
    }

    #[test]
    fn test_builders_leave_original_untouched() {
        let base = AgentConfig::default();
        let tuned = base.clone().with_rates(0.5, 0.25, 0.9).with_seed(7);
        assert_eq!(base.alpha, 0.01);
        assert_eq!(tuned.alpha, 0.5);
        assert_eq!(tuned.seed, Some(7));
        assert!(base.validate().is_ok());
    }
}
