//! Parameter sweeps and algorithm comparisons
//!
//! Every trial builds a fresh [`AgentConfig`] from a base through a caller
//! supplied function and trains new agents on a fresh environment, so no
//! configuration is ever shared between trials.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tdlab_agent::build_agent;
use tdlab_core::{AgentConfig, Environment, RLError, Result};
use tracing::debug;

use crate::runner::run_repeatedly;

/// Run lengths of a sweep trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepOptions {
    /// Episodes per run
    pub num_episodes: usize,
    /// Independent runs per trial
    pub num_repetitions: usize,
    /// Leading episodes left out of the score
    pub skip_episodes: usize,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            num_episodes: 200,
            num_repetitions: 10,
            skip_episodes: 100,
        }
    }
}

impl SweepOptions {
    /// Require at least one scored episode and one repetition
    pub fn validate(&self) -> Result<()> {
        if self.num_episodes <= self.skip_episodes {
            return Err(RLError::config(format!(
                "num_episodes ({}) must exceed skip_episodes ({})",
                self.num_episodes, self.skip_episodes
            )));
        }
        if self.num_repetitions == 0 {
            return Err(RLError::config("nothing to average: num_repetitions is 0"));
        }
        Ok(())
    }
}

/// Mean episode length of a fresh agent trained under `config`
fn score<E, M>(config: &AgentConfig, options: &SweepOptions, make_env: &mut M) -> Result<f64>
where
    E: Environment,
    M: FnMut() -> Result<E>,
{
    let mut env = make_env()?;
    let mut agent = build_agent(config, &env.observation_space(), &env.action_space())?;
    let curve = run_repeatedly(
        &mut env,
        agent.as_mut(),
        options.num_episodes,
        options.num_repetitions,
        true,
        true,
    )?;
    let kept = &curve[options.skip_episodes..];
    #[allow(clippy::cast_precision_loss)]
    Ok(kept.iter().sum::<f64>() / kept.len() as f64)
}

/// Score every `(secondary, primary)` pair
///
/// Row `i`, column `j` of the result holds the score of
/// `apply(base, &primary[j], &secondary[i])`.
pub fn grid_search<P, S, F, E, M>(
    base: &AgentConfig,
    primary: &[P],
    secondary: &[S],
    apply: F,
    options: &SweepOptions,
    mut make_env: M,
) -> Result<Array2<f64>>
where
    P: std::fmt::Debug,
    S: std::fmt::Debug,
    F: Fn(AgentConfig, &P, &S) -> AgentConfig,
    E: Environment,
    M: FnMut() -> Result<E>,
{
    options.validate()?;

    let mut scores = Array2::zeros((secondary.len(), primary.len()));
    for (i, s) in secondary.iter().enumerate() {
        for (j, p) in primary.iter().enumerate() {
            let config = apply(base.clone(), p, s);
            let value = score(&config, options, &mut make_env)?;
            debug!(primary = ?p, secondary = ?s, score = value, "Sweep cell finished");
            scores[[i, j]] = value;
        }
    }
    Ok(scores)
}

/// Score each value of a single parameter
pub fn one_parameter_sweep<P, F, E, M>(
    base: &AgentConfig,
    values: &[P],
    apply: F,
    options: &SweepOptions,
    make_env: M,
) -> Result<Vec<f64>>
where
    P: std::fmt::Debug,
    F: Fn(AgentConfig, &P) -> AgentConfig,
    E: Environment,
    M: FnMut() -> Result<E>,
{
    let grid = grid_search(
        base,
        values,
        &["defaults"],
        |config, p, _| apply(config, p),
        options,
        make_env,
    )?;
    Ok(grid.row(0).to_vec())
}

/// Averaged learning curve of each labelled configuration
pub fn compare_algorithms<E, M>(
    candidates: &[(String, AgentConfig)],
    num_episodes: usize,
    num_repetitions: usize,
    mut make_env: M,
) -> Result<Vec<(String, Vec<f64>)>>
where
    E: Environment,
    M: FnMut() -> Result<E>,
{
    candidates
        .iter()
        .map(|(label, config)| {
            let mut env = make_env()?;
            let mut agent = build_agent(config, &env.observation_space(), &env.action_space())?;
            let curve = run_repeatedly(
                &mut env,
                agent.as_mut(),
                num_episodes,
                num_repetitions,
                true,
                true,
            )?;
            debug!(%label, "Learning curve finished");
            Ok((label.clone(), curve))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlaneWalkEnv;
    use tdlab_core::{AlgorithmKind, Representation, Scheme};

    fn base() -> AgentConfig {
        AgentConfig::default()
            .with_representation(Representation::Tabular)
            .with_coding(Scheme::Aggregating, vec![4, 4])
            .with_seed(5)
    }

    fn small() -> SweepOptions {
        SweepOptions {
            num_episodes: 4,
            num_repetitions: 2,
            skip_episodes: 1,
        }
    }

    #[test]
    fn test_options_validation() {
        assert!(SweepOptions::default().validate().is_ok());
        let bad = SweepOptions {
            num_episodes: 3,
            num_repetitions: 1,
            skip_episodes: 3,
        };
        assert!(bad.validate().unwrap_err().is_configuration());
        let empty = SweepOptions {
            num_repetitions: 0,
            ..small()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_grid_shape_and_fresh_configs() {
        let alphas = [0.1, 0.5];
        let gammas = [0.9, 0.99, 1.0];
        let grid = grid_search(
            &base(),
            &alphas,
            &gammas,
            |config, &alpha, &gamma| config.with_rates(alpha, alpha, gamma),
            &small(),
            || Ok(PlaneWalkEnv::new()),
        )
        .unwrap();
        assert_eq!(grid.dim(), (3, 2));
        assert!(grid.iter().all(|&s| (10.0..=21.0).contains(&s)));
    }

    #[test]
    fn test_one_parameter_sweep() {
        let scores = one_parameter_sweep(
            &base(),
            &[AlgorithmKind::Sarsa, AlgorithmKind::Qlearning],
            |config, &algorithm| config.with_algorithm(algorithm),
            &small(),
            || Ok(PlaneWalkEnv::new()),
        )
        .unwrap();
        assert_eq!(scores.len(), 2);
    }

    #[test]
    fn test_compare_algorithms() {
        let candidates = vec![
            ("sarsa".to_string(), base()),
            ("dynaq".to_string(), base().with_algorithm(AlgorithmKind::Dynaq)),
        ];
        let curves = compare_algorithms(&candidates, 3, 1, || Ok(PlaneWalkEnv::new())).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[1].0, "dynaq");
        assert_eq!(curves[1].1.len(), 3);
    }
}
