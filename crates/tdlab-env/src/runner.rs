//! Episode driver
//!
//! The driver owns the loop between an [`Environment`] and a
//! [`ControlAlgorithm`]: it resets both, feeds every observation to the agent
//! and issues the final terminal call. Truncation counts as termination.

use anyhow::anyhow;
use tdlab_agent::{build_agent, AgentStep, ControlAlgorithm};
use tdlab_core::{AgentConfig, Environment, RLError, Result};
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Episodes between progress log lines
const LOG_EVERY: usize = 10;

/// Run one episode and return its number of steps
///
/// An action outside the environment's action space ends the episode with
/// [`RLError::InvalidAction`].
pub fn run_one_episode<E>(env: &mut E, agent: &mut dyn ControlAlgorithm, learning: bool) -> Result<usize>
where
    E: Environment + ?Sized,
{
    let actions = *env.action_space().as_discrete()?;
    agent.reset_episode();
    let mut state = env.reset()?;
    let mut reward = 0.0;
    let mut steps = 0;

    loop {
        let action = agent
            .act(AgentStep::Observe { reward, state: &state }, learning)?
            .ok_or_else(|| RLError::Other(anyhow!("agent returned no action mid-episode")))?;
        if !actions.contains(action) {
            return Err(RLError::InvalidAction(format!(
                "agent chose action {action} outside 0..{}",
                actions.n
            )));
        }

        let step = env.step(action)?;
        steps += 1;
        reward = step.reward;

        if step.is_last() {
            agent.act(AgentStep::Terminal { reward }, learning)?;
            return Ok(steps);
        }
        state = step.observation;
    }
}

/// Run `num_episodes` episodes and return their lengths
///
/// `new_agent` resets the agent first and is only allowed while learning.
pub fn run_episodes<E>(
    env: &mut E,
    agent: &mut dyn ControlAlgorithm,
    num_episodes: usize,
    new_agent: bool,
    learning: bool,
) -> Result<Vec<usize>>
where
    E: Environment + ?Sized,
{
    if new_agent && !learning {
        return Err(RLError::config("a new agent must be trained"));
    }
    if new_agent {
        agent.reset();
    }

    let mut lengths = Vec::with_capacity(num_episodes);
    for episode in 1..=num_episodes {
        let steps = run_one_episode(env, agent, learning)?;
        if episode % LOG_EVERY == 0 {
            info!(episode, steps, epsilon = ?agent.epsilon(), "Episode finished");
        }
        lengths.push(steps);
    }
    Ok(lengths)
}

/// Per-episode lengths averaged over `num_repetitions` runs of one agent
pub fn run_repeatedly<E>(
    env: &mut E,
    agent: &mut dyn ControlAlgorithm,
    num_episodes: usize,
    num_repetitions: usize,
    new_agent: bool,
    learning: bool,
) -> Result<Vec<f64>>
where
    E: Environment + ?Sized,
{
    let mut totals = vec![0.0; num_episodes];
    for repetition in 0..num_repetitions {
        info!(repetition, "Starting repetition");
        let lengths = run_episodes(env, agent, num_episodes, new_agent, learning)?;
        accumulate(&mut totals, &lengths);
    }
    Ok(average(totals, num_repetitions))
}

/// [`run_repeatedly`] over independent environment/agent pairs on a blocking pool
///
/// Repetition `i` gets its environment from `make_env(i)` and a freshly built
/// agent whose seed, when `config` has one, is offset by `i`.
pub async fn run_repeatedly_parallel<F>(
    config: &AgentConfig,
    make_env: F,
    num_episodes: usize,
    num_repetitions: usize,
) -> Result<Vec<f64>>
where
    F: Fn(usize) -> Result<Box<dyn Environment>>,
{
    let mut tasks = JoinSet::new();
    for repetition in 0..num_repetitions {
        let mut env = make_env(repetition)?;
        let mut config = config.clone();
        config.seed = config.seed.map(|seed| seed.wrapping_add(repetition as u64));

        tasks.spawn_blocking(move || -> Result<Vec<usize>> {
            let mut agent = build_agent(&config, &env.observation_space(), &env.action_space())?;
            debug!(repetition, "Running repetition");
            run_episodes(&mut env, agent.as_mut(), num_episodes, true, true)
        });
    }

    let mut totals = vec![0.0; num_episodes];
    while let Some(joined) = tasks.join_next().await {
        let lengths = joined.map_err(|e| RLError::Other(e.into()))??;
        accumulate(&mut totals, &lengths);
    }
    Ok(average(totals, num_repetitions))
}

#[allow(clippy::cast_precision_loss)]
fn accumulate(totals: &mut [f64], lengths: &[usize]) {
    for (total, &len) in totals.iter_mut().zip(lengths) {
        *total += len as f64;
    }
}

#[allow(clippy::cast_precision_loss)]
fn average(totals: Vec<f64>, repetitions: usize) -> Vec<f64> {
    if repetitions == 0 {
        return totals;
    }
    totals.into_iter().map(|t| t / repetitions as f64).collect()
}
