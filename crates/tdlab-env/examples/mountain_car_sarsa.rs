//! Example: tabular Sarsa(λ) with replacing traces on MountainCar
//!
//! Run with `RUST_LOG=info` to see progress lines from the driver.

use tdlab_agent::build_agent;
use tdlab_core::{AgentConfig, AlgorithmKind, PolicyKind, Representation, Scheme, TraceKind};
use tdlab_env::{default_resolution, greedy_action_map, make_env, run_episodes, run_repeatedly_parallel};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = AgentConfig::default()
        .with_algorithm(AlgorithmKind::SarsaLambda)
        .with_representation(Representation::Tabular)
        .with_coding(Scheme::Tile, vec![8, 8])
        .with_trace(TraceKind::Replacing, 0.9)
        .with_rates(0.05, 0.01, 1.0)
        .with_seed(0);
    config.policy = PolicyKind::EpsilonGreedy;
    config.epsilon = 0.1;

    let mut env = make_env("mountain_car", Some(0))?;
    let observation_space = env.observation_space();
    let mut agent = build_agent(&config, &observation_space, &env.action_space())?;

    let num_episodes = 100;
    let lengths = run_episodes(&mut env, agent.as_mut(), num_episodes, true, true)?;
    for (episode, steps) in lengths.iter().enumerate().step_by(10) {
        println!("Episode {}: Steps = {}", episode + 1, steps);
    }

    let evaluation = run_episodes(&mut env, agent.as_mut(), 5, false, false)?;
    println!("\nGreedy evaluation lengths: {evaluation:?}");

    // Greedy action per cell: 0 = push left, 1 = coast, 2 = push right
    let resolution = default_resolution(&config.granularity)?;
    let map = greedy_action_map(agent.as_mut(), observation_space.as_bounded_box()?, resolution)?;
    for row in map.outer_iter().rev() {
        let line: String = row.iter().map(|&a| ['<', '.', '>'][a]).collect();
        println!("{line}");
    }

    // Learning curve averaged over independent runs
    let curve = run_repeatedly_parallel(
        &config,
        |i| make_env("mountain_car", Some(i as u64)),
        50,
        4,
    )
    .await?;
    let tail: f64 = curve[40..].iter().sum::<f64>() / 10.0;
    println!("\nAverage length over the last 10 of 50 episodes: {tail:.1}");

    Ok(())
}
