//! Construction of control agents from configuration

use tdlab_coding::{select_coding, SelectedCoding};
use tdlab_core::{
    AgentConfig, AlgorithmKind, BoxSpace, RLError, Representation, Result, Space, TraceKind,
};
use tracing::{debug, info};

use crate::algorithms::{
    agent_rng, ActorCritic, Bootstrap, ControlAlgorithm, DoubleRule, DoubleTd, DynaQ, OneStepTd,
    SarsaN, TrueSarsaLambda,
};
use crate::exploration::ExplorationPolicy;
use crate::policy::LinearSoftmaxPolicy;
use crate::q_function::{build_q_function, LinearQFunction, QFunction};
use crate::trace::TraceSettings;
use crate::v_function::LinearVFunction;

/// Build the agent described by `config` for the given spaces
///
/// The observation space must be a bounded box and the action space
/// discrete. Every incompatible combination is reported here, before any
/// episode runs.
pub fn build_agent(
    config: &AgentConfig,
    observation_space: &Space,
    action_space: &Space,
) -> Result<Box<dyn ControlAlgorithm>> {
    config.validate()?;
    let space = observation_space.as_bounded_box()?;
    let n_actions = action_space.as_discrete()?.n;

    let exploration = ExplorationPolicy::new(&config.exploration());
    let rng = agent_rng(config.seed);
    let (alpha, gamma) = (config.alpha, config.gamma);

    let agent: Box<dyn ControlAlgorithm> = match config.algorithm {
        AlgorithmKind::Sarsa | AlgorithmKind::ExpectedSarsa | AlgorithmKind::Qlearning => {
            let bootstrap = match config.algorithm {
                AlgorithmKind::ExpectedSarsa => Bootstrap::Expected,
                AlgorithmKind::Qlearning => Bootstrap::Greedy,
                _ => Bootstrap::Sarsa,
            };
            Box::new(OneStepTd::new(
                config.algorithm,
                bootstrap,
                q_function(config, space, n_actions, None)?,
                exploration,
                alpha,
                gamma,
                rng,
            ))
        }
        AlgorithmKind::SarsaLambda => {
            if config.trace == TraceKind::Dutch {
                return Err(RLError::config(
                    "dutch traces require the true_sarsa_lambda algorithm",
                ));
            }
            let trace = TraceSettings::new(config.trace, config.lambda);
            Box::new(OneStepTd::new(
                config.algorithm,
                Bootstrap::Sarsa,
                q_function(config, space, n_actions, Some(trace))?,
                exploration,
                alpha,
                gamma,
                rng,
            ))
        }
        AlgorithmKind::TrueSarsaLambda => {
            if config.representation != Representation::LinearApprox
                || config.trace != TraceKind::Dutch
            {
                return Err(RLError::config(
                    "true online Sarsa(λ) needs linear approximation with a dutch trace",
                ));
            }
            let trace = TraceSettings::new(TraceKind::Dutch, config.lambda);
            let q = LinearQFunction::new(coding(config, space)?.discretizer, n_actions, Some(trace))?;
            Box::new(TrueSarsaLambda::new(q, exploration, alpha, gamma, rng))
        }
        AlgorithmKind::DoubleSarsa | AlgorithmKind::DoubleQlearning => {
            let rule = if config.algorithm == AlgorithmKind::DoubleSarsa {
                DoubleRule::Sarsa
            } else {
                DoubleRule::QLearning
            };
            Box::new(DoubleTd::new(
                rule,
                q_function(config, space, n_actions, None)?,
                q_function(config, space, n_actions, None)?,
                exploration,
                alpha,
                gamma,
                rng,
            ))
        }
        AlgorithmKind::SarsaN => Box::new(SarsaN::new(
            config.n,
            q_function(config, space, n_actions, None)?,
            exploration,
            alpha,
            gamma,
            rng,
        )?),
        AlgorithmKind::Dynaq => Box::new(DynaQ::new(
            q_function(config, space, n_actions, None)?,
            exploration,
            alpha,
            gamma,
            config.plan_rep,
            config.model_size,
            rng,
        )?),
        AlgorithmKind::ActorCritic => {
            let linear = |space: &BoxSpace| {
                select_coding(
                    space,
                    Representation::LinearApprox,
                    config.scheme,
                    &config.granularity,
                )
            };
            Box::new(ActorCritic::new(
                LinearVFunction::new(linear(space)?.discretizer),
                LinearSoftmaxPolicy::new(linear(space)?.discretizer, n_actions),
                config.alpha,
                config.alpha_theta,
                gamma,
                rng,
            ))
        }
    };

    info!(
        algorithm = %config.algorithm,
        representation = %config.representation,
        scheme = %config.scheme,
        n_actions,
        "Built control agent"
    );
    Ok(agent)
}

fn coding(config: &AgentConfig, space: &BoxSpace) -> Result<SelectedCoding> {
    let coding = select_coding(
        space,
        config.representation,
        config.scheme,
        &config.granularity,
    )?;
    debug!(
        coding_size = coding.coding_size,
        tilings = coding.tilings,
        "Selected state coding"
    );
    Ok(coding)
}

fn q_function(
    config: &AgentConfig,
    space: &BoxSpace,
    n_actions: usize,
    trace: Option<TraceSettings>,
) -> Result<Box<dyn QFunction>> {
    build_q_function(coding(config, space)?, config.representation, n_actions, trace)
}
