//! The agent/environment interaction loop.
//!
//! Each cycle the agent receives the environment's current percept, folds it
//! into its model, chooses an action (by search, or uniformly at random
//! with the current exploration probability) and hands it back. The loop
//! runs until the environment finishes or the agent outlives
//! `terminate-age`, logging one CSV row per cycle and a summary at every
//! power-of-two cycle.

use std::time::Instant;

use tracing::info;

use crate::agent::Agent;
use crate::env::Environment;
use crate::error::{ConfigError, Error};
use crate::logging::{CycleLog, CycleRecord};
use crate::options::Options;
use crate::rng;

/// Options consumed by the loop itself.
#[derive(Debug, Clone)]
pub struct LoopOptions {
    /// Initial probability of acting at random (option `exploration`).
    /// Exploration is enabled only when the option is present.
    pub explore: bool,
    pub explore_rate: f64,
    /// Per-cycle multiplicative decay of the exploration rate.
    pub explore_decay: f64,
    /// Stop once the agent's age exceeds this.
    pub terminate_age: Option<u64>,
    /// Cycle after which exploration is frozen along with learning.
    pub learning_period: u64,
    /// Echo the environment state every cycle.
    pub verbose: bool,
}

impl LoopOptions {
    pub fn from_options(options: &Options) -> Result<Self, ConfigError> {
        let explore = options.contains("exploration");
        let explore_rate = options.get_or("exploration", 0.0)?;
        let explore_decay = options.get_or("explore-decay", 1.0)?;
        if !(0.0..=1.0).contains(&explore_rate) {
            return Err(ConfigError::InvalidValue {
                key: "exploration".to_string(),
                value: explore_rate.to_string(),
                reason: "must be a probability in [0, 1]".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&explore_decay) {
            return Err(ConfigError::InvalidValue {
                key: "explore-decay".to_string(),
                value: explore_decay.to_string(),
                reason: "must be in [0, 1]".to_string(),
            });
        }

        Ok(Self {
            explore,
            explore_rate,
            explore_decay,
            terminate_age: options.get("terminate-age")?,
            learning_period: options.get_or("learning-period", 0)?,
            verbose: options.get_flag("verbose", false)?,
        })
    }
}

/// Drive the agent against the environment until either finishes.
pub fn interaction_loop(
    agent: &mut Agent,
    env: &mut dyn Environment,
    options: &LoopOptions,
    log: &mut CycleLog,
) -> Result<(), Error> {
    let mut explore = options.explore;
    let mut explore_rate = options.explore_rate;

    let mut cycle: u64 = 0;
    while !env.is_finished() {
        cycle += 1;
        if let Some(terminate_age) = options.terminate_age {
            if agent.age() > terminate_age {
                break;
            }
        }
        let cycle_start = Instant::now();

        let observation = env.observation();
        let reward = env.reward();

        if options.learning_period > 0 && cycle > options.learning_period {
            explore = false;
        }

        agent.model_update_percept(observation, reward);

        let explored = explore && rng::rand01() < explore_rate;
        let action = if explored {
            agent.gen_random_action()
        } else {
            agent.search()
        };

        env.perform_action(action);
        agent.model_update_action(action);

        log.record(&CycleRecord {
            cycle,
            observation,
            reward,
            action,
            explored,
            explore_rate,
            total_reward: agent.total_reward(),
            average_reward: agent.average_reward(),
            cycle_time_seconds: cycle_start.elapsed().as_secs_f64(),
            model_size: agent.model_size(),
        })
        .map_err(|e| Error::io("interaction log", e))?;

        if options.verbose || cycle.is_power_of_two() {
            info!(
                cycle,
                average_reward = agent.average_reward(),
                explore_rate = if explore { Some(explore_rate) } else { None },
                model_size = agent.model_size(),
            );
        }
        if options.verbose {
            info!("{}", env.describe());
        }

        if explore {
            explore_rate *= options.explore_decay;
        }
    }

    log.flush().map_err(|e| Error::io("interaction log", e))?;
    info!(
        age = agent.age(),
        average_reward = agent.average_reward(),
        total_reward = agent.total_reward(),
        "interaction finished"
    );
    Ok(())
}
