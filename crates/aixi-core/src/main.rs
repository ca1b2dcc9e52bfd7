//! Command-line driver.
//!
//! Usage: `aixi-core <config-file> <log-file>`. The configuration file
//! selects and parameterises an environment and the agent; the log file
//! receives one CSV row per interaction cycle.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use aixi_core::agent::Agent;
use aixi_core::config::AgentConfig;
use aixi_core::env::{create_environment, PerceptSpace};
use aixi_core::error::Error;
use aixi_core::logging::{self, CycleLog};
use aixi_core::options::Options;
use aixi_core::rng;
use aixi_core::run::{interaction_loop, LoopOptions};

/// A Monte-Carlo AIXI approximation agent.
#[derive(Parser)]
#[command(name = "aixi-core", version, about, long_about = None)]
struct Cli {
    /// Path to the key=value configuration file.
    config: PathBuf,

    /// Path to write the CSV interaction log.
    log: PathBuf,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("ERROR: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    // Defaults first; the configuration file overrides them.
    let mut options = Options::with_defaults();
    let text = std::fs::read_to_string(&cli.config)
        .map_err(|e| Error::io(cli.config.display().to_string(), e))?;
    options.parse_lines(&text);

    // Seed before anything draws randomness, the environments included.
    rng::seed(options.get_or("random-seed", 0)?);

    let environment_name: String = options.require("environment")?;
    let mut env = create_environment(&environment_name, &options)?;

    // Record the environment's derived characteristics alongside the
    // configured options, then echo the lot.
    let space = PerceptSpace::of(env.as_ref());
    options.set("action-bits", space.action_bits().to_string());
    options.set("observation-bits", space.observation_bits().to_string());
    options.set("reward-bits", space.reward_bits().to_string());
    options.set("percept-bits", space.percept_bits().to_string());
    options.set("max-action", space.max_action.to_string());
    options.set("max-observation", space.max_observation.to_string());
    options.set("max-reward", space.max_reward.to_string());
    for (key, value) in options.iter() {
        info!(option = key, value, "resolved option");
    }

    let agent_config = AgentConfig::from_options(&options)?;
    let loop_options = LoopOptions::from_options(&options)?;
    let mut agent = Agent::new(agent_config, space);
    let mut log = CycleLog::create(&cli.log)?;

    interaction_loop(&mut agent, env.as_mut(), &loop_options, &mut log)
}
