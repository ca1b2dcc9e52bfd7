//! Validated agent configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::options::Options;

/// Configuration consumed by the agent itself.
///
/// Resolved from the option map by [`AgentConfig::from_options`]; the
/// remaining interaction-loop options (`exploration`, `explore-decay`,
/// `terminate-age`, `random-seed`, `verbose`) are read by [`crate::run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum context tree depth D (option `ct-depth`).
    pub ct_depth: usize,

    /// Planning horizon H in agent cycles (option `agent-horizon`).
    pub horizon: u64,

    /// Simulations per search (option `mc-simulations`).
    pub mc_simulations: u64,

    /// Cycle after which percepts stop training the mixture; 0 means learn
    /// forever (option `learning-period`).
    #[serde(default)]
    pub learning_period: u64,
}

impl AgentConfig {
    /// Resolve and validate the agent's options.
    pub fn from_options(options: &Options) -> Result<Self, ConfigError> {
        let config = Self {
            ct_depth: options.require("ct-depth")?,
            horizon: options.require("agent-horizon")?,
            mc_simulations: options.require("mc-simulations")?,
            learning_period: options.get_or("learning-period", 0)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("ct-depth", self.ct_depth as u64),
            ("agent-horizon", self.horizon),
            ("mc-simulations", self.mc_simulations),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}
