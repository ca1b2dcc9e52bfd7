//! A biased coin the agent is asked to call.
//!
//! Each cycle a coin with heads-probability `coin-flip-p` is flipped. The
//! action is the agent's prediction for the upcoming flip, the observation
//! is the side the coin landed on, and the reward is 1 for a correct call.
//!
//! Domain characteristics: `max_action = 1`, `max_observation = 1`,
//! `max_reward = 1`.

use crate::env::Environment;
use crate::error::ConfigError;
use crate::options::Options;
use crate::{rng, Action, Percept};

const TAILS: Percept = 0;
const HEADS: Percept = 1;

const LOSS: Percept = 0;
const WIN: Percept = 1;

const DEFAULT_PROBABILITY: f64 = 0.7;

#[derive(Debug)]
pub struct CoinFlip {
    /// Probability of the coin landing heads (option `coin-flip-p`).
    probability: f64,
    action: Action,
    observation: Percept,
    reward: Percept,
}

impl CoinFlip {
    pub fn new(options: &Options) -> Result<Self, ConfigError> {
        let probability = options.get_or("coin-flip-p", DEFAULT_PROBABILITY)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::InvalidValue {
                key: "coin-flip-p".to_string(),
                value: probability.to_string(),
                reason: "must be a probability in [0, 1]".to_string(),
            });
        }

        Ok(Self {
            probability,
            action: TAILS,
            observation: if rng::rand01() < probability { HEADS } else { TAILS },
            reward: 0,
        })
    }
}

impl Environment for CoinFlip {
    fn perform_action(&mut self, action: Action) {
        debug_assert!(self.is_valid_action(action));
        self.action = action;

        self.observation = if rng::rand01() < self.probability { HEADS } else { TAILS };
        self.reward = if action == self.observation { WIN } else { LOSS };
    }

    fn observation(&self) -> Percept {
        self.observation
    }

    fn reward(&self) -> Percept {
        self.reward
    }

    fn max_action(&self) -> Action {
        1
    }

    fn max_observation(&self) -> Percept {
        1
    }

    fn max_reward(&self) -> Percept {
        1
    }

    fn describe(&self) -> String {
        format!(
            "prediction: {}, observation: {}, reward: {}",
            if self.action == TAILS { "tails" } else { "heads" },
            if self.observation == TAILS { "tails" } else { "heads" },
            self.reward
        )
    }
}
