//! The environment interface and the built-in toy environments.
//!
//! An environment is a stateful, single-threaded process the agent interacts
//! with in cycles: the agent reads the current (observation, reward) percept,
//! performs an action, and the environment computes the next percept. All
//! observations, rewards and actions are non-negative integers bounded by
//! per-environment constants; environments whose natural rewards are
//! negative shift them so the minimum maps to zero.

use serde::{Deserialize, Serialize};

use crate::bits::bits_required;
use crate::error::ConfigError;
use crate::options::Options;
use crate::{Action, Percept};

mod coin_flip;
mod extended_tiger;
mod kuhn_poker;
mod maze;
mod pacman;
mod rock_paper_scissors;
mod tictactoe;
mod tiger;

pub use coin_flip::CoinFlip;
pub use extended_tiger::ExtendedTiger;
pub use kuhn_poker::KuhnPoker;
pub use maze::Maze;
pub use pacman::PacMan;
pub use rock_paper_scissors::RockPaperScissors;
pub use tictactoe::TicTacToe;
pub use tiger::Tiger;

/// The capability set the agent consumes.
///
/// Implementations must keep the declared maxima consistent with the values
/// they actually emit: the agent sizes its bit encodings from them.
pub trait Environment: std::fmt::Debug {
    /// Receive the agent's action and compute the new percept.
    fn perform_action(&mut self, action: Action);

    /// The current observation.
    fn observation(&self) -> Percept;

    /// The current reward.
    fn reward(&self) -> Percept;

    /// True once the environment can no longer interact with the agent.
    fn is_finished(&self) -> bool {
        false
    }

    /// The largest action the environment accepts.
    fn max_action(&self) -> Action;

    /// The largest observation the environment can emit.
    fn max_observation(&self) -> Percept;

    /// The largest reward the environment can emit.
    fn max_reward(&self) -> Percept;

    fn min_action(&self) -> Action {
        0
    }

    fn min_observation(&self) -> Percept {
        0
    }

    fn min_reward(&self) -> Percept {
        0
    }

    fn is_valid_action(&self, action: Action) -> bool {
        self.min_action() <= action && action <= self.max_action()
    }

    fn is_valid_observation(&self, observation: Percept) -> bool {
        self.min_observation() <= observation && observation <= self.max_observation()
    }

    fn is_valid_reward(&self, reward: Percept) -> bool {
        self.min_reward() <= reward && reward <= self.max_reward()
    }

    /// A human-readable account of the most recent interaction, for verbose
    /// runs.
    fn describe(&self) -> String {
        format!(
            "observation = {}, reward = {}",
            self.observation(),
            self.reward()
        )
    }
}

/// Instantiate one of the built-in environments by its configuration name.
pub fn create_environment(
    name: &str,
    options: &Options,
) -> Result<Box<dyn Environment>, ConfigError> {
    match name {
        "coin-flip" => Ok(Box::new(CoinFlip::new(options)?)),
        "extended-tiger" => Ok(Box::new(ExtendedTiger::new(options)?)),
        "kuhn-poker" => Ok(Box::new(KuhnPoker::new(options)?)),
        "maze" => Ok(Box::new(Maze::new(options)?)),
        "pacman" => Ok(Box::new(PacMan::new(options)?)),
        "rock-paper-scissors" => Ok(Box::new(RockPaperScissors::new(options)?)),
        "tictactoe" => Ok(Box::new(TicTacToe::new(options)?)),
        "tiger" => Ok(Box::new(Tiger::new(options)?)),
        other => Err(ConfigError::UnknownEnvironment(other.to_string())),
    }
}

/// Snapshot of an environment's immutable interaction bounds and the bit
/// widths they imply.
///
/// The agent captures one of these at construction instead of borrowing the
/// environment across the driver loop; the bounds never change over an
/// environment's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerceptSpace {
    pub max_action: Action,
    pub max_observation: Percept,
    pub max_reward: Percept,
}

impl PerceptSpace {
    pub fn of(env: &dyn Environment) -> Self {
        Self {
            max_action: env.max_action(),
            max_observation: env.max_observation(),
            max_reward: env.max_reward(),
        }
    }

    /// Bits needed to encode any action.
    pub fn action_bits(&self) -> u32 {
        bits_required(self.max_action)
    }

    /// Bits needed to encode any observation.
    pub fn observation_bits(&self) -> u32 {
        bits_required(self.max_observation)
    }

    /// Bits needed to encode any reward.
    pub fn reward_bits(&self) -> u32 {
        bits_required(self.max_reward)
    }

    /// Bits needed to encode any (observation, reward) percept.
    pub fn percept_bits(&self) -> u32 {
        self.observation_bits() + self.reward_bits()
    }

    /// Bits needed for the wider of an action or a percept.
    pub fn max_bits_needed(&self) -> u32 {
        self.action_bits().max(self.percept_bits())
    }

    /// Pack a percept into a single `percept_bits()`-wide integer, reward in
    /// the low bits. Used to key chance-node children in the search tree.
    pub fn pack_percept(&self, observation: Percept, reward: Percept) -> u64 {
        (observation << self.reward_bits()) | reward
    }
}
