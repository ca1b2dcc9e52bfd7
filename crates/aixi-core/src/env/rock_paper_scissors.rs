//! Repeated rock-paper-scissors against an exploitable opponent.
//!
//! The opponent has one predictable habit: after winning a round with rock
//! it plays rock again; otherwise it plays uniformly at random. The
//! observation is the opponent's most recent play; the reward is 0 for a
//! loss, 1 for a draw, 2 for a win.
//!
//! Domain characteristics: `max_action = 2`, `max_observation = 2`,
//! `max_reward = 2`.

use crate::env::Environment;
use crate::error::ConfigError;
use crate::options::Options;
use crate::{rng, Action, Percept};

const ROCK: u64 = 0;
const PAPER: u64 = 1;
const SCISSORS: u64 = 2;

const LOSE: Percept = 0;
const DRAW: Percept = 1;
const WIN: Percept = 2;

#[derive(Debug)]
pub struct RockPaperScissors {
    action: Action,
    observation: Percept,
    reward: Percept,
}

impl RockPaperScissors {
    pub fn new(_options: &Options) -> Result<Self, ConfigError> {
        Ok(Self {
            action: ROCK,
            // Anything but a rock win, so the first opponent move is random.
            observation: PAPER,
            reward: 0,
        })
    }
}

impl Environment for RockPaperScissors {
    fn perform_action(&mut self, action: Action) {
        debug_assert!(self.is_valid_action(action));
        self.action = action;

        // Opponent repeats rock after winning with rock, else plays randomly.
        self.observation = if self.observation == ROCK && self.reward == LOSE {
            ROCK
        } else {
            rng::rand_range(3)
        };

        self.reward = if action == self.observation {
            DRAW
        } else {
            let beats = match action {
                ROCK => SCISSORS,
                PAPER => ROCK,
                _ => PAPER,
            };
            if self.observation == beats {
                WIN
            } else {
                LOSE
            }
        };
    }

    fn observation(&self) -> Percept {
        self.observation
    }

    fn reward(&self) -> Percept {
        self.reward
    }

    fn max_action(&self) -> Action {
        2
    }

    fn max_observation(&self) -> Percept {
        2
    }

    fn max_reward(&self) -> Percept {
        2
    }

    fn describe(&self) -> String {
        let name = |p: u64| match p {
            ROCK => "rock",
            PAPER => "paper",
            _ => "scissors",
        };
        let outcome = match self.reward {
            WIN => "wins",
            DRAW => "draws",
            _ => "loses",
        };
        format!(
            "agent played {}, opponent played {}, agent {}",
            name(self.action),
            name(self.observation),
            outcome
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_follows_the_cycle() {
        crate::rng::seed(0);
        let mut env = RockPaperScissors::new(&Options::new()).unwrap();
        for _ in 0..200 {
            let action = rng::rand_range(3);
            env.perform_action(action);
            let observation = env.observation();
            let expected = if action == observation {
                DRAW
            } else {
                match (action, observation) {
                    (ROCK, SCISSORS) | (PAPER, ROCK) | (SCISSORS, PAPER) => WIN,
                    _ => LOSE,
                }
            };
            assert_eq!(env.reward(), expected);
        }
    }

    #[test]
    fn opponent_repeats_winning_rock() {
        crate::rng::seed(1);
        let mut env = RockPaperScissors::new(&Options::new()).unwrap();

        // Force the opponent into a rock win: play scissors until the
        // opponent happens to play rock.
        loop {
            env.perform_action(SCISSORS);
            if env.observation() == ROCK && env.reward() == LOSE {
                break;
            }
        }

        // The habit: the next opponent play must be rock again.
        env.perform_action(PAPER);
        assert_eq!(env.observation(), ROCK);
        assert_eq!(env.reward(), WIN);
    }
}
