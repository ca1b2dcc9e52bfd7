//! The tiger problem with a posture mechanic.
//!
//! As in the basic tiger domain, but the agent starts seated: it can only
//! listen while sitting and only open a door once it has stood up. Invalid
//! combinations (listening while standing, opening while seated, standing
//! twice) earn the worst reward. Raw rewards {-100, -1, 0, +30} are shifted
//! by +100.
//!
//! Domain characteristics: `max_action = 3`, `max_observation = 2`,
//! `max_reward = 130`.

use crate::env::Environment;
use crate::error::ConfigError;
use crate::options::Options;
use crate::{rng, Action, Percept};

const LISTEN: Action = 0;
const OPEN_LEFT: Action = 1;
const OPEN_RIGHT: Action = 2;
const STAND: Action = 3;

const NULL_OBS: Percept = 0;
const LEFT: Percept = 1;
const RIGHT: Percept = 2;

// Rewards, offset by +100.
const INVALID: Percept = 0;
const TIGER: Percept = 0;
const STOOD: Percept = 99;
const LISTENED: Percept = 100;
const GOLD: Percept = 130;

const DEFAULT_LISTEN_ACCURACY: f64 = 0.85;

#[derive(Debug)]
pub struct ExtendedTiger {
    listen_accuracy: f64,
    tiger: Percept,
    gold: Percept,
    sitting: bool,
    action: Action,
    observation: Percept,
    reward: Percept,
}

impl ExtendedTiger {
    pub fn new(options: &Options) -> Result<Self, ConfigError> {
        let listen_accuracy = options.get_or("tiger-listen-accuracy", DEFAULT_LISTEN_ACCURACY)?;
        if !(0.0..=1.0).contains(&listen_accuracy) {
            return Err(ConfigError::InvalidValue {
                key: "tiger-listen-accuracy".to_string(),
                value: listen_accuracy.to_string(),
                reason: "must be a probability in [0, 1]".to_string(),
            });
        }

        let mut env = Self {
            listen_accuracy,
            tiger: LEFT,
            gold: RIGHT,
            sitting: true,
            action: LISTEN,
            observation: NULL_OBS,
            reward: 0,
        };
        env.reset_round();
        Ok(env)
    }

    /// Replace tiger and gold behind random doors and reseat the agent.
    fn reset_round(&mut self) {
        self.tiger = if rng::rand01() < 0.5 { LEFT } else { RIGHT };
        self.gold = if self.tiger == LEFT { RIGHT } else { LEFT };
        self.sitting = true;
    }
}

impl Environment for ExtendedTiger {
    fn perform_action(&mut self, action: Action) {
        debug_assert!(self.is_valid_action(action));
        self.action = action;

        // Unless explicitly matched below, the action is invalid in the
        // current posture.
        self.observation = NULL_OBS;
        self.reward = INVALID;

        match action {
            LISTEN if self.sitting => {
                self.observation = if rng::rand01() < self.listen_accuracy {
                    self.tiger
                } else {
                    self.gold
                };
                self.reward = LISTENED;
            }
            OPEN_LEFT if !self.sitting => {
                self.reward = if self.tiger == LEFT { TIGER } else { GOLD };
                self.reset_round();
            }
            OPEN_RIGHT if !self.sitting => {
                self.reward = if self.tiger == RIGHT { TIGER } else { GOLD };
                self.reset_round();
            }
            STAND if self.sitting => {
                self.reward = STOOD;
                self.sitting = false;
            }
            _ => {}
        }
    }

    fn observation(&self) -> Percept {
        self.observation
    }

    fn reward(&self) -> Percept {
        self.reward
    }

    fn max_action(&self) -> Action {
        3
    }

    fn max_observation(&self) -> Percept {
        2
    }

    fn max_reward(&self) -> Percept {
        130
    }

    fn describe(&self) -> String {
        let action = match self.action {
            LISTEN => "listen",
            OPEN_LEFT => "open left door",
            OPEN_RIGHT => "open right door",
            _ => "stand up",
        };
        let observation = match self.observation {
            NULL_OBS => "null",
            LEFT => "hear tiger at left door",
            _ => "hear tiger at right door",
        };
        format!(
            "action = {action}, observation = {observation}, reward = {}, agent is now {}",
            self.reward,
            if self.sitting { "sitting" } else { "standing" }
        )
    }
}
