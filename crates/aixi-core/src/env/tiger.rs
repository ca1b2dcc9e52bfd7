//! The tiger problem: a classic partially observable decision task.
//!
//! A tiger and a pot of gold hide behind two doors. Listening costs a
//! little and reports the tiger's door with probability
//! `tiger-listen-accuracy`; opening the gold door pays well and opening the
//! tiger's door is catastrophic. Raw rewards {-100, -1, +10} are shifted by
//! +100 so the minimum maps to zero.
//!
//! Domain characteristics: `max_action = 2`, `max_observation = 2`,
//! `max_reward = 110`.

use crate::env::Environment;
use crate::error::ConfigError;
use crate::options::Options;
use crate::{rng, Action, Percept};

const LISTEN: Action = 0;
const OPEN_LEFT: Action = 1;
const OPEN_RIGHT: Action = 2;

const NULL_OBS: Percept = 0;
const LEFT: Percept = 1;
const RIGHT: Percept = 2;

// Rewards, offset so the -100 penalty maps to 0.
const EATEN: Percept = 0;
const LISTENED: Percept = 99;
const GOLD: Percept = 110;

const DEFAULT_LISTEN_ACCURACY: f64 = 0.85;

#[derive(Debug)]
pub struct Tiger {
    listen_accuracy: f64,
    /// Door hiding the tiger.
    tiger: Percept,
    /// Door hiding the gold.
    gold: Percept,
    action: Action,
    observation: Percept,
    reward: Percept,
}

impl Tiger {
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
            action: LISTEN,
            observation: NULL_OBS,
            reward: 0,
        };
        env.place_tiger();
        Ok(env)
    }

    /// Randomly place the tiger behind one door and the gold behind the
    /// other.
    fn place_tiger(&mut self) {
        self.tiger = if rng::rand01() < 0.5 { LEFT } else { RIGHT };
        self.gold = if self.tiger == LEFT { RIGHT } else { LEFT };
    }
}

impl Environment for Tiger {
    fn perform_action(&mut self, action: Action) {
        debug_assert!(self.is_valid_action(action));
        self.action = action;

        if action == LISTEN {
            self.reward = LISTENED;
            self.observation = if rng::rand01() < self.listen_accuracy {
                self.tiger
            } else {
                self.gold
            };
        } else {
            let opened = if action == OPEN_LEFT { LEFT } else { RIGHT };
            self.reward = if self.tiger == opened { EATEN } else { GOLD };
            self.observation = NULL_OBS;
            self.place_tiger();
        }
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
        110
    }

    fn describe(&self) -> String {
        let action = match self.action {
            LISTEN => "listen",
            OPEN_LEFT => "open left door",
            _ => "open right door",
        };
        let observation = match self.observation {
            NULL_OBS => "null",
            LEFT => "hear tiger at left door",
            _ => "hear tiger at right door",
        };
        let outcome = match self.reward {
            EATEN => "eaten",
            LISTENED => "listen",
            _ => "gold!",
        };
        format!(
            "action = {action}, observation = {observation}, reward = {outcome} ({})",
            self.reward
        )
    }
}
