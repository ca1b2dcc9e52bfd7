//! Heads-up Kuhn poker against a fixed stochastic opponent.
//!
//! Three cards (jack < queen < king), one dealt to each player, one round of
//! betting. The opponent plays a fixed mixed strategy: it bets a king with
//! probability 0.7, bluffs a jack with a third of that, always checks a
//! queen first but calls a bet on it with probability (1 + 0.7)/3. The
//! observation packs the agent's card with the opponent's initial
//! bet/pass; the reward encodes the showdown outcome (lost bet = 0, lost
//! pass = 1, won pass = 3, won bet = 4, a constant offset of two chips).
//!
//! Domain characteristics: `max_action = 1`, `max_observation = 6`,
//! `max_reward = 4`.

use crate::env::Environment;
use crate::error::ConfigError;
use crate::options::Options;
use crate::{rng, Action, Percept};

const BET: Action = 0;
const PASS: Action = 1;

const JACK: Percept = 0;
const QUEEN: Percept = 1;
const KING: Percept = 2;

/// Observation flag added when the opponent's first action is a pass.
const OPPONENT_PASSES: Percept = 4;

const BET_LOSS: Percept = 0;
const PASS_LOSS: Percept = 1;
const PASS_WIN: Percept = 3;
const BET_WIN: Percept = 4;

const BET_PROB_KING: f64 = 0.7;
const BET_PROB_QUEEN: f64 = (1.0 + BET_PROB_KING) / 3.0;
const BET_PROB_JACK: f64 = BET_PROB_KING / 3.0;

#[derive(Debug)]
pub struct KuhnPoker {
    agent_card: Percept,
    opponent_card: Percept,
    opponent_action: Action,
    // Previous hand, kept for describe().
    previous_agent_card: Percept,
    previous_opponent_card: Percept,
    previous_opponent_action: Action,
    action: Action,
    observation: Percept,
    reward: Percept,
}

impl KuhnPoker {
    pub fn new(_options: &Options) -> Result<Self, ConfigError> {
        let mut env = Self {
            agent_card: JACK,
            opponent_card: QUEEN,
            opponent_action: PASS,
            previous_agent_card: JACK,
            previous_opponent_card: QUEEN,
            previous_opponent_action: PASS,
            action: PASS,
            observation: 0,
            reward: 0,
        };
        env.deal();
        Ok(env)
    }

    fn random_card() -> Percept {
        rng::rand_range(3)
    }

    /// Start a new hand: deal distinct cards, pick the opponent's opening
    /// action, and compute the agent's observation.
    fn deal(&mut self) {
        self.previous_agent_card = self.agent_card;
        self.previous_opponent_card = self.opponent_card;
        self.previous_opponent_action = self.opponent_action;

        self.agent_card = Self::random_card();
        self.opponent_card = self.agent_card;
        while self.opponent_card == self.agent_card {
            self.opponent_card = Self::random_card();
        }

        self.opponent_action = match self.opponent_card {
            JACK if rng::rand01() < BET_PROB_JACK => BET,
            KING if rng::rand01() < BET_PROB_KING => BET,
            _ => PASS, // always check a queen first
        };

        self.observation = self.agent_card
            + if self.opponent_action == PASS {
                OPPONENT_PASSES
            } else {
                0
            };
    }

    fn card_name(card: Percept) -> &'static str {
        match card {
            JACK => "jack",
            QUEEN => "queen",
            _ => "king",
        }
    }
}

impl Environment for KuhnPoker {
    fn perform_action(&mut self, action: Action) {
        debug_assert!(self.is_valid_action(action));
        self.action = action;

        // Folding to a bet loses immediately.
        if action == PASS && self.opponent_action == BET {
            self.reward = PASS_LOSS;
            self.deal();
            return;
        }

        // Facing a check with a bet, the opponent may reconsider.
        if action == BET && self.opponent_action == PASS {
            if self.opponent_card == QUEEN && rng::rand01() < BET_PROB_QUEEN {
                self.opponent_action = BET;
            } else if self.opponent_card == KING {
                self.opponent_action = BET;
            } else {
                self.reward = PASS_WIN;
                self.deal();
                return;
            }
        }

        // Equal bets: showdown, highest card wins.
        let agent_wins = self.opponent_card == JACK
            || (self.opponent_card == QUEEN && self.agent_card == KING);
        self.reward = if agent_wins {
            if self.opponent_action == BET { BET_WIN } else { PASS_WIN }
        } else if self.action == BET {
            BET_LOSS
        } else {
            PASS_LOSS
        };
        self.deal();
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
        6
    }

    fn max_reward(&self) -> Percept {
        4
    }

    fn describe(&self) -> String {
        let agent_wins = self.reward == PASS_WIN || self.reward == BET_WIN;
        format!(
            "agent card = {}, opponent card = {}, agent {}, opponent {}; agent {}, reward = {}",
            Self::card_name(self.previous_agent_card),
            Self::card_name(self.previous_opponent_card),
            if self.action == PASS { "passes" } else { "bets" },
            if self.previous_opponent_action == PASS { "passes" } else { "bets" },
            if agent_wins { "wins" } else { "loses" },
            self.reward
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_packs_card_and_bet_status() {
        crate::rng::seed(0);
        let env = KuhnPoker::new(&Options::new()).unwrap();
        let observation = env.observation();
        let card = observation % 4;
        assert!(card <= KING);
        assert!(observation == card || observation == card + OPPONENT_PASSES);
    }

    #[test]
    fn folding_to_a_bet_loses() {
        crate::rng::seed(0);
        let mut env = KuhnPoker::new(&Options::new()).unwrap();
        // Walk until the opponent opens with a bet.
        while env.observation() >= OPPONENT_PASSES {
            env.perform_action(PASS);
        }
        env.perform_action(PASS);
        assert_eq!(env.reward(), PASS_LOSS);
    }

    #[test]
    fn rewards_stay_in_range_over_many_hands() {
        crate::rng::seed(3);
        let mut env = KuhnPoker::new(&Options::new()).unwrap();
        for i in 0..500 {
            env.perform_action(i % 2);
            assert!(env.reward() <= BET_WIN);
            assert!(env.is_valid_observation(env.observation()));
        }
    }

    #[test]
    fn a_held_king_never_loses_a_showdown() {
        crate::rng::seed(8);
        let mut env = KuhnPoker::new(&Options::new()).unwrap();
        for _ in 0..300 {
            let holding_king = env.observation() % 4 == KING;
            env.perform_action(BET);
            if holding_king {
                assert!(
                    env.reward() == PASS_WIN || env.reward() == BET_WIN,
                    "king lost: reward {}",
                    env.reward()
                );
            }
        }
    }
}
