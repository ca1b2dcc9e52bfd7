//! The agent shell: history encoding, the speculative update/revert
//! protocol, and the search driver.
//!
//! The agent owns the context tree and mediates every interaction with it.
//! Experience is appended to one bit history in strict alternation:
//!
//! ```text
//! ... a₁ (r₂ o₂) a₂ (r₃ o₃) a₃ ...
//! ```
//!
//! Percepts train the mixture (unless the learning period has lapsed);
//! actions extend the history only, because the model is conditioned on the
//! agent's behaviour rather than predictive of it. The [`ModelUndo`] token
//! snapshots everything the planner's speculative rollouts can disturb, and
//! [`Agent::model_revert`] restores the agent, tree included, bit-exactly.

use serde::{Deserialize, Serialize};

use crate::bits::{decode, encode};
use crate::config::AgentConfig;
use crate::env::PerceptSpace;
use crate::model::ContextTree;
use crate::search::{NodeKind, SearchNode};
use crate::{rng, Action, Percept, RewardSum, SymbolList};

/// Which half of the interaction cycle was most recently folded into the
/// history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastUpdate {
    Action,
    Percept,
}

/// Snapshot used to restore the agent exactly after speculative planning.
#[derive(Debug, Clone, Copy)]
pub struct ModelUndo {
    age: u64,
    total_reward: RewardSum,
    history_size: usize,
    last_update: LastUpdate,
}

impl ModelUndo {
    pub fn of(agent: &Agent) -> Self {
        Self {
            age: agent.age,
            total_reward: agent.total_reward,
            history_size: agent.history_size(),
            last_update: agent.last_update,
        }
    }

    pub fn history_size(&self) -> usize {
        self.history_size
    }
}

/// A Monte-Carlo AIXI approximation agent.
pub struct Agent {
    /// The mixture environment model.
    model: ContextTree,
    /// Bounds and bit widths of the environment being faced.
    space: PerceptSpace,
    config: AgentConfig,
    /// Current time cycle.
    age: u64,
    /// Reward accumulated across the agent's lifespan.
    total_reward: RewardSum,
    last_update: LastUpdate,
}

impl Agent {
    pub fn new(config: AgentConfig, space: PerceptSpace) -> Self {
        let model = ContextTree::new(config.ct_depth);
        Self {
            model,
            space,
            config,
            age: 0,
            total_reward: 0.0,
            last_update: LastUpdate::Action,
        }
    }

    /// Forget everything: clear the model and lifetime statistics.
    pub fn reset(&mut self) {
        self.model.clear();
        self.age = 0;
        self.total_reward = 0.0;
        self.last_update = LastUpdate::Action;
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn total_reward(&self) -> RewardSum {
        self.total_reward
    }

    pub fn average_reward(&self) -> RewardSum {
        if self.age > 0 {
            self.total_reward / self.age as f64
        } else {
            0.0
        }
    }

    /// Length of the stored bit history.
    pub fn history_size(&self) -> usize {
        self.model.history_size()
    }

    /// Length of the planning horizon in agent cycles.
    pub fn horizon(&self) -> u64 {
        self.config.horizon
    }

    /// Number of nodes in the context tree.
    pub fn model_size(&self) -> usize {
        self.model.size()
    }

    pub fn last_update(&self) -> LastUpdate {
        self.last_update
    }

    pub fn percept_space(&self) -> &PerceptSpace {
        &self.space
    }

    /// Bits needed for the wider of an action or a percept.
    pub fn max_bits_needed(&self) -> u32 {
        self.space.max_bits_needed()
    }

    /// An action drawn uniformly at random.
    pub fn gen_random_action(&self) -> Action {
        rng::rand_range(self.space.max_action + 1)
    }

    /// An action sampled from the agent's history statistics. Leaves the
    /// model untouched.
    pub fn gen_action(&mut self) -> Action {
        debug_assert_eq!(self.last_update, LastUpdate::Percept);
        let action_bits = self.space.action_bits();
        let symbols = self.model.gen_random_symbols(action_bits as usize);
        // An environment's action count need not fill the bit width; wrap
        // oversized samples back into range.
        decode(&symbols, action_bits) % (self.space.max_action + 1)
    }

    /// A percept sampled from the mixture, leaving the model untouched.
    pub fn gen_percept(&mut self) -> (Percept, Percept) {
        let symbols = self.model.gen_random_symbols(self.space.percept_bits() as usize);
        self.decode_percept(&symbols)
    }

    /// A percept sampled from the mixture, folding the drawn bits into the
    /// model as observed experience. The planner's chance nodes step the
    /// simulation forward with this.
    pub fn gen_percept_and_update(&mut self) -> (Percept, Percept) {
        let symbols = self
            .model
            .gen_random_symbols_and_update(self.space.percept_bits() as usize);
        let (observation, reward) = self.decode_percept(&symbols);

        self.total_reward += reward as f64;
        self.last_update = LastUpdate::Percept;
        (observation, reward)
    }

    /// Fold a received percept into the model. Trains the mixture unless
    /// the learning period has lapsed, in which case the bits extend the
    /// history only.
    pub fn model_update_percept(&mut self, observation: Percept, reward: Percept) {
        debug_assert_eq!(self.last_update, LastUpdate::Action);
        debug_assert!(observation <= self.space.max_observation);
        debug_assert!(reward <= self.space.max_reward);

        let symbols = self.encode_percept(observation, reward);
        if self.config.learning_period > 0 && self.age > self.config.learning_period {
            self.model.update_history_all(&symbols);
        } else {
            self.model.update_all(&symbols);
        }

        self.total_reward += reward as f64;
        self.last_update = LastUpdate::Percept;
    }

    /// Fold a performed action into the history. Actions are conditioning
    /// context, never training data.
    pub fn model_update_action(&mut self, action: Action) {
        debug_assert_eq!(self.last_update, LastUpdate::Percept);
        debug_assert!(action <= self.space.max_action, "invalid action {action}");

        let symbols = self.encode_action(action);
        self.model.update_history_all(&symbols);

        self.age += 1;
        self.last_update = LastUpdate::Action;
    }

    /// Rewind the model and lifetime statistics to the state captured by
    /// `undo`, unwinding whole actions and percepts in reverse order.
    pub fn model_revert(&mut self, undo: &ModelUndo) {
        while self.history_size() > undo.history_size {
            match self.last_update {
                LastUpdate::Percept => {
                    self.model.revert_many(self.space.percept_bits() as usize);
                    self.last_update = LastUpdate::Action;
                }
                LastUpdate::Action => {
                    self.model.revert_history(self.space.action_bits() as usize);
                    self.last_update = LastUpdate::Percept;
                }
            }
        }

        self.age = undo.age;
        self.total_reward = undo.total_reward;
        self.last_update = undo.last_update;
    }

    /// The probability the agent's own model assigns to it selecting
    /// `action` next.
    pub fn predicted_action_prob(&mut self, action: Action) -> f64 {
        debug_assert_eq!(self.last_update, LastUpdate::Percept);
        let symbols = self.encode_action(action);
        self.model.predict_all(&symbols)
    }

    /// The probability the mixture assigns to receiving the percept
    /// (observation, reward) next.
    pub fn percept_probability(&mut self, observation: Percept, reward: Percept) -> f64 {
        debug_assert_eq!(self.last_update, LastUpdate::Action);
        let symbols = self.encode_percept(observation, reward);
        self.model.predict_all(&symbols)
    }

    /// Choose the next action by predictive UCT: run the configured number
    /// of simulations against the mixture, rewinding the model after each,
    /// then pick the root child with the best sampled mean.
    pub fn search(&mut self) -> Action {
        let undo = ModelUndo::of(self);
        let mut root = SearchNode::new(NodeKind::Decision);

        let horizon = self.config.horizon;
        for _ in 0..self.config.mc_simulations {
            root.sample(self, horizon);
            self.model_revert(&undo);
        }

        // Tiny noise breaks exact ties between equally sampled actions. If
        // no simulation reached a child (degenerate budgets), fall back to a
        // uniformly random action.
        let mut best_action = self.gen_random_action();
        let mut best_mean = f64::NEG_INFINITY;
        for action in 0..=self.space.max_action {
            if let Some(child) = root.child(action) {
                let mean = child.mean() + rng::rand01() * 1e-4;
                if mean > best_mean {
                    best_mean = mean;
                    best_action = action;
                }
            }
        }
        best_action
    }

    /// Rollout policy: act uniformly at random against the mixture for
    /// `horizon` cycles and accumulate the sampled reward. Leaves the model
    /// rolled forward; callers rewind with a [`ModelUndo`].
    pub fn playout(&mut self, horizon: u64) -> RewardSum {
        let mut reward = 0.0;
        for _ in 0..horizon {
            let action = self.gen_random_action();
            self.model_update_action(action);
            let (_, r) = self.gen_percept_and_update();
            reward += r as f64;
        }
        reward
    }

    fn encode_action(&self, action: Action) -> SymbolList {
        let mut symbols = Vec::new();
        encode(&mut symbols, action, self.space.action_bits());
        symbols
    }

    /// A percept on the wire is reward first, then observation, each
    /// least-significant-bit first.
    fn encode_percept(&self, observation: Percept, reward: Percept) -> SymbolList {
        let mut symbols = Vec::new();
        encode(&mut symbols, reward, self.space.reward_bits());
        encode(&mut symbols, observation, self.space.observation_bits());
        symbols
    }

    fn decode_percept(&self, symbols: &[crate::Symbol]) -> (Percept, Percept) {
        let reward_bits = self.space.reward_bits() as usize;
        let reward = decode(&symbols[..reward_bits], self.space.reward_bits());
        let observation = decode(&symbols[reward_bits..], self.space.observation_bits());
        (observation, reward)
    }
}
