//! Predictive UCT: Monte-Carlo tree search against the learned mixture.
//!
//! The search tree alternates two node kinds along every root-to-leaf path.
//! A *decision* node's children are indexed by actions; a *chance* node's
//! children are indexed by packed percept integers. Sampling a trajectory
//! descends the tree (UCB at decision nodes, a draw from the mixture at
//! chance nodes) and the agent's model rolls forward with every step, so
//! each completed simulation must be rewound by the caller before the next
//! begins ([`crate::agent::Agent::search`] owns that protocol).
//!
//! A decision node's first visit is estimated with a uniform-random playout
//! instead of expanding further; afterwards UCB takes over with exploration
//! constant `horizon · max_reward`, which scales the confidence bonus to the
//! range of achievable returns.

use std::collections::HashMap;

use crate::agent::Agent;
use crate::{rng, Action, RewardSum};

/// Priority given to actions that have never been sampled, large enough to
/// dominate any achievable UCB score.
const UNEXPLORED_PRIORITY: f64 = 1e9;

/// The two alternating search node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Children are the agent's actions.
    Decision,
    /// Children are packed (observation, reward) percepts.
    Chance,
}

/// A node in the Monte-Carlo search tree.
#[derive(Debug)]
pub struct SearchNode {
    kind: NodeKind,
    /// Number of samples routed through this node.
    visits: u64,
    /// Arithmetic mean of the returns of those samples.
    mean: RewardSum,
    children: HashMap<u64, SearchNode>,
}

impl SearchNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            visits: 0,
            mean: 0.0,
            children: HashMap::new(),
        }
    }

    /// The sampled expected return from this node.
    pub fn mean(&self) -> RewardSum {
        self.mean
    }

    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// The child for an action (decision nodes) or packed percept (chance
    /// nodes), if it has been created.
    pub fn child(&self, index: u64) -> Option<&SearchNode> {
        self.children.get(&index)
    }

    /// Pick an action by the UCB policy, favouring unexplored actions and
    /// breaking ties with a sliver of noise.
    fn select_action(&self, agent: &Agent) -> Action {
        let explore_bias = agent.horizon() as f64 * agent.percept_space().max_reward as f64;
        let log_visits = (self.visits as f64).ln();

        let mut best_action = 0;
        let mut best_priority = f64::NEG_INFINITY;
        for action in 0..=agent.percept_space().max_action {
            let priority = match self.child(action) {
                Some(node) if node.visits > 0 => {
                    node.mean + explore_bias * (2.0 * log_visits / node.visits as f64).sqrt()
                }
                _ => UNEXPLORED_PRIORITY,
            };

            let noisy = priority + rng::rand01() * 1e-3;
            if noisy > best_priority {
                best_priority = noisy;
                best_action = action;
            }
        }
        best_action
    }

    /// Sample one trajectory of up to `horizon` cycles through this node,
    /// rolling the agent's model forward as it goes. Returns the sampled
    /// return from this node down.
    ///
    /// The horizon is measured in whole interaction cycles, so it decrements
    /// where a cycle completes, on the chance/decision link, and not on
    /// the decision-to-chance link.
    pub fn sample(&mut self, agent: &mut Agent, horizon: u64) -> RewardSum {
        if horizon == 0 {
            return 0.0;
        }

        let reward = match self.kind {
            NodeKind::Chance => {
                let (observation, reward) = agent.gen_percept_and_update();
                let key = agent.percept_space().pack_percept(observation, reward);
                let child = self
                    .children
                    .entry(key)
                    .or_insert_with(|| SearchNode::new(NodeKind::Decision));
                reward as f64 + child.sample(agent, horizon - 1)
            }
            NodeKind::Decision if self.visits == 0 => agent.playout(horizon),
            NodeKind::Decision => {
                let action = self.select_action(agent);
                agent.model_update_action(action);
                let child = self
                    .children
                    .entry(action)
                    .or_insert_with(|| SearchNode::new(NodeKind::Chance));
                child.sample(agent, horizon)
            }
        };

        self.mean = (reward + self.visits as f64 * self.mean) / (self.visits + 1) as f64;
        self.visits += 1;
        reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::env::PerceptSpace;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn trained_agent() -> Agent {
        crate::rng::seed(5);
        let config = AgentConfig {
            ct_depth: 3,
            horizon: 2,
            mc_simulations: 50,
            learning_period: 0,
        };
        let space = PerceptSpace {
            max_action: 1,
            max_observation: 1,
            max_reward: 1,
        };
        let mut agent = Agent::new(config, space);
        for _ in 0..10 {
            agent.model_update_percept(1, 1);
            agent.model_update_action(agent.gen_random_action());
        }
        agent.model_update_percept(1, 1);
        agent
    }

    #[test]
    fn zero_horizon_contributes_nothing() {
        let mut agent = trained_agent();
        let mut node = SearchNode::new(NodeKind::Decision);
        assert_eq!(node.sample(&mut agent, 0), 0.0);
        // Truncation happens before the statistics update.
        assert_eq!(node.visits(), 0);
    }

    #[test]
    fn sampling_builds_alternating_levels() {
        let mut agent = trained_agent();
        let undo = crate::agent::ModelUndo::of(&agent);
        let mut root = SearchNode::new(NodeKind::Decision);

        for _ in 0..30 {
            root.sample(&mut agent, 2);
            agent.model_revert(&undo);
        }

        assert_eq!(root.visits(), 30);
        // After 30 samples both actions have chance children.
        for action in 0..=1 {
            assert!(root.child(action).is_some(), "action {action} unexpanded");
        }
    }

    #[test]
    fn mean_is_average_of_returns() {
        let mut agent = trained_agent();
        let undo = crate::agent::ModelUndo::of(&agent);
        let mut root = SearchNode::new(NodeKind::Decision);

        let mut total = 0.0;
        for _ in 0..20 {
            total += root.sample(&mut agent, 2);
            agent.model_revert(&undo);
        }

        assert!(approx_eq(root.mean(), total / 20.0, 1e-9));
    }

    #[test]
    fn unexplored_actions_are_tried_first() {
        let mut agent = trained_agent();
        let mut node = SearchNode::new(NodeKind::Decision);
        // One visit so UCB selection (not the playout path) runs.
        node.visits = 1;
        let action = node.select_action(&agent);
        assert!(action <= 1);
        // Neither child exists, so selection must pick an unexplored slot,
        // which is every slot; after inserting one child with visits, the
        // other side wins.
        node.children.insert(0, {
            let mut child = SearchNode::new(NodeKind::Chance);
            child.visits = 5;
            child.mean = 0.9;
            child
        });
        assert_eq!(node.select_action(&agent), 1);
    }
}
