//! A Monte-Carlo AIXI approximation.
//!
//! A general reinforcement-learning agent for unknown, partially observable
//! environments. The agent maintains a single universal model of its
//! experience, an action-conditional Context Tree Weighting mixture over bit
//! sequences ([`model`]), and plans by running predictive UCT Monte-Carlo
//! tree search ([`search`]) against that model as a generative simulator.
//!
//! The crate is organised bottom-up:
//!
//! - [`bits`]: fixed-width bit encodings of actions and percepts
//! - [`rng`]: the process-wide seedable randomness source
//! - [`model`]: the context tree (nodes, history, reversible updates)
//! - [`search`]: decision/chance search nodes and UCB sampling
//! - [`agent`]: the agent shell mediating model and planner
//! - [`env`]: the environment trait and the built-in toy environments
//! - [`options`] / [`config`]: key=value configuration
//! - [`run`]: the agent/environment interaction loop
//!
//! The binary target wires a configuration file and a CSV log path to
//! [`run::interaction_loop`].

pub mod agent;
pub mod bits;
pub mod config;
pub mod env;
pub mod error;
pub mod logging;
pub mod model;
pub mod options;
pub mod rng;
pub mod run;
pub mod search;

/// A single bit of agent experience.
pub type Symbol = bool;

/// An ordered bit sequence; the agent's history is one of these, used as a
/// stack.
pub type SymbolList = Vec<Symbol>;

/// An action chosen by the agent, as a non-negative integer.
pub type Action = u64;

/// An observation or reward component of a percept, as a non-negative
/// integer.
pub type Percept = u64;

/// Reward accumulated across an agent's lifespan.
pub type RewardSum = f64;
