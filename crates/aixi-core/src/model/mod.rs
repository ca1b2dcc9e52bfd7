//! The action-conditional Context Tree Weighting model.
//!
//! CTW is a Bayesian mixture over every pruning of a depth-D binary suffix
//! tree, computable incrementally in time O(D) per bit. Each [`node::CtNode`]
//! blends its own Krichevsky-Trofimov estimate with the product of its
//! children's weighted probabilities; [`tree::ContextTree`] routes history
//! bits through the tree and keeps every update exactly reversible so the
//! planner can speculate and rewind.

pub mod node;
pub mod tree;

pub use node::CtNode;
pub use tree::ContextTree;
