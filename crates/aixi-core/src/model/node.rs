//! A single node of the context tree.
//!
//! Denote by `a` and `b` the number of zeros and ones routed through a node
//! `n`. The node maintains two cached log probabilities for that bit
//! substring:
//!
//! - the Krichevsky-Trofimov estimate `Pr_kt(a, b)`, updated sequentially by
//!   the multiplier `(count[s] + 1/2) / (a + b + 1)` on each observed bit
//!   `s`, and
//! - the weighted block probability
//!
//! ```text
//! P_w = Pr_kt(a, b)                                   if n is a leaf
//! P_w = 1/2 Pr_kt(a, b) + 1/2 P_w(n0) P_w(n1)         otherwise
//! ```
//!
//! Both are held in log space; the mixture sum uses [`log_add_exp`] so that
//! deeply negative operands cannot overflow.
//!
//! Updates must be invertible: the planner rolls the model forward through
//! speculative futures and rewinds it afterwards. [`CtNode::update`] applies
//! the KT multiplier *before* incrementing the count, and [`CtNode::revert`]
//! decrements the count *before* subtracting the multiplier, so the pair
//! cancels exactly. A child whose visit count returns to zero on revert is
//! destroyed, keeping long playouts from leaking nodes.

use aixi_math::{log_add_exp, LN_HALF};

use crate::Symbol;

/// A node in an action-conditional context tree.
#[derive(Debug, Clone, Default)]
pub struct CtNode {
    /// Cached log KT estimate of the substring routed through this node.
    log_kt: f64,
    /// Cached log weighted block probability.
    log_prob: f64,
    /// Zeros and ones routed through this node.
    count: [u64; 2],
    /// Children, created lazily on first descent.
    child: [Option<Box<CtNode>>; 2],
}

fn side(symbol: Symbol) -> usize {
    usize::from(symbol)
}

impl CtNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// The log weighted block probability `ln P_w`.
    pub fn log_prob(&self) -> f64 {
        self.log_prob
    }

    /// The log KT estimate `ln Pr_kt(a, b)`.
    pub fn log_kt(&self) -> f64 {
        self.log_kt
    }

    /// Number of times this context has been visited.
    pub fn visits(&self) -> u64 {
        self.count[0] + self.count[1]
    }

    pub fn count(&self, symbol: Symbol) -> u64 {
        self.count[side(symbol)]
    }

    pub fn child(&self, symbol: Symbol) -> Option<&CtNode> {
        self.child[side(symbol)].as_deref()
    }

    pub(crate) fn child_mut(&mut self, symbol: Symbol) -> Option<&mut CtNode> {
        self.child[side(symbol)].as_deref_mut()
    }

    /// The child on `symbol`'s side, created if absent.
    pub(crate) fn child_or_create(&mut self, symbol: Symbol) -> &mut CtNode {
        self.child[side(symbol)].get_or_insert_with(Box::default)
    }

    pub fn is_leaf(&self) -> bool {
        self.child[0].is_none() && self.child[1].is_none()
    }

    /// Number of nodes in the subtree rooted here (this node included).
    pub fn size(&self) -> usize {
        1 + self.child(false).map_or(0, CtNode::size) + self.child(true).map_or(0, CtNode::size)
    }

    /// Log of the KT update multiplier for observing `symbol` after `a`
    /// zeros and `b` ones: `ln((count[s] + 1/2) / (a + b + 1))`.
    fn log_kt_multiplier(&self, symbol: Symbol) -> f64 {
        let numerator = self.count[side(symbol)] as f64 + 0.5;
        let denominator = (self.visits() + 1) as f64;
        (numerator / denominator).ln()
    }

    /// Recompute `log_prob` from `log_kt` and the children's current
    /// `log_prob`. Children must already reflect the update being applied.
    ///
    /// An absent child contributes log probability 0: an uninstantiated
    /// subtree is a neutral factor in the mixture.
    fn update_log_prob(&mut self) {
        if self.is_leaf() {
            self.log_prob = self.log_kt;
        } else {
            let log_child_prob = self.child(false).map_or(0.0, CtNode::log_prob)
                + self.child(true).map_or(0.0, CtNode::log_prob);
            self.log_prob = LN_HALF + log_add_exp(self.log_kt, log_child_prob);
        }
    }

    /// Fold an observed `symbol` into this node's estimates.
    pub(crate) fn update(&mut self, symbol: Symbol) {
        self.log_kt += self.log_kt_multiplier(symbol);
        self.update_log_prob();
        self.count[side(symbol)] += 1;
    }

    /// Return the node to its state immediately before the last
    /// `update(symbol)`.
    pub(crate) fn revert(&mut self, symbol: Symbol) {
        debug_assert!(self.count[side(symbol)] > 0, "revert without update");
        self.count[side(symbol)] -= 1;

        // Reap a child whose subtree no longer covers any history.
        if let Some(child) = self.child(symbol) {
            if child.visits() == 0 {
                self.child[side(symbol)] = None;
            }
        }

        // Counts now equal their pre-update values, so the multiplier is the
        // exact quantity the update added.
        self.log_kt -= self.log_kt_multiplier(symbol);
        self.update_log_prob();
    }
}
