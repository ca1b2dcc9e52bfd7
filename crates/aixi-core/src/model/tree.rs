//! The context tree: history, context routing, and the reversible
//! update/revert/predict/sample protocol.
//!
//! The tree owns a root [`CtNode`] and the history of every symbol applied
//! to it. A depth-D tree conditions each new bit on the D most recent
//! history symbols: the context path runs from the root to a depth-D leaf,
//! taking the child indexed by each history bit read backwards from the most
//! recent. Updates touch the path leaf-first so that every parent recomputes
//! its weighted probability from already-updated children; reverts walk the
//! identical path because the symbol being reverted has been popped off the
//! history first, exposing the same context the update saw.
//!
//! Two update flavours exist because the model is *action-conditional*: the
//! agent's own actions are appended to the history as conditioning context
//! ([`ContextTree::update_history`]) without adjusting any counts: the
//! model predicts the environment, not itself.

use crate::model::CtNode;
use crate::{rng, Symbol, SymbolList};

/// An action-conditional context tree of fixed maximum depth.
#[derive(Debug, Clone)]
pub struct ContextTree {
    root: Box<CtNode>,
    history: SymbolList,
    depth: usize,
}

impl ContextTree {
    /// Create a context tree of maximum depth `depth` (> 0). Only the root
    /// is allocated; deeper nodes appear lazily as contexts are visited.
    pub fn new(depth: usize) -> Self {
        assert!(depth > 0, "context tree depth must be positive");
        Self {
            root: Box::default(),
            history: Vec::new(),
            depth,
        }
    }

    /// Drop all nodes and history.
    pub fn clear(&mut self) {
        self.history.clear();
        self.root = Box::default();
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Log probability the mixture assigns to the entire applied history,
    /// `ln P_w` at the root.
    pub fn log_block_probability(&self) -> f64 {
        self.root.log_prob()
    }

    /// Update the tree with one new symbol and append it to the history.
    ///
    /// With less than `depth` symbols of context the tree has nothing to
    /// condition on; the symbol only extends the history.
    pub fn update(&mut self, symbol: Symbol) {
        if self.history.len() >= self.depth {
            Self::update_walk(&mut self.root, &self.history, self.depth, symbol);
        }
        self.history.push(symbol);
    }

    /// Update with each symbol of `symbols` in order.
    pub fn update_all(&mut self, symbols: &[Symbol]) {
        for &symbol in symbols {
            self.update(symbol);
        }
    }

    /// Append a symbol to the history without touching any node.
    pub fn update_history(&mut self, symbol: Symbol) {
        self.history.push(symbol);
    }

    /// Append symbols to the history without touching any node.
    pub fn update_history_all(&mut self, symbols: &[Symbol]) {
        self.history.extend_from_slice(symbols);
    }

    /// Descend `remaining` more levels along the context (the tail of
    /// `history`, read backwards), creating nodes as needed, then update
    /// leaf-first on the way back up.
    fn update_walk(node: &mut CtNode, history: &[Symbol], remaining: usize, symbol: Symbol) {
        if remaining > 0 {
            let next = history[history.len() - 1];
            let rest = &history[..history.len() - 1];
            Self::update_walk(node.child_or_create(next), rest, remaining - 1, symbol);
        }
        node.update(symbol);
    }

    /// Undo the most recent update, restoring tree and history to their
    /// prior state. A no-op on an empty history.
    pub fn revert(&mut self) {
        let Some(symbol) = self.history.pop() else {
            return;
        };

        // With the symbol popped, the visible history suffix is exactly the
        // context its update conditioned on.
        if self.history.len() >= self.depth {
            Self::revert_walk(&mut self.root, &self.history, self.depth, symbol);
        }
    }

    /// Undo the `num_symbols` most recent updates.
    pub fn revert_many(&mut self, num_symbols: usize) {
        for _ in 0..num_symbols {
            self.revert();
        }
    }

    /// Shrink the history by `num_symbols` without touching any node.
    /// Inverse of [`ContextTree::update_history`].
    pub fn revert_history(&mut self, num_symbols: usize) {
        debug_assert!(num_symbols <= self.history.len());
        self.history.truncate(self.history.len() - num_symbols);
    }

    fn revert_walk(node: &mut CtNode, history: &[Symbol], remaining: usize, symbol: Symbol) {
        if remaining > 0 {
            let next = history[history.len() - 1];
            let rest = &history[..history.len() - 1];
            // The path node exists whenever updates and reverts are exactly
            // paired; reverting the node itself may reap the deeper child,
            // which is why children revert before their parents.
            if let Some(child) = node.child_mut(next) {
                Self::revert_walk(child, rest, remaining - 1, symbol);
            }
        }
        node.revert(symbol);
    }

    /// The conditional probability ρ(symbol | history) = ρ(h·s) / ρ(h),
    /// evaluated by updating, reading the root, and reverting. Returns the
    /// uniform 1/2 when there is not yet enough context to condition on.
    pub fn predict(&mut self, symbol: Symbol) -> f64 {
        if self.history.len() < self.depth {
            return 0.5;
        }

        let log_prob_history = self.log_block_probability();
        self.update(symbol);
        let log_prob_sequence = self.log_block_probability();
        self.revert();
        (log_prob_sequence - log_prob_history).exp()
    }

    /// The conditional probability ρ(symbols | history) of a whole sequence.
    pub fn predict_all(&mut self, symbols: &[Symbol]) -> f64 {
        if self.history.len() + symbols.len() <= self.depth {
            return 0.5f64.powi(symbols.len() as i32);
        }

        let log_prob_history = self.log_block_probability();
        self.update_all(symbols);
        let log_prob_sequence = self.log_block_probability();
        self.revert_many(symbols.len());
        (log_prob_sequence - log_prob_history).exp()
    }

    /// Sample `bits` symbols from the mixture, folding each one into the
    /// model as it is drawn.
    pub fn gen_random_symbols_and_update(&mut self, bits: usize) -> SymbolList {
        let mut symbols = Vec::with_capacity(bits);
        for _ in 0..bits {
            let symbol = rng::rand01() < self.predict(true);
            self.update(symbol);
            symbols.push(symbol);
        }
        symbols
    }

    /// Sample `bits` symbols from the mixture, then rewind so the tree is
    /// exactly as it was before the draw.
    pub fn gen_random_symbols(&mut self, bits: usize) -> SymbolList {
        let symbols = self.gen_random_symbols_and_update(bits);
        self.revert_many(bits);
        symbols
    }
}
