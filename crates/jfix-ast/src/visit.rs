//! Pre-order traversal with per-node descent control.

use crate::tree::{NodeId, SyntaxTree};

pub trait Visitor {
    /// Called before the children of `node`. Returning `false` skips the subtree.
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool;

    /// Called after the children of `node` (only when `visit` returned `true`).
    fn end_visit(&mut self, _tree: &SyntaxTree, _node: NodeId) {}
}

/// Walks the subtree rooted at `node` in source order.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, tree: &SyntaxTree, node: NodeId) {
    if !visitor.visit(tree, node) {
        return;
    }
    for child in tree.children(node) {
        walk(visitor, tree, *child);
    }
    visitor.end_visit(tree, node);
}
