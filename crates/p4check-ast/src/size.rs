//! Memoized subtree sizing for minimization.

use crate::ast::{Expression, NodeId};
use std::collections::HashMap;

/// Memoizes the node count of subtrees, keyed by node identity.
/// One cache per top-level evaluation; together with the boolean
/// result cache it keeps explanation linear in the expression size.
pub type SizeCache = HashMap<NodeId, usize>;

/// Number of nodes in the subtree rooted at `expr`: 1 plus the sizes
/// of all children.
pub fn subtree_size(expr: &Expression, cache: &mut SizeCache) -> usize {
    if let Some(&size) = cache.get(&expr.id) {
        return size;
    }
    let size = 1 + expr
        .children()
        .iter()
        .map(|child| subtree_size(child, cache))
        .sum::<usize>();
    cache.insert(expr.id, size);
    size
}
