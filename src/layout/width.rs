//! Subtree widths under the two layout policies.

use serde::{Deserialize, Serialize};

use super::child_map::{ChildMap, NodeIndex};

/// How much horizontal room a parent gives its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthPolicy {
    /// Siblings packed edge to edge, each as wide as its own subtree.
    #[default]
    Dense,
    /// Every sibling slot as wide as the widest sibling; even spacing, wider
    /// drawings.
    Centralized,
}

/// Width of a parent given its children's widths.
///
/// - Dense: `sum(w) + margin × (n − 1)`
/// - Centralized: `max(w) × n + margin × (n − 1)`
///
/// `child_widths` must not be empty; a leaf's width is the node diameter.
pub fn combine(policy: WidthPolicy, child_widths: &[f64], margin: f64) -> f64 {
    debug_assert!(!child_widths.is_empty());
    let n = child_widths.len() as f64;
    let gaps = margin * (n - 1.0);
    match policy {
        WidthPolicy::Dense => child_widths.iter().sum::<f64>() + gaps,
        WidthPolicy::Centralized => child_widths.iter().copied().fold(0.0, f64::max) * n + gaps,
    }
}

/// Subtree widths for one render, indexed by node.
///
/// Filled leaves first over the reversed pre-order, so every child is done
/// before its parent and depth never touches the call stack.
#[derive(Debug)]
pub struct SubtreeWidths {
    policy: WidthPolicy,
    widths: Vec<f64>,
}

impl SubtreeWidths {
    pub fn new(tree: &ChildMap, policy: WidthPolicy, node_diameter: f64, margin: f64) -> Self {
        let mut widths = vec![node_diameter; tree.node_count()];
        let mut child_widths = Vec::new();
        for &(node, _) in tree.preorder().iter().rev() {
            let children = tree.children(node);
            if children.is_empty() {
                continue;
            }
            child_widths.clear();
            child_widths.extend(children.iter().map(|&c| widths[c]));
            widths[node] = combine(policy, &child_widths, margin);
        }
        Self { policy, widths }
    }

    #[inline]
    pub fn policy(&self) -> WidthPolicy {
        self.policy
    }

    /// Width of the subtree rooted at `node`.
    #[inline]
    pub fn width(&self, node: NodeIndex) -> f64 {
        self.widths[node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Edge;
    use proptest::prelude::*;

    const D: f64 = 60.0;
    const M: f64 = 40.0;

    fn fan(n: i32) -> ChildMap {
        ChildMap::build(1, (0..n).map(|i| Edge::new(1, 100 + i))).unwrap()
    }

    #[test]
    fn test_leaf_is_diameter() {
        let tree = fan(0);
        let widths = SubtreeWidths::new(&tree, WidthPolicy::Dense, D, M);
        assert_eq!(widths.width(ChildMap::ROOT), D);
    }

    #[test]
    fn test_three_leaves() {
        let tree = fan(3);
        let dense = SubtreeWidths::new(&tree, WidthPolicy::Dense, D, M);
        assert_eq!(dense.width(ChildMap::ROOT), 3.0 * D + 2.0 * M);

        let central = SubtreeWidths::new(&tree, WidthPolicy::Centralized, D, M);
        assert_eq!(central.width(ChildMap::ROOT), 3.0 * D + 2.0 * M);
    }

    #[test]
    fn test_policies_diverge_on_uneven_children() {
        // 1 -> [2, 3], 2 -> [4, 5]
        let edges = [Edge::new(1, 2), Edge::new(1, 3), Edge::new(2, 4), Edge::new(2, 5)];
        let tree = ChildMap::build(1, edges).unwrap();

        let wide = 2.0 * D + M; // subtree of 2
        let dense = SubtreeWidths::new(&tree, WidthPolicy::Dense, D, M);
        assert_eq!(dense.width(ChildMap::ROOT), wide + D + M);

        let central = SubtreeWidths::new(&tree, WidthPolicy::Centralized, D, M);
        assert_eq!(central.width(ChildMap::ROOT), wide * 2.0 + M);
    }

    #[test]
    fn test_chain_widths() {
        let edges = [Edge::new(1, 2), Edge::new(2, 3), Edge::new(3, 4)];
        let tree = ChildMap::build(1, edges).unwrap();
        let widths = SubtreeWidths::new(&tree, WidthPolicy::Dense, D, M);

        assert_eq!(widths.width(ChildMap::ROOT), D);
        assert_eq!(widths.width(tree.lookup(3).unwrap()), D);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let tree = ChildMap::build(1, (1..20_000).map(|i| Edge::new(i, i + 1))).unwrap();
        let dense = SubtreeWidths::new(&tree, WidthPolicy::Dense, D, M);
        let central = SubtreeWidths::new(&tree, WidthPolicy::Centralized, D, M);

        assert_eq!(dense.width(ChildMap::ROOT), D);
        assert_eq!(central.width(ChildMap::ROOT), D);
    }

    #[test]
    fn test_policy_serde_names() {
        let json = serde_json::to_string(&WidthPolicy::Centralized).unwrap();
        assert_eq!(json, "\"centralized\"");
    }

    proptest! {
        #[test]
        fn prop_combine_formulas(
            widths in proptest::collection::vec(1.0f64..500.0, 1..12),
            margin in 0.0f64..100.0,
        ) {
            let n = widths.len() as f64;
            let sum: f64 = widths.iter().sum();
            let max = widths.iter().copied().fold(0.0, f64::max);

            let dense = combine(WidthPolicy::Dense, &widths, margin);
            let central = combine(WidthPolicy::Centralized, &widths, margin);

            prop_assert!((dense - (sum + margin * (n - 1.0))).abs() < 1e-9);
            prop_assert!((central - (max * n + margin * (n - 1.0))).abs() < 1e-9);
            prop_assert!(central + 1e-9 >= dense);
        }
    }
}
