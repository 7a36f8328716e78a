//! Parent → children adjacency built from the flat edge list.
//!
//! Arena layout, like the rest of the layout code: every pid gets a dense
//! `usize` index on first sight, children are stored as index vectors.
//! The root is always index 0.

use std::collections::HashMap;

use crate::error::{ForkTreeError, Result};
use crate::types::{Edge, Pid};

/// Dense node index into a [`ChildMap`].
pub type NodeIndex = usize;

/// Rooted adjacency structure for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildMap {
    pids: Vec<Pid>,
    index: HashMap<Pid, NodeIndex>,
    children: Vec<Vec<NodeIndex>>,
    parent: Vec<Option<NodeIndex>>,
}

impl ChildMap {
    /// The root index.
    pub const ROOT: NodeIndex = 0;

    /// Build from edges in store order.
    ///
    /// Sibling order is edge order. A child may show up as a parent before its
    /// own edge does (it forked before its parent finished recording it); it
    /// is attached when its edge arrives.
    ///
    /// Fails when a pid is recorded as a child twice or the root is recorded
    /// as a child, which also rules out cycles reachable from the root.
    pub fn build(root: Pid, edges: impl IntoIterator<Item = Edge>) -> Result<Self> {
        let mut map = Self {
            pids: Vec::new(),
            index: HashMap::new(),
            children: Vec::new(),
            parent: Vec::new(),
        };
        map.intern(root);

        for edge in edges {
            if edge.child == root {
                return Err(ForkTreeError::RootIsChild {
                    root,
                    parent: edge.parent,
                });
            }

            let parent = map.intern(edge.parent);
            let child = map.intern(edge.child);

            if let Some(first) = map.parent[child] {
                return Err(ForkTreeError::DuplicateChild {
                    child: edge.child,
                    first: map.pids[first],
                    second: edge.parent,
                });
            }

            map.parent[child] = Some(parent);
            map.children[parent].push(child);
        }

        Ok(map)
    }

    fn intern(&mut self, pid: Pid) -> NodeIndex {
        if let Some(&idx) = self.index.get(&pid) {
            return idx;
        }
        let idx = self.pids.len();
        self.pids.push(pid);
        self.index.insert(pid, idx);
        self.children.push(Vec::new());
        self.parent.push(None);
        idx
    }

    #[inline]
    pub fn root_pid(&self) -> Pid {
        self.pids[Self::ROOT]
    }

    /// Number of distinct pids seen, reachable from the root or not.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.pids.len()
    }

    #[inline]
    pub fn pid(&self, node: NodeIndex) -> Pid {
        self.pids[node]
    }

    #[inline]
    pub fn children(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.children[node]
    }

    #[inline]
    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.parent[node]
    }

    pub fn lookup(&self, pid: Pid) -> Option<NodeIndex> {
        self.index.get(&pid).copied()
    }

    /// Children of `pid` as pids, in recorded order.
    pub fn children_of(&self, pid: Pid) -> Option<Vec<Pid>> {
        let node = self.lookup(pid)?;
        Some(self.children[node].iter().map(|&c| self.pids[c]).collect())
    }

    /// Nodes reachable from the root in depth-first pre-order, with depth.
    pub fn preorder(&self) -> Vec<(NodeIndex, usize)> {
        let mut order = Vec::with_capacity(self.node_count());
        let mut stack = vec![(Self::ROOT, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            order.push((node, depth));
            for &child in self.children[node].iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_forks() {
        let edges = [Edge::new(1, 10), Edge::new(1, 11), Edge::new(1, 12)];
        let map = ChildMap::build(1, edges).unwrap();

        assert_eq!(map.root_pid(), 1);
        assert_eq!(map.children_of(1), Some(vec![10, 11, 12]));
        assert_eq!(map.children_of(10), Some(vec![]));
        assert_eq!(map.children_of(99), None);
    }

    #[test]
    fn test_child_recorded_after_its_own_children() {
        // 10 forked 20 before 1 finished recording 10.
        let edges = [Edge::new(10, 20), Edge::new(1, 10)];
        let map = ChildMap::build(1, edges).unwrap();

        let order: Vec<Pid> = map.preorder().iter().map(|&(n, _)| map.pid(n)).collect();
        assert_eq!(order, vec![1, 10, 20]);
        assert_eq!(map.parent(map.lookup(20).unwrap()), map.lookup(10));
    }

    #[test]
    fn test_preorder_depths() {
        let edges = [
            Edge::new(1, 2),
            Edge::new(2, 3),
            Edge::new(1, 4),
            Edge::new(3, 5),
        ];
        let map = ChildMap::build(1, edges).unwrap();
        let order: Vec<(Pid, usize)> = map
            .preorder()
            .iter()
            .map(|&(n, d)| (map.pid(n), d))
            .collect();
        assert_eq!(order, vec![(1, 0), (2, 1), (3, 2), (5, 3), (4, 1)]);
    }

    #[test]
    fn test_unreachable_nodes_are_not_visited() {
        let edges = [Edge::new(1, 2), Edge::new(50, 51)];
        let map = ChildMap::build(1, edges).unwrap();
        assert_eq!(map.node_count(), 4);
        assert_eq!(map.preorder().len(), 2);
    }

    #[test]
    fn test_duplicate_child_rejected() {
        let edges = [Edge::new(1, 2), Edge::new(1, 3), Edge::new(3, 2)];
        let err = ChildMap::build(1, edges).unwrap_err();
        assert!(matches!(
            err,
            ForkTreeError::DuplicateChild {
                child: 2,
                first: 1,
                second: 3
            }
        ));
    }

    #[test]
    fn test_root_as_child_rejected() {
        let err = ChildMap::build(1, [Edge::new(2, 1)]).unwrap_err();
        assert!(matches!(err, ForkTreeError::RootIsChild { root: 1, parent: 2 }));
    }

    #[test]
    fn test_empty_tree() {
        let map = ChildMap::build(7, []).unwrap();
        assert_eq!(map.node_count(), 1);
        assert!(map.children(ChildMap::ROOT).is_empty());
        assert_eq!(map.preorder(), vec![(ChildMap::ROOT, 0)]);
    }
}
