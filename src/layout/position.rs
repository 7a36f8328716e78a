//! Node positioning and scene assembly.
//!
//! # Coordinate System
//!
//! The root is centred at `x = 0`. A node at depth `d` is centred at
//! `y = radius + d × (diameter + level_margin)`. Children are placed relative
//! to their parent's centre:
//!
//! ```text
//! Dense        |<- w0 ->|  m  |<-- w1 -->|  m  |<- w2 ->|     slot = own width
//! Centralized  |<- step ->|<- step ->|<- step ->|           step = width / n
//!              ^ parent.x - width / 2
//! ```
//!
//! # Traversal Order
//!
//! Positions are assigned top-down in depth-first pre-order. The scene then
//! lists every connector (same pre-order, one per non-root node) and after
//! that every node glyph, so lines sit under glyphs.

use crate::config::LayoutMetrics;
use crate::renderer::scene::{CanvasRegion, Connector, NodeGlyph, Point, Scene};

use super::child_map::{ChildMap, NodeIndex};
use super::width::{SubtreeWidths, WidthPolicy};

/// Lay out every node reachable from the root.
pub fn compute_scene(tree: &ChildMap, policy: WidthPolicy, metrics: &LayoutMetrics) -> Scene {
    let margin = metrics.sibling_margin;
    let widths = SubtreeWidths::new(tree, policy, metrics.node_diameter, margin);
    let radius = metrics.node_radius();
    let order = tree.preorder();

    // Pass 0: centres.
    let mut centers: Vec<Option<Point>> = vec![None; tree.node_count()];
    centers[ChildMap::ROOT] = Some(Point::new(0.0, metrics.level_y(0)));

    for &(node, depth) in &order {
        let Some(center) = centers[node] else {
            continue;
        };
        let child_y = metrics.level_y(depth + 1);
        for (child, x) in place_children(tree, &widths, node, center.x, margin) {
            centers[child] = Some(Point::new(x, child_y));
        }
    }

    let mut bounds = CanvasRegion::new();

    // Pass 1: connectors.
    let mut connectors = Vec::with_capacity(order.len().saturating_sub(1));
    for &(node, _) in &order {
        let Some(parent) = tree.parent(node) else {
            continue;
        };
        let (Some(from), Some(to)) = (centers[parent], centers[node]) else {
            continue;
        };

        let connector = Connector {
            start: Point::new(from.x, from.y + radius),
            end: Point::new(to.x, to.y - radius),
            closes_parent: tree.children(parent).last() == Some(&node),
        };
        bounds.include_point(connector.start);
        bounds.include_point(connector.end);
        connectors.push(connector);
    }

    // Pass 2: glyphs.
    let mut nodes = Vec::with_capacity(order.len());
    for &(node, depth) in &order {
        let Some(center) = centers[node] else {
            continue;
        };
        bounds.include_circle(center, radius);
        nodes.push(NodeGlyph {
            pid: tree.pid(node),
            center,
            depth,
        });
    }

    bounds.expand(metrics.document_margin);

    tracing::debug!(
        ?policy,
        nodes = nodes.len(),
        width = bounds.width(),
        height = bounds.height(),
        "scene laid out"
    );

    Scene {
        connectors,
        nodes,
        bounds,
        node_radius: radius,
    }
}

/// Horizontal centres of `node`'s children, left to right.
fn place_children(
    tree: &ChildMap,
    widths: &SubtreeWidths,
    node: NodeIndex,
    x: f64,
    margin: f64,
) -> Vec<(NodeIndex, f64)> {
    let children = tree.children(node);
    if children.is_empty() {
        return Vec::new();
    }

    let width = widths.width(node);
    match widths.policy() {
        WidthPolicy::Dense => {
            let mut offset = x - width / 2.0;
            children
                .iter()
                .map(|&child| {
                    let child_width = widths.width(child);
                    let cx = offset + child_width / 2.0;
                    offset += child_width + margin;
                    (child, cx)
                })
                .collect()
        }
        WidthPolicy::Centralized => {
            // Each child is centred in its slot whatever its own width, so
            // lopsided subtrees can overlap their neighbours.
            let step = width / children.len() as f64;
            let offset = x - width / 2.0 - step / 2.0;
            children
                .iter()
                .enumerate()
                .map(|(i, &child)| (child, offset + step * (i + 1) as f64))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edge, Pid};

    fn metrics() -> LayoutMetrics {
        LayoutMetrics::default()
    }

    fn xs(scene: &Scene, pids: &[Pid]) -> Vec<f64> {
        pids.iter().map(|&p| scene.node(p).unwrap().center.x).collect()
    }

    #[test]
    fn test_single_node_bounds() {
        let tree = ChildMap::build(1, []).unwrap();
        let m = metrics();
        let scene = compute_scene(&tree, WidthPolicy::Dense, &m);

        assert!(scene.connectors.is_empty());
        assert_eq!(scene.nodes.len(), 1);

        let side = m.node_diameter + 2.0 * m.document_margin;
        assert_eq!(scene.bounds.width(), side);
        assert_eq!(scene.bounds.height(), side);
        assert_eq!(scene.bounds.center(), scene.nodes[0].center);
    }

    #[test]
    fn test_three_sequential_children_dense() {
        let edges = [Edge::new(1, 10), Edge::new(1, 11), Edge::new(1, 12)];
        let tree = ChildMap::build(1, edges).unwrap();
        let scene = compute_scene(&tree, WidthPolicy::Dense, &metrics());

        assert_eq!(xs(&scene, &[10, 11, 12]), vec![-100.0, 0.0, 100.0]);
        for pid in [10, 11, 12] {
            assert_eq!(scene.node(pid).unwrap().center.y, 170.0);
        }
        assert_eq!(scene.bounds.width(), 3.0 * 60.0 + 2.0 * 40.0 + 80.0);
    }

    #[test]
    fn test_three_sequential_children_centralized() {
        let edges = [Edge::new(1, 10), Edge::new(1, 11), Edge::new(1, 12)];
        let tree = ChildMap::build(1, edges).unwrap();
        let scene = compute_scene(&tree, WidthPolicy::Centralized, &metrics());

        let x = xs(&scene, &[10, 11, 12]);
        assert!(x[0] < x[1] && x[1] < x[2]);
        assert!(x[1].abs() < 1e-9);
        assert!((x[2] - x[1] - (x[1] - x[0])).abs() < 1e-9);
    }

    #[test]
    fn test_connectors_precede_glyphs_in_preorder() {
        // 1 -> [2, 3], 2 -> [4]
        let edges = [Edge::new(1, 2), Edge::new(1, 3), Edge::new(2, 4)];
        let tree = ChildMap::build(1, edges).unwrap();
        let scene = compute_scene(&tree, WidthPolicy::Dense, &metrics());

        let pids: Vec<Pid> = scene.nodes.iter().map(|n| n.pid).collect();
        assert_eq!(pids, vec![1, 2, 4, 3]);
        assert_eq!(scene.connectors.len(), 3);

        // Connector ends match child tops, in the same order as the glyphs.
        for (connector, node) in scene.connectors.iter().zip(&scene.nodes[1..]) {
            assert_eq!(connector.end.x, node.center.x);
            assert_eq!(connector.end.y, node.center.y - scene.node_radius);
        }

        let closes: Vec<bool> = scene.connectors.iter().map(|c| c.closes_parent).collect();
        assert_eq!(closes, vec![false, true, true]);
    }

    #[test]
    fn test_dense_subtrees_do_not_overlap() {
        // 1 -> [2, 3], 2 -> [4, 5, 6], 3 -> [7, 8]
        let edges = [
            Edge::new(1, 2),
            Edge::new(1, 3),
            Edge::new(2, 4),
            Edge::new(2, 5),
            Edge::new(2, 6),
            Edge::new(3, 7),
            Edge::new(3, 8),
        ];
        let tree = ChildMap::build(1, edges).unwrap();
        let m = metrics();
        let scene = compute_scene(&tree, WidthPolicy::Dense, &m);

        let row = xs(&scene, &[4, 5, 6, 7, 8]);
        for pair in row.windows(2) {
            assert!(pair[1] - pair[0] >= m.node_diameter + m.sibling_margin - 1e-9);
        }
        // Parents stay centred over their children.
        assert_eq!(scene.node(2).unwrap().center.x, scene.node(5).unwrap().center.x);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let edges: Vec<Edge> = (0..30)
            .map(|i| Edge::new(if i < 5 { 1 } else { 100 + i % 5 }, 100 + i))
            .collect();
        let tree = ChildMap::build(1, edges).unwrap();
        let a = compute_scene(&tree, WidthPolicy::Centralized, &metrics());
        let b = compute_scene(&tree, WidthPolicy::Centralized, &metrics());
        assert_eq!(a, b);
    }

    #[test]
    fn test_deep_chain_lays_out() {
        let tree = ChildMap::build(1, (1..20_000).map(|i| Edge::new(i, i + 1))).unwrap();
        let m = metrics();
        let scene = compute_scene(&tree, WidthPolicy::Dense, &m);

        assert_eq!(scene.nodes.len(), 20_000);
        let deepest = scene.node(20_000).unwrap();
        assert_eq!(deepest.depth, 19_999);
        assert_eq!(deepest.center.x, 0.0);
        assert_eq!(deepest.center.y, m.level_y(19_999));
    }
}
