//! In-memory drawing: what to emit and where, before any serialization.

use crate::types::Pid;

/// A point in document coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Running bounding box of everything drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRegion {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for CanvasRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasRegion {
    /// Empty region: `(+∞, +∞, −∞, −∞)`.
    pub const fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// True until something has been included.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn include_point(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    /// Include the square around a circle.
    pub fn include_circle(&mut self, center: Point, radius: f64) {
        self.include_point(Point::new(center.x - radius, center.y - radius));
        self.include_point(Point::new(center.x + radius, center.y + radius));
    }

    /// Grow by `margin` on every side.
    pub fn expand(&mut self, margin: f64) {
        self.min_x -= margin;
        self.min_y -= margin;
        self.max_x += margin;
        self.max_y += margin;
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// A parent-to-child link, drawn from the parent's bottom edge to the
/// child's top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    /// Where the curve leaves the parent.
    pub start: Point,
    /// Where the curve reaches the child.
    pub end: Point,
    /// Last child of its parent: also mark the parent end.
    pub closes_parent: bool,
}

impl Connector {
    /// Vertical midpoint used for both Bézier control points.
    pub fn mid_y(&self) -> f64 {
        (self.start.y + self.end.y) / 2.0
    }
}

/// A drawn process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeGlyph {
    pub pid: Pid,
    pub center: Point,
    pub depth: usize,
}

/// Connectors and nodes in emission order plus the final viewable area.
///
/// Connectors form the lower layer so no line crosses a glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub connectors: Vec<Connector>,
    pub nodes: Vec<NodeGlyph>,
    /// Bounding box already expanded by the document margin.
    pub bounds: CanvasRegion,
    pub node_radius: f64,
}

impl Scene {
    /// Glyph of `pid`, if it was drawn.
    pub fn node(&self, pid: Pid) -> Option<&NodeGlyph> {
        self.nodes.iter().find(|n| n.pid == pid)
    }

    /// `(min_x, min_y, width, height)` for the document's `viewBox`.
    pub fn view_box(&self) -> (f64, f64, f64, f64) {
        (
            self.bounds.min_x,
            self.bounds.min_y,
            self.bounds.width(),
            self.bounds.height(),
        )
    }
}
