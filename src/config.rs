//! Render configuration.
//!
//! Everything here only affects the emitted document. The tree store has no
//! tunables: page capacity is a compile-time constant of the shared layout.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::utils::Rgba;

// =============================================================================
// LAYOUT METRICS
// =============================================================================

/// Distances used by the width calculator and the layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    /// Diameter of a node glyph; also the width of a leaf subtree.
    pub node_diameter: f64,
    /// Horizontal gap between sibling subtrees.
    pub sibling_margin: f64,
    /// Vertical gap between a parent's glyph and its children's glyphs.
    pub level_margin: f64,
    /// Padding added around the drawing on every side.
    pub document_margin: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            node_diameter: 60.0,
            sibling_margin: 40.0,
            level_margin: 80.0,
            document_margin: 40.0,
        }
    }
}

impl LayoutMetrics {
    #[inline]
    pub fn node_radius(&self) -> f64 {
        self.node_diameter / 2.0
    }

    /// Vertical distance between consecutive tree levels.
    #[inline]
    pub fn level_step(&self) -> f64 {
        self.node_diameter + self.level_margin
    }

    /// Centre `y` of a node at `depth` (the root is depth 0).
    #[inline]
    pub fn level_y(&self, depth: usize) -> f64 {
        self.node_radius() + depth as f64 * self.level_step()
    }
}

// =============================================================================
// STYLE
// =============================================================================

bitflags! {
    /// Optional decorations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct StyleFlags: u32 {
        /// Blurred drop shadow under each node.
        const SHADOW = 1 << 0;
        /// Dots where connectors meet nodes.
        const ANCHORS = 1 << 1;
        /// Pid text inside each node.
        const LABELS = 1 << 2;
        /// Opaque rectangle behind the drawing.
        const BACKGROUND = 1 << 3;
    }
}

impl Default for StyleFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Colors of every drawn element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: Rgba,
    pub node: Rgba,
    pub label: Rgba,
    pub line: Rgba,
    pub anchor: Rgba,
    pub shadow: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgba::WHITE,
            node: Rgba::BLACK,
            label: Rgba::WHITE,
            line: Rgba::BLACK,
            anchor: Rgba::RED,
            // 0x33 / 0xFF = 0.2
            shadow: Rgba::new(0, 0, 0, 0x33),
        }
    }
}

// =============================================================================
// RENDER OPTIONS
// =============================================================================

/// Full render configuration.
///
/// Deserializes from partial documents: missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub metrics: LayoutMetrics,
    pub palette: Palette,
    pub style: StyleFlags,
    /// Gaussian blur standard deviation of node shadows.
    pub shadow_blur: f64,
    pub anchor_radius: f64,
    pub line_width: f64,
    pub font_family: String,
}

/// System UI font stack used for node labels.
pub const DEFAULT_FONT_FAMILY: &str = concat!(
    "-apple-system,system-ui,BlinkMacSystemFont,",
    "'Segoe UI',Roboto,'Helvetica Neue',Arial,sans-serif"
);

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            metrics: LayoutMetrics::default(),
            palette: Palette::default(),
            style: StyleFlags::default(),
            shadow_blur: 5.0,
            anchor_radius: 5.0,
            line_width: 2.0,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

impl RenderOptions {
    /// Replace the layout metrics.
    pub fn with_metrics(mut self, metrics: LayoutMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replace the palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Replace the decoration flags.
    pub fn with_style(mut self, style: StyleFlags) -> Self {
        self.style = style;
        self
    }

    /// Plain rendering: no shadow, no anchors, no background.
    pub fn minimal() -> Self {
        Self::default().with_style(StyleFlags::LABELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metrics() {
        let m = LayoutMetrics::default();
        assert_eq!(m.node_radius(), 30.0);
        assert_eq!(m.level_step(), 140.0);
        assert_eq!(m.level_y(0), 30.0);
        assert_eq!(m.level_y(2), 310.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r##"{
            "metrics": { "node_diameter": 20.0 },
            "palette": { "node": "#336699" }
        }"##;
        let options: RenderOptions = serde_json::from_str(json).unwrap();

        assert_eq!(options.metrics.node_diameter, 20.0);
        assert_eq!(options.metrics.sibling_margin, 40.0);
        assert_eq!(options.palette.node, Rgba::rgb(0x33, 0x66, 0x99));
        assert_eq!(options.palette.anchor, Rgba::RED);
        assert_eq!(options.style, StyleFlags::all());
    }

    #[test]
    fn test_invalid_color_rejected() {
        let json = r##"{ "palette": { "node": "blue" } }"##;
        assert!(serde_json::from_str::<RenderOptions>(json).is_err());
    }

    #[test]
    fn test_minimal_style() {
        let options = RenderOptions::minimal();
        assert!(options.style.contains(StyleFlags::LABELS));
        assert!(!options.style.contains(StyleFlags::SHADOW));
        assert!(!options.style.contains(StyleFlags::BACKGROUND));
    }
}
