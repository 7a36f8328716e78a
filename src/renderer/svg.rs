//! Scene to SVG serialization.
//!
//! # Document Structure
//!
//! ```text
//! <?xml ...?>
//! <svg viewBox="min_x min_y width height">
//!   <defs> shadow filter </defs>
//!   <rect/>                       background
//!   <g> path, anchor dots ... </g> connectors
//!   <g> shadow, circle, text ... </g> nodes
//! </svg>
//! ```
//!
//! The viewBox is known before the first byte is produced because layout
//! already computed the bounds.

use std::io::Write;

use super::markup::{self, SHADOW_FILTER_ID};
use super::output::OutputBuffer;
use super::scene::{Connector, NodeGlyph, Scene};
use crate::config::{RenderOptions, StyleFlags};
use crate::error::Result;

/// Serialize `scene` and write it to `sink` in one piece.
///
/// Returns the number of bytes written. On error nothing has been written,
/// unless the sink itself failed part way.
pub fn write_document<W: Write + ?Sized>(
    scene: &Scene,
    options: &RenderOptions,
    sink: &mut W,
) -> Result<usize> {
    let mut out = OutputBuffer::new();
    encode(scene, options, &mut out)?;
    let written = out.flush_to(sink)?;
    tracing::debug!(bytes = written, nodes = scene.nodes.len(), "svg written");
    Ok(written)
}

/// Serialize `scene` into a string.
pub fn to_string(scene: &Scene, options: &RenderOptions) -> Result<String> {
    let mut out = OutputBuffer::new();
    encode(scene, options, &mut out)?;
    Ok(out.as_str().into_owned())
}

fn encode(scene: &Scene, options: &RenderOptions, out: &mut OutputBuffer) -> Result<()> {
    let (min_x, min_y, width, height) = scene.view_box();

    markup::prologue(out)?;
    markup::svg_open(out, min_x, min_y, width, height)?;
    markup::shadow_filter(out, options.shadow_blur)?;
    if options.style.contains(StyleFlags::BACKGROUND) {
        markup::rect(out, min_x, min_y, width, height, options.palette.background)?;
    }

    markup::group_open(out)?;
    for connector in &scene.connectors {
        write_connector(out, connector, options)?;
    }
    markup::group_close(out)?;

    markup::group_open(out)?;
    for node in &scene.nodes {
        write_node(out, node, scene.node_radius, options)?;
    }
    markup::group_close(out)?;

    markup::svg_close(out)?;
    Ok(())
}

fn write_connector(
    out: &mut OutputBuffer,
    connector: &Connector,
    options: &RenderOptions,
) -> Result<()> {
    let palette = &options.palette;
    markup::s_curve(
        out,
        connector.start,
        connector.end,
        connector.mid_y(),
        palette.line,
        options.line_width,
    )?;

    if options.style.contains(StyleFlags::ANCHORS) {
        markup::circle(out, connector.end, options.anchor_radius, palette.anchor, None)?;
        if connector.closes_parent {
            markup::circle(out, connector.start, options.anchor_radius, palette.anchor, None)?;
        }
    }
    Ok(())
}

fn write_node(
    out: &mut OutputBuffer,
    node: &NodeGlyph,
    radius: f64,
    options: &RenderOptions,
) -> Result<()> {
    let palette = &options.palette;
    if options.style.contains(StyleFlags::SHADOW) {
        markup::circle(out, node.center, radius, palette.shadow, Some(SHADOW_FILTER_ID))?;
    }
    markup::circle(out, node.center, radius, palette.node, None)?;
    if options.style.contains(StyleFlags::LABELS) {
        let text = node.pid.to_string();
        markup::label(out, node.center, &text, palette.label, &options.font_family)?;
    }
    Ok(())
}
