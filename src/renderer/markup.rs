//! SVG element primitives.
//!
//! Each function writes one complete element (or one open/close tag) to any
//! `Write`. Numbers go through [`Num`], colors through [`Rgba`]: opaque colors
//! become a bare hex paint, translucent ones add an `opacity` attribute.

use std::io::Write;

use crate::renderer::scene::Point;
use crate::utils::{Num, Rgba};

// =============================================================================
// Constants
// =============================================================================

/// XML declaration, first line of every document.
pub const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";

/// SVG namespace.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Id of the node shadow filter.
pub const SHADOW_FILTER_ID: &str = "igs-shadow";

// =============================================================================
// Document
// =============================================================================

/// XML declaration followed by a newline.
#[inline]
pub fn prologue<W: Write>(w: &mut W) -> std::io::Result<()> {
    writeln!(w, "{XML_DECL}")
}

/// Open the root element.
pub fn svg_open<W: Write>(
    w: &mut W,
    min_x: f64,
    min_y: f64,
    width: f64,
    height: f64,
) -> std::io::Result<()> {
    write!(
        w,
        "<svg xmlns=\"{SVG_NS}\" version=\"1.1\" viewBox=\"{} {} {} {}\">",
        Num(min_x),
        Num(min_y),
        Num(width),
        Num(height)
    )
}

#[inline]
pub fn svg_close<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "</svg>")
}

/// `<defs>` holding the Gaussian blur used for node shadows.
pub fn shadow_filter<W: Write>(w: &mut W, std_deviation: f64) -> std::io::Result<()> {
    write!(w, "<defs><filter id=\"{SHADOW_FILTER_ID}\">")?;
    write!(
        w,
        "<feGaussianBlur in=\"SourceGraphic\" stdDeviation=\"{}\"></feGaussianBlur>",
        Num(std_deviation)
    )?;
    write!(w, "</filter></defs>")
}

#[inline]
pub fn group_open<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "<g>")
}

#[inline]
pub fn group_close<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "</g>")
}

// =============================================================================
// Shapes
// =============================================================================

/// ` fill="#RRGGBB"` plus ` opacity="a"` when translucent.
fn paint<W: Write>(w: &mut W, attr: &str, color: Rgba) -> std::io::Result<()> {
    write!(w, " {attr}=\"{}\"", color.to_hex())?;
    if !color.is_opaque() {
        write!(w, " opacity=\"{}\"", Num(color.opacity()))?;
    }
    Ok(())
}

pub fn rect<W: Write>(
    w: &mut W,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    fill: Rgba,
) -> std::io::Result<()> {
    write!(
        w,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
        Num(x),
        Num(y),
        Num(width),
        Num(height)
    )?;
    paint(w, "fill", fill)?;
    write!(w, "/>")
}

/// Filled circle, optionally passed through a filter.
pub fn circle<W: Write>(
    w: &mut W,
    center: Point,
    radius: f64,
    fill: Rgba,
    filter: Option<&str>,
) -> std::io::Result<()> {
    write!(
        w,
        "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"",
        Num(center.x),
        Num(center.y),
        Num(radius)
    )?;
    paint(w, "fill", fill)?;
    if let Some(id) = filter {
        write!(w, " filter=\"url(#{id})\"")?;
    }
    write!(w, "></circle>")
}

/// Vertical S-curve: both control points sit at `mid_y`.
pub fn s_curve<W: Write>(
    w: &mut W,
    start: Point,
    end: Point,
    mid_y: f64,
    stroke: Rgba,
    stroke_width: f64,
) -> std::io::Result<()> {
    write!(
        w,
        "<path d=\"M{},{} C{},{} {},{} {},{}\"",
        Num(start.x),
        Num(start.y),
        Num(start.x),
        Num(mid_y),
        Num(end.x),
        Num(mid_y),
        Num(end.x),
        Num(end.y)
    )?;
    paint(w, "stroke", stroke)?;
    write!(w, " stroke-width=\"{}\" fill=\"none\"></path>", Num(stroke_width))
}

/// Text centred on `at`.
pub fn label<W: Write>(
    w: &mut W,
    at: Point,
    content: &str,
    fill: Rgba,
    font_family: &str,
) -> std::io::Result<()> {
    write!(w, "<text font-family=\"{}\"", escape(font_family))?;
    write!(w, " x=\"{}\" y=\"{}\"", Num(at.x), Num(at.y))?;
    write!(w, " text-anchor=\"middle\" dominant-baseline=\"middle\"")?;
    paint(w, "fill", fill)?;
    write!(w, ">{}</text>", escape(content))
}

/// Escape text for use in attribute values and character data.
pub fn escape(s: &str) -> std::borrow::Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"']) {
        return std::borrow::Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    std::borrow::Cow::Owned(out)
}
