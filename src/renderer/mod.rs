//! SVG renderer - the output layer.
//!
//! The renderer knows only about scenes. It does not understand processes or
//! shared memory. Layout hands it a [`Scene`] with final coordinates and
//! bounds, and it writes one self-contained SVG document.

pub mod markup;
pub mod output;
pub mod scene;
pub mod svg;

pub use output::OutputBuffer;
pub use scene::{CanvasRegion, Connector, NodeGlyph, Point, Scene};
pub use svg::{to_string, write_document};
