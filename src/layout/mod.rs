//! Layout Module
//!
//! Turns a flat edge snapshot into positioned geometry.
//!
//! # Architecture
//!
//! 1. [`ChildMap::build`] groups edges by parent into an index arena
//! 2. [`SubtreeWidths`] computes each subtree's horizontal extent under a
//!    [`WidthPolicy`]
//! 3. [`compute_scene`] places every node and connector and accumulates the
//!    drawing bounds
//!
//! Nothing here touches shared memory; the input is a plain edge list.

mod child_map;
mod position;
mod width;

pub use child_map::{ChildMap, NodeIndex};
pub use position::compute_scene;
pub use width::{combine, SubtreeWidths, WidthPolicy};
