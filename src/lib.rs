//! fork-tree - record the process tree a program builds with `fork(2)` and
//! draw it as SVG.
//!
//! The root creates a [`ForkTree`], then every process in the family forks
//! through it. Each fork appends one `parent → child` edge to shared memory
//! that all descendants inherit. Once the descendants are reaped, the root
//! lays the tree out and writes a single SVG document.
//!
//! # Architecture
//!
//! ```text
//! root + every descendant                       root, after reaping
//! ───────────────────────                       ───────────────────
//!   ForkTree::fork()                              ForkTree::render()
//!        │ record_edge (shared mutex)                  │
//!        ▼                                             ▼
//!   ┌──────────────────────────────┐   snapshot   ┌──────────┐  widths  ┌───────┐  svg
//!   │ memfd: header + edge pages   │ ───────────► │ ChildMap │ ───────► │ Scene │ ─────► sink
//!   └──────────────────────────────┘              └──────────┘ position └───────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use fork_tree::{process, ForkTree, WidthPolicy};
//!
//! let tree = ForkTree::init()?;
//! for _ in 0..3 {
//!     // SAFETY: single-threaded program.
//!     if unsafe { tree.fork()? }.is_child() {
//!         std::process::exit(0);
//!     }
//! }
//! process::reap_children()?;
//! tree.render(WidthPolicy::Dense, &mut std::fs::File::create("tree.svg")?)?;
//! tree.destroy()?;
//! # Ok::<(), fork_tree::ForkTreeError>(())
//! ```

pub mod config;
pub mod error;
pub mod fork_tree;
pub mod layout;
pub mod process;
pub mod renderer;
pub mod shared;
pub mod types;
pub mod utils;

pub use config::{LayoutMetrics, Palette, RenderOptions, StyleFlags};
pub use error::{ForkTreeError, Result};
pub use fork_tree::ForkTree;
pub use layout::{ChildMap, WidthPolicy};
pub use process::Fork;
pub use renderer::Scene;
pub use types::{Edge, Pid, TreeStats};
pub use utils::Rgba;
