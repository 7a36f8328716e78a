//! Every process forks seven times: 2^7 processes, rendered with the Dense
//! policy. The Centralized policy makes this one very wide.
//!
//! Run with: RUST_LOG=fork_tree=info cargo run --example fan_out [out.svg]

use std::fs::File;
use std::io::BufWriter;

use fork_tree::{process, ForkTree, RenderOptions, WidthPolicy};
use tracing_subscriber::EnvFilter;

const ROUNDS: usize = 7;

fn main() -> fork_tree::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "fan_out.svg".to_string());
    let tree = ForkTree::init()?;

    for _ in 0..ROUNDS {
        // SAFETY: single-threaded program.
        unsafe { tree.fork()? };
    }

    process::reap_children()?;

    if !tree.is_root() {
        return Ok(());
    }

    let mut out = BufWriter::new(File::create(&path)?);
    tree.render_with(WidthPolicy::Dense, &RenderOptions::default(), &mut out)?;
    let stats = tree.stats()?;
    tree.destroy()?;

    println!(
        "{} processes over {} pages written to {path}",
        stats.edges + 1,
        stats.pages
    );
    Ok(())
}
