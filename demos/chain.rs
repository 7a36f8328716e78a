//! Staircase of nested forks, rendered with the Centralized policy.
//!
//! Each parent at step `i` forks up to `4 - i` more children until one of
//! them is itself a parent, producing a lopsided tree.
//!
//! Run with: RUST_LOG=fork_tree=debug cargo run --example chain [out.svg]

use std::fs::File;
use std::io::BufWriter;

use fork_tree::{process, ForkTree, WidthPolicy};
use tracing_subscriber::EnvFilter;

const STEPS: usize = 4;

fn main() -> fork_tree::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "chain.svg".to_string());
    let tree = ForkTree::init()?;

    for i in 0..STEPS {
        // SAFETY: single-threaded program.
        if unsafe { tree.fork()? }.is_parent() {
            for _ in i..STEPS {
                if unsafe { tree.fork()? }.is_parent() {
                    break;
                }
            }
            break;
        }
    }

    process::reap_children()?;

    if !tree.is_root() {
        return Ok(());
    }

    let mut out = BufWriter::new(File::create(&path)?);
    tree.render(WidthPolicy::Centralized, &mut out)?;
    let stats = tree.stats()?;
    tree.destroy()?;

    println!("{} processes written to {path}", stats.edges + 1);
    Ok(())
}
