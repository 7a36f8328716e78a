//! Error types for fork-tree.

use std::io;

use thiserror::Error;

use crate::types::Pid;

/// Result type alias using ForkTreeError.
pub type Result<T> = std::result::Result<T, ForkTreeError>;

/// Errors that can occur while recording or rendering a fork tree.
#[derive(Debug, Error)]
pub enum ForkTreeError {
    // Shared memory errors
    #[error("Failed to create shared region {name}: {source}")]
    RegionCreate { name: String, source: io::Error },

    #[error("Failed to resize shared region to {len} bytes: {source}")]
    RegionResize { len: usize, source: io::Error },

    #[error("Failed to map shared region of {len} bytes: {source}")]
    Map { len: usize, source: io::Error },

    #[error("Failed to initialize process-shared mutex: {0}")]
    MutexInit(io::Error),

    #[error("Shared mutex {op} failed: {source}")]
    Mutex { op: &'static str, source: io::Error },

    #[error("Fork tree initialization failed: {0}")]
    Init(#[source] Box<ForkTreeError>),

    // Process errors
    #[error("Process control call failed: {0}")]
    Fork(#[from] nix::Error),

    #[error("Child process {child} was created but its edge was not recorded: {source}")]
    Unrecorded {
        child: Pid,
        source: Box<ForkTreeError>,
    },

    #[error("Operation reserved to root process {root} (called from {caller})")]
    NotRoot { root: Pid, caller: Pid },

    // Tree errors
    #[error("Process id 0 cannot be recorded (edge {parent} -> {child})")]
    ZeroPid { parent: Pid, child: Pid },

    #[error("Corrupt tree: process {child} recorded under {first} and {second}")]
    DuplicateChild {
        child: Pid,
        first: Pid,
        second: Pid,
    },

    #[error("Corrupt tree: root process {root} recorded as a child of {parent}")]
    RootIsChild { root: Pid, parent: Pid },

    // Output errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ForkTreeError {
    /// Tag an error raised while setting up a tree.
    pub(crate) fn during_init(self) -> Self {
        match self {
            Self::Init(_) => self,
            other => Self::Init(Box::new(other)),
        }
    }

    /// Whether this error came out of tree initialization.
    ///
    /// Callers must not fork after one of these.
    pub fn is_initialization(&self) -> bool {
        matches!(self, Self::Init(_))
    }

    /// Whether the tree data itself violates the one-parent-per-process invariant.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::DuplicateChild { .. } | Self::RootIsChild { .. })
    }
}
