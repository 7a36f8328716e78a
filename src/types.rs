//! Core types shared by the store and the layout engine.

/// OS process identifier. The kernel never hands out `0`, which the page
/// store uses as its empty-slot sentinel.
pub type Pid = libc::pid_t;

/// Sentinel stored in unused edge slots.
pub const EMPTY_SLOT: Pid = 0;

/// One recorded fork: `parent` created `child`.
///
/// This is also the in-memory layout of a page slot, so field order matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct Edge {
    pub child: Pid,
    pub parent: Pid,
}

impl Edge {
    pub const EMPTY: Self = Self {
        child: EMPTY_SLOT,
        parent: EMPTY_SLOT,
    };

    /// Create an edge from `parent` to `child`.
    pub const fn new(parent: Pid, child: Pid) -> Self {
        Self { child, parent }
    }

    /// Whether this slot has never been written.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.child == EMPTY_SLOT
    }
}

/// Counters read from the shared metadata block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub root: Pid,
    pub pages: u32,
    pub edges: u32,
}
