//! Paged, append-only edge storage over a shared region.
//!
//! # Memory Layout
//!
//! ```text
//! offset 0                 PAGE_SIZE               2 × PAGE_SIZE
//! ┌────────────────────────┬────────────────────────┬───
//! │ Page 0                 │ Page 1                 │ ...
//! │ [Edge; PAGE_CAPACITY]  │ [Edge; PAGE_CAPACITY]  │
//! └────────────────────────┴────────────────────────┴───
//! Edge = { child: pid_t, parent: pid_t }, child == 0 marks an empty slot
//! ```
//!
//! The region is exactly `page_count × PAGE_SIZE` bytes. It grows one page at
//! a time and is never compacted. The page count itself lives in the tree
//! header; callers pass it in and persist the returned count, all while
//! holding the tree mutex.

use std::os::fd::BorrowedFd;

use super::region::{resize, Access, Mapping};
use crate::error::{ForkTreeError, Result};
use crate::types::{Edge, EMPTY_SLOT};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Edge slots per page.
pub const PAGE_CAPACITY: usize = 20;

/// Bytes per page.
pub const PAGE_SIZE: usize = PAGE_CAPACITY * std::mem::size_of::<Edge>();

/// One fixed-capacity page, filled left to right.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct Page {
    pub slots: [Edge; PAGE_CAPACITY],
}

impl Page {
    /// Index of the first unused slot.
    #[inline]
    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(Edge::is_empty)
    }
}

#[inline]
fn byte_len(pages: u32) -> usize {
    pages as usize * PAGE_SIZE
}

// =============================================================================
// APPEND
// =============================================================================

/// Where an appended edge landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Page index of the written slot.
    pub page: u32,
    /// Slot index within that page.
    pub slot: usize,
    /// Page count after the append; the caller stores it back in the header.
    pub page_count: u32,
    /// The last page was full and the store was extended by one page.
    /// Allocating the very first page does not count as growth.
    pub grew: bool,
}

/// Append/snapshot operations over the pages region.
#[derive(Debug, Clone, Copy)]
pub struct PageStore<'a> {
    fd: BorrowedFd<'a>,
}

impl<'a> PageStore<'a> {
    pub fn new(fd: BorrowedFd<'a>) -> Self {
        Self { fd }
    }

    /// Write `edge` into the first empty slot of the last page, extending the
    /// region by one page when there is none.
    ///
    /// Pid 0 marks empty slots and is rejected on either side of the edge.
    /// Errors are returned as-is; nothing is retried. A failed resize leaves
    /// `page_count` untouched, so the header stays consistent.
    pub fn append(&self, page_count: u32, edge: Edge) -> Result<Placement> {
        if edge.child == EMPTY_SLOT || edge.parent == EMPTY_SLOT {
            return Err(ForkTreeError::ZeroPid {
                parent: edge.parent,
                child: edge.child,
            });
        }

        if page_count > 0 {
            let map = Mapping::new(self.fd, byte_len(page_count), Access::ReadWrite)?;
            let last = page_count - 1;
            // SAFETY: the mapping covers `page_count` whole pages and we hold the
            // tree mutex, so no other process writes this page concurrently.
            let page = unsafe { &mut *(map.as_ptr() as *mut Page).add(last as usize) };
            if let Some(slot) = page.first_empty() {
                page.slots[slot] = edge;
                return Ok(Placement {
                    page: last,
                    slot,
                    page_count,
                    grew: false,
                });
            }
        }

        let new_count = page_count + 1;
        resize(self.fd, byte_len(new_count))?;
        let map = Mapping::new(self.fd, byte_len(new_count), Access::ReadWrite)?;
        // SAFETY: as above; the new page was zero-filled by ftruncate.
        let page = unsafe { &mut *(map.as_ptr() as *mut Page).add(page_count as usize) };
        page.slots[0] = edge;

        if page_count > 0 {
            tracing::debug!(pages = new_count, "page store grew");
        }

        Ok(Placement {
            page: page_count,
            slot: 0,
            page_count: new_count,
            grew: page_count > 0,
        })
    }

    /// Map the first `page_count` pages read-only.
    ///
    /// Meant for quiescent stores: concurrent appends are not reflected
    /// consistently.
    pub fn snapshot(&self, page_count: u32) -> Result<Snapshot> {
        let map = if page_count == 0 {
            None
        } else {
            Some(Mapping::new(self.fd, byte_len(page_count), Access::ReadOnly)?)
        };
        Ok(Snapshot { map, page_count })
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Read-only view over every page of the store.
#[derive(Debug)]
pub struct Snapshot {
    map: Option<Mapping>,
    page_count: u32,
}

impl Snapshot {
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// All pages in order.
    pub fn pages(&self) -> &[Page] {
        match &self.map {
            // SAFETY: the mapping spans exactly `page_count` pages and stays
            // alive as long as `self`.
            Some(map) => unsafe {
                std::slice::from_raw_parts(map.as_ptr() as *const Page, self.page_count as usize)
            },
            None => &[],
        }
    }

    /// Non-empty slots in page order, then slot order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.pages()
            .iter()
            .flat_map(|page| page.slots.iter().copied())
            .filter(|edge| !edge.is_empty())
    }
}
