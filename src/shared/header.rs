//! The tree metadata block.
//!
//! One `TreeHeader` sits at offset 0 of the metadata region and is mapped by
//! every process in the family. `root` is written once before the first fork
//! and is read-only afterwards; the counters change only under `mutex`.

use std::ptr::{self, addr_of, addr_of_mut};

use crate::types::Pid;

/// Metadata layout, shared across processes.
#[repr(C)]
pub struct TreeHeader {
    pub mutex: libc::pthread_mutex_t,
    root: Pid,
    page_count: u32,
    edge_count: u32,
}

/// Bytes to reserve for the metadata region.
pub const HEADER_SIZE: usize = std::mem::size_of::<TreeHeader>();

/// Accessors over a mapped header.
///
/// Reads and writes go through raw pointers so that no long-lived `&mut`
/// aliases memory other processes modify.
#[derive(Debug, Clone, Copy)]
pub struct HeaderView {
    ptr: *mut TreeHeader,
}

impl HeaderView {
    /// # Safety
    /// `ptr` must point to a mapped, aligned `TreeHeader` that outlives the view.
    pub unsafe fn from_ptr(ptr: *mut TreeHeader) -> Self {
        Self { ptr }
    }

    /// Zero the counters and set the root. Only valid before any fork.
    pub fn initialize(&self, root: Pid) {
        unsafe {
            ptr::write(addr_of_mut!((*self.ptr).root), root);
            ptr::write(addr_of_mut!((*self.ptr).page_count), 0);
            ptr::write(addr_of_mut!((*self.ptr).edge_count), 0);
        }
    }

    #[inline]
    pub fn mutex_ptr(&self) -> *mut libc::pthread_mutex_t {
        unsafe { addr_of_mut!((*self.ptr).mutex) }
    }

    #[inline]
    pub fn root(&self) -> Pid {
        unsafe { ptr::read(addr_of!((*self.ptr).root)) }
    }

    /// Caller must hold the tree mutex.
    #[inline]
    pub fn page_count(&self) -> u32 {
        unsafe { ptr::read_volatile(addr_of!((*self.ptr).page_count)) }
    }

    /// Caller must hold the tree mutex.
    #[inline]
    pub fn set_page_count(&self, value: u32) {
        unsafe { ptr::write_volatile(addr_of_mut!((*self.ptr).page_count), value) }
    }

    /// Caller must hold the tree mutex.
    #[inline]
    pub fn edge_count(&self) -> u32 {
        unsafe { ptr::read_volatile(addr_of!((*self.ptr).edge_count)) }
    }

    /// Caller must hold the tree mutex.
    #[inline]
    pub fn increment_edge_count(&self) {
        let next = self.edge_count() + 1;
        unsafe { ptr::write_volatile(addr_of_mut!((*self.ptr).edge_count), next) }
    }
}
