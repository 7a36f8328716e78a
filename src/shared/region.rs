//! Anonymous, fork-inheritable shared memory regions.
//!
//! A region is a `memfd` descriptor. Sizing goes through `ftruncate`, access
//! through `MAP_SHARED` mappings, so every process that inherits the
//! descriptor across `fork(2)` sees the same bytes.

use std::ffi::CString;
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};

use memmap2::{MmapOptions, MmapRaw};
use nix::sys::memfd::{memfd_create, MemFdCreateFlag};
use nix::unistd::ftruncate;

use crate::error::{ForkTreeError, Result};
use crate::types::Pid;

// =============================================================================
// NAMING
// =============================================================================

/// Generates region names for one tree.
///
/// memfd names are debugging labels (`/proc/<pid>/fd/*` shows them as
/// `/memfd:<name>`), they do not need to be globally unique. Combining the
/// creating pid with a counter owned by the namer keeps them distinct within a
/// tree without any process-wide state.
#[derive(Debug)]
pub struct RegionNamer {
    pid: Pid,
    next: u32,
}

impl RegionNamer {
    pub fn new(pid: Pid) -> Self {
        Self { pid, next: 0 }
    }

    /// Produce the next name, tagged with `role`.
    pub fn next_name(&mut self, role: &str) -> String {
        let name = format!("fork_tree.{}.{}.{}", self.pid, self.next, role);
        self.next += 1;
        name
    }
}

// =============================================================================
// REGION
// =============================================================================

/// An owned memfd region.
#[derive(Debug)]
pub struct SharedRegion {
    fd: OwnedFd,
    name: String,
}

impl SharedRegion {
    /// Create an empty region.
    ///
    /// The descriptor is not close-on-exec; it must survive into every forked
    /// descendant. Sealing is allowed.
    pub fn create(name: &str) -> Result<Self> {
        let create_error = |source: io::Error| ForkTreeError::RegionCreate {
            name: name.to_string(),
            source,
        };
        let c_name = CString::new(name)
            .map_err(|e| create_error(io::Error::new(io::ErrorKind::InvalidInput, e)))?;
        let fd = memfd_create(c_name.as_c_str(), MemFdCreateFlag::MFD_ALLOW_SEALING)
            .map_err(|errno| create_error(io::Error::from(errno)))?;

        Ok(Self {
            fd,
            name: name.to_string(),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

/// Set the size of a region.
pub fn resize(fd: BorrowedFd<'_>, len: usize) -> Result<()> {
    ftruncate(fd, len as libc::off_t).map_err(|errno| ForkTreeError::RegionResize {
        len,
        source: io::Error::from(errno),
    })
}

// =============================================================================
// MAPPING
// =============================================================================

/// Access mode for [`Mapping::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// A `MAP_SHARED` view of the first `len` bytes of a region.
///
/// Unmapped on drop. A mapping only lives in the address space that created
/// it (or inherited it through fork); dropping it never affects other
/// processes.
#[derive(Debug)]
pub struct Mapping {
    raw: MmapRaw,
}

impl Mapping {
    pub fn new(fd: BorrowedFd<'_>, len: usize, access: Access) -> Result<Self> {
        if len == 0 {
            return Err(ForkTreeError::Map {
                len,
                source: io::Error::from_raw_os_error(libc::EINVAL),
            });
        }

        let mut options = MmapOptions::new();
        options.len(len);
        let raw = match access {
            Access::ReadOnly => options.map_raw_read_only(fd.as_raw_fd()),
            Access::ReadWrite => options.map_raw(fd.as_raw_fd()),
        }
        .map_err(|source| ForkTreeError::Map { len, source })?;

        Ok(Self { raw })
    }

    /// Base address, page aligned.
    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.raw.as_mut_ptr()
    }
}
