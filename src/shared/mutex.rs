//! Process-shared pthread mutex living inside a shared mapping.
//!
//! Unlike `std::sync::Mutex`, the lock word is not owned by the Rust value:
//! it sits in memory that every forked descendant maps, and any of them may
//! lock it. `SharedMutex` is only a typed pointer to it.

use std::io;
use std::mem::MaybeUninit;

use crate::error::{ForkTreeError, Result};

/// Typed pointer to a `pthread_mutex_t` initialized with
/// `PTHREAD_PROCESS_SHARED`.
#[derive(Debug)]
pub struct SharedMutex {
    raw: *mut libc::pthread_mutex_t,
}

// SAFETY: the mutex is designed for concurrent use from separate address
// spaces; sharing the pointer between threads of one process is no weaker.
unsafe impl Send for SharedMutex {}
unsafe impl Sync for SharedMutex {}

#[inline]
fn check(ret: libc::c_int) -> io::Result<()> {
    // pthread_* return the error code instead of setting errno.
    if ret == 0 {
        Ok(())
    } else {
        Err(io::Error::from_raw_os_error(ret))
    }
}

impl SharedMutex {
    /// Initialize a new process-shared mutex in place.
    ///
    /// # Safety
    /// - `raw` must be aligned, writable, inside a `MAP_SHARED` mapping
    /// - the memory must outlive every use of the returned value
    /// - no other process may be using the memory yet
    pub unsafe fn init(raw: *mut libc::pthread_mutex_t) -> Result<Self> {
        let mut attr = MaybeUninit::<libc::pthread_mutexattr_t>::uninit();

        unsafe {
            check(libc::pthread_mutexattr_init(attr.as_mut_ptr()))
                .map_err(ForkTreeError::MutexInit)?;

            let result = check(libc::pthread_mutexattr_setpshared(
                attr.as_mut_ptr(),
                libc::PTHREAD_PROCESS_SHARED,
            ))
            .and_then(|()| check(libc::pthread_mutex_init(raw, attr.as_ptr())));

            libc::pthread_mutexattr_destroy(attr.as_mut_ptr());
            result.map_err(ForkTreeError::MutexInit)?;
        }

        Ok(Self { raw })
    }

    /// Wrap an already initialized mutex.
    ///
    /// # Safety
    /// `raw` must have been initialized by [`SharedMutex::init`] and not yet
    /// destroyed.
    pub unsafe fn from_raw(raw: *mut libc::pthread_mutex_t) -> Self {
        Self { raw }
    }

    /// Block until the mutex is held by this process.
    ///
    /// There is no timeout: a holder that dies inside the critical section
    /// wedges every other participant.
    pub fn lock(&self) -> Result<SharedMutexGuard<'_>> {
        check(unsafe { libc::pthread_mutex_lock(self.raw) })
            .map_err(|source| ForkTreeError::Mutex {
                op: "lock",
                source,
            })?;
        Ok(SharedMutexGuard { mutex: self })
    }

    /// Destroy the mutex. It must be unlocked and no process may touch it
    /// afterwards.
    ///
    /// # Safety
    /// All other processes sharing the mutex must have exited.
    pub unsafe fn destroy(&self) -> Result<()> {
        check(unsafe { libc::pthread_mutex_destroy(self.raw) })
            .map_err(|source| ForkTreeError::Mutex {
                op: "destroy",
                source,
            })
    }
}

/// Held lock; unlocks on drop, whatever path the critical section took.
#[derive(Debug)]
pub struct SharedMutexGuard<'a> {
    mutex: &'a SharedMutex,
}

impl Drop for SharedMutexGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = check(unsafe { libc::pthread_mutex_unlock(self.mutex.raw) }) {
            tracing::warn!(error = %e, "shared mutex unlock failed");
        }
    }
}
