//! Process helpers: fork outcome, pid lookup, reaping.

use nix::errno::Errno;
use nix::sys::wait::wait;
use nix::unistd::{self, ForkResult};

use crate::error::Result;
use crate::types::Pid;

/// Which side of a fork the caller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fork {
    /// The calling process; `child` is the new process's pid.
    Parent { child: Pid },
    /// The new process.
    Child,
}

impl Fork {
    #[inline]
    pub fn is_child(&self) -> bool {
        matches!(self, Self::Child)
    }

    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_child()
    }

    /// The new process's pid, on the parent side.
    #[inline]
    pub fn child(&self) -> Option<Pid> {
        match self {
            Self::Parent { child } => Some(*child),
            Self::Child => None,
        }
    }
}

/// Pid of the calling process.
#[inline]
pub fn current_pid() -> Pid {
    unistd::getpid().as_raw()
}

/// Plain `fork(2)`, nothing recorded.
///
/// # Safety
/// In a multithreaded process the child may only call async-signal-safe
/// functions until it execs or exits. See [`nix::unistd::fork`].
pub unsafe fn fork() -> Result<Fork> {
    let outcome = match unsafe { unistd::fork() }? {
        ForkResult::Parent { child } => Fork::Parent {
            child: child.as_raw(),
        },
        ForkResult::Child => Fork::Child,
    };
    Ok(outcome)
}

/// Wait for every direct child of the calling process.
///
/// Returns how many were reaped. Children that are already gone count too;
/// the loop ends when the kernel reports there is nothing left to wait for.
pub fn reap_children() -> Result<usize> {
    let mut reaped = 0;
    loop {
        match wait() {
            Ok(status) => {
                tracing::debug!(?status, "child reaped");
                reaped += 1;
            }
            Err(Errno::ECHILD) => return Ok(reaped),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fork_accessors() {
        let parent = Fork::Parent { child: 42 };
        assert!(parent.is_parent());
        assert_eq!(parent.child(), Some(42));

        assert!(Fork::Child.is_child());
        assert_eq!(Fork::Child.child(), None);
    }

    #[test]
    fn test_current_pid_matches_std() {
        assert_eq!(current_pid() as u32, std::process::id());
    }

    #[test]
    fn test_reap_without_children() {
        assert_eq!(reap_children().unwrap(), 0);
    }
}
