// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Thin process-control layer: fork, reap, identity.
//!
//! The only unsafe code in the workspace lives here.

#![allow(unsafe_code)]

use core::fmt;
use std::io;

/// Kernel process id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct Pid(libc::pid_t);

impl Pid {
    /// Raw pid value.
    pub fn raw(self) -> libc::pid_t {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of a successful fork the caller is on.
#[derive(Debug)]
pub enum Fork {
    /// Running in the new process.
    Child,
    /// Running in the forking process; carries the child's pid.
    Parent(Pid),
}

/// Duplicates the calling process.
///
/// Callers must be single-threaded: only the forking thread survives in the child.
pub fn fork() -> io::Result<Fork> {
    // SAFETY: fork(2) has no memory-safety preconditions; the supervisor never starts
    // extra threads, so the child inherits a consistent address space.
    let pid = unsafe { libc::fork() };
    match pid {
        -1 => Err(io::Error::last_os_error()),
        0 => Ok(Fork::Child),
        pid => Ok(Fork::Parent(Pid(pid))),
    }
}

/// How a reaped child ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitStatus {
    /// Normal exit with the given code.
    Exited(i32),
    /// Killed by the given signal.
    Signaled(i32),
    /// Any other status word.
    Other(i32),
}

impl WaitStatus {
    fn from_raw(status: libc::c_int) -> Self {
        if libc::WIFEXITED(status) {
            Self::Exited(libc::WEXITSTATUS(status))
        } else if libc::WIFSIGNALED(status) {
            Self::Signaled(libc::WTERMSIG(status))
        } else {
            Self::Other(status)
        }
    }

    /// Returns `true` for a zero exit code.
    pub fn success(self) -> bool {
        self == Self::Exited(0)
    }
}

/// Blocks until `pid` terminates and reaps it.
pub fn wait(pid: Pid) -> io::Result<WaitStatus> {
    let mut status: libc::c_int = 0;
    loop {
        // SAFETY: `status` is a valid, writable c_int for the duration of the call.
        let rc = unsafe { libc::waitpid(pid.0, &mut status, 0) };
        if rc == pid.0 {
            return Ok(WaitStatus::from_raw(status));
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

/// Pid and parent pid of the calling process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessIds {
    /// Own pid.
    pub pid: u32,
    /// Parent pid.
    pub parent: u32,
}

impl ProcessIds {
    /// Reads the ids of the calling process.
    pub fn current() -> Self {
        Self { pid: std::process::id(), parent: std::os::unix::process::parent_id() }
    }
}

/// Ends a participant process.
///
/// Buffered stdout is flushed by `exit`; descriptors close with the process.
pub fn exit_child(code: i32) -> ! {
    std::process::exit(code)
}
