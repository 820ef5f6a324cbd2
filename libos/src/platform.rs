//! Per-platform behavior behind one interface.
//!
//! [`Platform::preallocate`] defaults to the native primitive. [`Preflight`]
//! overrides it with the capacity check needed where `posix_fallocate` loops
//! instead of failing fast. [`DefaultPlatform`] is the build-time choice;
//! [`crate::Sal::from_config`] picks one at startup.

use std::fmt::Debug;
use std::os::fd::BorrowedFd;

use crate::env::Credentials;
use crate::error::Result;
use crate::prealloc::{CapacityProbe, StatvfsProbe, native_preallocate};

pub trait Platform: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn preallocate(&self, fd: BorrowedFd<'_>, offset: libc::off_t, len: libc::off_t) -> Result<()> {
        native_preallocate(fd, offset, len)
    }

    /// Identity the privilege-aware environment lookup judges the process by.
    fn credentials(&self) -> Credentials {
        Credentials::current()
    }
}

/// Straight pass-through to the native calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl Platform for Passthrough {
    fn name(&self) -> &'static str {
        "passthrough"
    }
}

/// Checks free space before calling `posix_fallocate` for requests that
/// start at offset 0.
///
/// Requests at a nonzero offset are passed through unchecked: the blocks
/// already present past the offset are unknown, so the real requirement
/// cannot be computed from `st_blocks`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Preflight<Q = StatvfsProbe> {
    probe: Q,
}

impl Preflight {
    pub fn new() -> Self {
        Self {
            probe: StatvfsProbe,
        }
    }
}

impl<Q: CapacityProbe> Preflight<Q> {
    pub fn with_probe(probe: Q) -> Self {
        Self { probe }
    }
}

impl<Q: CapacityProbe + Debug> Platform for Preflight<Q> {
    fn name(&self) -> &'static str {
        "preflight"
    }

    fn preallocate(&self, fd: BorrowedFd<'_>, offset: libc::off_t, len: libc::off_t) -> Result<()> {
        // negative lengths go straight to the native call, which rejects them
        if offset == 0 && len >= 0 {
            self.probe.probe(fd)?.check(len as u64)?;
        }
        native_preallocate(fd, offset, len)
    }
}

#[cfg(target_os = "freebsd")]
pub type DefaultPlatform = Preflight;

#[cfg(not(target_os = "freebsd"))]
pub type DefaultPlatform = Passthrough;
