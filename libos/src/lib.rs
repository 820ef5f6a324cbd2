//! A thin abstraction layer over the POSIX calls a storage engine needs.
//!
//! Every operation is a synchronous pass-through to the native call and
//! returns the native [`Errno`](nix::errno::Errno) unchanged. The one
//! exception is [`preallocate`] on platforms whose `posix_fallocate`
//! zero-fills block by block: there a capacity check turns an unbounded
//! allocation loop into an immediate `ENOSPC`. See [`platform`].

pub mod clock;
pub mod config;
pub mod env;
pub mod error;
pub mod fs;
pub mod lock;
pub mod platform;
pub mod prealloc;
mod sal;
mod stream;

use std::ffi::{OsStr, OsString};
use std::os::fd::AsFd;

pub use clock::{ClockId, TimeSpec, clock_read};
pub use config::{PreallocPolicy, SalConfig};
pub use error::{ConfigError, Result};
pub use fs::{OpenRequest, access, fstat, mkstemp, open, stat, unlink};
pub use lock::{LockOp, flock};
pub use platform::{DefaultPlatform, Passthrough, Platform, Preflight};
pub use sal::Sal;
pub use stream::{Stream, fopen};

/// Reserve `len` bytes of storage for `fd` starting at `offset`, using the
/// platform selected at build time.
pub fn preallocate<Fd: AsFd>(fd: Fd, offset: libc::off_t, len: libc::off_t) -> Result<()> {
    DefaultPlatform::default().preallocate(fd.as_fd(), offset, len)
}

/// Look up `name` in the environment unless the process runs with changed
/// privileges.
pub fn getenv_secure<K: AsRef<OsStr>>(name: K) -> Option<OsString> {
    env::getenv_secure_with(&env::Credentials::current(), name)
}
