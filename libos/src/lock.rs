use std::os::fd::{AsFd, AsRawFd};

use bitflags::bitflags;
use nix::errno::Errno;

use crate::error::Result;

bitflags! {
    /// Advisory lock operation. Values match the BSD `flock` encoding but
    /// are translated explicitly, so the native constants may differ.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LockOp: u32 {
        const SHARED = 1;
        const EXCLUSIVE = 2;
        const NONBLOCK = 4;
        const UNLOCK = 8;
    }
}

const NATIVE_LOCK_FLAGS: [(LockOp, libc::c_int); 4] = [
    (LockOp::EXCLUSIVE, libc::LOCK_EX),
    (LockOp::SHARED, libc::LOCK_SH),
    (LockOp::UNLOCK, libc::LOCK_UN),
    (LockOp::NONBLOCK, libc::LOCK_NB),
];

impl LockOp {
    /// Native `flock` operation. Bits outside the four known flags are
    /// dropped, not rejected.
    pub fn to_native(self) -> libc::c_int {
        NATIVE_LOCK_FLAGS
            .iter()
            .filter(|(op, _)| self.contains(*op))
            .fold(0, |acc, (_, native)| acc | native)
    }
}

/// Apply or remove an advisory lock on `fd`.
pub fn flock<Fd: AsFd>(fd: Fd, op: LockOp) -> Result<()> {
    let res = unsafe { libc::flock(fd.as_fd().as_raw_fd(), op.to_native()) };
    Errno::result(res).map(drop)
}
