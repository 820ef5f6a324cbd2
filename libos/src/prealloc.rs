//! Space preallocation and the capacity check that guards it.
//!
//! FreeBSD implements `posix_fallocate` as a loop that allocates and zeroes
//! one block at a time. A request larger than the free space runs inside an
//! uninterruptible syscall until the filesystem is full, which can take hours
//! before `ENOSPC` finally comes back. [`FsCapacity::check`] makes the same
//! decision up front from `fstatvfs` and `fstat`.

use std::os::fd::{AsRawFd, BorrowedFd};

use nix::errno::Errno;

use crate::error::Result;

/// `st_blocks` is always counted in 512 byte units.
const STAT_BLOCK_SIZE: u64 = 512;

/// Free space on a filesystem and the share of it a file already holds.
/// All block counts are in units of `block_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsCapacity {
    pub block_size: u64,
    pub blocks_available: u64,
    pub blocks_allocated: u64,
}

impl FsCapacity {
    /// Query the filesystem holding `fd`. Nothing is cached: free space
    /// changes under us between calls.
    pub fn probe(fd: BorrowedFd<'_>) -> Result<Self> {
        let vfs = nix::sys::statvfs::fstatvfs(fd)?;
        let st = nix::sys::stat::fstat(fd.as_raw_fd())?;

        // f_bavail is counted in fragments; fall back to f_bsize on
        // filesystems that leave f_frsize unset
        let block_size = match vfs.fragment_size() as u64 {
            0 => vfs.block_size() as u64,
            frsize => frsize,
        };
        Ok(Self::from_stat_blocks(
            block_size,
            vfs.blocks_available() as u64,
            st.st_blocks as u64,
        ))
    }

    /// Build a capacity from a filesystem block size, its free block count
    /// and a file's `st_blocks`.
    pub fn from_stat_blocks(block_size: u64, blocks_available: u64, st_blocks: u64) -> Self {
        let blocks_allocated = match block_size {
            0 => 0,
            bs => st_blocks.saturating_mul(STAT_BLOCK_SIZE) / bs,
        };
        Self {
            block_size,
            blocks_available,
            blocks_allocated,
        }
    }

    /// Blocks still missing for the file to hold `len` bytes from offset 0.
    pub fn required_blocks(&self, len: u64) -> u64 {
        if self.block_size == 0 {
            return 0;
        }
        len.div_ceil(self.block_size)
            .saturating_sub(self.blocks_allocated)
    }

    /// Fail with `ENOSPC` when `len` bytes from offset 0 cannot fit.
    pub fn check(&self, len: u64) -> Result<()> {
        let required = self.required_blocks(len);
        if required > self.blocks_available {
            tracing::trace!(
                len,
                required,
                available = self.blocks_available,
                block_size = self.block_size,
                "preallocation exceeds free space"
            );
            return Err(Errno::ENOSPC);
        }
        Ok(())
    }
}

/// Source of [`FsCapacity`] for the pre-flight check.
pub trait CapacityProbe: Send + Sync {
    fn probe(&self, fd: BorrowedFd<'_>) -> Result<FsCapacity>;
}

/// Reads capacity from `fstatvfs` and `fstat` on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatvfsProbe;

impl CapacityProbe for StatvfsProbe {
    fn probe(&self, fd: BorrowedFd<'_>) -> Result<FsCapacity> {
        FsCapacity::probe(fd)
    }
}

/// The platform's own `posix_fallocate`, with the error code taken from its
/// return value.
#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
pub fn native_preallocate(fd: BorrowedFd<'_>, offset: libc::off_t, len: libc::off_t) -> Result<()> {
    nix::fcntl::posix_fallocate(fd.as_raw_fd(), offset, len)
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
pub fn native_preallocate(fd: BorrowedFd<'_>, offset: libc::off_t, len: libc::off_t) -> Result<()> {
    let _ = (fd, offset, len);
    Err(Errno::EOPNOTSUPP)
}
