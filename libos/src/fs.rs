//! File lifecycle pass-throughs: open, stat, unlink, access, mkstemp.

use std::os::fd::{AsFd, AsRawFd, FromRawFd, OwnedFd};
use std::path::PathBuf;

use nix::NixPath;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::stat::{FileStat, Mode};
use nix::unistd::AccessFlags;

use crate::error::Result;

/// How a file is opened. Requests that create an entry carry the permission
/// mode; requests that do not create have nowhere to put one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenRequest {
    /// Open an existing entry. `flags` must not ask for creation.
    Plain { flags: OFlag },
    /// Open with `O_CREAT`; `mode` is applied (minus the umask) if the file
    /// did not exist.
    Create { flags: OFlag, mode: Mode },
    /// Open an unnamed temporary file inside the directory given as path.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    Tmpfile { flags: OFlag, mode: Mode },
}

impl OpenRequest {
    pub fn plain(flags: OFlag) -> Self {
        Self::Plain { flags }
    }

    pub fn create(flags: OFlag, mode: Mode) -> Self {
        Self::Create {
            flags: flags | OFlag::O_CREAT,
            mode,
        }
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub fn tmpfile(flags: OFlag, mode: Mode) -> Self {
        Self::Tmpfile {
            flags: flags | OFlag::O_TMPFILE,
            mode,
        }
    }

    /// Build a request from a raw flag set and an optional mode, the way the
    /// native `open` is called.
    ///
    /// When `flags` asks for creation the mode is required and is narrowed
    /// to `mode_t`; a missing mode fails with `EINVAL` before any syscall.
    /// Without a creation flag the mode is never looked at.
    pub fn from_flags(flags: OFlag, mode: Option<u32>) -> Result<Self> {
        if !requires_mode(flags) {
            return Ok(Self::Plain { flags });
        }
        let mode = narrow_mode(mode.ok_or(Errno::EINVAL)?);

        #[cfg(any(target_os = "linux", target_os = "android"))]
        {
            if flags.contains(OFlag::O_TMPFILE) {
                return Ok(Self::Tmpfile { flags, mode });
            }
        }

        Ok(Self::Create { flags, mode })
    }

    pub fn flags(&self) -> OFlag {
        match *self {
            Self::Plain { flags } | Self::Create { flags, .. } => flags,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            Self::Tmpfile { flags, .. } => flags,
        }
    }

    /// The permission mode the native call receives, if the request has one.
    pub fn mode(&self) -> Option<Mode> {
        match *self {
            Self::Plain { .. } => None,
            Self::Create { mode, .. } => Some(mode),
            #[cfg(any(target_os = "linux", target_os = "android"))]
            Self::Tmpfile { mode, .. } => Some(mode),
        }
    }

    fn native_args(&self) -> Result<(OFlag, Mode)> {
        let flags = self.flags();
        match self.mode() {
            Some(mode) => Ok((flags, mode)),
            // a plain request asking for creation would otherwise create
            // the file with whatever mode happened to be passed
            None if requires_mode(flags) => Err(Errno::EINVAL),
            None => Ok((flags, Mode::empty())),
        }
    }
}

fn requires_mode(flags: OFlag) -> bool {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        if flags.contains(OFlag::O_TMPFILE) {
            return true;
        }
    }
    flags.contains(OFlag::O_CREAT)
}

#[allow(clippy::unnecessary_cast)]
fn narrow_mode(mode: u32) -> Mode {
    Mode::from_bits_truncate(mode as libc::mode_t)
}

/// Open `path`. The returned descriptor belongs to the caller.
pub fn open<P: ?Sized + NixPath>(path: &P, request: OpenRequest) -> Result<OwnedFd> {
    let (flags, mode) = request.native_args()?;
    let fd = nix::fcntl::open(path, flags, mode)?;
    // SAFETY: open just returned this descriptor and nothing else holds it.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

pub fn stat<P: ?Sized + NixPath>(path: &P) -> Result<FileStat> {
    nix::sys::stat::stat(path)
}

pub fn fstat<Fd: AsFd>(fd: Fd) -> Result<FileStat> {
    nix::sys::stat::fstat(fd.as_fd().as_raw_fd())
}

pub fn unlink<P: ?Sized + NixPath>(path: &P) -> Result<()> {
    nix::unistd::unlink(path)
}

pub fn access<P: ?Sized + NixPath>(path: &P, mode: AccessFlags) -> Result<()> {
    nix::unistd::access(path, mode)
}

/// Create and open a unique file from `template`, which must end in
/// `XXXXXX`. On success the template is replaced by the generated name.
pub fn mkstemp(template: &mut PathBuf) -> Result<OwnedFd> {
    let (fd, path) = nix::unistd::mkstemp(template.as_path())?;
    *template = path;
    // SAFETY: mkstemp just returned this descriptor and nothing else holds it.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}
