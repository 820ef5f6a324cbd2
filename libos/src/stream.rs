use std::ffi::CString;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::ptr::NonNull;

use nix::NixPath;
use nix::errno::Errno;

use crate::error::Result;

/// A C stdio stream opened by [`fopen`]. Closed with `fclose` on drop.
#[derive(Debug)]
pub struct Stream {
    file: NonNull<libc::FILE>,
}

// SAFETY: stdio streams lock internally, and the pointer is owned uniquely.
unsafe impl Send for Stream {}

/// Open `path` as a stdio stream with an `fopen` mode string such as `"r"`,
/// `"w+"` or `"ab"`. An unrecognized mode is reported by the native call.
pub fn fopen<P: ?Sized + NixPath>(path: &P, mode: &str) -> Result<Stream> {
    let mode = CString::new(mode).map_err(|_| Errno::EINVAL)?;
    let file = path.with_nix_path(|path| unsafe { libc::fopen(path.as_ptr(), mode.as_ptr()) })?;
    NonNull::new(file)
        .map(|file| Stream { file })
        .ok_or_else(Errno::last)
}

impl Stream {
    /// The underlying `FILE*`, for handing to C code. Still owned by `self`.
    pub fn as_ptr(&self) -> *mut libc::FILE {
        self.file.as_ptr()
    }

    fn take_error(&mut self) -> io::Error {
        let err = io::Error::last_os_error();
        unsafe { libc::clearerr(self.file.as_ptr()) };
        err
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let n = unsafe { libc::fread(buf.as_mut_ptr().cast(), 1, buf.len(), self.file.as_ptr()) };
        if n == 0 && unsafe { libc::ferror(self.file.as_ptr()) } != 0 {
            return Err(self.take_error());
        }
        Ok(n)
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let n = unsafe { libc::fwrite(buf.as_ptr().cast(), 1, buf.len(), self.file.as_ptr()) };
        if n == 0 {
            return Err(self.take_error());
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        if unsafe { libc::fflush(self.file.as_ptr()) } != 0 {
            return Err(self.take_error());
        }
        Ok(())
    }
}

impl AsRawFd for Stream {
    fn as_raw_fd(&self) -> RawFd {
        unsafe { libc::fileno(self.file.as_ptr()) }
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        unsafe { libc::fclose(self.file.as_ptr()) };
    }
}
