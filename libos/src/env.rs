use std::ffi::{OsStr, OsString};

use nix::unistd::{Gid, Uid, getegid, geteuid, getgid, getuid};

/// The process identity as far as privilege boundaries are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    pub real_uid: Uid,
    pub effective_uid: Uid,
    pub real_gid: Gid,
    pub effective_gid: Gid,
    /// The kernel flagged this exec as crossing a privilege boundary
    /// (`AT_SECURE` on Linux, `issetugid` on the BSDs and macOS).
    pub secure_exec: bool,
}

impl Credentials {
    pub fn current() -> Self {
        Self {
            real_uid: getuid(),
            effective_uid: geteuid(),
            real_gid: getgid(),
            effective_gid: getegid(),
            secure_exec: secure_exec(),
        }
    }

    /// Credentials of an unprivileged process running as `uid`/`gid`.
    pub fn unprivileged(uid: Uid, gid: Gid) -> Self {
        Self {
            real_uid: uid,
            effective_uid: uid,
            real_gid: gid,
            effective_gid: gid,
            secure_exec: false,
        }
    }

    pub fn is_elevated(&self) -> bool {
        self.secure_exec
            || self.real_uid != self.effective_uid
            || self.real_gid != self.effective_gid
    }
}

#[cfg(target_os = "linux")]
fn secure_exec() -> bool {
    unsafe { libc::getauxval(libc::AT_SECURE) != 0 }
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "openbsd",
    target_os = "netbsd"
))]
fn secure_exec() -> bool {
    unsafe { libc::issetugid() != 0 }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "openbsd",
    target_os = "netbsd"
)))]
fn secure_exec() -> bool {
    false
}

/// Environment lookup that returns nothing for an elevated process, so
/// configuration inherited from the invoking user never reaches privileged
/// code.
pub fn getenv_secure_with<K: AsRef<OsStr>>(credentials: &Credentials, name: K) -> Option<OsString> {
    if credentials.is_elevated() {
        return None;
    }
    std::env::var_os(name)
}
