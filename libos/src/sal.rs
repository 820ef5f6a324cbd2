use std::ffi::{OsStr, OsString};
use std::os::fd::AsFd;

use crate::config::{PreallocPolicy, SalConfig};
use crate::env::getenv_secure_with;
use crate::error::Result;
use crate::platform::{DefaultPlatform, Passthrough, Platform, Preflight};

/// Entry point for the platform-dependent operations when the platform is
/// picked at startup rather than at build time.
#[derive(Debug)]
pub struct Sal {
    platform: Box<dyn Platform>,
}

impl Sal {
    pub fn new<P: Platform + 'static>(platform: P) -> Self {
        tracing::debug!(platform = platform.name(), "selected syscall platform");
        Self {
            platform: Box::new(platform),
        }
    }

    pub fn from_config(config: &SalConfig) -> Self {
        match config.preallocate {
            PreallocPolicy::Auto => Self::new(DefaultPlatform::default()),
            PreallocPolicy::Native => Self::new(Passthrough),
            PreallocPolicy::Preflight => Self::new(Preflight::new()),
        }
    }

    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    pub fn preallocate<Fd: AsFd>(&self, fd: Fd, offset: libc::off_t, len: libc::off_t) -> Result<()> {
        self.platform.preallocate(fd.as_fd(), offset, len)
    }

    pub fn getenv_secure<K: AsRef<OsStr>>(&self, name: K) -> Option<OsString> {
        getenv_secure_with(&self.platform.credentials(), name)
    }
}

impl Default for Sal {
    fn default() -> Self {
        Self::new(DefaultPlatform::default())
    }
}
