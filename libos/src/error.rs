use thiserror::Error;

/// Result of a syscall wrapper. The error is the POSIX code itself, captured
/// right after the native call returned.
pub type Result<T> = nix::Result<T>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown preallocation policy {0:?}, expected one of auto, native, preflight")]
    UnknownPolicy(String),

    #[error("environment variable {0} is not valid unicode")]
    NotUnicode(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
