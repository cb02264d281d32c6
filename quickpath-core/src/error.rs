//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Completion Engine
//!
//! Enumeration failures never reach the consumer: the enumerator converts
//! them into partial results. `AppError` exists for the internal plumbing
//! (directory reads, worker stop reasons) and for the host-facing handle,
//! which reports a stopped control loop. Configuration goes through
//! `anyhow` in `config.rs`.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Convenient alias for results carrying [`AppError`].
pub type AppResult<T> = Result<T, AppError>;

/// Unified error type for all engine operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Permissions error for file/directory access.
    #[error("Permission denied: {0:?}")]
    PermissionDenied(PathBuf),

    /// Requested file or directory does not exist.
    #[error("File or directory not found: {0:?}")]
    NotFound(PathBuf),

    /// Enumeration observed its cancellation token.
    #[error("Operation was cancelled")]
    Cancelled,

    /// The engine control loop has exited; commands can no longer be queued.
    #[error("Completion engine is not running")]
    EngineStopped,
}

impl AppError {
    /// Classify an I/O error raised while touching `path`.
    pub fn from_io<P: Into<PathBuf>>(path: P, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.into()),
            io::ErrorKind::NotFound => Self::NotFound(path.into()),
            _ => Self::Io(err),
        }
    }

    /// True for the expected, non-failure outcome of a superseded query.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_classifies_kinds() {
        let denied = AppError::from_io(
            "/root/secret",
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(denied, AppError::PermissionDenied(_)));

        let missing = AppError::from_io("/gone", io::Error::new(io::ErrorKind::NotFound, "x"));
        assert!(matches!(missing, AppError::NotFound(_)));

        let other = AppError::from_io("/dev/x", io::Error::other("boom"));
        assert!(matches!(other, AppError::Io(_)));
    }

    #[test]
    fn test_cancelled_is_not_a_failure() {
        assert!(AppError::Cancelled.is_cancelled());
        assert!(!AppError::EngineStopped.is_cancelled());
    }
}
