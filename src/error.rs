//! Error types for upq.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a transfer ended in failure.
///
/// The taxonomy is deliberately binary: either the endpoint answered and
/// said no, or the transport never produced an answer at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The endpoint received the upload but rejected it with a
    /// non-success status.
    #[error("rejected with status {status}")]
    Rejected { status: u16 },

    /// The transfer could not complete (DNS, connect, reset, local read).
    #[error("network error: {reason}")]
    Network { reason: String },
}

/// Crate-level error type.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Invalid configuration (endpoint URL, config file contents).
    #[error("config error: {0}")]
    Config(String),

    /// A queued path could not be read.
    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A path that exists but is not uploadable.
    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

pub type Result<T> = std::result::Result<T, UploadError>;
