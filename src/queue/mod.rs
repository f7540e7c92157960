//! Queue entries and the per-entry state machine.

use std::path::{Path, PathBuf};

use crate::error::{Result, TransferError, UploadError};

/// Reference to a local file awaiting upload.
///
/// `name` and `size` are what the presentation layer sees; `path` is what
/// the transfer port reads bytes from.
#[derive(Debug, Clone)]
pub struct FileHandle {
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, size: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size,
            path: path.into(),
        }
    }

    /// Build a handle from a filesystem path, taking the size from metadata.
    pub fn from_path(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !meta.is_file() {
            return Err(UploadError::NotAFile(path.to_path_buf()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| UploadError::NotAFile(path.to_path_buf()))?;
        Ok(Self {
            name,
            size: meta.len(),
            path: path.to_path_buf(),
        })
    }
}

/// Opaque handle minted per entry to route presentation updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub(crate) u64);

/// Entry identity. Never reused for the lifetime of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) u64);

/// Where an entry is in its lifecycle.
///
/// Transitions are `Queued -> Uploading -> {Succeeded | Failed}`, nothing
/// else. The terminal states are sticky; only a full [`clear`] discards
/// them.
///
/// [`clear`]: crate::scheduler::Scheduler::clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Queued,
    Uploading,
    Succeeded,
    Failed,
}

/// One file in the queue, together with its tracked state.
#[derive(Debug)]
pub struct QueueEntry {
    pub id: EntryId,
    pub ticket: Ticket,
    pub handle: FileHandle,
    pub state: EntryState,

    /// Percent complete, 0-100. Monotonic while uploading; forced to 100
    /// on success.
    pub progress: u8,

    /// Set exactly when `state == Failed`.
    pub failure: Option<TransferError>,
}

impl QueueEntry {
    pub(crate) fn new(id: EntryId, ticket: Ticket, handle: FileHandle) -> Self {
        Self {
            id,
            ticket,
            handle,
            state: EntryState::Queued,
            progress: 0,
            failure: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, EntryState::Succeeded | EntryState::Failed)
    }
}
