//! Transfer ports - the byte-moving boundary the scheduler drives.

pub mod http;

pub use http::HttpPort;

use async_trait::async_trait;

use crate::error::TransferError;
use crate::queue::FileHandle;
use crate::scheduler::channel::ProgressFeed;

/// Moves one file to the remote endpoint.
///
/// Implementations report fraction-complete through `progress` zero or
/// more times (values in [0, 1]) and resolve to exactly one terminal
/// outcome. The scheduler runs each call on its own task; up to the
/// concurrency cap run at once, so implementations must be shareable
/// across tasks.
#[async_trait]
pub trait TransferPort: Send + Sync {
    async fn transfer(
        &self,
        handle: FileHandle,
        progress: ProgressFeed,
    ) -> Result<(), TransferError>;
}
