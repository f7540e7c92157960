//! upq - client-side bounded-concurrency upload queue.
//!
//! Files enter a FIFO queue; at most `max_concurrent` are in flight at a
//! time; every finished transfer pulls the next queued file in. The
//! scheduler is transport- and presentation-agnostic: bytes move through
//! a [`TransferPort`], state changes go out through a
//! [`PresentationSink`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use upq::queue::FileHandle;
//! use upq::scheduler::{Scheduler, SchedulerConfig};
//! use upq::sink::NullSink;
//! use upq::transfer::HttpPort;
//!
//! # async fn demo() -> upq::Result<()> {
//! let port = Arc::new(HttpPort::new("http://127.0.0.1:8000/upload")?);
//! let mut scheduler = Scheduler::new(SchedulerConfig::default(), port, Box::new(NullSink));
//!
//! scheduler.enqueue([FileHandle::from_path("notes.txt".as_ref())?]);
//! scheduler.admit_more();
//! scheduler.run_until_idle().await;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod queue;
pub mod scheduler;
pub mod sink;
pub mod transfer;

pub use error::{Result, TransferError, UploadError};
pub use queue::{EntryState, FileHandle, QueueEntry, Ticket};
pub use scheduler::{Scheduler, SchedulerConfig, DEFAULT_MAX_CONCURRENT};
pub use sink::{NullSink, PresentationSink, StatusStyle};
pub use transfer::{HttpPort, TransferPort};
