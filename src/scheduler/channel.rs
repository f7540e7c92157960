//! Event channel between in-flight transfers and the scheduler.
//!
//! Every callback a transfer would make is funneled through one mpsc
//! channel with the scheduler as sole consumer, so all state mutation
//! stays on one side and the admission routine can never be re-entered
//! mid-update.

use tokio::sync::mpsc;

use crate::error::TransferError;
use crate::queue::EntryId;

/// An event emitted by an in-flight transfer.
#[derive(Debug)]
pub struct TransferEvent {
    /// Entry the event belongs to.
    pub id: EntryId,

    /// Scheduler epoch the transfer was started under. Events minted
    /// under a cleared epoch are dropped unprocessed.
    pub epoch: u64,

    pub kind: EventKind,
}

#[derive(Debug)]
pub enum EventKind {
    /// Fraction complete in [0, 1].
    Progress(f64),

    /// Terminal outcome. Sent exactly once per transfer, by the task
    /// wrapper around the port call rather than the port itself.
    Done(Result<(), TransferError>),
}

pub type EventSender = mpsc::UnboundedSender<TransferEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<TransferEvent>;

/// Create the transfer event channel. Unbounded so transfer tasks never
/// block on a slow consumer.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Progress reporter handed to a [`TransferPort`] implementation.
///
/// Cheap to clone. Sends are best-effort: a dropped receiver means the
/// scheduler is gone and the report is moot.
///
/// [`TransferPort`]: crate::transfer::TransferPort
#[derive(Debug, Clone)]
pub struct ProgressFeed {
    tx: EventSender,
    id: EntryId,
    epoch: u64,
}

impl ProgressFeed {
    pub(crate) fn new(tx: EventSender, id: EntryId, epoch: u64) -> Self {
        Self { tx, id, epoch }
    }

    /// Report fraction complete in [0, 1].
    pub fn report(&self, fraction: f64) {
        let _ = self.tx.send(TransferEvent {
            id: self.id,
            epoch: self.epoch,
            kind: EventKind::Progress(fraction),
        });
    }

    pub(crate) fn finish(&self, outcome: Result<(), TransferError>) {
        let _ = self.tx.send(TransferEvent {
            id: self.id,
            epoch: self.epoch,
            kind: EventKind::Done(outcome),
        });
    }
}
