//! Upload scheduler.
//!
//! Owns the FIFO queue of entries, enforces the concurrency cap, and
//! reacts to transfer events. All state lives behind `&mut self`;
//! in-flight transfers only talk back through the event channel, so no
//! callback can re-enter a scheduler method mid-mutation.

pub mod channel;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::TransferError;
use crate::queue::{EntryId, EntryState, FileHandle, QueueEntry, Ticket};
use crate::sink::{PresentationSink, StatusStyle};
use crate::transfer::TransferPort;
use channel::{event_channel, EventKind, EventReceiver, EventSender, ProgressFeed, TransferEvent};

/// Default number of simultaneous uploads.
pub const DEFAULT_MAX_CONCURRENT: usize = 3;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum number of entries in flight at once.
    pub max_concurrent: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

/// Drives queued files through a [`TransferPort`], at most
/// `max_concurrent` at a time, reporting every state change to a
/// [`PresentationSink`].
///
/// Entries are admitted strictly in enqueue order. A terminal outcome
/// (success or failure) frees a slot and immediately refills it from the
/// queue. Completed entries stay in the queue until [`clear`] discards
/// everything.
///
/// [`clear`]: Scheduler::clear
pub struct Scheduler {
    entries: Vec<QueueEntry>,
    active: usize,
    cap: usize,

    /// Bumped on clear. Transfers started before the bump keep sending
    /// events tagged with the old value; those are dropped on receipt.
    epoch: u64,
    next_id: u64,

    port: Arc<dyn TransferPort>,
    sink: Box<dyn PresentationSink>,
    events_tx: EventSender,
    events_rx: EventReceiver,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        port: Arc<dyn TransferPort>,
        sink: Box<dyn PresentationSink>,
    ) -> Self {
        let (events_tx, events_rx) = event_channel();
        Self {
            entries: Vec::new(),
            active: 0,
            cap: config.max_concurrent.max(1),
            epoch: 0,
            next_id: 0,
            port,
            sink,
            events_tx,
            events_rx,
        }
    }

    /// Append handles to the tail of the queue, in order.
    ///
    /// Never starts a transfer; that takes an explicit [`admit_more`] or
    /// a terminal event freeing a slot. An empty iterator is a no-op.
    ///
    /// [`admit_more`]: Scheduler::admit_more
    pub fn enqueue(&mut self, handles: impl IntoIterator<Item = FileHandle>) {
        let before = self.entries.len();
        for handle in handles {
            let id = EntryId(self.next_id);
            let ticket = Ticket(self.next_id);
            self.next_id += 1;
            self.sink.entry_added(ticket, &handle.name, handle.size);
            self.entries.push(QueueEntry::new(id, ticket, handle));
        }
        if self.entries.len() != before {
            debug!(added = self.entries.len() - before, total = self.entries.len(), "enqueued files");
            self.sink.queue_count(self.entries.len());
        }
    }

    /// Fill free slots with the oldest queued entries.
    ///
    /// Idempotent: with no terminal events in between, a second call
    /// finds the cap already saturated (or the queue drained) and does
    /// nothing.
    pub fn admit_more(&mut self) {
        while self.active < self.cap {
            let Some(idx) = self
                .entries
                .iter()
                .position(|e| e.state == EntryState::Queued)
            else {
                return;
            };
            self.admit(idx);
        }
    }

    fn admit(&mut self, idx: usize) {
        let entry = &mut self.entries[idx];
        entry.state = EntryState::Uploading;
        let id = entry.id;
        let ticket = entry.ticket;
        let handle = entry.handle.clone();

        self.active += 1;
        debug!(name = %handle.name, active = self.active, "admitting upload");
        self.sink.status(ticket, "Uploading...", StatusStyle::Busy);

        let port = Arc::clone(&self.port);
        let feed = ProgressFeed::new(self.events_tx.clone(), id, self.epoch);
        tokio::spawn(async move {
            let outcome = port.transfer(handle, feed.clone()).await;
            feed.finish(outcome);
        });
    }

    /// Apply one transfer event.
    ///
    /// Stale events -- an older epoch, an entry id that no longer
    /// resolves, or an entry already settled -- are dropped without
    /// touching any state.
    pub fn handle_event(&mut self, event: TransferEvent) {
        if event.epoch != self.epoch {
            trace!(?event, "dropping event from cleared queue");
            return;
        }
        let Some(idx) = self.entries.iter().position(|e| e.id == event.id) else {
            trace!(?event, "dropping event for unknown entry");
            return;
        };
        if self.entries[idx].state != EntryState::Uploading {
            trace!(?event, "dropping event for settled entry");
            return;
        }
        match event.kind {
            EventKind::Progress(fraction) => self.apply_progress(idx, fraction),
            EventKind::Done(Ok(())) => self.finish_ok(idx),
            EventKind::Done(Err(err)) => self.finish_err(idx, err),
        }
    }

    /// Drain and apply every event already sitting in the channel.
    pub fn pump(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Drive the event loop until nothing is in flight.
    ///
    /// Terminal events refill the cap from the queue as they arrive, so
    /// this returns once every entry admitted so far (and everything
    /// behind it in the queue) has settled.
    pub async fn run_until_idle(&mut self) {
        while self.active > 0 {
            let Some(event) = self.events_rx.recv().await else {
                break;
            };
            self.handle_event(event);
        }
    }

    /// Drop every entry, regardless of state.
    ///
    /// Outstanding transport work is not cancelled; its late events carry
    /// the old epoch and fall on the floor.
    pub fn clear(&mut self) {
        debug!(dropped = self.entries.len(), "clearing queue");
        self.entries.clear();
        self.active = 0;
        self.epoch += 1;
        self.sink.cleared();
        self.sink.queue_count(0);
    }

    fn apply_progress(&mut self, idx: usize, fraction: f64) {
        let entry = &mut self.entries[idx];
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u8;
        // Out-of-order reports only ever move the bar forward.
        if percent > entry.progress {
            entry.progress = percent;
            trace!(name = %entry.handle.name, percent, "upload progress");
            self.sink.progress(entry.ticket, percent);
        }
    }

    fn finish_ok(&mut self, idx: usize) {
        let entry = &mut self.entries[idx];
        entry.state = EntryState::Succeeded;
        entry.progress = 100;
        let ticket = entry.ticket;
        debug!(name = %entry.handle.name, "upload succeeded");

        self.active -= 1;
        self.sink.progress(ticket, 100);
        self.sink.status(ticket, "Uploaded", StatusStyle::Ok);
        self.sink.queue_count(self.entries.len());
        self.admit_more();
    }

    fn finish_err(&mut self, idx: usize, err: TransferError) {
        let entry = &mut self.entries[idx];
        entry.state = EntryState::Failed;
        let ticket = entry.ticket;
        let text = match &err {
            TransferError::Rejected { status } => format!("Failed ({status})"),
            TransferError::Network { .. } => "Network error".to_string(),
        };
        debug!(name = %entry.handle.name, error = %err, "upload failed");
        entry.failure = Some(err);

        self.active -= 1;
        self.sink.status(ticket, &text, StatusStyle::Error);
        self.sink.queue_count(self.entries.len());
        self.admit_more();
    }

    /// All entries, in enqueue order.
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries currently in flight.
    pub fn active(&self) -> usize {
        self.active
    }

    pub fn max_concurrent(&self) -> usize {
        self.cap
    }
}
