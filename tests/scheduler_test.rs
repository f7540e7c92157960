//! End-to-end scheduler tests over in-memory transfer ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use upq::error::TransferError;
use upq::queue::{EntryState, FileHandle, Ticket};
use upq::scheduler::channel::ProgressFeed;
use upq::scheduler::{Scheduler, SchedulerConfig};
use upq::sink::{PresentationSink, StatusStyle};
use upq::transfer::TransferPort;

#[derive(Debug, Clone, PartialEq)]
enum Note {
    Added(String),
    Progress(u8),
    Status(String, StatusStyle),
    Count(usize),
    Cleared,
}

/// Sink that records every notification for later inspection.
struct RecordingSink {
    notes: Arc<Mutex<Vec<Note>>>,
}

impl RecordingSink {
    fn new() -> (Self, Arc<Mutex<Vec<Note>>>) {
        let notes = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                notes: notes.clone(),
            },
            notes,
        )
    }

    fn push(&self, note: Note) {
        self.notes.lock().unwrap().push(note);
    }
}

impl PresentationSink for RecordingSink {
    fn entry_added(&mut self, _ticket: Ticket, name: &str, _size: u64) {
        self.push(Note::Added(name.to_string()));
    }
    fn progress(&mut self, _ticket: Ticket, percent: u8) {
        self.push(Note::Progress(percent));
    }
    fn status(&mut self, _ticket: Ticket, text: &str, style: StatusStyle) {
        self.push(Note::Status(text.to_string(), style));
    }
    fn queue_count(&mut self, count: usize) {
        self.push(Note::Count(count));
    }
    fn cleared(&mut self) {
        self.push(Note::Cleared);
    }
}

/// Port that reports a few progress steps, then returns the outcome
/// scripted for the file name (success by default). Tracks its own peak
/// concurrency so tests can assert the cap held at the transport layer.
struct ScriptedPort {
    failures: HashMap<String, TransferError>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedPort {
    fn new() -> Self {
        Self {
            failures: HashMap::new(),
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    fn fail(mut self, name: &str, err: TransferError) -> Self {
        self.failures.insert(name.to_string(), err);
        self
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransferPort for ScriptedPort {
    async fn transfer(
        &self,
        handle: FileHandle,
        progress: ProgressFeed,
    ) -> Result<(), TransferError> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        for step in [0.25, 0.5, 0.75] {
            progress.report(step);
            tokio::task::yield_now().await;
        }

        self.running.fetch_sub(1, Ordering::SeqCst);
        match self.failures.get(&handle.name) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Port that parks every transfer until the test hands out permits.
struct GatedPort {
    gate: Arc<Semaphore>,
}

#[async_trait]
impl TransferPort for GatedPort {
    async fn transfer(
        &self,
        _handle: FileHandle,
        _progress: ProgressFeed,
    ) -> Result<(), TransferError> {
        let _permit = self.gate.acquire().await;
        Ok(())
    }
}

fn handles(names: &[&str]) -> Vec<FileHandle> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| FileHandle::new(*name, 1024 * (i as u64 + 1), format!("/tmp/{name}")))
        .collect()
}

#[tokio::test]
async fn drains_queue_without_exceeding_cap() {
    let port = Arc::new(ScriptedPort::new());
    let (sink, notes) = RecordingSink::new();
    let mut scheduler = Scheduler::new(
        SchedulerConfig { max_concurrent: 3 },
        port.clone(),
        Box::new(sink),
    );

    scheduler.enqueue(handles(&["a", "b", "c", "d", "e", "f", "g"]));
    scheduler.admit_more();
    scheduler.run_until_idle().await;

    assert_eq!(scheduler.active(), 0);
    assert!(scheduler
        .entries()
        .iter()
        .all(|e| e.state == EntryState::Succeeded));
    assert!(scheduler.entries().iter().all(|e| e.progress == 100));
    assert!(port.peak() <= 3);

    let notes = notes.lock().unwrap();
    let added: Vec<_> = notes
        .iter()
        .filter_map(|n| match n {
            Note::Added(name) => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(added, ["a", "b", "c", "d", "e", "f", "g"]);
    assert!(notes.contains(&Note::Count(7)));
    assert_eq!(
        notes
            .iter()
            .filter(|n| **n == Note::Status("Uploaded".to_string(), StatusStyle::Ok))
            .count(),
        7
    );
}

#[tokio::test]
async fn single_slot_runs_strictly_serially() {
    let port = Arc::new(ScriptedPort::new());
    let (sink, _notes) = RecordingSink::new();
    let mut scheduler = Scheduler::new(
        SchedulerConfig { max_concurrent: 1 },
        port.clone(),
        Box::new(sink),
    );

    scheduler.enqueue(handles(&["a", "b", "c"]));
    scheduler.admit_more();
    scheduler.run_until_idle().await;

    assert_eq!(port.peak(), 1);
    assert!(scheduler
        .entries()
        .iter()
        .all(|e| e.state == EntryState::Succeeded));
}

#[tokio::test]
async fn failures_are_terminal_and_rendered_distinctly() {
    let port = Arc::new(
        ScriptedPort::new()
            .fail("bad.bin", TransferError::Rejected { status: 404 })
            .fail(
                "lost.bin",
                TransferError::Network {
                    reason: "connection reset".to_string(),
                },
            ),
    );
    let (sink, notes) = RecordingSink::new();
    let mut scheduler = Scheduler::new(
        SchedulerConfig { max_concurrent: 2 },
        port,
        Box::new(sink),
    );

    scheduler.enqueue(handles(&["ok.bin", "bad.bin", "lost.bin"]));
    scheduler.admit_more();
    scheduler.run_until_idle().await;

    let entries = scheduler.entries();
    assert_eq!(entries[0].state, EntryState::Succeeded);
    assert_eq!(entries[1].state, EntryState::Failed);
    assert_eq!(
        entries[1].failure,
        Some(TransferError::Rejected { status: 404 })
    );
    assert_eq!(entries[2].state, EntryState::Failed);
    assert!(matches!(
        entries[2].failure,
        Some(TransferError::Network { .. })
    ));

    let notes = notes.lock().unwrap();
    assert!(notes.contains(&Note::Status("Failed (404)".to_string(), StatusStyle::Error)));
    assert!(notes.contains(&Note::Status("Network error".to_string(), StatusStyle::Error)));
    assert!(notes.contains(&Note::Status("Uploaded".to_string(), StatusStyle::Ok)));
}

#[tokio::test]
async fn clear_while_in_flight_ignores_late_events() {
    let gate = Arc::new(Semaphore::new(0));
    let (sink, notes) = RecordingSink::new();
    let mut scheduler = Scheduler::new(
        SchedulerConfig { max_concurrent: 2 },
        Arc::new(GatedPort { gate: gate.clone() }),
        Box::new(sink),
    );

    scheduler.enqueue(handles(&["one.txt", "two.txt"]));
    scheduler.admit_more();
    assert_eq!(scheduler.active(), 2);

    scheduler.clear();
    assert!(scheduler.is_empty());
    assert_eq!(scheduler.active(), 0);

    // Let the abandoned transfers finish; their events carry the old epoch.
    gate.add_permits(2);

    scheduler.enqueue(handles(&["three.txt"]));
    scheduler.admit_more();
    gate.add_permits(1);
    scheduler.run_until_idle().await;

    // Give the abandoned tasks time to deliver their stale events, then
    // drain whatever is left in the channel.
    tokio::time::sleep(Duration::from_millis(50)).await;
    scheduler.pump();

    assert_eq!(scheduler.len(), 1);
    assert_eq!(scheduler.active(), 0);
    assert_eq!(scheduler.entries()[0].handle.name, "three.txt");
    assert_eq!(scheduler.entries()[0].state, EntryState::Succeeded);

    let notes = notes.lock().unwrap();
    assert!(notes.contains(&Note::Cleared));
    assert!(notes.contains(&Note::Count(0)));
}

#[tokio::test]
async fn enqueue_while_running_extends_the_queue() {
    let port = Arc::new(ScriptedPort::new());
    let (sink, _notes) = RecordingSink::new();
    let mut scheduler = Scheduler::new(
        SchedulerConfig { max_concurrent: 2 },
        port.clone(),
        Box::new(sink),
    );

    scheduler.enqueue(handles(&["a", "b"]));
    scheduler.admit_more();

    // More work arrives mid-run; the refill loop picks it up as slots free.
    scheduler.enqueue(handles(&["c", "d"]));
    scheduler.run_until_idle().await;

    assert_eq!(scheduler.len(), 4);
    assert!(scheduler
        .entries()
        .iter()
        .all(|e| e.state == EntryState::Succeeded));
    assert!(port.peak() <= 2);
}
