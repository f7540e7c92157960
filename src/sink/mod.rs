//! Presentation boundary.
//!
//! The scheduler pushes notifications out through this trait; nothing
//! flows back. Rendering lives entirely on the other side.

pub mod console;

pub use console::ConsoleSink;

use crate::queue::Ticket;

/// Visual treatment of a status line. Mirrors the three ways an entry
/// can look: in flight, done, failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusStyle {
    /// Waiting or in flight.
    Busy,
    /// Terminal success.
    Ok,
    /// Terminal failure.
    Error,
}

/// Write-only observer of queue state.
pub trait PresentationSink: Send {
    /// A new entry joined the queue.
    fn entry_added(&mut self, ticket: Ticket, name: &str, size: u64);

    /// Progress for an in-flight entry, percent in [0, 100].
    fn progress(&mut self, ticket: Ticket, percent: u8);

    /// Status line change for one entry.
    fn status(&mut self, ticket: Ticket, text: &str, style: StatusStyle);

    /// The total entry count changed or was re-announced.
    fn queue_count(&mut self, count: usize);

    /// Every entry was discarded.
    fn cleared(&mut self);
}

/// Sink that drops every notification.
#[derive(Debug, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn entry_added(&mut self, _ticket: Ticket, _name: &str, _size: u64) {}
    fn progress(&mut self, _ticket: Ticket, _percent: u8) {}
    fn status(&mut self, _ticket: Ticket, _text: &str, _style: StatusStyle) {}
    fn queue_count(&mut self, _count: usize) {}
    fn cleared(&mut self) {}
}
