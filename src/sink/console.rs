//! Terminal sink rendered with indicatif progress bars.

use std::collections::HashMap;

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::{PresentationSink, StatusStyle};
use crate::queue::Ticket;

const BAR_TEMPLATE: &str = "{prefix:32!} [{bar:25}] {percent:>3}% {msg}";

/// Format a byte count for display (1024-based, one decimal).
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// One progress bar per entry, stacked under a shared [`MultiProgress`],
/// plus a header line with the queue count.
pub struct ConsoleSink {
    multi: MultiProgress,
    header: ProgressBar,
    bars: HashMap<Ticket, ProgressBar>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        let multi = MultiProgress::new();
        let header = multi.add(ProgressBar::no_length());
        header.set_style(ProgressStyle::with_template("{msg}").expect("static template"));
        header.set_message("0 files");
        Self {
            multi,
            header,
            bars: HashMap::new(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationSink for ConsoleSink {
    fn entry_added(&mut self, ticket: Ticket, name: &str, size: u64) {
        let bar = self.multi.add(ProgressBar::new(100));
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .expect("static template")
                .progress_chars("=> "),
        );
        bar.set_prefix(format!("{} ({})", name, human_size(size)));
        bar.set_message("Waiting");
        self.bars.insert(ticket, bar);
    }

    fn progress(&mut self, ticket: Ticket, percent: u8) {
        if let Some(bar) = self.bars.get(&ticket) {
            bar.set_position(percent as u64);
        }
    }

    fn status(&mut self, ticket: Ticket, text: &str, style: StatusStyle) {
        if let Some(bar) = self.bars.get(&ticket) {
            match style {
                StatusStyle::Busy => bar.set_message(text.to_string()),
                StatusStyle::Ok => bar.finish_with_message(text.green().to_string()),
                StatusStyle::Error => bar.abandon_with_message(text.red().to_string()),
            }
        }
    }

    fn queue_count(&mut self, count: usize) {
        let plural = if count == 1 { "" } else { "s" };
        self.header.set_message(format!("{count} file{plural}"));
    }

    fn cleared(&mut self) {
        for (_, bar) in self.bars.drain() {
            bar.finish_and_clear();
        }
        self.header.set_message("0 files");
    }
}
