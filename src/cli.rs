//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

/// Upload files to an HTTP endpoint, a few at a time.
#[derive(Debug, Parser)]
#[command(name = "upq", version, about = "Bounded-concurrency upload queue")]
pub struct Args {
    /// Files to upload, queued in the order given.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Upload endpoint URL.
    #[arg(long, env = "UPQ_URL")]
    pub url: Option<String>,

    /// Maximum simultaneous uploads.
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
