use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use upq::cli::Args;
use upq::config::Config;
use upq::queue::{EntryState, FileHandle};
use upq::scheduler::{Scheduler, SchedulerConfig, DEFAULT_MAX_CONCURRENT};
use upq::sink::console::human_size;
use upq::sink::ConsoleSink;
use upq::transfer::HttpPort;

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/upload";

#[derive(Debug, Serialize)]
struct Summary {
    uploaded: usize,
    failed: usize,
    bytes_sent: u64,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("upq={default}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = Config::load().context("loading config file")?;
    let endpoint = args
        .url
        .or(config.endpoint)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let jobs = args
        .jobs
        .or(config.max_concurrent)
        .unwrap_or(DEFAULT_MAX_CONCURRENT);

    let mut handles = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let handle = FileHandle::from_path(path)
            .with_context(|| format!("cannot queue {}", path.display()))?;
        handles.push(handle);
    }

    let port = HttpPort::new(&endpoint).context("invalid endpoint")?;
    let mut scheduler = Scheduler::new(
        SchedulerConfig {
            max_concurrent: jobs,
        },
        Arc::new(port),
        Box::new(ConsoleSink::new()),
    );

    scheduler.enqueue(handles);
    scheduler.admit_more();
    scheduler.run_until_idle().await;

    let entries = scheduler.entries();
    let summary = Summary {
        uploaded: entries
            .iter()
            .filter(|e| e.state == EntryState::Succeeded)
            .count(),
        failed: entries
            .iter()
            .filter(|e| e.state == EntryState::Failed)
            .count(),
        bytes_sent: entries
            .iter()
            .filter(|e| e.state == EntryState::Succeeded)
            .map(|e| e.handle.size)
            .sum(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let uploaded = summary.uploaded.to_string();
        let failed = summary.failed.to_string();
        println!(
            "{} uploaded ({}), {} failed",
            uploaded.as_str().green(),
            human_size(summary.bytes_sent),
            if summary.failed > 0 {
                failed.as_str().red()
            } else {
                failed.as_str().normal()
            },
        );
    }

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
