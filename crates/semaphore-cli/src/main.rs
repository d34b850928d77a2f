//! `semaphore` CLI — parse, validate, and inspect Markdown broadcast messages.
//!
//! ## Usage
//!
//! ```sh
//! # Parse one broadcast and print it as JSON
//! semaphore parse broadcasts/maintenance.md
//!
//! # Validate several broadcasts (non-zero exit if any is invalid)
//! semaphore check broadcasts/*.md
//!
//! # Summarize every broadcast in a directory for one environment
//! semaphore scan broadcasts --env idfprod --status active
//!
//! # Evaluate schedules at a fixed instant instead of now
//! semaphore scan broadcasts --now 2024-03-13T02:00:00Z
//! ```
//!
//! Logging goes to stderr. Set `--log-level`, `SEMAPHORE_LOG`, or `RUST_LOG`
//! (e.g. `debug`) to see how each document is normalized.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use semaphore_broadcast::{is_broadcast_path, BroadcastMessage, BroadcastRepository};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "semaphore",
    version,
    about = "Validate and inspect Markdown broadcast messages"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter directive (e.g. "debug", "semaphore_broadcast=trace")
    #[arg(long, global = true, env = "SEMAPHORE_LOG")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a broadcast document and print the message as JSON
    Parse {
        /// Markdown document with YAML front matter
        file: PathBuf,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate broadcast documents
    Check {
        /// Markdown documents to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Load every broadcast in a directory and report its schedule state
    Scan {
        /// Directory holding broadcast documents
        dir: PathBuf,
        /// Only include broadcasts that apply to this environment
        #[arg(long, env = "SEMAPHORE_ENV")]
        env: Option<String>,
        /// Evaluate schedules at this RFC 3339 instant instead of now
        #[arg(long, value_parser = parse_instant)]
        now: Option<DateTime<Utc>>,
        /// Which broadcasts to list
        #[arg(long, value_enum, default_value_t = Status::All)]
        status: Status,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Status {
    All,
    Active,
    Pending,
    Stale,
}

/// One row of `scan` output.
#[derive(Debug, Serialize)]
struct ScanEntry<'a> {
    id: &'a str,
    summary: &'a str,
    enabled: bool,
    active: bool,
    pending: bool,
    stale: bool,
    policy: &'a semaphore_broadcast::SchedulingPolicy,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match run(cli.command) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

fn init_tracing(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<i32> {
    match command {
        Commands::Parse { file, output } => {
            let message = load_message(&file)?;
            let json = serde_json::to_string_pretty(&message)?;
            write_output(output.as_deref(), &json)?;
            Ok(0)
        }
        Commands::Check { files } => {
            let mut failures = 0;
            for file in &files {
                match load_message(file) {
                    Ok(_) => println!("ok: {}", file.display()),
                    Err(err) => {
                        failures += 1;
                        eprintln!("error: {}: {err:#}", file.display());
                    }
                }
            }
            if failures > 0 {
                eprintln!("{failures} of {} broadcast(s) failed validation", files.len());
                Ok(1)
            } else {
                Ok(0)
            }
        }
        Commands::Scan {
            dir,
            env,
            now,
            status,
        } => {
            let now = now.unwrap_or_else(Utc::now);
            let repo = load_directory(&dir, env.as_deref())?;
            let entries = scan_entries(&repo, now, status);
            println!("{}", serde_json::to_string_pretty(&entries)?);
            Ok(0)
        }
    }
}

fn load_message(path: &Path) -> Result<BroadcastMessage> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let source = path.to_string_lossy();
    BroadcastMessage::parse(&text, &source)
        .with_context(|| format!("Invalid broadcast: {}", path.display()))
}

/// Parse every broadcast document in `dir` (non-recursive). Invalid documents
/// are logged and skipped so one bad file does not hide the rest.
fn load_directory(dir: &Path, env: Option<&str>) -> Result<BroadcastRepository> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_broadcast_path(path))
        .collect();
    paths.sort();

    let mut repo = BroadcastRepository::new();
    for path in paths {
        let message = match load_message(&path) {
            Ok(message) => message,
            Err(err) => {
                let error = format!("{err:#}");
                tracing::warn!(path = %path.display(), %error, "skipping invalid broadcast");
                continue;
            }
        };
        if let Some(env) = env {
            if !message.is_relevant_to_env(env) {
                tracing::debug!(path = %path.display(), env, "skipping broadcast for another environment");
                continue;
            }
        }
        repo.add(message);
    }
    tracing::info!(count = repo.len(), dir = %dir.display(), "loaded broadcasts");
    Ok(repo)
}

fn scan_entries(repo: &BroadcastRepository, now: DateTime<Utc>, status: Status) -> Vec<ScanEntry<'_>> {
    repo.iter()
        .map(|message| ScanEntry {
            id: &message.source_identifier,
            summary: &message.summary,
            enabled: message.enabled,
            active: message.is_active_at(now),
            pending: message.has_future_events_at(now),
            stale: message.is_stale_at(now),
            policy: &message.scheduling_policy,
        })
        .filter(|entry| match status {
            Status::All => true,
            Status::Active => entry.active,
            Status::Pending => entry.pending,
            Status::Stale => entry.stale,
        })
        .collect()
}

fn parse_instant(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
