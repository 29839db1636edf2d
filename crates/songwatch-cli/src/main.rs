mod args;
mod trace;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use songwatch_core::config::AppConfig;
use songwatch_core::{SelectorTable, SongwatchError, TrackSnapshot, TrackWatcher};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::{Args, Command};
use crate::trace::Trace;

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "songwatch=debug"
    } else {
        "songwatch=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), SongwatchError> {
    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let selectors = match &args.selectors {
        Some(path) => SelectorTable::from_toml(&std::fs::read_to_string(path)?)?,
        None => config.selector_table()?,
    };

    match args.command {
        Command::Selectors => {
            print!("{}", selectors.to_toml()?);
            Ok(())
        }
        Command::Replay { trace, events } => {
            let trace = Trace::load(&trace)?;
            let mut watcher = TrackWatcher::new(selectors, print_notification);
            let report = trace::replay(&trace, &mut watcher)?;

            info!(
                frames = trace.frames.len(),
                notified = report.notified,
                duplicates = report.duplicates,
                ignored = report.ignored,
                "Replay finished"
            );

            if events || config.watcher.log_events {
                for (at, event) in watcher.events().snapshot() {
                    eprintln!("{} {event:?}", at.format("%H:%M:%S%.3f"));
                }
            }
            Ok(())
        }
    }
}

/// Host for replays: one JSON object per notification on stdout.
fn print_notification(track: &TrackSnapshot) {
    match serde_json::to_string(track) {
        Ok(line) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{line}") {
                warn!("Failed to write notification: {e}");
            }
        }
        Err(e) => warn!("Failed to encode notification: {e}"),
    }
}
