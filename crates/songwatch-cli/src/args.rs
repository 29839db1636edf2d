use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Replay recorded player pages through the track-change watcher
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Args {
    /// Log every insertion the watcher looks at
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the user config
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Complete selector table (TOML) replacing the configured one
    #[arg(short, long, global = true)]
    pub selectors: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Feed a JSON trace through the watcher and print each notification
    Replay {
        /// Trace file recorded from the player page
        trace: PathBuf,

        /// Print the watch event log when done
        #[arg(long)]
        events: bool,
    },
    /// Print the effective selector table
    Selectors,
}
