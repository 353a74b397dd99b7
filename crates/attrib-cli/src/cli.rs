//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Research attribution tracker.
///
/// Records research activity (prompts, searches, visits, copies) and links
/// the paragraphs you write back to the activity that informed them.
#[derive(Debug, Parser)]
#[command(name = "attrib", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Feed observed events (JSON lines) through the engine.
    Replay {
        /// Event file to read; stdin when omitted.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print a debug snapshot after the replay.
        #[arg(long)]
        debug: bool,
    },

    /// Show attribution statistics.
    Stats {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Dump recorded activities as JSON lines.
    Activities {
        /// Only activities at or after this time (ISO 8601 or relative like '30 minutes ago').
        #[arg(long)]
        since: Option<String>,
    },

    /// Dump finalized paragraphs as JSON lines.
    Paragraphs,

    /// Show recent entries from the action log.
    Log {
        /// Number of entries to show.
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Delete all recorded activities and paragraphs.
    Clear,

    /// Show storage locations and counts.
    Status,
}
