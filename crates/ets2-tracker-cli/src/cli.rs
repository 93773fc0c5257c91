use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ets2-tracker")]
#[command(about = "Reads the ETS2 tracker telemetry file")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the current snapshot once
    Show {
        /// Snapshot file (defaults to Documents/ETS2_Tracker/tracker_data.json)
        #[arg(short, long, env = "ETS2_TRACKER_FILE")]
        file: Option<PathBuf>,
    },
    /// Poll the snapshot and report connection, trip and fine events
    Watch {
        #[arg(short, long, env = "ETS2_TRACKER_FILE")]
        file: Option<PathBuf>,

        /// Poll interval in milliseconds
        #[arg(short, long, default_value_t = 1000)]
        interval_ms: u64,

        /// Record trips and fines as JSON lines under this directory
        #[arg(short, long, env = "ETS2_TRACKER_SESSION_DIR")]
        session_dir: Option<PathBuf>,
    },
    /// Totals, monthly breakdown and driver level over recorded sessions
    Stats {
        #[arg(short, long, env = "ETS2_TRACKER_SESSION_DIR")]
        session_dir: PathBuf,
    },
}
