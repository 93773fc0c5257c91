mod cli;
mod commands;
mod shutdown;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use ets2_tracker_core::default_output_path;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ets2_tracker=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Show { file } => {
            let file = file.unwrap_or_else(default_output_path);
            commands::show::run(&file)
        }
        Command::Watch {
            file,
            interval_ms,
            session_dir,
        } => {
            let file = file.unwrap_or_else(default_output_path);
            commands::watch::run(
                &file,
                Duration::from_millis(interval_ms.max(1)),
                session_dir.as_deref(),
            )
        }
        Command::Stats { session_dir } => commands::stats::run(&session_dir),
    }
}
