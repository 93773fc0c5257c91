//! One-shot snapshot printout.

use std::path::Path;

use anyhow::{Context, Result};
use ets2_tracker_core::{SnapshotJson, read_snapshot};
use owo_colors::OwoColorize;

/// Print the snapshot at `path`
pub fn run(path: &Path) -> Result<()> {
    let snapshot = match read_snapshot(path) {
        Ok(s) => s,
        Err(e) if e.is_not_found() => {
            println!("{} no telemetry at {}", "Offline:".red(), path.display());
            return Ok(());
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    for (label, value) in summary(&snapshot) {
        println!("{:<12} {}", label.bold(), value);
    }
    Ok(())
}

/// Label/value pairs describing a snapshot
pub fn summary(s: &SnapshotJson) -> Vec<(&'static str, String)> {
    let mut lines = vec![(
        "Status",
        if s.connected { "connected" } else { "disconnected" }.to_string(),
    )];
    if !s.connected {
        return lines;
    }

    lines.push(("Odometer", format!("{} km", s.odometer.max(0.0).floor())));
    lines.push(("Speed", format!("{:.0} km/h", s.speed)));

    if s.job_active {
        lines.push(("Route", format!("{} -> {}", s.source, s.destination)));
        lines.push(("Cargo", s.cargo.clone()));
        lines.push(("Income", format!("{} €", s.income)));
        lines.push(("Remaining", format!("{:.1} km", s.trip_distance)));
    } else {
        lines.push(("Job", "none".to_string()));
    }

    if s.fine_detected {
        lines.push(("Fine", format!("{} € ({})", s.fine_amount, s.fine_type)));
    }

    lines
}
