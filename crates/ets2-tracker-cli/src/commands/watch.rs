//! Polling dashboard mode.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use ets2_tracker_core::{
    DashboardEvent, DashboardTracker, SessionManager, SessionRecord, SnapshotJson, read_snapshot,
};
use owo_colors::OwoColorize;
use tracing::{debug, info, warn};

use crate::shutdown::ShutdownSignal;

/// Run until Ctrl+C, polling `path` every `interval`
pub fn run(path: &Path, interval: Duration, session_dir: Option<&Path>) -> Result<()> {
    let shutdown = Arc::new(ShutdownSignal::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown_ctrlc.trigger();
    })?;

    let sessions = match session_dir {
        Some(dir) => {
            let mut manager = SessionManager::new(dir);
            let file = manager
                .start_session()
                .with_context(|| format!("starting session in {}", dir.display()))?;
            info!("Recording session to {}", file.display());
            Some(manager)
        }
        None => None,
    };

    let mut tracker = DashboardTracker::new();
    let mut totals = Totals::default();

    println!("Watching {} (Ctrl+C to stop)", path.display());
    loop {
        let snapshot = poll(path);
        for event in tracker.observe(snapshot.as_ref(), Utc::now()) {
            println!("{}", describe(&event));
            totals.add(&event);

            if let (Some(manager), Some(record)) = (&sessions, session_record(&event)) {
                if let Err(e) = manager.append(&record) {
                    warn!("Failed to record session entry: {}", e);
                }
            }
        }

        if shutdown.wait(interval) {
            break;
        }
    }

    println!(
        "{} trips, {} € earned, {} fines, {} € paid",
        totals.trips, totals.income, totals.fines, totals.fines_paid
    );
    info!("Shutdown complete");
    Ok(())
}

/// One read of the snapshot; any failure counts as no telemetry
fn poll(path: &Path) -> Option<SnapshotJson> {
    match read_snapshot(path) {
        Ok(snapshot) => Some(snapshot),
        Err(e) if e.is_not_found() => None,
        Err(e) => {
            debug!("Unreadable snapshot: {}", e);
            None
        }
    }
}

fn session_record(event: &DashboardEvent) -> Option<SessionRecord> {
    match event {
        DashboardEvent::TripFinished(trip) => Some(SessionRecord::Trip(trip.clone())),
        DashboardEvent::FineReceived(fine) => Some(SessionRecord::Fine(fine.clone())),
        _ => None,
    }
}

/// Running totals printed on exit
#[derive(Debug, Default, PartialEq)]
struct Totals {
    trips: u32,
    income: i64,
    fines: u32,
    fines_paid: i64,
}

impl Totals {
    fn add(&mut self, event: &DashboardEvent) {
        match event {
            DashboardEvent::TripFinished(trip) => {
                self.trips += 1;
                self.income = self.income.saturating_add(trip.income);
            }
            DashboardEvent::FineReceived(fine) => {
                self.fines += 1;
                self.fines_paid = self.fines_paid.saturating_add(fine.amount);
            }
            _ => {}
        }
    }
}

fn describe(event: &DashboardEvent) -> String {
    let time = Local::now().format("%H:%M:%S");
    let text = match event {
        DashboardEvent::Connected => "Telemetry connected".green().to_string(),
        DashboardEvent::Disconnected => "Telemetry disconnected".red().to_string(),
        DashboardEvent::Odometer(km) => format!("Odometer {} km", km),
        DashboardEvent::JobStarted {
            source,
            destination,
            cargo,
        } => format!(
            "{} {} -> {} ({})",
            "Job".cyan(),
            source,
            destination,
            cargo
        ),
        DashboardEvent::TripFinished(trip) => format!(
            "{} {} -> {}, {} km, {} €",
            "Trip".green().bold(),
            trip.source,
            trip.destination,
            trip.distance_km,
            trip.income
        ),
        DashboardEvent::FineReceived(fine) => format!(
            "{} {} € for {}",
            "Fine".yellow().bold(),
            fine.amount,
            fine.offence
        ),
    };
    format!("[{}] {}", time, text)
}
