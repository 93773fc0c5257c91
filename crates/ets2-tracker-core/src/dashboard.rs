//! Consumer-side tracking of published snapshots.
//!
//! The dashboard polls the snapshot file about once per second. Individual
//! polls only show levels (`job_active`, `fine_detected`); this module turns
//! level changes between polls into discrete events:
//!
//! - A job going from active to inactive finishes a trip
//! - `fine_detected` going from false to true is one fine
//!
//! The plugin holds a fine for two seconds, so a one-second poller sees every
//! fine at least once and the rising edge is counted exactly once.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::snapshot::SnapshotJson;

/// Minimum time between two recorded trips
pub const TRIP_DEBOUNCE: Duration = Duration::from_secs(5);

/// Trips shorter than this (in km) are not recorded
pub const MIN_TRIP_DISTANCE_KM: f32 = 1.0;

/// Offence name used when the game does not report one
pub const UNKNOWN_OFFENCE: &str = "Unknown offence";

/// A delivered (or abandoned) job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub finished_at: DateTime<Utc>,
    pub source: String,
    pub destination: String,
    pub cargo: String,
    pub income: i64,
    /// Longest remaining navigation distance seen while the job was active
    pub distance_km: u32,
}

/// A fine as seen by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FineRecord {
    pub received_at: DateTime<Utc>,
    pub offence: String,
    pub amount: i64,
}

/// Changes detected between two polls
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    Connected,
    Disconnected,
    /// Whole kilometres on the truck's odometer
    Odometer(u64),
    JobStarted {
        source: String,
        destination: String,
        cargo: String,
    },
    TripFinished(TripRecord),
    FineReceived(FineRecord),
}

#[derive(Debug, Clone, Default)]
struct JobProgress {
    source: String,
    destination: String,
    cargo: String,
    income: i64,
    route_km: f32,
}

impl JobProgress {
    fn update(&mut self, snapshot: &SnapshotJson) {
        if !snapshot.source.is_empty() {
            self.source.clone_from(&snapshot.source);
        }
        if !snapshot.destination.is_empty() {
            self.destination.clone_from(&snapshot.destination);
        }
        if !snapshot.cargo.is_empty() {
            self.cargo.clone_from(&snapshot.cargo);
        }
        if snapshot.income != 0 {
            self.income = snapshot.income;
        }
        if snapshot.trip_distance.is_finite() {
            self.route_km = self.route_km.max(snapshot.trip_distance);
        }
    }
}

/// Edge detector over successive snapshots
#[derive(Debug, Default)]
pub struct DashboardTracker {
    connected: bool,
    odometer_km: Option<u64>,
    job: Option<JobProgress>,
    last_trip_at: Option<DateTime<Utc>>,
    fine_seen: bool,
}

impl DashboardTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Feed one poll result.
    ///
    /// `None` means the file was missing or unreadable this poll. Job and fine
    /// progress survive such gaps; only the connection state changes.
    pub fn observe(
        &mut self,
        snapshot: Option<&SnapshotJson>,
        at: DateTime<Utc>,
    ) -> Vec<DashboardEvent> {
        let mut events = Vec::new();

        let snapshot = match snapshot {
            Some(s) if s.connected => s,
            _ => {
                if self.connected {
                    info!("Telemetry disconnected");
                    self.connected = false;
                    events.push(DashboardEvent::Disconnected);
                }
                return events;
            }
        };

        if !self.connected {
            info!("Telemetry connected");
            self.connected = true;
            events.push(DashboardEvent::Connected);
        }

        self.track_odometer(snapshot, &mut events);
        self.track_job(snapshot, at, &mut events);
        self.track_fine(snapshot, at, &mut events);

        events
    }

    fn track_odometer(&mut self, snapshot: &SnapshotJson, events: &mut Vec<DashboardEvent>) {
        if !(snapshot.odometer.is_finite() && snapshot.odometer > 0.0) {
            return;
        }
        let km = snapshot.odometer.floor() as u64;
        if self.odometer_km != Some(km) {
            self.odometer_km = Some(km);
            events.push(DashboardEvent::Odometer(km));
        }
    }

    fn track_job(
        &mut self,
        snapshot: &SnapshotJson,
        at: DateTime<Utc>,
        events: &mut Vec<DashboardEvent>,
    ) {
        if snapshot.job_active {
            let job = self.job.get_or_insert_with(|| {
                events.push(DashboardEvent::JobStarted {
                    source: snapshot.source.clone(),
                    destination: snapshot.destination.clone(),
                    cargo: snapshot.cargo.clone(),
                });
                JobProgress::default()
            });
            job.update(snapshot);
            return;
        }

        let Some(job) = self.job.take() else {
            return;
        };

        if let Some(last) = self.last_trip_at {
            let since = at.signed_duration_since(last).to_std().unwrap_or_default();
            if since <= TRIP_DEBOUNCE {
                debug!("Ignoring job end {}s after previous trip", since.as_secs());
                return;
            }
        }
        self.last_trip_at = Some(at);

        if job.route_km <= MIN_TRIP_DISTANCE_KM {
            debug!("Ignoring short trip ({:.1} km)", job.route_km);
            return;
        }

        events.push(DashboardEvent::TripFinished(TripRecord {
            finished_at: at,
            source: job.source,
            destination: job.destination,
            cargo: job.cargo,
            income: job.income,
            distance_km: job.route_km.round() as u32,
        }));
    }

    fn track_fine(
        &mut self,
        snapshot: &SnapshotJson,
        at: DateTime<Utc>,
        events: &mut Vec<DashboardEvent>,
    ) {
        if snapshot.fine_detected && !self.fine_seen {
            let offence = if snapshot.fine_type.is_empty() {
                UNKNOWN_OFFENCE.to_string()
            } else {
                snapshot.fine_type.clone()
            };
            events.push(DashboardEvent::FineReceived(FineRecord {
                received_at: at,
                offence,
                amount: snapshot.fine_amount,
            }));
        }
        self.fine_seen = snapshot.fine_detected;
    }
}
