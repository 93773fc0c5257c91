//! Snapshot file layout

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StringEncoding;
use crate::error::Result;
use crate::state::TelemetryState;

/// m/s to km/h
const MS_TO_KMH: f32 = 3.6;

/// m to km
const M_PER_KM: f32 = 1000.0;

/// Published snapshot as seen by a consumer.
///
/// Field order matches the file layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotJson {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub odometer: f32,
    /// km/h
    #[serde(default)]
    pub speed: f32,
    /// km left to the navigation target
    #[serde(default)]
    pub trip_distance: f32,
    #[serde(default)]
    pub job_active: bool,
    #[serde(default)]
    pub cargo: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub income: i64,
    #[serde(default)]
    pub fine_detected: bool,
    #[serde(default)]
    pub fine_amount: i64,
    #[serde(default)]
    pub fine_type: String,
}

impl SnapshotJson {
    /// Consumer view of a state, with units converted the way the file has them
    pub fn from_state(state: &TelemetryState) -> Self {
        Self {
            connected: true,
            odometer: state.odometer,
            speed: state.speed * MS_TO_KMH,
            trip_distance: state.trip_distance / M_PER_KM,
            job_active: state.job_active(),
            cargo: state.cargo.to_string(),
            source: state.source.to_string(),
            destination: state.destination.to_string(),
            income: state.income,
            fine_detected: state.fine.detected,
            fine_amount: state.fine.amount,
            fine_type: state.fine.offence.to_string(),
        }
    }
}

/// Render the snapshot file contents.
///
/// The layout is fixed: same keys, same order, two-space indent and a
/// trailing newline. Identical states render identical bytes.
pub fn render_snapshot(state: &TelemetryState, encoding: StringEncoding) -> String {
    let s = SnapshotJson::from_state(state);

    format!(
        "{{\n  \"connected\": {},\n  \"odometer\": {},\n  \"speed\": {},\n  \"trip_distance\": {},\n  \"job_active\": {},\n  \"cargo\": {},\n  \"source\": {},\n  \"destination\": {},\n  \"income\": {},\n  \"fine_detected\": {},\n  \"fine_amount\": {},\n  \"fine_type\": {}\n}}\n",
        s.connected,
        s.odometer,
        s.speed,
        s.trip_distance,
        s.job_active,
        quote(&s.cargo, encoding),
        quote(&s.source, encoding),
        quote(&s.destination, encoding),
        s.income,
        s.fine_detected,
        s.fine_amount,
        quote(&s.fine_type, encoding),
    )
}

fn quote(value: &str, encoding: StringEncoding) -> String {
    match encoding {
        StringEncoding::Raw => format!("\"{}\"", value),
        StringEncoding::Escaped => {
            serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
        }
    }
}

/// Parse snapshot file contents.
///
/// Empty (or whitespace-only) contents mean the plugin has not written yet
/// and parse as a disconnected snapshot.
pub fn parse_snapshot(content: &str) -> Result<SnapshotJson> {
    if content.trim().is_empty() {
        return Ok(SnapshotJson::default());
    }
    Ok(serde_json::from_str(content)?)
}

/// Read and parse a snapshot file
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<SnapshotJson> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    debug!("Read {} bytes from {}", content.len(), path.display());
    parse_snapshot(&content)
}
