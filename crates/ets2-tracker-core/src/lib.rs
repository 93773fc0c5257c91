//! # ets2-tracker-core
//!
//! Core library for the ETS2 tracker telemetry plugin.
//!
//! This crate provides:
//! - The telemetry state store and its channel/configuration/gameplay handlers
//! - Fine detection with a fixed dwell window
//! - Snapshot rendering and per-frame publishing to the tracker file
//! - Dashboard-side edge detection (finished trips, received fines)
//! - Session files for recorded trips and fines, and totals across them
//!
//! Nothing in here touches the game's ABI; see `ets2-tracker-plugin` for the
//! host-facing side.

pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod history;
pub mod session;
pub mod snapshot;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{StringEncoding, TrackerConfig, TrackerConfigBuilder, default_output_path};
pub use dashboard::{DashboardEvent, DashboardTracker, FineRecord, TripRecord};
pub use error::{Error, Result};
pub use history::{DriverLevel, HistoryStats, MonthStats, load_history, session_files};
pub use session::{SessionManager, SessionRecord, load_session};
pub use snapshot::{Publisher, SnapshotJson, parse_snapshot, read_snapshot, render_snapshot};
pub use state::{
    Attribute, AttributeValue, Channel, FinePhase, FineState, FixedString, TelemetryState,
};
