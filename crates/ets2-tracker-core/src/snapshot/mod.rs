//! Snapshot publishing for the external dashboard.
//!
//! On every frame the publisher clears an expired fine and then overwrites
//! the snapshot file with the whole state:
//!
//! - Speed is converted from m/s to km/h
//! - Trip distance is converted from m to km
//! - Strings are written raw unless escaping is configured
//!
//! The file is rewritten in place (no temp file and rename), so a reader
//! polling at the wrong moment can see a partial file. Consumers treat a
//! parse failure as "no data this poll".

mod format;
mod publisher;

pub use format::*;
pub use publisher::*;
