//! CLI command implementations.

pub mod show;
pub mod stats;
pub mod watch;
