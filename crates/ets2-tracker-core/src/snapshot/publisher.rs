use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::{StringEncoding, TrackerConfig};
use crate::error::Result;
use crate::state::TelemetryState;

use super::format::render_snapshot;

/// Writes the state to the snapshot file once per frame
pub struct Publisher {
    path: PathBuf,
    output_dir: Option<PathBuf>,
    encoding: StringEncoding,
    fine_dwell: Duration,
    /// Whether the last write failed; failures are logged only on change
    failing: bool,
}

impl Publisher {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            path: config.output_path.clone(),
            output_dir: config.output_dir().map(Path::to_path_buf),
            encoding: config.string_encoding,
            fine_dwell: config.fine_dwell,
            failing: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory the snapshot lives in
    pub fn ensure_output_dir(&self) -> Result<()> {
        if let Some(dir) = &self.output_dir {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Frame handler: expire the fine flag, then publish.
    ///
    /// Write errors are swallowed; the next frame simply tries again.
    pub fn tick(&mut self, state: &mut TelemetryState, now: Instant) {
        if state.fine.decay(now, self.fine_dwell) {
            debug!("Fine {}", state.fine.phase());
        }

        match self.publish(state) {
            Ok(()) => {
                if self.failing {
                    info!("Writing {} again", self.path.display());
                    self.failing = false;
                }
            }
            Err(e) => {
                if !self.failing {
                    debug!("Failed to write {}: {}", self.path.display(), e);
                    self.failing = true;
                }
            }
        }
    }

    /// Overwrite the snapshot file with the current state
    pub fn publish(&self, state: &TelemetryState) -> Result<()> {
        let content = render_snapshot(state, self.encoding);
        fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn is_failing(&self) -> bool {
        self.failing
    }
}
