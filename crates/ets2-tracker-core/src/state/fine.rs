use std::time::{Duration, Instant};

use strum::{Display, IntoStaticStr};

use super::FixedString;

/// How long a fine stays visible after the event that raised it
pub const DEFAULT_FINE_DWELL: Duration = Duration::from_secs(2);

/// Observable phase of fine detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, IntoStaticStr)]
pub enum FinePhase {
    #[default]
    #[strum(serialize = "clear")]
    Clear,
    #[strum(serialize = "active")]
    Active,
}

/// Most recent fine, held for a dwell window so that slow pollers see it
#[derive(Debug, Clone, Default)]
pub struct FineState {
    pub detected: bool,
    pub amount: i64,
    pub offence: FixedString,
    pub last_fine_at: Option<Instant>,
}

impl FineState {
    /// Raise the flag and restart the dwell window.
    ///
    /// Amount and offence are left as they are; the caller overwrites them
    /// with whatever the event carries.
    pub fn trigger(&mut self, now: Instant) {
        self.detected = true;
        self.last_fine_at = Some(now);
    }

    /// Clear the fine once the dwell window has elapsed.
    ///
    /// Returns `true` when this call moved the state from active to clear.
    pub fn decay(&mut self, now: Instant, dwell: Duration) -> bool {
        if !self.detected {
            return false;
        }

        let expired = match self.last_fine_at {
            Some(at) => now.saturating_duration_since(at) >= dwell,
            None => true,
        };
        if !expired {
            return false;
        }

        self.detected = false;
        self.amount = 0;
        self.offence.clear();
        true
    }

    pub fn phase(&self) -> FinePhase {
        if self.detected {
            FinePhase::Active
        } else {
            FinePhase::Clear
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_fine(at: Instant) -> FineState {
        let mut fine = FineState::default();
        fine.trigger(at);
        fine.amount = 500;
        fine.offence.set("Speeding");
        fine
    }

    #[test]
    fn test_initial_phase_is_clear() {
        assert_eq!(FineState::default().phase(), FinePhase::Clear);
    }

    #[test]
    fn test_stays_active_inside_window() {
        let t0 = Instant::now();
        let mut fine = active_fine(t0);

        assert!(!fine.decay(t0 + Duration::from_millis(1999), DEFAULT_FINE_DWELL));
        assert_eq!(fine.phase(), FinePhase::Active);
        assert_eq!(fine.amount, 500);
        assert_eq!(fine.offence, "Speeding");
    }

    #[test]
    fn test_clears_at_window_end() {
        let t0 = Instant::now();
        let mut fine = active_fine(t0);

        assert!(fine.decay(t0 + DEFAULT_FINE_DWELL, DEFAULT_FINE_DWELL));
        assert_eq!(fine.phase(), FinePhase::Clear);
        assert_eq!(fine.amount, 0);
        assert!(fine.offence.is_empty());
    }

    #[test]
    fn test_decay_when_clear_is_noop() {
        let mut fine = FineState::default();
        assert!(!fine.decay(Instant::now(), DEFAULT_FINE_DWELL));
    }

    #[test]
    fn test_retrigger_extends_window() {
        let t0 = Instant::now();
        let mut fine = active_fine(t0);

        fine.trigger(t0 + Duration::from_millis(1500));
        assert!(!fine.decay(t0 + Duration::from_millis(2500), DEFAULT_FINE_DWELL));
        assert!(fine.decay(t0 + Duration::from_millis(3500), DEFAULT_FINE_DWELL));
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(FinePhase::Active.to_string(), "active");
        let name: &'static str = FinePhase::Clear.into();
        assert_eq!(name, "clear");
    }
}
