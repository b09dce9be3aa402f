//! Pre-drop staging
//!
//! When the car is at home, pointed at the charger and in reverse, a
//! departure or approach is imminent and the connector is staged down before
//! the door or geofence signals catch up. The window lasts a fixed duration
//! from activation and ignores later signal changes.

use charger_core::{Heading, ShiftState, TelemetrySnapshot};
use std::time::{Duration, Instant};

/// Default length of a staging window
pub const STAGING_DURATION: Duration = Duration::from_secs(300);

/// Inclusive heading arc, in degrees, facing the charger head-on
pub const STAGING_HEADING_ARC: (u16, u16) = (340, 359);

/// Whether a staging window is open, and since when
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagingState {
    started_at: Option<Instant>,
}

impl StagingState {
    /// A window opened at `at`
    pub fn started(at: Instant) -> Self {
        Self {
            started_at: Some(at),
        }
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }
}

/// Check the arming condition against a snapshot
///
/// Returns the heading that satisfied the arc, for reporting.
pub fn staging_condition(telemetry: &TelemetrySnapshot, home: &str) -> Option<Heading> {
    let (from, to) = STAGING_HEADING_ARC;
    if !telemetry.geofence.is_zone(home) || telemetry.shift_state != Some(ShiftState::Reverse) {
        return None;
    }
    telemetry.heading.filter(|h| h.within(from, to))
}

/// One-shot staging timer owned by the control loop
#[derive(Debug, Clone)]
pub struct StagingTimer {
    state: StagingState,
    duration: Duration,
}

impl Default for StagingTimer {
    fn default() -> Self {
        Self::new(STAGING_DURATION)
    }
}

impl StagingTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            state: StagingState::default(),
            duration,
        }
    }

    pub fn state(&self) -> &StagingState {
        &self.state
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Close the window once `duration` has elapsed
    ///
    /// Returns how long the window was open when it closes on this call.
    pub fn advance(&mut self, now: Instant) -> Option<Duration> {
        let started_at = self.state.started_at?;
        let elapsed = now.saturating_duration_since(started_at);
        if elapsed < self.duration {
            return None;
        }
        self.state = StagingState::default();
        Some(elapsed)
    }

    /// Open a window if the arming condition holds and none is open
    ///
    /// Returns the triggering heading when a new window opens. A window that
    /// has expired can be re-armed.
    pub fn arm(&mut self, telemetry: &TelemetrySnapshot, home: &str, now: Instant) -> Option<Heading> {
        if self.state.is_active() {
            return None;
        }
        let heading = staging_condition(telemetry, home)?;
        self.state = StagingState::started(now);
        Some(heading)
    }
}
