//! Status reporter
//!
//! Logs and fires one event per transition, never one per tick.

use charger_core::events::{
    DirectionChangedData, EstopTrippedData, SignalsChangedData, StagingExpiredData,
    StagingStartedData, TripSource,
};
use charger_core::{Direction, DoorState, Geofence, Heading, TelemetrySnapshot};
use charger_event_bus::EventBus;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Last reported value of each observed group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeMemory {
    /// `None` until the first observation
    pub signals: Option<(Geofence, DoorState)>,
    pub direction: Direction,
}

pub struct StatusReporter {
    memory: ChangeMemory,
    event_bus: Arc<EventBus>,
}

impl StatusReporter {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            memory: ChangeMemory::default(),
            event_bus,
        }
    }

    pub fn memory(&self) -> &ChangeMemory {
        &self.memory
    }

    /// Compare this tick against the last report; returns events emitted
    pub fn observe(&mut self, telemetry: &TelemetrySnapshot, direction: Direction) -> usize {
        let mut emitted = 0;

        let signals = (telemetry.geofence.clone(), telemetry.charge_door);
        if self.memory.signals.as_ref() != Some(&signals) {
            info!(
                charge_door = %signals.1,
                geofence = %signals.0,
                "State"
            );
            self.event_bus.fire_typed(SignalsChangedData {
                geofence: signals.0.clone(),
                charge_door: signals.1,
            });
            self.memory.signals = Some(signals);
            emitted += 1;
        }

        if direction != self.memory.direction {
            info!(charger_direction = %direction, previous = %self.memory.direction, "Charger");
            self.event_bus.fire_typed(DirectionChangedData {
                previous: self.memory.direction,
                direction,
            });
            self.memory.direction = direction;
            emitted += 1;
        }

        emitted
    }

    pub fn estop_tripped(&self, source: TripSource) {
        warn!(?source, "E-Stop!");
        self.event_bus.fire_typed(EstopTrippedData { source });
    }

    pub fn staging_started(&self, heading: Heading, window: Duration) {
        info!(%heading, window_secs = window.as_secs(), "Staging started");
        self.event_bus.fire_typed(StagingStartedData {
            heading,
            window_secs: window.as_secs(),
        });
    }

    pub fn staging_expired(&self, active_for: Duration) {
        info!(active_secs = active_for.as_secs(), "Staging expired");
        self.event_bus.fire_typed(StagingExpiredData {
            active_secs: active_for.as_secs(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charger_core::events::{DIRECTION_CHANGED, SIGNALS_CHANGED};

    fn reporter() -> (StatusReporter, Arc<EventBus>) {
        let bus = Arc::new(EventBus::new());
        (StatusReporter::new(bus.clone()), bus)
    }

    #[test]
    fn test_first_observation_reports_signals() {
        let (mut reporter, bus) = reporter();
        let mut rx = bus.subscribe(SIGNALS_CHANGED);

        let t = TelemetrySnapshot::failsafe("Home");
        assert_eq!(reporter.observe(&t, Direction::Down), 2);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.data["charge_door"], "open");
        assert_eq!(event.data["geofence"]["name"], "Home");
    }

    #[test]
    fn test_unchanged_state_is_silent() {
        let (mut reporter, bus) = reporter();
        let mut all = bus.subscribe_all();
        let t = TelemetrySnapshot::failsafe("Home");

        reporter.observe(&t, Direction::Down);
        for _ in 0..20 {
            assert_eq!(reporter.observe(&t, Direction::Down), 0);
        }

        assert!(all.try_recv().is_ok());
        assert!(all.try_recv().is_ok());
        assert!(all.try_recv().is_err());
    }

    #[test]
    fn test_initial_hold_is_not_a_change() {
        let (mut reporter, bus) = reporter();
        let mut rx = bus.subscribe(DIRECTION_CHANGED);
        reporter.observe(&TelemetrySnapshot::unknown(), Direction::Hold);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_direction_change_reported_once() {
        let (mut reporter, bus) = reporter();
        let mut rx = bus.subscribe(DIRECTION_CHANGED);
        let t = TelemetrySnapshot::failsafe("Home");

        reporter.observe(&t, Direction::Down);
        reporter.observe(&t, Direction::Up);
        reporter.observe(&t, Direction::Up);

        assert_eq!(rx.try_recv().unwrap().data["direction"], "down");
        let second = rx.try_recv().unwrap();
        assert_eq!(second.data["previous"], "down");
        assert_eq!(second.data["direction"], "up");
        assert!(rx.try_recv().is_err());
        assert_eq!(reporter.memory().direction, Direction::Up);
    }

    #[test]
    fn test_signal_changes_ignore_other_fields() {
        let (mut reporter, _bus) = reporter();
        let mut t = TelemetrySnapshot::failsafe("Home");
        reporter.observe(&t, Direction::Down);

        t.heading = Heading::new(90);
        assert_eq!(reporter.observe(&t, Direction::Down), 0);

        t.geofence = Geofence::Empty;
        assert_eq!(reporter.observe(&t, Direction::Down), 1);
    }
}
