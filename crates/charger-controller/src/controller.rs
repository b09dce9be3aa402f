//! The control loop

use charger_core::{Direction, SafetyState};
use charger_engine::{evaluate, DecisionInput, StagingState, StagingTimer};
use charger_event_bus::EventBus;
use charger_hal::{ActuatorDriver, ChargerPins, IndicatorMode, SafetyMonitor};
use charger_telemetry::TelemetryStore;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::reporter::StatusReporter;

/// Owns every piece of per-tick state
///
/// Only the control loop mutates the safety latch, the staging window and
/// the outputs. Telemetry is shared with the transport through the store.
pub struct Controller {
    store: Arc<TelemetryStore>,
    driver: ActuatorDriver,
    safety: SafetyMonitor,
    staging: StagingTimer,
    reporter: StatusReporter,
    home: String,
    /// Last direction actually applied to the outputs
    commanded: Direction,
}

impl Controller {
    pub fn new(
        store: Arc<TelemetryStore>,
        pins: ChargerPins,
        event_bus: Arc<EventBus>,
        home: impl Into<String>,
        staging_duration: Duration,
    ) -> Self {
        let (driver, safety) = pins.split();
        Self {
            store,
            driver,
            safety,
            staging: StagingTimer::new(staging_duration),
            reporter: StatusReporter::new(event_bus),
            home: home.into(),
            commanded: Direction::Hold,
        }
    }

    pub fn safety(&self) -> &SafetyState {
        self.safety.state()
    }

    pub fn staging(&self) -> &StagingState {
        self.staging.state()
    }

    pub fn commanded(&self) -> Direction {
        self.commanded
    }

    /// Latch the E-stop from software; takes effect on the next tick
    pub fn trip(&mut self) {
        if let Some(source) = self.safety.trip_software() {
            self.reporter.estop_tripped(source);
        }
    }

    /// Run one pass of the loop and return the direction applied
    pub fn tick(&mut self, now: Instant) -> Direction {
        if let Some(source) = self.safety.sample() {
            self.reporter.estop_tripped(source);
        }

        if let Some(active_for) = self.staging.advance(now) {
            self.reporter.staging_expired(active_for);
        }

        let telemetry = self.store.snapshot();
        let decision = evaluate(&DecisionInput {
            telemetry: &telemetry,
            safety: self.safety.state(),
            staging: self.staging.state(),
            home: &self.home,
        });
        debug!(
            rule = decision.rule.unwrap_or("none"),
            direction = %decision.direction,
            "Decided"
        );

        // Arming here feeds the next tick's decision
        if let Some(heading) = self.staging.arm(&telemetry, &self.home, now) {
            self.reporter.staging_started(heading, self.staging.duration());
        }

        let direction = decision.direction.or_previous(self.commanded);
        self.driver.apply(direction);
        self.commanded = direction;

        let indicator = if self.safety.state().is_tripped() {
            IndicatorMode::Blink
        } else if telemetry.car_online() {
            IndicatorMode::Solid
        } else {
            IndicatorMode::Off
        };
        self.driver.show_status(indicator, now);

        self.reporter.observe(&telemetry, direction);
        direction
    }
}

/// Tick `controller` every `period` until `shutdown` resolves
///
/// Ticks that fall behind are skipped rather than bunched up.
pub async fn run<F>(mut controller: Controller, period: Duration, shutdown: F) -> Controller
where
    F: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    info!(period_ms = period.as_millis() as u64, "Control loop started");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                controller.tick(Instant::now());
            }
            _ = &mut shutdown => {
                info!(direction = %controller.commanded(), "Control loop stopped");
                break;
            }
        }
    }
    controller
}
