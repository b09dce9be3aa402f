//! Actuator driver
//!
//! Turns a `Direction` into pin levels. No decisions are made here: the
//! same direction always produces the same outputs, so re-applying every
//! tick is safe.

use charger_core::Direction;
use std::time::{Duration, Instant};
use tracing::trace;

use crate::gpio::OutputPin;

/// Time between status indicator toggles while blinking (1 Hz)
pub const BLINK_HALF_PERIOD: Duration = Duration::from_millis(500);

/// What the status indicator should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorMode {
    Solid,
    Off,
    Blink,
}

/// Drives the motor lines and both indicators
pub struct ActuatorDriver {
    up: Box<dyn OutputPin>,
    down: Box<dyn OutputPin>,
    enable: Box<dyn OutputPin>,
    status_led: Box<dyn OutputPin>,
    direction_led: Box<dyn OutputPin>,
    /// When the status indicator last toggled while blinking
    last_toggle: Option<Instant>,
}

impl ActuatorDriver {
    pub fn new(
        up: Box<dyn OutputPin>,
        down: Box<dyn OutputPin>,
        enable: Box<dyn OutputPin>,
        status_led: Box<dyn OutputPin>,
        direction_led: Box<dyn OutputPin>,
    ) -> Self {
        Self {
            up,
            down,
            enable,
            status_led,
            direction_led,
            last_toggle: None,
        }
    }

    /// Assert the outputs for `direction`
    ///
    /// The opposing direction line always drops before the new one rises, so
    /// `up` and `down` are never high together. `Hold` disables the motor.
    pub fn apply(&mut self, direction: Direction) {
        trace!(%direction, "Applying direction");
        match direction {
            Direction::Up => {
                self.enable.set_high();
                self.down.set_low();
                self.up.set_high();
                self.direction_led.set_low();
            }
            Direction::Down => {
                self.enable.set_high();
                self.up.set_low();
                self.down.set_high();
                self.direction_led.set_high();
            }
            Direction::Hold => {
                self.enable.set_low();
                self.up.set_low();
                self.down.set_low();
                self.direction_led.set_low();
            }
        }
    }

    /// Update the status indicator
    pub fn show_status(&mut self, mode: IndicatorMode, now: Instant) {
        match mode {
            IndicatorMode::Solid => {
                self.status_led.set_high();
                self.last_toggle = None;
            }
            IndicatorMode::Off => {
                self.status_led.set_low();
                self.last_toggle = None;
            }
            IndicatorMode::Blink => {
                let due = self
                    .last_toggle
                    .map_or(true, |at| now.saturating_duration_since(at) >= BLINK_HALF_PERIOD);
                if due {
                    self.status_led.toggle();
                    self.last_toggle = Some(now);
                }
            }
        }
    }
}
