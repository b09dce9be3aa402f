//! Pin assignments and the pin set handed to the controller

use crate::actuator::ActuatorDriver;
use crate::gpio::{InputPin, OutputPin};
use crate::safety::SafetyMonitor;

/// Motor up direction (BCM numbering)
pub const UP: u8 = 27;

/// Motor down direction
pub const DOWN: u8 = 17;

/// Motor driver enable
pub const ENABLE: u8 = 22;

/// Status indicator: car online, blinks while the E-stop is latched
pub const STATUS_LED: u8 = 23;

/// Direction indicator: lit while retracted
pub const DIRECTION_LED: u8 = 24;

/// Emergency stop input, active low with pull-up
pub const ESTOP: u8 = 26;

/// Every line the controller drives or reads
pub struct ChargerPins {
    pub up: Box<dyn OutputPin>,
    pub down: Box<dyn OutputPin>,
    pub enable: Box<dyn OutputPin>,
    pub status_led: Box<dyn OutputPin>,
    pub direction_led: Box<dyn OutputPin>,
    pub estop: Box<dyn InputPin>,
}

impl ChargerPins {
    /// Hand the outputs to the actuator driver and the input to the E-stop monitor
    pub fn split(self) -> (ActuatorDriver, SafetyMonitor) {
        let driver = ActuatorDriver::new(
            self.up,
            self.down,
            self.enable,
            self.status_led,
            self.direction_led,
        );
        (driver, SafetyMonitor::new(self.estop))
    }
}
