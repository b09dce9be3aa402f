//! Simulated pins
//!
//! Used wherever there is no GPIO hardware. Writes only update an in-memory
//! level, and a [`SimulatedBoard`] keeps handles to the same levels so the
//! outputs can be observed and the E-stop pressed from outside.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::gpio::{InputPin, OutputPin};
use crate::pins::ChargerPins;

/// A pin whose level lives in memory; clones share the level
#[derive(Debug, Clone, Default)]
pub struct SimulatedPin {
    level: Arc<AtomicBool>,
}

impl SimulatedPin {
    pub fn new(high: bool) -> Self {
        Self {
            level: Arc::new(AtomicBool::new(high)),
        }
    }

    pub fn level(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }

    /// Drive the level from outside, as a wired input would
    pub fn drive(&self, high: bool) {
        self.level.store(high, Ordering::SeqCst);
    }
}

impl OutputPin for SimulatedPin {
    fn set_high(&mut self) {
        self.drive(true);
    }

    fn set_low(&mut self) {
        self.drive(false);
    }

    fn is_set_high(&self) -> bool {
        self.level()
    }
}

impl InputPin for SimulatedPin {
    fn is_high(&self) -> bool {
        self.level()
    }
}

/// Output levels of every driven line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLevels {
    pub up: bool,
    pub down: bool,
    pub enable: bool,
    pub status_led: bool,
    pub direction_led: bool,
}

/// Observer side of a simulated pin set
#[derive(Debug, Clone)]
pub struct SimulatedBoard {
    up: SimulatedPin,
    down: SimulatedPin,
    enable: SimulatedPin,
    status_led: SimulatedPin,
    direction_led: SimulatedPin,
    estop: SimulatedPin,
}

impl SimulatedBoard {
    /// Build a pin set with all outputs low and the E-stop released
    pub fn build() -> (ChargerPins, SimulatedBoard) {
        let board = SimulatedBoard {
            up: SimulatedPin::new(false),
            down: SimulatedPin::new(false),
            enable: SimulatedPin::new(false),
            status_led: SimulatedPin::new(false),
            direction_led: SimulatedPin::new(false),
            // Pulled up: high means released
            estop: SimulatedPin::new(true),
        };
        let pins = ChargerPins {
            up: Box::new(board.up.clone()),
            down: Box::new(board.down.clone()),
            enable: Box::new(board.enable.clone()),
            status_led: Box::new(board.status_led.clone()),
            direction_led: Box::new(board.direction_led.clone()),
            estop: Box::new(board.estop.clone()),
        };
        (pins, board)
    }

    pub fn levels(&self) -> PinLevels {
        PinLevels {
            up: self.up.level(),
            down: self.down.level(),
            enable: self.enable.level(),
            status_led: self.status_led.level(),
            direction_led: self.direction_led.level(),
        }
    }

    /// Pull the E-stop line low
    pub fn press_estop(&self) {
        self.estop.drive(false);
    }

    /// Release the E-stop line
    pub fn release_estop(&self) {
        self.estop.drive(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_level() {
        let pin = SimulatedPin::new(false);
        let mut output = pin.clone();
        output.set_high();
        assert!(pin.level());
        output.toggle();
        assert!(!pin.level());
    }

    #[test]
    fn test_board_observes_pins() {
        let (mut pins, board) = SimulatedBoard::build();
        assert!(pins.estop.is_high());

        pins.up.set_high();
        board.press_estop();

        assert!(board.levels().up);
        assert!(pins.estop.is_low());
    }
}
