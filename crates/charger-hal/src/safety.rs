//! Emergency-stop monitor
//!
//! Polls the active-low E-stop input once per tick. The first asserted read
//! latches `SafetyState`; after that the input is never read again, so a
//! flaky or disconnected switch cannot clear the stop.

use charger_core::events::TripSource;
use charger_core::SafetyState;
use tracing::debug;

use crate::gpio::InputPin;

pub struct SafetyMonitor {
    input: Box<dyn InputPin>,
    state: SafetyState,
}

impl SafetyMonitor {
    pub fn new(input: Box<dyn InputPin>) -> Self {
        Self {
            input,
            state: SafetyState::new(),
        }
    }

    /// Sample the input; returns the trip source on the tick it latches
    pub fn sample(&mut self) -> Option<TripSource> {
        if self.state.is_tripped() {
            return None;
        }
        if self.input.is_low() && self.state.trip() {
            debug!("E-stop input asserted");
            return Some(TripSource::Input);
        }
        None
    }

    /// Latch the stop without the physical input
    pub fn trip_software(&mut self) -> Option<TripSource> {
        self.state.trip().then_some(TripSource::Software)
    }

    pub fn state(&self) -> &SafetyState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedBoard;

    fn monitor() -> (SafetyMonitor, SimulatedBoard) {
        let (pins, board) = SimulatedBoard::build();
        let (_, monitor) = pins.split();
        (monitor, board)
    }

    #[test]
    fn test_released_input_does_not_trip() {
        let (mut monitor, _board) = monitor();
        for _ in 0..5 {
            assert_eq!(monitor.sample(), None);
        }
        assert!(!monitor.state().is_tripped());
    }

    #[test]
    fn test_trip_reports_once() {
        let (mut monitor, board) = monitor();
        board.press_estop();
        assert_eq!(monitor.sample(), Some(TripSource::Input));
        assert_eq!(monitor.sample(), None);
        assert!(monitor.state().is_tripped());
    }

    #[test]
    fn test_trip_latches_after_release() {
        let (mut monitor, board) = monitor();
        board.press_estop();
        monitor.sample();
        board.release_estop();
        assert_eq!(monitor.sample(), None);
        assert!(monitor.state().is_tripped());
    }

    #[test]
    fn test_software_trip_shares_latch() {
        let (mut monitor, board) = monitor();
        assert_eq!(monitor.trip_software(), Some(TripSource::Software));
        assert_eq!(monitor.trip_software(), None);

        board.press_estop();
        assert_eq!(monitor.sample(), None);
        assert!(monitor.state().is_tripped());
    }
}
