//! Pin backend selection

use charger_config::GpioBackend;
use charger_hal::{ChargerPins, HalResult, SimulatedBoard};
use tracing::warn;

/// Acquire the pin set for `backend`
pub fn open(backend: GpioBackend) -> HalResult<ChargerPins> {
    match backend {
        GpioBackend::None => {
            warn!("No GPIO backend, outputs are simulated");
            let (pins, _board) = SimulatedBoard::build();
            Ok(pins)
        }
        GpioBackend::Rpi => open_rpi(),
    }
}

#[cfg(feature = "rpi")]
fn open_rpi() -> HalResult<ChargerPins> {
    charger_hal::rpi::open()
}

#[cfg(not(feature = "rpi"))]
fn open_rpi() -> HalResult<ChargerPins> {
    Err(charger_hal::HalError::BackendUnavailable(
        GpioBackend::Rpi.as_str().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_backend_opens() {
        assert!(open(GpioBackend::None).is_ok());
    }

    #[cfg(not(feature = "rpi"))]
    #[test]
    fn test_rpi_unavailable_without_feature() {
        use charger_hal::HalError;

        let err = open(GpioBackend::Rpi).err().unwrap();
        assert!(matches!(err, HalError::BackendUnavailable(_)));
        assert!(err.to_string().contains("rpi"));
    }
}
