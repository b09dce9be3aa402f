//! Raspberry Pi GPIO backend
//!
//! Built only with the `rpi` feature. Pins are addressed by BCM number.

use rppal::gpio::Gpio;
use tracing::info;

use crate::error::{HalError, HalResult};
use crate::gpio::{InputPin, OutputPin};
use crate::pins::{self, ChargerPins};

pub struct RpiOutput(rppal::gpio::OutputPin);

impl OutputPin for RpiOutput {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn toggle(&mut self) {
        self.0.toggle();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

pub struct RpiInput(rppal::gpio::InputPin);

impl InputPin for RpiInput {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

fn output(gpio: &Gpio, pin: u8) -> HalResult<Box<dyn OutputPin>> {
    let line = gpio
        .get(pin)
        .map_err(|source| HalError::Gpio { pin, source })?
        .into_output_low();
    Ok(Box::new(RpiOutput(line)))
}

/// Acquire every charger line on the local GPIO header
pub fn open() -> HalResult<ChargerPins> {
    let gpio = Gpio::new().map_err(HalError::Open)?;
    let estop = gpio
        .get(pins::ESTOP)
        .map_err(|source| HalError::Gpio {
            pin: pins::ESTOP,
            source,
        })?
        .into_input_pullup();

    let set = ChargerPins {
        up: output(&gpio, pins::UP)?,
        down: output(&gpio, pins::DOWN)?,
        enable: output(&gpio, pins::ENABLE)?,
        status_led: output(&gpio, pins::STATUS_LED)?,
        direction_led: output(&gpio, pins::DIRECTION_LED)?,
        estop: Box::new(RpiInput(estop)),
    };
    info!("Raspberry Pi GPIO opened");
    Ok(set)
}
