//! Hardware abstraction for the charger controller
//!
//! The control loop only talks to digital pins through the capability traits
//! in [`gpio`]. A backend is picked once, at construction:
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │  ActuatorDriver / SafetyMonitor           │
//! └───────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌───────────────────────────────────────────┐
//! │  gpio::OutputPin / gpio::InputPin         │
//! └───────────────────────────────────────────┘
//!          │                         │
//!          ▼                         ▼
//! ┌─────────────────┐       ┌─────────────────┐
//! │  sim (no-op,    │       │  rpi (rppal,    │
//! │  inspectable)   │       │  feature "rpi") │
//! └─────────────────┘       └─────────────────┘
//! ```

#![deny(unsafe_code)]

pub mod actuator;
pub mod error;
pub mod gpio;
pub mod pins;
#[cfg(feature = "rpi")]
pub mod rpi;
pub mod safety;
pub mod sim;

pub use actuator::{ActuatorDriver, IndicatorMode, BLINK_HALF_PERIOD};
pub use error::{HalError, HalResult};
pub use gpio::{InputPin, OutputPin};
pub use pins::ChargerPins;
pub use safety::SafetyMonitor;
pub use sim::{PinLevels, SimulatedBoard, SimulatedPin};
