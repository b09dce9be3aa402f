//! Error types for hardware backends

use thiserror::Error;

/// Result type for hardware operations
pub type HalResult<T> = Result<T, HalError>;

/// Errors that can occur while acquiring hardware
#[derive(Debug, Error)]
pub enum HalError {
    /// The requested backend was not compiled in
    #[error("GPIO backend '{0}' is not available in this build")]
    BackendUnavailable(String),

    /// The GPIO peripheral or a pin could not be acquired
    #[cfg(feature = "rpi")]
    #[error("GPIO pin {pin}: {source}")]
    Gpio {
        pin: u8,
        #[source]
        source: rppal::gpio::Error,
    },

    /// The GPIO peripheral could not be opened
    #[cfg(feature = "rpi")]
    #[error("failed to open GPIO: {0}")]
    Open(#[source] rppal::gpio::Error),
}
