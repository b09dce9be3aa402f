//! Raw payload parsing
//!
//! Every topic carries a bare text value. Parsing turns it into a closed
//! type or a `TelemetryError`; nothing unrecognized is silently coerced.

use charger_core::{CarState, DoorState, Geofence, Heading, ShiftState, Signal};
use thiserror::Error;

/// Result type for payload parsing
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Errors raised by malformed telemetry payloads
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("'{payload}' is not a boolean")]
    InvalidBool { payload: String },

    #[error("'{payload}' is not an integer heading")]
    InvalidHeading { payload: String },

    #[error("heading {degrees} is outside 0..=359")]
    HeadingOutOfRange { degrees: i64 },

    #[error("unrecognized car state '{payload}'")]
    UnknownCarState { payload: String },

    #[error("unrecognized shift state '{payload}'")]
    UnknownShiftState { payload: String },
}

/// A parsed value for one signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reading {
    Geofence(Geofence),
    ChargeDoor(DoorState),
    CarState(CarState),
    Heading(Heading),
    /// `None` when the car reports no gear (empty payload)
    ShiftState(Option<ShiftState>),
}

impl Reading {
    /// Parse a payload published for `signal`
    pub fn parse(signal: Signal, payload: &str) -> TelemetryResult<Self> {
        match signal {
            Signal::Geofence => Ok(Reading::Geofence(Geofence::from_payload(payload))),
            Signal::ChargePortDoorOpen => {
                parse_bool(payload).map(|open| Reading::ChargeDoor(DoorState::from_open(open)))
            }
            Signal::CarState => parse_car_state(payload).map(Reading::CarState),
            Signal::Heading => parse_heading(payload).map(Reading::Heading),
            Signal::ShiftState => parse_shift_state(payload).map(Reading::ShiftState),
        }
    }

    /// The signal this reading belongs to
    pub fn signal(&self) -> Signal {
        match self {
            Reading::Geofence(_) => Signal::Geofence,
            Reading::ChargeDoor(_) => Signal::ChargePortDoorOpen,
            Reading::CarState(_) => Signal::CarState,
            Reading::Heading(_) => Signal::Heading,
            Reading::ShiftState(_) => Signal::ShiftState,
        }
    }

    /// Normalized value for logs and events
    pub fn value(&self) -> String {
        match self {
            Reading::Geofence(g) => g.to_string(),
            Reading::ChargeDoor(d) => d.to_string(),
            Reading::CarState(c) => c.to_string(),
            Reading::Heading(h) => h.to_string(),
            Reading::ShiftState(Some(s)) => s.to_string(),
            Reading::ShiftState(None) => "unknown".to_string(),
        }
    }
}

/// Accepts `1`, `t`, `true` and `0`, `f`, `false` in lower, upper and title case
fn parse_bool(payload: &str) -> TelemetryResult<bool> {
    match payload {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(TelemetryError::InvalidBool {
            payload: payload.to_string(),
        }),
    }
}

fn parse_heading(payload: &str) -> TelemetryResult<Heading> {
    let degrees: i64 = payload
        .trim()
        .parse()
        .map_err(|_| TelemetryError::InvalidHeading {
            payload: payload.to_string(),
        })?;
    u16::try_from(degrees)
        .ok()
        .and_then(Heading::new)
        .ok_or(TelemetryError::HeadingOutOfRange { degrees })
}

fn parse_car_state(payload: &str) -> TelemetryResult<CarState> {
    CarState::ALL
        .into_iter()
        .find(|state| state.as_str() == payload)
        .ok_or_else(|| TelemetryError::UnknownCarState {
            payload: payload.to_string(),
        })
}

fn parse_shift_state(payload: &str) -> TelemetryResult<Option<ShiftState>> {
    if payload.is_empty() {
        return Ok(None);
    }
    ShiftState::from_code(payload)
        .map(Some)
        .ok_or_else(|| TelemetryError::UnknownShiftState {
            payload: payload.to_string(),
        })
}
