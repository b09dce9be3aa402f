//! Vehicle telemetry signals and the snapshot read once per control tick

use serde::{Deserialize, Serialize};
use std::fmt;

/// A tracked telemetry signal, one per transport topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Geofence,
    ChargePortDoorOpen,
    CarState,
    Heading,
    ShiftState,
}

impl Signal {
    /// Every tracked signal, in subscription order
    pub const ALL: [Signal; 5] = [
        Signal::Geofence,
        Signal::ChargePortDoorOpen,
        Signal::CarState,
        Signal::Heading,
        Signal::ShiftState,
    ];

    /// The topic suffix this signal is published under
    pub fn topic_suffix(&self) -> &'static str {
        match self {
            Signal::Geofence => "geofence",
            Signal::ChargePortDoorOpen => "charge_port_door_open",
            Signal::CarState => "state",
            Signal::Heading => "heading",
            Signal::ShiftState => "shift_state",
        }
    }

    /// Look up a signal by its topic suffix
    pub fn from_topic_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.topic_suffix() == suffix)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic_suffix())
    }
}

/// Geofence reading
///
/// `Unset` (never received) and `Empty` (an empty payload was received) are
/// distinct from each other and from every named zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Geofence {
    #[default]
    Unset,
    Empty,
    Zone(String),
}

impl Geofence {
    /// Normalize a raw payload: the empty string becomes `Empty`
    pub fn from_payload(payload: &str) -> Self {
        if payload.is_empty() {
            Geofence::Empty
        } else {
            Geofence::Zone(payload.to_string())
        }
    }

    /// A named zone
    pub fn zone(name: impl Into<String>) -> Self {
        Geofence::Zone(name.into())
    }

    /// True once any payload has been received
    pub fn is_known(&self) -> bool {
        !matches!(self, Geofence::Unset)
    }

    /// True only for the exact named zone
    pub fn is_zone(&self, name: &str) -> bool {
        matches!(self, Geofence::Zone(zone) if zone == name)
    }

    /// Value as logged: the zone name or the sentinel
    pub fn as_str(&self) -> &str {
        match self {
            Geofence::Unset => "unset",
            Geofence::Empty => "empty",
            Geofence::Zone(zone) => zone,
        }
    }
}

impl fmt::Display for Geofence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Charge-port door state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorState {
    #[default]
    Unknown,
    Open,
    Closed,
}

impl DoorState {
    pub fn from_open(open: bool) -> Self {
        if open {
            DoorState::Open
        } else {
            DoorState::Closed
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, DoorState::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DoorState::Unknown => "unknown",
            DoorState::Open => "open",
            DoorState::Closed => "closed",
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Car power state as reported by the vehicle logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarState {
    Online,
    Offline,
    Asleep,
    Suspended,
    Charging,
    Driving,
    Updating,
    Start,
}

impl CarState {
    pub const ALL: [CarState; 8] = [
        CarState::Online,
        CarState::Offline,
        CarState::Asleep,
        CarState::Suspended,
        CarState::Charging,
        CarState::Driving,
        CarState::Updating,
        CarState::Start,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CarState::Online => "online",
            CarState::Offline => "offline",
            CarState::Asleep => "asleep",
            CarState::Suspended => "suspended",
            CarState::Charging => "charging",
            CarState::Driving => "driving",
            CarState::Updating => "updating",
            CarState::Start => "start",
        }
    }

    /// Only the literal `online` state lights the status indicator
    pub fn is_online(&self) -> bool {
        matches!(self, CarState::Online)
    }
}

impl fmt::Display for CarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compass heading in whole degrees, 0..=359
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Heading(u16);

impl Heading {
    /// Create a heading, rejecting values outside 0..=359
    pub fn new(degrees: u16) -> Option<Self> {
        (degrees < 360).then_some(Self(degrees))
    }

    pub fn degrees(&self) -> u16 {
        self.0
    }

    /// Inclusive arc check; `from > to` wraps through north
    pub fn within(&self, from: u16, to: u16) -> bool {
        if from <= to {
            (from..=to).contains(&self.0)
        } else {
            self.0 >= from || self.0 <= to
        }
    }
}

impl TryFrom<u16> for Heading {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Heading::new(degrees).ok_or_else(|| format!("heading {} out of range 0..=359", degrees))
    }
}

impl From<Heading> for u16 {
    fn from(heading: Heading) -> Self {
        heading.0
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gear selector position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftState {
    #[serde(rename = "P")]
    Park,
    #[serde(rename = "R")]
    Reverse,
    #[serde(rename = "N")]
    Neutral,
    #[serde(rename = "D")]
    Drive,
}

impl ShiftState {
    /// Single-letter gear code
    pub fn code(&self) -> &'static str {
        match self {
            ShiftState::Park => "P",
            ShiftState::Reverse => "R",
            ShiftState::Neutral => "N",
            ShiftState::Drive => "D",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P" => Some(ShiftState::Park),
            "R" => Some(ShiftState::Reverse),
            "N" => Some(ShiftState::Neutral),
            "D" => Some(ShiftState::Drive),
            _ => None,
        }
    }
}

impl fmt::Display for ShiftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The latest known value of every tracked signal
///
/// Fields are updated independently by the transport, so a snapshot may mix
/// a fresh value of one signal with a stale value of another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub geofence: Geofence,
    pub charge_door: DoorState,
    pub car_state: Option<CarState>,
    pub heading: Option<Heading>,
    pub shift_state: Option<ShiftState>,
}

impl TelemetrySnapshot {
    /// Nothing received yet
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Startup state before any telemetry: at home with the door open
    pub fn failsafe(home: &str) -> Self {
        Self {
            geofence: Geofence::zone(home),
            charge_door: DoorState::Open,
            ..Self::default()
        }
    }

    pub fn car_online(&self) -> bool {
        self.car_state.is_some_and(|s| s.is_online())
    }
}
