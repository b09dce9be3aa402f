//! Core types for the charger controller
//!
//! This crate provides the fundamental types shared by every other crate in
//! the workspace: the closed telemetry enumerations, the `TelemetrySnapshot`
//! read by the decision engine, the latched `SafetyState`, the `Direction`
//! the engine produces, and the `Event` envelope carried on the event bus.

mod direction;
mod event;
mod safety;
mod telemetry;

pub use direction::Direction;
pub use event::{Event, EventData, EventType};
pub use safety::SafetyState;
pub use telemetry::{
    CarState, DoorState, Geofence, Heading, ShiftState, Signal, TelemetrySnapshot,
};

/// Standard event types fired by the controller
pub mod events {
    use super::*;
    use serde::{Deserialize, Serialize};

    /// A telemetry payload was accepted into the store
    pub const TELEMETRY_RECEIVED: &str = "telemetry_received";

    /// A telemetry payload failed to parse and was dropped
    pub const TELEMETRY_REJECTED: &str = "telemetry_rejected";

    /// The (geofence, charge door) pair changed since it was last reported
    pub const SIGNALS_CHANGED: &str = "signals_changed";

    /// The commanded charger direction changed
    pub const DIRECTION_CHANGED: &str = "direction_changed";

    /// The emergency stop latched
    pub const ESTOP_TRIPPED: &str = "estop_tripped";

    /// The pre-drop staging window opened
    pub const STAGING_STARTED: &str = "staging_started";

    /// The pre-drop staging window elapsed
    pub const STAGING_EXPIRED: &str = "staging_expired";

    /// Data for TELEMETRY_RECEIVED events
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TelemetryReceivedData {
        pub signal: Signal,
        /// Normalized value as it will be read by the decision engine
        pub value: String,
    }

    impl EventData for TelemetryReceivedData {
        fn event_type() -> &'static str {
            TELEMETRY_RECEIVED
        }
    }

    /// Data for TELEMETRY_REJECTED events
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TelemetryRejectedData {
        pub signal: Signal,
        pub payload: String,
        pub reason: String,
        /// Total rejections seen on this signal, including this one
        pub rejected_total: u64,
    }

    impl EventData for TelemetryRejectedData {
        fn event_type() -> &'static str {
            TELEMETRY_REJECTED
        }
    }

    /// Data for SIGNALS_CHANGED events
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SignalsChangedData {
        pub geofence: Geofence,
        pub charge_door: DoorState,
    }

    impl EventData for SignalsChangedData {
        fn event_type() -> &'static str {
            SIGNALS_CHANGED
        }
    }

    /// Data for DIRECTION_CHANGED events
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DirectionChangedData {
        pub previous: Direction,
        pub direction: Direction,
    }

    impl EventData for DirectionChangedData {
        fn event_type() -> &'static str {
            DIRECTION_CHANGED
        }
    }

    /// What latched the emergency stop
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TripSource {
        /// The active-low E-stop input read asserted
        Input,
        /// Latched programmatically
        Software,
    }

    /// Data for ESTOP_TRIPPED events
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct EstopTrippedData {
        pub source: TripSource,
    }

    impl EventData for EstopTrippedData {
        fn event_type() -> &'static str {
            ESTOP_TRIPPED
        }
    }

    /// Data for STAGING_STARTED events
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct StagingStartedData {
        pub heading: Heading,
        pub window_secs: u64,
    }

    impl EventData for StagingStartedData {
        fn event_type() -> &'static str {
            STAGING_STARTED
        }
    }

    /// Data for STAGING_EXPIRED events
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct StagingExpiredData {
        pub active_secs: u64,
    }

    impl EventData for StagingExpiredData {
        fn event_type() -> &'static str {
            STAGING_EXPIRED
        }
    }
}
