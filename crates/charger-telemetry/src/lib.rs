//! Telemetry storage for the charger controller
//!
//! This crate provides the TelemetryStore, which holds the latest value of
//! every tracked vehicle signal. Transport callbacks write one signal each,
//! concurrently and in any order; the control loop reads a snapshot once per
//! tick. Updates are last-write-wins per signal and there is no cross-signal
//! consistency.

mod payload;
mod topics;

pub use payload::{Reading, TelemetryError, TelemetryResult};
pub use topics::Topics;

use charger_core::events::{TelemetryReceivedData, TelemetryRejectedData};
use charger_core::{Signal, TelemetrySnapshot};
use charger_event_bus::EventBus;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The telemetry store tracks the latest reading of each signal
pub struct TelemetryStore {
    /// Latest accepted reading per signal
    readings: DashMap<Signal, Reading>,
    /// Malformed payload count per signal
    rejected: DashMap<Signal, u64>,
    /// Event bus for received/rejected events
    event_bus: Arc<EventBus>,
}

impl TelemetryStore {
    /// Create a store with every signal unknown
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            readings: DashMap::new(),
            rejected: DashMap::new(),
            event_bus,
        }
    }

    /// Create a store seeded with the failsafe "at home, door open" state
    pub fn with_failsafe(event_bus: Arc<EventBus>, home: &str) -> Self {
        let store = Self::new(event_bus);
        let seed = TelemetrySnapshot::failsafe(home);
        store
            .readings
            .insert(Signal::Geofence, Reading::Geofence(seed.geofence));
        store
            .readings
            .insert(Signal::ChargePortDoorOpen, Reading::ChargeDoor(seed.charge_door));
        store
    }

    /// Parse and store a raw payload for `signal`
    ///
    /// A payload that fails to parse leaves the prior value in place; the
    /// rejection is counted, logged and fired on the bus.
    #[instrument(skip_all, fields(signal = %signal))]
    pub fn ingest(&self, signal: Signal, payload: &str) -> TelemetryResult<Reading> {
        match Reading::parse(signal, payload) {
            Ok(reading) => {
                self.set(reading.clone());
                Ok(reading)
            }
            Err(err) => {
                let rejected_total = {
                    let mut count = self.rejected.entry(signal).or_insert(0);
                    *count += 1;
                    *count
                };
                warn!(payload, error = %err, rejected_total, "Ignoring malformed telemetry");
                self.event_bus.fire_typed(TelemetryRejectedData {
                    signal,
                    payload: payload.to_string(),
                    reason: err.to_string(),
                    rejected_total,
                });
                Err(err)
            }
        }
    }

    /// Store an already-parsed reading
    pub fn set(&self, reading: Reading) {
        let signal = reading.signal();
        let value = reading.value();
        let previous = self.readings.insert(signal, reading);
        let changed = previous.as_ref().map(Reading::value).as_deref() != Some(value.as_str());

        match signal {
            // Geofence repeats on every position update; only log changes
            Signal::Geofence if changed => info!(geofence = %value, "MQTT"),
            Signal::Geofence => {}
            Signal::ChargePortDoorOpen => info!(charge_door = %value, "MQTT"),
            Signal::CarState => info!(car_state = %value, "MQTT"),
            Signal::Heading | Signal::ShiftState => debug!(%signal, %value, changed, "MQTT"),
        }

        self.event_bus
            .fire_typed(TelemetryReceivedData { signal, value });
    }

    /// Current value of every signal
    pub fn snapshot(&self) -> TelemetrySnapshot {
        let mut snapshot = TelemetrySnapshot::unknown();
        for entry in self.readings.iter() {
            match entry.value() {
                Reading::Geofence(g) => snapshot.geofence = g.clone(),
                Reading::ChargeDoor(d) => snapshot.charge_door = *d,
                Reading::CarState(c) => snapshot.car_state = Some(*c),
                Reading::Heading(h) => snapshot.heading = Some(*h),
                Reading::ShiftState(s) => snapshot.shift_state = *s,
            }
        }
        snapshot
    }

    /// Malformed payloads seen on `signal` since startup
    pub fn rejected_count(&self, signal: Signal) -> u64 {
        self.rejected.get(&signal).map(|c| *c).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charger_core::events::{TELEMETRY_RECEIVED, TELEMETRY_REJECTED};
    use charger_core::{CarState, DoorState, Geofence, Heading, ShiftState};

    fn store() -> (TelemetryStore, Arc<EventBus>) {
        let bus = Arc::new(EventBus::new());
        (TelemetryStore::new(bus.clone()), bus)
    }

    #[test]
    fn test_new_store_is_unknown() {
        let (store, _) = store();
        assert_eq!(store.snapshot(), TelemetrySnapshot::unknown());
    }

    #[test]
    fn test_failsafe_seed() {
        let bus = Arc::new(EventBus::new());
        let store = TelemetryStore::with_failsafe(bus, "Home");
        let snapshot = store.snapshot();
        assert!(snapshot.geofence.is_zone("Home"));
        assert_eq!(snapshot.charge_door, DoorState::Open);
        assert_eq!(snapshot.shift_state, None);
    }

    #[test]
    fn test_fields_update_independently() {
        let (store, _) = store();
        store.ingest(Signal::Geofence, "Home").unwrap();
        store.ingest(Signal::ShiftState, "R").unwrap();
        store.ingest(Signal::Heading, "350").unwrap();
        store.ingest(Signal::CarState, "online").unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.geofence, Geofence::zone("Home"));
        assert_eq!(snapshot.shift_state, Some(ShiftState::Reverse));
        assert_eq!(snapshot.heading, Heading::new(350));
        assert_eq!(snapshot.car_state, Some(CarState::Online));
        assert_eq!(snapshot.charge_door, DoorState::Unknown);
    }

    #[test]
    fn test_last_write_wins() {
        let (store, _) = store();
        store.ingest(Signal::ChargePortDoorOpen, "true").unwrap();
        store.ingest(Signal::ChargePortDoorOpen, "false").unwrap();
        assert_eq!(store.snapshot().charge_door, DoorState::Closed);
    }

    #[test]
    fn test_malformed_payload_keeps_prior_value() {
        let (store, bus) = store();
        let mut rejected = bus.subscribe(TELEMETRY_REJECTED);

        store.ingest(Signal::ChargePortDoorOpen, "true").unwrap();
        assert!(store.ingest(Signal::ChargePortDoorOpen, "maybe").is_err());
        assert!(store.ingest(Signal::ChargePortDoorOpen, "").is_err());

        assert_eq!(store.snapshot().charge_door, DoorState::Open);
        assert_eq!(store.rejected_count(Signal::ChargePortDoorOpen), 2);
        assert_eq!(store.rejected_count(Signal::Heading), 0);

        let first = rejected.try_recv().unwrap();
        assert_eq!(first.data["payload"], "maybe");
        let second = rejected.try_recv().unwrap();
        assert_eq!(second.data["rejected_total"], 2);
    }

    #[test]
    fn test_empty_geofence_replaces_zone() {
        let (store, _) = store();
        store.ingest(Signal::Geofence, "Home").unwrap();
        store.ingest(Signal::Geofence, "").unwrap();
        assert_eq!(store.snapshot().geofence, Geofence::Empty);
    }

    #[test]
    fn test_received_event_carries_normalized_value() {
        let (store, bus) = store();
        let mut received = bus.subscribe(TELEMETRY_RECEIVED);

        store.ingest(Signal::ChargePortDoorOpen, "True").unwrap();

        let event = received.try_recv().unwrap();
        assert_eq!(event.data["signal"], "charge_port_door_open");
        assert_eq!(event.data["value"], "open");
    }

    #[tokio::test]
    async fn test_concurrent_writers() {
        let bus = Arc::new(EventBus::new());
        let store = Arc::new(TelemetryStore::new(bus));

        let mut handles = Vec::new();
        for (signal, payload) in [
            (Signal::Geofence, "Home"),
            (Signal::ChargePortDoorOpen, "false"),
            (Signal::CarState, "asleep"),
            (Signal::Heading, "12"),
            (Signal::ShiftState, "P"),
        ] {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    store.ingest(signal, payload).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.charge_door, DoorState::Closed);
        assert_eq!(snapshot.car_state, Some(CarState::Asleep));
        assert_eq!(snapshot.shift_state, Some(ShiftState::Park));
    }
}
