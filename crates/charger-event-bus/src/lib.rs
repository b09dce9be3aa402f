//! Event bus with typed pub/sub for the charger controller
//!
//! The telemetry store fires an event for every accepted or rejected payload,
//! and the status reporter fires one event per observed transition. Anything
//! interested (logging sinks, tests, a future status publisher) subscribes
//! here instead of being wired into the control loop.

use charger_core::{Event, EventData, EventType};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Default channel capacity for event subscriptions
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// The event bus for publishing and subscribing to events
///
/// Delivery is best effort: with no receivers an event is dropped, and a
/// receiver that falls more than `capacity` events behind sees `Lagged`.
pub struct EventBus {
    /// Map of event types to their broadcast senders
    listeners: DashMap<EventType, broadcast::Sender<Event<serde_json::Value>>>,
    /// Sender for subscribers of every event type
    all_sender: broadcast::Sender<Event<serde_json::Value>>,
    /// Channel capacity
    capacity: usize,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new event bus with specified channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (all_sender, _) = broadcast::channel(capacity);
        Self {
            listeners: DashMap::new(),
            all_sender,
            capacity,
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe(
        &self,
        event_type: impl Into<EventType>,
    ) -> broadcast::Receiver<Event<serde_json::Value>> {
        let event_type = event_type.into();
        trace!(event_type = %event_type, "Subscribing to event type");

        self.listeners
            .entry(event_type)
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(self.capacity);
                tx
            })
            .subscribe()
    }

    /// Subscribe to a typed event, receiving parsed data
    pub fn subscribe_typed<T: EventData + serde::de::DeserializeOwned>(
        &self,
    ) -> TypedEventReceiver<T> {
        TypedEventReceiver::new(self.subscribe(T::event_type()))
    }

    /// Subscribe to all events
    pub fn subscribe_all(&self) -> broadcast::Receiver<Event<serde_json::Value>> {
        self.all_sender.subscribe()
    }

    /// Fire an event to the subscribers of its type and to all-event subscribers
    pub fn fire(&self, event: Event<serde_json::Value>) {
        debug!(event_type = %event.event_type, "Firing event");

        if let Some(sender) = self.listeners.get(&event.event_type) {
            // Send errors only mean there is no active receiver
            let _ = sender.send(event.clone());
        }

        let _ = self.all_sender.send(event);
    }

    /// Fire a typed event
    pub fn fire_typed<T: EventData + serde::Serialize>(&self, data: T) {
        let event = Event::typed(data).map(|data| serde_json::to_value(data).unwrap_or_default());
        self.fire(event);
    }

    /// Number of event types with at least one subscription ever made
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A receiver for typed events
pub struct TypedEventReceiver<T> {
    rx: broadcast::Receiver<Event<serde_json::Value>>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: EventData + serde::de::DeserializeOwned> TypedEventReceiver<T> {
    fn new(rx: broadcast::Receiver<Event<serde_json::Value>>) -> Self {
        Self {
            rx,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Receive the next typed event, skipping payloads that fail to parse
    pub async fn recv(&mut self) -> Result<Event<T>, broadcast::error::RecvError> {
        loop {
            let event = self.rx.recv().await?;
            if let Some(typed) = Self::parse(event) {
                return Ok(typed);
            }
        }
    }

    /// Receive an already-fired event without waiting
    pub fn try_recv(&mut self) -> Result<Event<T>, broadcast::error::TryRecvError> {
        loop {
            let event = self.rx.try_recv()?;
            if let Some(typed) = Self::parse(event) {
                return Ok(typed);
            }
        }
    }

    fn parse(event: Event<serde_json::Value>) -> Option<Event<T>> {
        let data = serde_json::from_value::<T>(event.data.clone()).ok()?;
        Some(event.map(|_| data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charger_core::events::{DirectionChangedData, DIRECTION_CHANGED};
    use charger_core::Direction;
    use serde_json::json;

    #[tokio::test]
    async fn test_subscribe_and_fire() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe("test_event");

        bus.fire(Event::new("test_event", json!({"key": "value"})));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type.as_str(), "test_event");
        assert_eq!(received.data["key"], "value");
    }

    #[tokio::test]
    async fn test_subscribe_all() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe_all();

        bus.fire(Event::new("event_a", json!({})));
        bus.fire(Event::new("event_b", json!({})));

        assert_eq!(rx.recv().await.unwrap().event_type.as_str(), "event_a");
        assert_eq!(rx.recv().await.unwrap().event_type.as_str(), "event_b");
    }

    #[tokio::test]
    async fn test_typed_subscription() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe_typed::<DirectionChangedData>();

        bus.fire_typed(DirectionChangedData {
            previous: Direction::Down,
            direction: Direction::Up,
        });

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type.as_str(), DIRECTION_CHANGED);
        assert_eq!(received.data.direction, Direction::Up);
    }

    #[test]
    fn test_typed_try_recv_without_runtime() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe_typed::<DirectionChangedData>();
        assert!(rx.try_recv().is_err());

        bus.fire_typed(DirectionChangedData {
            previous: Direction::Hold,
            direction: Direction::Down,
        });

        assert_eq!(rx.try_recv().unwrap().data.previous, Direction::Hold);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_typed_recv_skips_malformed_payloads() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe_typed::<DirectionChangedData>();

        bus.fire(Event::new(DIRECTION_CHANGED, json!({"direction": "sideways"})));
        bus.fire_typed(DirectionChangedData {
            previous: Direction::Down,
            direction: Direction::Up,
        });

        let received = tokio_test::assert_ok!(tokio_test::block_on(rx.recv()));
        assert_eq!(received.data.previous, Direction::Down);
    }

    #[tokio::test]
    async fn test_no_cross_event_pollution() {
        let bus = EventBus::new();
        let mut rx_a = bus.subscribe("event_a");
        let mut rx_b = bus.subscribe("event_b");

        bus.fire(Event::new("event_a", json!({"type": "a"})));

        assert_eq!(rx_a.recv().await.unwrap().data["type"], "a");
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_fire_without_subscribers_is_dropped() {
        let bus = EventBus::new();
        bus.fire(Event::new("nobody_listens", json!(null)));
        assert_eq!(bus.listener_count(), 0);
    }
}
