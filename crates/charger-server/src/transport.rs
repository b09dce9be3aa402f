//! Telemetry transport seam
//!
//! A transport delivers `(topic, payload)` pairs into the telemetry store.
//! The store does not care where they come from.

use async_trait::async_trait;
use charger_telemetry::{TelemetryStore, Topics};
use std::sync::Arc;
use tracing::{trace, warn};

#[async_trait]
pub trait TelemetryTransport: Send {
    /// Establish the first session and subscribe to every signal topic
    ///
    /// Failing here is fatal to the process.
    async fn connect(&mut self) -> anyhow::Result<()>;

    /// Deliver messages into `store` until the transport closes
    async fn run(&mut self, store: Arc<TelemetryStore>) -> anyhow::Result<()>;
}

/// Route one message to the store; returns whether it was accepted
pub fn deliver(topics: &Topics, store: &TelemetryStore, topic: &str, payload: &[u8]) -> bool {
    let Some(signal) = topics.signal(topic) else {
        trace!(topic, "Ignoring message on unknown topic");
        return false;
    };
    let Ok(payload) = std::str::from_utf8(payload) else {
        warn!(topic, len = payload.len(), "Dropping non-UTF-8 payload");
        return false;
    };
    store.ingest(signal, payload).is_ok()
}
