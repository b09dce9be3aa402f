//! MQTT telemetry transport

use anyhow::Context;
use async_trait::async_trait;
use charger_config::{BrokerTransport, Settings};
use charger_telemetry::{TelemetryStore, Topics};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::transport::{deliver, TelemetryTransport};

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const RECONNECT_DELAY: Duration = Duration::from_secs(1);
const REQUEST_CAPACITY: usize = 16;

/// A fresh `charger-xxxx` client id
///
/// The suffix comes from the random half of a ULID.
pub fn client_id() -> String {
    let id = ulid::Ulid::new().to_string().to_lowercase();
    format!("charger-{}", &id[id.len() - 4..])
}

/// Client options for the configured broker
pub fn options(settings: &Settings, client_id: &str) -> MqttOptions {
    let broker = &settings.broker;
    let mut options = match broker.transport {
        BrokerTransport::Ws => {
            let mut options = MqttOptions::new(client_id, broker.url.as_str(), broker.port);
            options.set_transport(Transport::Ws);
            options
        }
        BrokerTransport::Tcp => MqttOptions::new(client_id, broker.host.as_str(), broker.port),
    };
    options.set_keep_alive(KEEP_ALIVE);
    if !settings.user.is_empty() {
        options.set_credentials(settings.user.as_str(), settings.pass.as_str());
    }
    options
}

pub struct MqttTransport {
    client: AsyncClient,
    eventloop: EventLoop,
    topics: Topics,
    broker: String,
}

impl MqttTransport {
    pub fn new(settings: &Settings) -> Self {
        let client_id = client_id();
        info!(client_id = %client_id, broker = %settings.broker, "Creating MQTT client");
        let (client, eventloop) =
            AsyncClient::new(options(settings, &client_id), REQUEST_CAPACITY);
        Self {
            client,
            eventloop,
            topics: Topics::new(&settings.topic_prefix, &settings.car),
            broker: settings.broker.to_string(),
        }
    }

    /// Queue a subscription for every signal topic
    ///
    /// Called on every ConnAck; the broker does not keep our session.
    fn subscribe(&self) -> anyhow::Result<()> {
        for (signal, topic) in self.topics.all() {
            self.client
                .try_subscribe(topic.as_str(), QoS::AtMostOnce)
                .with_context(|| format!("subscribing to {}", topic))?;
            debug!(%signal, topic = %topic, "Subscribed");
        }
        Ok(())
    }
}

#[async_trait]
impl TelemetryTransport for MqttTransport {
    async fn connect(&mut self) -> anyhow::Result<()> {
        loop {
            let event = self
                .eventloop
                .poll()
                .await
                .with_context(|| format!("connecting to {}", self.broker))?;
            if let Event::Incoming(Packet::ConnAck(_)) = event {
                info!(broker = %self.broker, "Connected");
                return self.subscribe();
            }
        }
    }

    async fn run(&mut self, store: Arc<TelemetryStore>) -> anyhow::Result<()> {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!(broker = %self.broker, "Reconnected");
                    if let Err(e) = self.subscribe() {
                        error!(error = %e, "Resubscribe failed");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    deliver(&self.topics, &store, &publish.topic, &publish.payload);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "MQTT connection error, retrying");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn test_client_id_shape() {
        let id = client_id();
        assert!(id.starts_with("charger-"));
        assert_eq!(id.len(), "charger-".len() + 4);
        assert!(id["charger-".len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_options_for_tcp_broker() {
        let s = settings(&[("MQTT_HOST", "tcp://broker.local:1884")]);
        let options = options(&s, "charger-abcd");
        assert_eq!(options.client_id(), "charger-abcd");
        assert_eq!(
            options.broker_address(),
            ("broker.local".to_string(), 1884)
        );
        assert!(options.credentials().is_none());
        assert_eq!(options.keep_alive(), KEEP_ALIVE);
    }

    #[test]
    fn test_options_for_default_websocket_broker() {
        let s = settings(&[("MQTT_USER", "car"), ("MQTT_PASS", "secret")]);
        let options = options(&s, "charger-abcd");
        assert_eq!(
            options.broker_address(),
            ("ws://192.168.1.51:9001".to_string(), 9001)
        );
        assert!(options.credentials().is_some());
    }

    #[tokio::test]
    async fn test_connect_fails_without_broker() {
        let s = settings(&[("MQTT_HOST", "tcp://127.0.0.1:1")]);
        let mut transport = MqttTransport::new(&s);
        let err = transport.connect().await.unwrap_err();
        assert!(err.to_string().contains("127.0.0.1"));
    }
}
