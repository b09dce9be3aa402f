//! Broker address parsing

use std::fmt;

use crate::error::{ConfigError, ConfigResult};

const KEY: &str = "MQTT_HOST";

/// How the broker is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerTransport {
    /// Plain MQTT over TCP
    Tcp,
    /// MQTT over websocket
    Ws,
}

impl BrokerTransport {
    fn default_port(&self) -> u16 {
        match self {
            BrokerTransport::Tcp => 1883,
            BrokerTransport::Ws => 9001,
        }
    }
}

/// A parsed `MQTT_HOST` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub transport: BrokerTransport,
    pub host: String,
    pub port: u16,
    /// The address as configured; websocket clients connect to the full URL
    pub url: String,
}

impl BrokerAddress {
    /// Parse `ws://host[:port][/path]`, `tcp://host[:port]`,
    /// `mqtt://host[:port]` or a bare `host[:port]`
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        let raw = raw.trim();
        let (transport, rest) = match raw.split_once("://") {
            Some(("ws", rest)) => (BrokerTransport::Ws, rest),
            Some(("tcp" | "mqtt", rest)) => (BrokerTransport::Tcp, rest),
            Some((scheme, _)) => {
                return Err(ConfigError::invalid(
                    KEY,
                    format!("unsupported scheme '{}'", scheme),
                ))
            }
            None => (BrokerTransport::Tcp, raw),
        };

        let authority = rest.split('/').next().unwrap_or_default();
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| ConfigError::invalid(KEY, format!("invalid port '{}'", port)))?;
                (host, port)
            }
            None => (authority, transport.default_port()),
        };
        if host.is_empty() {
            return Err(ConfigError::invalid(KEY, "missing host"));
        }

        Ok(Self {
            transport,
            host: host.to_string(),
            port,
            url: raw.to_string(),
        })
    }
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
