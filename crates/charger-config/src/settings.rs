//! Resolved controller settings

use std::fmt;
use std::time::Duration;
use tracing::info;

use crate::broker::BrokerAddress;
use crate::error::{ConfigError, ConfigResult};

const DEFAULT_HOST: &str = "ws://192.168.1.51:9001";
const DEFAULT_CAR: &str = "1";
const DEFAULT_HOME: &str = "Home";
const DEFAULT_TOPIC_PREFIX: &str = "teslamate/cars/";
const DEFAULT_LOOP_INTERVAL_MS: u64 = 250;
const DEFAULT_STAGING_SECONDS: u64 = 300;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings whose values must never reach the log
const SECRET_KEYS: [&str; 1] = ["MQTT_PASS"];

/// Which pin backend to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioBackend {
    /// Simulated pins, nothing physical is driven
    None,
    /// Raspberry Pi header via rppal
    Rpi,
}

impl GpioBackend {
    fn parse(value: &str) -> ConfigResult<Self> {
        match value {
            "none" => Ok(GpioBackend::None),
            "rpi" => Ok(GpioBackend::Rpi),
            other => Err(ConfigError::invalid(
                "GPIO_BACKEND",
                format!("expected 'none' or 'rpi', got '{}'", other),
            )),
        }
    }

    fn default_name() -> &'static str {
        if cfg!(feature = "rpi") {
            "rpi"
        } else {
            "none"
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GpioBackend::None => "none",
            GpioBackend::Rpi => "rpi",
        }
    }
}

/// Controller settings
#[derive(Clone)]
pub struct Settings {
    pub broker: BrokerAddress,
    pub user: String,
    pub pass: String,
    /// Vehicle index in the topic namespace
    pub car: String,
    pub topic_prefix: String,
    /// Name of the home geofence zone
    pub home: String,
    pub tick_interval: Duration,
    pub staging_duration: Duration,
    pub gpio_backend: GpioBackend,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Settings {
    /// Resolve settings from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through an arbitrary lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let get = |key: &str, default: &str| resolve(&lookup, key, default);

        let tick_ms = parse_positive(
            "LOOP_INTERVAL_MS",
            &get("LOOP_INTERVAL_MS", &DEFAULT_LOOP_INTERVAL_MS.to_string()),
        )?;
        let staging_secs = parse_positive(
            "STAGING_SECONDS",
            &get("STAGING_SECONDS", &DEFAULT_STAGING_SECONDS.to_string()),
        )?;
        let gpio_backend =
            GpioBackend::parse(&get("GPIO_BACKEND", GpioBackend::default_name()))?;

        Ok(Self {
            broker: BrokerAddress::parse(&get("MQTT_HOST", DEFAULT_HOST))?,
            user: get("MQTT_USER", ""),
            pass: get("MQTT_PASS", ""),
            car: get("CAR_NUMBER", DEFAULT_CAR),
            topic_prefix: get("TOPIC_PREFIX", DEFAULT_TOPIC_PREFIX),
            home: get("GEOFENCE_HOME", DEFAULT_HOME),
            tick_interval: Duration::from_millis(tick_ms),
            staging_duration: Duration::from_secs(staging_secs),
            gpio_backend,
            log_level: get("LOG_LEVEL", DEFAULT_LOG_LEVEL),
        })
    }

    /// Resolve only the log filter, before logging is initialized
    pub fn log_level_from_env() -> String {
        std::env::var("LOG_LEVEL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("broker", &self.broker.url)
            .field("user", &self.user)
            .field("pass", &if self.pass.is_empty() { "" } else { "***" })
            .field("car", &self.car)
            .field("topic_prefix", &self.topic_prefix)
            .field("home", &self.home)
            .field("tick_interval", &self.tick_interval)
            .field("staging_duration", &self.staging_duration)
            .field("gpio_backend", &self.gpio_backend)
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Look up `key`, falling back to `default` when unset or empty
fn resolve(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    let secret = SECRET_KEYS.contains(&key);
    match lookup(key).filter(|v| !v.is_empty()) {
        Some(value) => {
            let shown = if secret { "***" } else { value.as_str() };
            info!(config_from = "env", key, value = shown, "Settings");
            value
        }
        None => {
            let shown = if secret && !default.is_empty() { "***" } else { default };
            info!(config_from = "default", key, value = shown, "Settings");
            default.to_string()
        }
    }
}

fn parse_positive(key: &str, value: &str) -> ConfigResult<u64> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid(key, "must be greater than zero")),
        Ok(n) => Ok(n),
        Err(_) => Err(ConfigError::invalid(
            key,
            format!("'{}' is not a whole number", value),
        )),
    }
}
