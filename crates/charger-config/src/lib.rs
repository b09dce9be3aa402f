//! Configuration for the charger controller
//!
//! Every setting is read from an environment variable and falls back to an
//! explicit default when the variable is unset or empty:
//!
//! | Variable | Default |
//! |---|---|
//! | `MQTT_HOST` | `ws://192.168.1.51:9001` |
//! | `MQTT_USER` / `MQTT_PASS` | empty |
//! | `CAR_NUMBER` | `1` |
//! | `TOPIC_PREFIX` | `teslamate/cars/` |
//! | `GEOFENCE_HOME` | `Home` |
//! | `LOOP_INTERVAL_MS` | `250` |
//! | `STAGING_SECONDS` | `300` |
//! | `GPIO_BACKEND` | `rpi` with the `rpi` feature, else `none` |
//! | `LOG_LEVEL` | `info` |
//!
//! # Example
//!
//! ```ignore
//! use charger_config::Settings;
//!
//! let settings = Settings::from_env()?;
//! println!("home zone is {}", settings.home);
//! ```

mod broker;
mod error;
mod settings;

pub use broker::{BrokerAddress, BrokerTransport};
pub use error::{ConfigError, ConfigResult};
pub use settings::{GpioBackend, Settings};
