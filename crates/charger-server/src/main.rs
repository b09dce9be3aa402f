//! Charger controller daemon
//!
//! Subscribes to vehicle telemetry over MQTT and drives the charger
//! connector actuator from a fixed-rate control loop.

mod hardware;
mod mqtt;
mod transport;

use anyhow::{Context, Result};
use charger_config::Settings;
use charger_controller::Controller;
use charger_event_bus::EventBus;
use charger_telemetry::TelemetryStore;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::mqtt::MqttTransport;
use crate::transport::TelemetryTransport;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins over LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Settings::log_level_from_env()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting charger controller");

    let settings = Settings::from_env().context("invalid configuration")?;
    info!(?settings, "Configuration resolved");

    let bus = Arc::new(EventBus::new());
    let store = Arc::new(TelemetryStore::with_failsafe(bus.clone(), &settings.home));

    let pins = hardware::open(settings.gpio_backend).context("opening GPIO")?;
    let controller = Controller::new(
        store.clone(),
        pins,
        bus.clone(),
        settings.home.clone(),
        settings.staging_duration,
    );

    let mut transport = MqttTransport::new(&settings);
    transport.connect().await?;

    let mut telemetry = tokio::spawn(async move { transport.run(store).await });

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let control = tokio::spawn(charger_controller::run(
        controller,
        settings.tick_interval,
        async move {
            let _ = stop_rx.await;
        },
    ));

    info!("Charger controller is running");

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutting down...");
        }
        result = &mut telemetry => {
            match result {
                Ok(Ok(())) => error!("Telemetry transport closed"),
                Ok(Err(e)) => error!(error = %e, "Telemetry transport failed"),
                Err(e) => error!(error = %e, "Telemetry task panicked"),
            }
        }
    }

    telemetry.abort();
    let _ = stop_tx.send(());
    let controller = control.await.context("control loop task")?;
    info!(direction = %controller.commanded(), "Stopped");

    Ok(())
}
