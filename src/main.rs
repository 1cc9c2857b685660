//! Weather station daemon — main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  GpioPin / MemoryPin   EnvironmentSensors   Wunderground     │
//! │  (OutputPort)          (SensorPort)         (UploadPort)     │
//! │  PingProbe             LogEventSink         axum routes      │
//! │  (ProbePort)           (EventSink)          (web front end)  │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ────────────────────   │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │        StationService (per-tick update logic)        │    │
//! │  │  NetWatch · throttled uploads · display publication  │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! │                                                              │
//! │  OutputController x2 (LED / relay banks on 10 ms ticks)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Thread layout: one thread per output controller, one update daemon
//! thread, and a tokio runtime serving the web front end from the main
//! thread. The runtime returns on SIGINT/SIGTERM; the daemon stops
//! first and the controllers last, so every output is driven low on the
//! way out.

#![deny(unused_must_use)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use wxstation::adapters::log_sink::LogEventSink;
use wxstation::adapters::probe::PingProbe;
use wxstation::adapters::upload::WundergroundClient;
use wxstation::app::daemon::{StationService, UpdateDaemon};
use wxstation::app::display::DisplayState;
use wxstation::config::StationConfig;
use wxstation::devices::{Device, OutputController, OutputMode};
use wxstation::web::{self, WebContext};

fn main() -> Result<()> {
    // ── 1. Logging + CLI ──────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let Some(config_path) = config_path_from(std::env::args_os().skip(1)) else {
        eprintln!("usage: wxstation CONFIG_FILE");
        std::process::exit(2);
    };

    info!("weather station v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = StationConfig::load(&config_path)?;

    // ── 3. Output controllers ─────────────────────────────────
    let (led_devices, relay_devices) = build_banks(&config)?;
    let timing = config.device_timing();
    let leds = Arc::new(OutputController::new("led", led_devices, timing));
    let relays = Arc::new(OutputController::new("relay", relay_devices, timing));
    leds.start().context("starting led controller")?;
    relays.start().context("starting relay controller")?;

    // Conventional status LEDs, when the config wires them.
    for (name, mode) in [("pwr", OutputMode::On), ("hb", OutputMode::Blink)] {
        if leds.set(name, mode).is_err() {
            debug!(led = name, "status led not configured; skipping");
        }
    }

    // ── 4. Update daemon ──────────────────────────────────────
    let display = DisplayState::new();
    let service = StationService::new(
        config.web.display_units,
        config.daemon_timing(),
        Arc::clone(&leds),
        display.clone(),
    );
    // The blocking HTTP client must be built before the async runtime
    // below exists.
    let uplink = WundergroundClient::new(&config.pws.id, &config.pws.password, config.pws.rapidfire)
        .context("building upload client")?;
    let probe = PingProbe::new(&config.daemon.probe_host);
    let sensors = open_sensors(&config)?;
    let mut daemon = UpdateDaemon::start(
        service,
        config.daemon_timing().tick_interval,
        sensors,
        uplink,
        probe,
        LogEventSink::new(),
    )
    .context("spawning update daemon")?;

    // ── 5. Web front end (runs until shutdown signal) ─────────
    let ctx = WebContext {
        display,
        leds: Arc::clone(&leds),
        relays: Arc::clone(&relays),
    };
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind((config.web.listen_address.as_str(), config.web.port))
            .await
            .with_context(|| {
                format!(
                    "binding http listener on {}:{}",
                    config.web.listen_address, config.web.port
                )
            })?;
        info!(
            "serving conditions on http://{}:{}",
            config.web.listen_address, config.web.port
        );
        web::serve(listener, ctx).await.context("http server")
    })?;

    // ── 6. Orderly shutdown ───────────────────────────────────
    info!("shutting down");
    daemon.stop();
    leds.stop();
    relays.stop();
    info!("all outputs released");
    Ok(())
}

/// Claim every configured pin and wrap it in a device, both banks at
/// once so a single GPIO handle covers the claims.
#[cfg(feature = "hardware")]
fn build_banks(config: &StationConfig) -> Result<(Vec<Device>, Vec<Device>)> {
    use rppal::gpio::Gpio;
    use wxstation::adapters::gpio::GpioPin;

    let gpio = Gpio::new().context("opening GPIO character device")?;

    let mut leds = Vec::new();
    for (name, pin) in &config.led {
        let port = GpioPin::open(&gpio, *pin)
            .with_context(|| format!("claiming pin {pin} for led '{name}'"))?;
        leds.push(Device::led(name.clone(), Box::new(port)));
    }
    let mut relays = Vec::new();
    for (name, pin) in &config.relay {
        let port = GpioPin::open(&gpio, *pin)
            .with_context(|| format!("claiming pin {pin} for relay '{name}'"))?;
        relays.push(Device::relay(name.clone(), Box::new(port)));
    }
    Ok((leds, relays))
}

#[cfg(not(feature = "hardware"))]
fn build_banks(config: &StationConfig) -> Result<(Vec<Device>, Vec<Device>)> {
    use wxstation::adapters::gpio::MemoryPin;

    info!("hardware feature disabled; driving in-memory pins");
    let leds = config
        .led
        .keys()
        .map(|name| Device::led(name.clone(), Box::new(MemoryPin::new())))
        .collect();
    let relays = config
        .relay
        .keys()
        .map(|name| Device::relay(name.clone(), Box::new(MemoryPin::new())))
        .collect();
    Ok((leds, relays))
}

#[cfg(feature = "hardware")]
fn open_sensors(config: &StationConfig) -> Result<wxstation::sensors::EnvironmentSensors> {
    wxstation::sensors::EnvironmentSensors::open(config.daemon.i2c_bus)
        .with_context(|| format!("initializing sensors on i2c bus {}", config.daemon.i2c_bus))
}

#[cfg(not(feature = "hardware"))]
fn open_sensors(_config: &StationConfig) -> Result<wxstation::sensors::sim::SimulatedSensors> {
    info!("hardware feature disabled; using simulated sensors");
    Ok(wxstation::sensors::sim::SimulatedSensors::new())
}

/// Exactly one positional argument: the config file path. Anything else
/// (none, or extras) is a usage error.
fn config_path_from(mut args: impl Iterator<Item = std::ffi::OsString>) -> Option<PathBuf> {
    match (args.next(), args.next()) {
        (Some(path), None) => Some(PathBuf::from(path)),
        _ => None,
    }
}
