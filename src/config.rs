//! Station configuration, loaded from the TOML file named on the command
//! line.
//!
//! `[led]` and `[relay]` map device names to BCM pin numbers and are
//! required alongside `[pws]` and `[web]`; `[daemon]` and `[devices]` tune
//! cadences and fall back to defaults field by field. Validation runs at
//! load time so every wiring mistake is fatal before any loop starts.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

use crate::app::daemon::DaemonTiming;
use crate::app::display::DisplayUnits;
use crate::devices::DeviceTiming;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StationConfig {
    /// LED name to BCM pin number.
    pub led: BTreeMap<String, u8>,
    /// Relay name to BCM pin number.
    pub relay: BTreeMap<String, u8>,
    pub pws: PwsConfig,
    pub web: WebConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub devices: DevicesConfig,
}

/// Credentials for the remote weather service.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PwsConfig {
    /// Station ID assigned by the service.
    pub id: String,
    pub password: String,
    /// Use the rapid-fire endpoint meant for sub-minute cadences.
    #[serde(default)]
    pub rapidfire: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebConfig {
    /// Units for the conditions page: `imperial` or `metric`.
    pub display_units: DisplayUnits,
    pub listen_address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    /// Update loop tick interval (milliseconds).
    pub tick_interval_ms: u64,
    /// Spacing between reachability probes (seconds).
    pub ping_interval_secs: u64,
    /// Spacing between remote uploads (seconds).
    pub remote_interval_secs: u64,
    /// Host pinged for the reachability check.
    pub probe_host: String,
    /// I2C bus both sensor chips sit on.
    pub i2c_bus: u8,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            ping_interval_secs: 5,
            remote_interval_secs: 300, // 5 min between uploads
            probe_host: "8.8.8.8".to_owned(),
            i2c_bus: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevicesConfig {
    /// Output controller tick interval (milliseconds).
    pub tick_interval_ms: u64,
    /// Blink half-period (milliseconds).
    pub blink_interval_ms: u64,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
            blink_interval_ms: 500,
        }
    }
}

impl StationConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.pws.id.trim().is_empty() {
            bail!("pws.id must not be empty");
        }
        if self.pws.password.trim().is_empty() {
            bail!("pws.password must not be empty");
        }
        if self.web.port == 0 {
            bail!("web.port must be nonzero");
        }
        if self.daemon.tick_interval_ms == 0 {
            bail!("daemon.tick_interval_ms must be nonzero");
        }
        if self.devices.tick_interval_ms == 0 || self.devices.blink_interval_ms == 0 {
            bail!("devices intervals must be nonzero");
        }

        let mut names = BTreeSet::new();
        let mut pins: BTreeMap<u8, String> = BTreeMap::new();
        for (kind, table) in [("led", &self.led), ("relay", &self.relay)] {
            for (name, pin) in table {
                if !names.insert(name.clone()) {
                    bail!("device name '{name}' appears in both [led] and [relay]");
                }
                if let Some(holder) = pins.insert(*pin, format!("{kind} '{name}'")) {
                    bail!("pin {pin} assigned to both {holder} and {kind} '{name}'");
                }
            }
        }
        Ok(())
    }

    pub fn device_timing(&self) -> DeviceTiming {
        DeviceTiming {
            tick_interval: Duration::from_millis(self.devices.tick_interval_ms),
            blink_interval: Duration::from_millis(self.devices.blink_interval_ms),
        }
    }

    pub fn daemon_timing(&self) -> DaemonTiming {
        DaemonTiming {
            tick_interval: Duration::from_millis(self.daemon.tick_interval_ms),
            ping_interval: Duration::from_secs(self.daemon.ping_interval_secs),
            remote_interval: Duration::from_secs(self.daemon.remote_interval_secs),
        }
    }
}
