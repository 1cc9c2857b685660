//! Named binary output devices (status LEDs, switching relays) driven by
//! per-device timer state machines.
//!
//! Each device carries a *commanded mode* (what the caller wants) and a
//! *physical level* (what the pin is actually driven to). The two are only
//! ever reconciled by the controller's tick, so a `set` call never touches
//! hardware directly and takes effect within one tick interval.
//!
//! ## Tick engine
//!
//! ```text
//!   off         level = false
//!   on          level = true
//!   blink       toggle when now - last_transition >= blink_interval
//!   blink_once  toggle now, record the transition, then retire the mode
//!               only if that just-recorded transition is already older
//!               than the blink interval
//! ```
//!
//! The `blink_once` retire check reads the timestamp it just wrote, so the
//! mode stays commanded and the device keeps toggling every tick. That
//! matches the deployed controller behavior this code replaces, and
//! `blink_once_toggles_every_tick` pins it so it cannot change silently.
//!
//! The controller runs its loop on a dedicated thread; `stop` flags the
//! loop, waits for it to exit, and guarantees every device was driven low
//! before returning (fail-safe off).

use core::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::app::ports::OutputPort;
use crate::error::CommandError;

// ───────────────────────────────────────────────────────────────
// Device model
// ───────────────────────────────────────────────────────────────

/// Hardware class of an output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Led,
    Relay,
}

impl DeviceClass {
    /// Whether `set` accepts this mode for the class. Relays are plain
    /// switches; only LEDs blink.
    pub fn supports(self, mode: OutputMode) -> bool {
        match self {
            Self::Led => true,
            Self::Relay => matches!(mode, OutputMode::Off | OutputMode::On),
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Led => write!(f, "led"),
            Self::Relay => write!(f, "relay"),
        }
    }
}

/// Commanded behavior for a device, distinct from its physical level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    Off,
    On,
    Blink,
    BlinkOnce,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Blink => "blink",
            Self::BlinkOnce => "blink_once",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named output device and the pin it owns.
pub struct Device {
    name: String,
    class: DeviceClass,
    mode: OutputMode,
    level: bool,
    last_transition: Option<Instant>,
    pin: Box<dyn OutputPort>,
}

impl Device {
    pub fn led(name: impl Into<String>, pin: Box<dyn OutputPort>) -> Self {
        Self::new(name, DeviceClass::Led, pin)
    }

    pub fn relay(name: impl Into<String>, pin: Box<dyn OutputPort>) -> Self {
        Self::new(name, DeviceClass::Relay, pin)
    }

    fn new(name: impl Into<String>, class: DeviceClass, pin: Box<dyn OutputPort>) -> Self {
        Self {
            name: name.into(),
            class,
            mode: OutputMode::Off,
            level: false,
            last_transition: None,
            pin,
        }
    }
}

/// Point-in-time view of a device, for the web API and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceStatus {
    pub name: String,
    pub class: DeviceClass,
    pub mode: OutputMode,
    pub level: bool,
}

/// Tick and blink cadence for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceTiming {
    pub tick_interval: Duration,
    pub blink_interval: Duration,
}

impl Default for DeviceTiming {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(10),
            blink_interval: Duration::from_millis(500),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Transition engine
// ───────────────────────────────────────────────────────────────

/// Age of the last transition; a device that has never toggled counts as
/// infinitely old, so a freshly commanded blink toggles on its first tick.
fn transition_age(last: Option<Instant>, now: Instant) -> Duration {
    last.map_or(Duration::MAX, |t| now.saturating_duration_since(t))
}

/// Advance one device by one tick and push the resulting level to its pin.
/// The pin is written every tick, not just on changes.
fn advance(dev: &mut Device, now: Instant, blink_interval: Duration) {
    match dev.mode {
        OutputMode::Off => dev.level = false,
        OutputMode::On => dev.level = true,
        OutputMode::Blink => {
            if transition_age(dev.last_transition, now) >= blink_interval {
                dev.level = !dev.level;
                dev.last_transition = Some(now);
            }
        }
        OutputMode::BlinkOnce => {
            dev.level = !dev.level;
            dev.last_transition = Some(now);
            // Re-check the transition recorded above; it is never old
            // enough on the same tick, so the mode stays commanded.
            if transition_age(dev.last_transition, now) > blink_interval {
                dev.mode = OutputMode::Off;
            }
        }
    }
    dev.pin.write(dev.level);
}

// ───────────────────────────────────────────────────────────────
// Controller task
// ───────────────────────────────────────────────────────────────

struct Bank {
    devices: Mutex<Vec<Device>>,
    running: AtomicBool,
    blink_interval: Duration,
}

impl Bank {
    fn guard(&self) -> MutexGuard<'_, Vec<Device>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drive every device low and clear its commanded mode.
    fn all_off(&self) {
        for dev in self.guard().iter_mut() {
            dev.mode = OutputMode::Off;
            dev.level = false;
            dev.pin.write(false);
        }
    }
}

/// Owns a fixed registry of devices and reconciles them on a periodic tick.
///
/// The registry is fixed at construction; `set` swaps commanded modes, the
/// tick thread is the only writer of physical levels.
pub struct OutputController {
    label: String,
    tick_interval: Duration,
    bank: Arc<Bank>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl OutputController {
    pub fn new(label: impl Into<String>, devices: Vec<Device>, timing: DeviceTiming) -> Self {
        Self {
            label: label.into(),
            tick_interval: timing.tick_interval,
            bank: Arc::new(Bank {
                devices: Mutex::new(devices),
                running: AtomicBool::new(false),
                blink_interval: timing.blink_interval,
            }),
            worker: Mutex::new(None),
        }
    }

    /// Spawn the tick thread. A second call while running is a no-op.
    pub fn start(&self) -> io::Result<()> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_some() {
            return Ok(());
        }
        self.bank.running.store(true, Ordering::SeqCst);

        let bank = Arc::clone(&self.bank);
        let tick_interval = self.tick_interval;
        let label = self.label.clone();
        let handle = thread::Builder::new()
            .name(format!("{label}-outputs"))
            .spawn(move || {
                debug!(controller = %label, "output tick loop running");
                while bank.running.load(Ordering::SeqCst) {
                    let now = Instant::now();
                    for dev in bank.guard().iter_mut() {
                        advance(dev, now, bank.blink_interval);
                    }
                    thread::sleep(tick_interval);
                }
                bank.all_off();
                debug!(controller = %label, "output tick loop exited, outputs reset");
            })?;
        *worker = Some(handle);
        info!(
            controller = %self.label,
            devices = self.bank.guard().len(),
            "output controller started"
        );
        Ok(())
    }

    /// Stop the tick thread and wait for it; on return every device has
    /// been driven low. Safe to call more than once.
    pub fn stop(&self) {
        self.bank.running.store(false, Ordering::SeqCst);
        let handle = {
            let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
            worker.take()
        };
        let Some(handle) = handle else { return };
        if handle.join().is_err() {
            // The worker died before its shutdown reset could run.
            error!(controller = %self.label, "output tick thread panicked; resetting outputs");
            self.bank.all_off();
        }
        info!(controller = %self.label, "output controller stopped");
    }

    /// Replace a device's commanded mode. The physical level does not
    /// change until the next tick.
    pub fn set(&self, name: &str, mode: OutputMode) -> Result<(), CommandError> {
        let mut devices = self.bank.guard();
        let dev = devices
            .iter_mut()
            .find(|d| d.name == name)
            .ok_or_else(|| CommandError::UnknownDevice(name.to_string()))?;
        if !dev.class.supports(mode) {
            return Err(CommandError::UnsupportedMode {
                device: dev.name.clone(),
                class: dev.class,
                mode,
            });
        }
        debug!(controller = %self.label, device = %name, mode = %mode, "command set");
        dev.mode = mode;
        Ok(())
    }

    pub fn commanded(&self, name: &str) -> Result<OutputMode, CommandError> {
        self.bank
            .guard()
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.mode)
            .ok_or_else(|| CommandError::UnknownDevice(name.to_string()))
    }

    pub fn level(&self, name: &str) -> Result<bool, CommandError> {
        self.bank
            .guard()
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.level)
            .ok_or_else(|| CommandError::UnknownDevice(name.to_string()))
    }

    /// Snapshot every device for the web API.
    pub fn statuses(&self) -> Vec<DeviceStatus> {
        self.bank
            .guard()
            .iter()
            .map(|d| DeviceStatus {
                name: d.name.clone(),
                class: d.class,
                mode: d.mode,
                level: d.level,
            })
            .collect()
    }

    /// Run one tick at the given instant. The spawned thread calls this
    /// with wall time; tests call it directly with synthetic instants.
    pub fn tick_at(&self, now: Instant) {
        for dev in self.bank.guard().iter_mut() {
            advance(dev, now, self.bank.blink_interval);
        }
    }
}

impl Drop for OutputController {
    fn drop(&mut self) {
        self.stop();
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
