//! The update daemon: reachability-gated sampling, throttled uploads, and
//! display publication.
//!
//! ## Tick state machine (default cadence 100 ms)
//!
//! ```text
//!   1. probe network   at most once per ping interval, cached between;
//!                      up→down commands the "network" LED to blink,
//!                      down→up commands it off
//!   2. gate            network down ⇒ the tick ends here
//!   3. due check       no successful upload yet, or the remote interval
//!                      has elapsed since the last one
//!   4. sample+upload   on due cycles only; a failed read or upload leaves
//!                      the last-upload mark untouched so the next tick
//!                      retries at full cadence
//!   5. publish         format the retained snapshot into the shared
//!                      display state
//! ```
//!
//! Reachability gates everything downstream of step 1: while the network
//! is down the loop only re-probes, and sampling, uploads, and display
//! refreshes resume when connectivity returns.
//!
//! Every per-tick failure is logged, surfaced as a [`StationEvent`], and
//! swallowed; only `stop` ends the loop.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::app::Observation;
use crate::app::display::{DisplayState, DisplayUnits, format_fields};
use crate::app::events::StationEvent;
use crate::app::ports::{EventSink, ProbePort, SensorPort, UploadPort};
use crate::devices::{OutputController, OutputMode};

/// Name of the LED that mirrors network reachability.
pub const NETWORK_LED: &str = "network";

/// Cadence settings for the daemon loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaemonTiming {
    /// Loop tick interval.
    pub tick_interval: Duration,
    /// Minimum spacing between reachability probes.
    pub ping_interval: Duration,
    /// Minimum spacing between successful remote uploads.
    pub remote_interval: Duration,
}

impl Default for DaemonTiming {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            ping_interval: Duration::from_secs(5),
            remote_interval: Duration::from_secs(300),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Reachability watch
// ───────────────────────────────────────────────────────────────

/// Direction of a reachability change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetTransition {
    CameUp,
    WentDown,
}

/// Interval-throttled reachability state.
///
/// Starts optimistic (up); the first tick probes immediately and corrects
/// it. Between probes every call reports the cached state.
pub struct NetWatch {
    interval: Duration,
    up: bool,
    last_check: Option<Instant>,
}

impl NetWatch {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            up: true,
            last_check: None,
        }
    }

    /// Cached state without probing.
    pub fn is_up(&self) -> bool {
        self.up
    }

    /// Re-probe if the interval has elapsed; report a transition when the
    /// state flipped. Off-interval calls return `None` without probing.
    pub fn check(&mut self, now: Instant, probe: &mut impl ProbePort) -> Option<NetTransition> {
        let due = self
            .last_check
            .is_none_or(|t| now.saturating_duration_since(t) >= self.interval);
        if !due {
            return None;
        }
        self.last_check = Some(now);

        let reachable = probe.probe();
        let transition = match (self.up, reachable) {
            (false, true) => Some(NetTransition::CameUp),
            (true, false) => Some(NetTransition::WentDown),
            _ => None,
        };
        self.up = reachable;
        transition
    }
}

// ───────────────────────────────────────────────────────────────
// Station service (per-tick logic)
// ───────────────────────────────────────────────────────────────

/// Coordination state for one station. Ports are passed into [`tick`]
/// rather than owned, so tests can drive the whole cycle with mocks and
/// synthetic instants.
///
/// [`tick`]: StationService::tick
pub struct StationService {
    units: DisplayUnits,
    remote_interval: Duration,
    net: NetWatch,
    leds: Arc<OutputController>,
    display: DisplayState,
    snapshot: Option<Observation>,
    last_upload: Option<Instant>,
}

impl StationService {
    pub fn new(
        units: DisplayUnits,
        timing: DaemonTiming,
        leds: Arc<OutputController>,
        display: DisplayState,
    ) -> Self {
        Self {
            units,
            remote_interval: timing.remote_interval,
            net: NetWatch::new(timing.ping_interval),
            leds,
            display,
            snapshot: None,
            last_upload: None,
        }
    }

    /// Run one tick of the update cycle at the given instant.
    pub fn tick(
        &mut self,
        now: Instant,
        sensors: &mut impl SensorPort,
        uplink: &mut impl UploadPort,
        probe: &mut impl ProbePort,
        sink: &mut impl EventSink,
    ) {
        match self.net.check(now, probe) {
            Some(NetTransition::WentDown) => {
                warn!("network unreachable; pausing sampling and uploads");
                sink.emit(&StationEvent::NetworkDown);
                self.drive_network_led(OutputMode::Blink);
            }
            Some(NetTransition::CameUp) => {
                info!("network reachable again");
                sink.emit(&StationEvent::NetworkUp);
                self.drive_network_led(OutputMode::Off);
            }
            None => {}
        }

        if !self.net.is_up() {
            return;
        }

        if self.upload_due(now) {
            match sensors.sample() {
                Ok(obs) => {
                    debug!(
                        temperature_c = obs.temperature_c,
                        pressure_kpa = obs.pressure_kpa,
                        humidity_pct = obs.humidity_pct,
                        uv_index = obs.uv_index,
                        "sampled environment"
                    );
                    sink.emit(&StationEvent::SampleTaken(obs));
                    self.snapshot = Some(obs);

                    match uplink.upload(&obs) {
                        Ok(()) => {
                            info!("snapshot uploaded");
                            sink.emit(&StationEvent::UploadSucceeded);
                            self.last_upload = Some(now);
                        }
                        Err(err) => {
                            warn!(%err, "upload failed; next tick retries");
                            sink.emit(&StationEvent::UploadFailed(err));
                        }
                    }
                }
                Err(err) => {
                    warn!(%err, "sensor read failed; skipping this cycle");
                    sink.emit(&StationEvent::SampleFailed(err));
                }
            }
        }

        if let Some(obs) = &self.snapshot {
            self.display.publish(format_fields(obs, self.units));
        }
    }

    fn upload_due(&self, now: Instant) -> bool {
        self.last_upload
            .is_none_or(|t| now.saturating_duration_since(t) >= self.remote_interval)
    }

    /// The network LED is optional hardware; a missing device is logged
    /// once per transition and otherwise ignored.
    fn drive_network_led(&self, mode: OutputMode) {
        if let Err(err) = self.leds.set(NETWORK_LED, mode) {
            debug!(%err, "network LED not driven");
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Daemon task
// ───────────────────────────────────────────────────────────────

/// Thread wrapper around [`StationService`]: ticks at a fixed interval
/// until stopped, with the same stop-flag/join contract as the output
/// controllers.
pub struct UpdateDaemon {
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl UpdateDaemon {
    /// Spawn the daemon thread; the service and all ports move into it.
    pub fn start(
        mut service: StationService,
        tick_interval: Duration,
        mut sensors: impl SensorPort + Send + 'static,
        mut uplink: impl UploadPort + Send + 'static,
        mut probe: impl ProbePort + Send + 'static,
        mut sink: impl EventSink + Send + 'static,
    ) -> io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let worker = thread::Builder::new()
            .name("wx-daemon".into())
            .spawn(move || {
                info!("update daemon running");
                sink.emit(&StationEvent::Started);
                while flag.load(Ordering::SeqCst) {
                    service.tick(
                        Instant::now(),
                        &mut sensors,
                        &mut uplink,
                        &mut probe,
                        &mut sink,
                    );
                    thread::sleep(tick_interval);
                }
                info!("update daemon stopped");
            })?;
        Ok(Self {
            running,
            worker: Some(worker),
        })
    }

    /// Flag the loop to stop and wait for the thread to exit. Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("daemon thread panicked");
            }
        }
    }
}

impl Drop for UpdateDaemon {
    fn drop(&mut self) {
        self.stop();
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
