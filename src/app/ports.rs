//! Port traits — the boundary between the daemon core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ StationService / OutputController
//! ```
//!
//! Driven adapters (sensor chips, GPIO pins, the upload HTTP client, the
//! ping probe, log sinks) implement these traits. The daemon consumes them
//! via generics, so the core logic never touches hardware or the network
//! directly and every scenario can run against mocks on a dev host.
//!
//! All port errors are typed; callers decide per class whether to retry
//! (sensor/upload failures) or treat the call as a caller bug (commands).

use crate::app::Observation;
use crate::app::events::StationEvent;
use crate::error::{SensorError, UploadError};

// ───────────────────────────────────────────────────────────────
// Output pin port (controller → hardware)
// ───────────────────────────────────────────────────────────────

/// One binary output pin, owned exclusively by its device.
///
/// `write` drives the line level; releasing the pin is `Drop`. The
/// controller guarantees a final `write(false)` before any handle is
/// dropped, so implementations need no shutdown logic of their own.
/// `Send` because the controller tick runs on its own thread.
pub trait OutputPort: Send {
    fn write(&mut self, level: bool);
}

// ───────────────────────────────────────────────────────────────
// Sensor port (hardware → daemon)
// ───────────────────────────────────────────────────────────────

/// Environmental sensor gateway in canonical units (Celsius, kPa, %,
/// normalized UV index).
///
/// Every read may fail with [`SensorError`]; the daemon treats that as
/// "skip this cycle, keep the previous display state, retry next tick".
pub trait SensorPort {
    fn read_temperature_c(&mut self) -> Result<f64, SensorError>;
    fn read_pressure_kpa(&mut self) -> Result<f64, SensorError>;
    fn read_humidity_pct(&mut self) -> Result<f64, SensorError>;

    /// UV index, already normalized (sensor raw word / 100).
    fn read_uv_index(&mut self) -> Result<f64, SensorError>;

    /// Read everything as one snapshot. Any single failed read fails the
    /// whole sample, so a partial read can never tear the snapshot.
    /// Implementations backed by a combined measurement may override this
    /// to avoid redundant bus traffic.
    fn sample(&mut self) -> Result<Observation, SensorError> {
        Ok(Observation {
            temperature_c: self.read_temperature_c()?,
            pressure_kpa: self.read_pressure_kpa()?,
            humidity_pct: self.read_humidity_pct()?,
            uv_index: self.read_uv_index()?,
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Upload port (daemon → remote weather service)
// ───────────────────────────────────────────────────────────────

/// Pushes one snapshot to the remote weather service.
///
/// Implementations convert canonical units to whatever the wire wants
/// (Fahrenheit, inches of mercury) and must bound their own I/O time;
/// the daemon calls this synchronously inside a tick.
pub trait UploadPort {
    fn upload(&mut self, obs: &Observation) -> Result<(), UploadError>;
}

// ───────────────────────────────────────────────────────────────
// Reachability probe port (daemon → network)
// ───────────────────────────────────────────────────────────────

/// Single-shot network liveness probe.
///
/// Returns a plain boolean: any timeout, unreachable answer, or process
/// error is simply `false`. No retries at this layer; the reachability
/// watch above it owns the cadence and hysteresis.
pub trait ProbePort {
    fn probe(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (daemon → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The daemon emits structured [`StationEvent`]s through this port.
/// Adapters decide where they go (log stream, future MQTT, a recording
/// sink in tests).
pub trait EventSink {
    fn emit(&mut self, event: &StationEvent);
}
