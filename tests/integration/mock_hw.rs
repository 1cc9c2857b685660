//! Mock adapters for integration tests.
//!
//! Recording implementations of every port so tests can assert on full
//! call and write history without touching GPIO, I2C, or the network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use wxstation::app::Observation;
use wxstation::app::events::StationEvent;
use wxstation::app::ports::{EventSink, OutputPort, ProbePort, SensorPort, UploadPort};
use wxstation::error::{SensorError, UploadError};

/// The canonical fixture: 20.0 C / 101.3 kPa / 45% / UV 3.2.
pub fn pleasant_day() -> Observation {
    Observation {
        temperature_c: 20.0,
        pressure_kpa: 101.3,
        humidity_pct: 45.0,
        uv_index: 3.2,
    }
}

// ── Recording pin ─────────────────────────────────────────────

/// Output pin that records every write; the paired [`PinState`] stays
/// with the test while the pin itself moves into a controller.
pub struct RecordingPin {
    level: Arc<AtomicBool>,
    writes: Arc<Mutex<Vec<bool>>>,
}

#[derive(Clone)]
pub struct PinState {
    level: Arc<AtomicBool>,
    writes: Arc<Mutex<Vec<bool>>>,
}

impl RecordingPin {
    pub fn new() -> (Self, PinState) {
        let level = Arc::new(AtomicBool::new(false));
        let writes = Arc::new(Mutex::new(Vec::new()));
        let state = PinState {
            level: Arc::clone(&level),
            writes: Arc::clone(&writes),
        };
        (Self { level, writes }, state)
    }
}

#[allow(dead_code)]
impl PinState {
    pub fn is_high(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn writes(&self) -> Vec<bool> {
        self.writes.lock().unwrap().clone()
    }
}

impl OutputPort for RecordingPin {
    fn write(&mut self, level: bool) {
        self.level.store(level, Ordering::SeqCst);
        self.writes.lock().unwrap().push(level);
    }
}

// ── Sensors ───────────────────────────────────────────────────

/// Sensor gateway returning a scripted outcome and counting samples.
pub struct MockSensors {
    pub next: Result<Observation, SensorError>,
    pub samples: usize,
}

#[allow(dead_code)]
impl MockSensors {
    pub fn on_a_pleasant_day() -> Self {
        Self::returning(pleasant_day())
    }

    pub fn returning(obs: Observation) -> Self {
        Self {
            next: Ok(obs),
            samples: 0,
        }
    }

    pub fn failing(err: SensorError) -> Self {
        Self {
            next: Err(err),
            samples: 0,
        }
    }
}

impl SensorPort for MockSensors {
    fn read_temperature_c(&mut self) -> Result<f64, SensorError> {
        self.next.clone().map(|o| o.temperature_c)
    }

    fn read_pressure_kpa(&mut self) -> Result<f64, SensorError> {
        self.next.clone().map(|o| o.pressure_kpa)
    }

    fn read_humidity_pct(&mut self) -> Result<f64, SensorError> {
        self.next.clone().map(|o| o.humidity_pct)
    }

    fn read_uv_index(&mut self) -> Result<f64, SensorError> {
        self.next.clone().map(|o| o.uv_index)
    }

    fn sample(&mut self) -> Result<Observation, SensorError> {
        self.samples += 1;
        self.next.clone()
    }
}

// ── Uplink ────────────────────────────────────────────────────

/// Upload client recording every observation it was handed.
pub struct MockUplink {
    pub next: Result<(), UploadError>,
    pub uploads: Vec<Observation>,
}

#[allow(dead_code)]
impl MockUplink {
    pub fn accepting() -> Self {
        Self {
            next: Ok(()),
            uploads: Vec::new(),
        }
    }

    pub fn rejecting(err: UploadError) -> Self {
        Self {
            next: Err(err),
            uploads: Vec::new(),
        }
    }
}

impl UploadPort for MockUplink {
    fn upload(&mut self, obs: &Observation) -> Result<(), UploadError> {
        self.uploads.push(*obs);
        self.next.clone()
    }
}

// ── Probe ─────────────────────────────────────────────────────

/// Reachability probe that pops scripted answers, then repeats a default.
pub struct ScriptedProbe {
    script: VecDeque<bool>,
    fallback: bool,
    pub probes: usize,
}

#[allow(dead_code)]
impl ScriptedProbe {
    pub fn always(up: bool) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: up,
            probes: 0,
        }
    }

    pub fn sequence(answers: &[bool], then: bool) -> Self {
        Self {
            script: answers.iter().copied().collect(),
            fallback: then,
            probes: 0,
        }
    }
}

impl ProbePort for ScriptedProbe {
    fn probe(&mut self) -> bool {
        self.probes += 1;
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

// ── Event sink ────────────────────────────────────────────────

/// Sink keeping every emitted event in order.
pub struct RecordingSink {
    pub events: Vec<StationEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn contains(&self, event: &StationEvent) -> bool {
        self.events.contains(event)
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &StationEvent) {
        self.events.push(event.clone());
    }
}

/// Clonable sink for tests that move the sink into a daemon thread.
#[derive(Clone, Default)]
pub struct SharedSink {
    events: Arc<Mutex<Vec<StationEvent>>>,
}

#[allow(dead_code)]
impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for SharedSink {
    fn emit(&mut self, event: &StationEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
