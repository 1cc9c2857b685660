//! Update daemon scenario tests.
//!
//! Each test drives `StationService::tick` directly with synthetic
//! instants, so reachability caching, upload throttling, and retry
//! cadence are all asserted without sleeping through real intervals.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use wxstation::app::daemon::{DaemonTiming, NETWORK_LED, StationService, UpdateDaemon};
use wxstation::app::display::{DisplayState, DisplayUnits, NOT_AVAILABLE};
use wxstation::app::events::StationEvent;
use wxstation::devices::{Device, DeviceTiming, OutputController, OutputMode};
use wxstation::error::{SensorError, UploadError};

use crate::mock_hw::{
    MockSensors, MockUplink, RecordingPin, RecordingSink, ScriptedProbe, SharedSink, pleasant_day,
};

// ── Test rig ──────────────────────────────────────────────────

struct Rig {
    service: StationService,
    leds: Arc<OutputController>,
    display: DisplayState,
    sensors: MockSensors,
    uplink: MockUplink,
    probe: ScriptedProbe,
    sink: RecordingSink,
    start: Instant,
}

impl Rig {
    fn with_units(units: DisplayUnits) -> Self {
        let (pin, _state) = RecordingPin::new();
        let leds = Arc::new(OutputController::new(
            "led",
            vec![Device::led(NETWORK_LED, Box::new(pin))],
            DeviceTiming::default(),
        ));
        let display = DisplayState::new();
        let service = StationService::new(
            units,
            DaemonTiming::default(),
            Arc::clone(&leds),
            display.clone(),
        );
        Self {
            service,
            leds,
            display,
            sensors: MockSensors::on_a_pleasant_day(),
            uplink: MockUplink::accepting(),
            probe: ScriptedProbe::always(true),
            sink: RecordingSink::new(),
            start: Instant::now(),
        }
    }

    fn tick_at_ms(&mut self, ms: u64) {
        self.service.tick(
            self.start + Duration::from_millis(ms),
            &mut self.sensors,
            &mut self.uplink,
            &mut self.probe,
            &mut self.sink,
        );
    }
}

fn rig() -> Rig {
    Rig::with_units(DisplayUnits::Imperial)
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn first_tick_samples_uploads_and_publishes() {
    let mut rig = rig();
    rig.tick_at_ms(0);

    assert_eq!(rig.sensors.samples, 1);
    assert_eq!(rig.uplink.uploads, vec![pleasant_day()]);

    let fields = rig.display.snapshot();
    assert_eq!(fields.temperature, "68.00 deg F");
    assert_eq!(fields.pressure, "29.92 in Hg");
    assert_eq!(fields.humidity, "45.00%");
    assert_eq!(fields.uv, "3.20");

    assert!(rig.sink.contains(&StationEvent::SampleTaken(pleasant_day())));
    assert!(rig.sink.contains(&StationEvent::UploadSucceeded));
}

#[test]
fn metric_units_flow_to_display() {
    let mut rig = Rig::with_units(DisplayUnits::Metric);
    rig.tick_at_ms(0);

    let fields = rig.display.snapshot();
    assert_eq!(fields.temperature, "20.00 deg C");
    assert_eq!(fields.pressure, "101.30 kPa");
    assert_eq!(fields.humidity, "45.00%");
    assert_eq!(fields.uv, "3.20");
}

#[test]
fn uploads_throttle_until_remote_interval() {
    let mut rig = rig();
    rig.tick_at_ms(0);
    rig.tick_at_ms(100);
    rig.tick_at_ms(200_000);
    assert_eq!(rig.uplink.uploads.len(), 1, "within the remote interval");

    rig.tick_at_ms(300_000);
    assert_eq!(rig.uplink.uploads.len(), 2, "due again after 300 s");

    // Sampling is tied to due cycles, not the raw tick cadence.
    assert_eq!(rig.sensors.samples, 2);
}

// ── Reachability gating ───────────────────────────────────────

#[test]
fn network_down_gates_the_whole_tick() {
    let mut rig = rig();
    rig.probe = ScriptedProbe::always(false);

    rig.tick_at_ms(0);
    assert_eq!(rig.sensors.samples, 0);
    assert!(rig.uplink.uploads.is_empty());
    assert_eq!(rig.leds.commanded(NETWORK_LED), Ok(OutputMode::Blink));
    assert!(rig.sink.contains(&StationEvent::NetworkDown));
    assert_eq!(rig.display.snapshot().temperature, NOT_AVAILABLE);

    // Within the ping interval the cached verdict is reused.
    rig.tick_at_ms(100);
    rig.tick_at_ms(1_000);
    rig.tick_at_ms(4_900);
    assert_eq!(rig.probe.probes, 1);
    assert_eq!(rig.sensors.samples, 0);
}

#[test]
fn recovery_resumes_uploads_and_clears_led() {
    let mut rig = rig();
    rig.probe = ScriptedProbe::sequence(&[false], true);

    rig.tick_at_ms(0);
    assert_eq!(rig.leds.commanded(NETWORK_LED), Ok(OutputMode::Blink));
    assert!(rig.uplink.uploads.is_empty());

    // Next probe due at 5 s reports the network back.
    rig.tick_at_ms(5_000);
    assert_eq!(rig.leds.commanded(NETWORK_LED), Ok(OutputMode::Off));
    assert!(rig.sink.contains(&StationEvent::NetworkUp));
    assert_eq!(rig.uplink.uploads.len(), 1, "resumed on the same tick");
}

// ── Failure handling ──────────────────────────────────────────

#[test]
fn failed_upload_retries_at_full_cadence() {
    let mut rig = rig();
    rig.uplink = MockUplink::rejecting(UploadError::RequestFailed("invalid key".into()));

    rig.tick_at_ms(0);
    assert_eq!(rig.uplink.uploads.len(), 1);
    assert!(rig.sink.contains(&StationEvent::UploadFailed(
        UploadError::RequestFailed("invalid key".into())
    )));
    // The sample itself succeeded, so the display is fresh regardless.
    assert_eq!(rig.display.snapshot().temperature, "68.00 deg F");

    // Timestamp was not advanced; the very next tick retries.
    rig.tick_at_ms(100);
    assert_eq!(rig.uplink.uploads.len(), 2);

    rig.uplink.next = Ok(());
    rig.tick_at_ms(200);
    assert_eq!(rig.uplink.uploads.len(), 3);

    // A success arms the throttle again.
    rig.tick_at_ms(300);
    assert_eq!(rig.uplink.uploads.len(), 3);
}

#[test]
fn failed_sample_skips_upload_and_preserves_display() {
    let mut rig = rig();
    rig.sensors = MockSensors::failing(SensorError::Bus("i2c timeout".into()));

    rig.tick_at_ms(0);
    assert!(rig.uplink.uploads.is_empty());
    assert!(rig.sink.contains(&StationEvent::SampleFailed(SensorError::Bus(
        "i2c timeout".into()
    ))));
    assert_eq!(rig.display.snapshot().temperature, NOT_AVAILABLE);

    // The sensor heals; the next tick is still due and recovers fully.
    rig.sensors.next = Ok(pleasant_day());
    rig.tick_at_ms(100);
    assert_eq!(rig.uplink.uploads.len(), 1);
    assert_eq!(rig.display.snapshot().temperature, "68.00 deg F");
}

// ── Daemon thread ─────────────────────────────────────────────

#[test]
fn daemon_thread_emits_started_and_stops_cleanly() {
    let (pin, _state) = RecordingPin::new();
    let leds = Arc::new(OutputController::new(
        "led",
        vec![Device::led(NETWORK_LED, Box::new(pin))],
        DeviceTiming::default(),
    ));
    let display = DisplayState::new();
    let service = StationService::new(
        DisplayUnits::Imperial,
        DaemonTiming::default(),
        Arc::clone(&leds),
        display.clone(),
    );

    let sink = SharedSink::new();
    let mut daemon = UpdateDaemon::start(
        service,
        Duration::from_millis(10),
        MockSensors::on_a_pleasant_day(),
        MockUplink::accepting(),
        ScriptedProbe::always(true),
        sink.clone(),
    )
    .unwrap();

    thread::sleep(Duration::from_millis(80));
    daemon.stop();

    let events = sink.events();
    assert_eq!(events.first(), Some(&StationEvent::Started));
    assert!(events.contains(&StationEvent::SampleTaken(pleasant_day())));
    assert!(events.contains(&StationEvent::UploadSucceeded));
    assert_eq!(display.snapshot().temperature, "68.00 deg F");
}
