//! Output controller lifecycle tests, driven through real worker threads.
//!
//! Timings here are deliberately fast (2 ms ticks) so each test settles
//! in tens of milliseconds while still crossing many tick boundaries.

use std::thread;
use std::time::Duration;

use wxstation::devices::{Device, DeviceTiming, OutputController, OutputMode};

use crate::mock_hw::RecordingPin;

fn fast_timing() -> DeviceTiming {
    DeviceTiming {
        tick_interval: Duration::from_millis(2),
        blink_interval: Duration::from_millis(20),
    }
}

fn settle() {
    thread::sleep(Duration::from_millis(50));
}

// ── Command propagation ───────────────────────────────────────

#[test]
fn commanded_mode_reaches_the_pin() {
    let (pin, state) = RecordingPin::new();
    let controller = OutputController::new(
        "led",
        vec![Device::led("network", Box::new(pin))],
        fast_timing(),
    );
    controller.start().unwrap();

    controller.set("network", OutputMode::On).unwrap();
    settle();
    assert!(state.is_high());

    controller.set("network", OutputMode::Off).unwrap();
    settle();
    assert!(!state.is_high());

    controller.stop();
}

#[test]
fn blink_toggles_while_running() {
    let (pin, state) = RecordingPin::new();
    let controller = OutputController::new(
        "led",
        vec![Device::led("network", Box::new(pin))],
        fast_timing(),
    );
    controller.start().unwrap();
    controller.set("network", OutputMode::Blink).unwrap();

    // 100 ms spans several 20 ms blink half-periods.
    thread::sleep(Duration::from_millis(100));
    controller.stop();

    let writes = state.writes();
    let transitions = writes.windows(2).filter(|w| w[0] != w[1]).count();
    assert!(
        transitions >= 2,
        "expected several blink transitions, saw {transitions} in {writes:?}"
    );
}

// ── Shutdown contract ─────────────────────────────────────────

#[test]
fn stop_resets_outputs_before_returning() {
    let (pin, state) = RecordingPin::new();
    let controller = OutputController::new(
        "led",
        vec![Device::led("network", Box::new(pin))],
        fast_timing(),
    );
    controller.start().unwrap();
    controller.set("network", OutputMode::On).unwrap();
    settle();
    assert!(state.is_high());

    controller.stop();

    // stop() blocks until the worker has exited and reset every output.
    assert!(!state.is_high());
    assert_eq!(controller.commanded("network"), Ok(OutputMode::Off));

    let writes_at_stop = state.write_count();
    settle();
    assert_eq!(
        state.write_count(),
        writes_at_stop,
        "no further writes once stop has returned"
    );
}

#[test]
fn stop_is_idempotent() {
    let (pin, _state) = RecordingPin::new();
    let controller = OutputController::new(
        "led",
        vec![Device::led("network", Box::new(pin))],
        fast_timing(),
    );
    controller.start().unwrap();
    controller.stop();
    controller.stop();
}

#[test]
fn drop_stops_the_worker() {
    let (pin, state) = RecordingPin::new();
    {
        let controller = OutputController::new(
            "led",
            vec![Device::led("network", Box::new(pin))],
            fast_timing(),
        );
        controller.start().unwrap();
        controller.set("network", OutputMode::On).unwrap();
        settle();
        assert!(state.is_high());
    }
    // Drop joined the worker, which drove the pin low on the way out.
    assert!(!state.is_high());
}
