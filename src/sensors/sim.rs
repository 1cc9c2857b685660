//! Synthetic environment readings for development machines.
//!
//! Drifts sinusoidally around a mild spring day so the display, upload
//! formatting, and web API can all be exercised with no I2C hardware
//! attached.

use std::time::Instant;

use crate::app::Observation;
use crate::app::ports::SensorPort;
use crate::error::SensorError;

const PERIOD_SECS: f64 = 600.0;

const BASE_TEMPERATURE_C: f64 = 20.0;
const BASE_PRESSURE_KPA: f64 = 101.3;
const BASE_HUMIDITY_PCT: f64 = 45.0;
const BASE_UV_INDEX: f64 = 3.2;

pub struct SimulatedSensors {
    started: Instant,
}

impl SimulatedSensors {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    fn observation(&self) -> Observation {
        profile(self.started.elapsed().as_secs_f64())
    }
}

impl Default for SimulatedSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for SimulatedSensors {
    fn read_temperature_c(&mut self) -> Result<f64, SensorError> {
        Ok(self.observation().temperature_c)
    }

    fn read_pressure_kpa(&mut self) -> Result<f64, SensorError> {
        Ok(self.observation().pressure_kpa)
    }

    fn read_humidity_pct(&mut self) -> Result<f64, SensorError> {
        Ok(self.observation().humidity_pct)
    }

    fn read_uv_index(&mut self) -> Result<f64, SensorError> {
        Ok(self.observation().uv_index)
    }

    fn sample(&mut self) -> Result<Observation, SensorError> {
        Ok(self.observation())
    }
}

/// Base conditions drifted over a ten-minute cycle, with each field on
/// its own phase so they do not move in lockstep.
fn profile(elapsed_secs: f64) -> Observation {
    let phase = (elapsed_secs / PERIOD_SECS) * std::f64::consts::TAU;
    Observation {
        temperature_c: BASE_TEMPERATURE_C + 2.5 * phase.sin(),
        pressure_kpa: BASE_PRESSURE_KPA + 0.4 * (phase * 0.5).cos(),
        humidity_pct: BASE_HUMIDITY_PCT + 8.0 * (phase * 0.25).sin(),
        uv_index: (BASE_UV_INDEX + 1.5 * phase.cos()).max(0.0),
    }
}
