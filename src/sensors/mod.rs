//! Sensor subsystem: individual drivers and the aggregating
//! [`EnvironmentSensors`] gateway.
//!
//! The gateway owns one driver per chip and produces a complete
//! [`Observation`](crate::app::Observation) per sample. Hardware drivers
//! exist only with the `hardware` feature; [`sim`] is always built and
//! stands in on development machines.

#[cfg(feature = "hardware")]
pub mod bme280;
#[cfg(feature = "hardware")]
pub mod si1145;
pub mod sim;

#[cfg(feature = "hardware")]
use crate::app::Observation;
#[cfg(feature = "hardware")]
use crate::app::ports::SensorPort;
#[cfg(feature = "hardware")]
use crate::error::SensorError;

/// The station's sensor complement on one I2C bus: a BME280 for
/// temperature, pressure, and humidity, and an SI1145 for UV index.
#[cfg(feature = "hardware")]
pub struct EnvironmentSensors {
    atmosphere: bme280::Bme280Sensor,
    uv: si1145::Si1145Uv,
}

#[cfg(feature = "hardware")]
impl EnvironmentSensors {
    /// Open and initialize both chips on the given I2C bus.
    pub fn open(i2c_bus: u8) -> Result<Self, SensorError> {
        Ok(Self {
            atmosphere: bme280::Bme280Sensor::open(i2c_bus)?,
            uv: si1145::Si1145Uv::open(i2c_bus)?,
        })
    }
}

#[cfg(feature = "hardware")]
impl SensorPort for EnvironmentSensors {
    fn read_temperature_c(&mut self) -> Result<f64, SensorError> {
        Ok(self.atmosphere.measure()?.temperature_c)
    }

    fn read_pressure_kpa(&mut self) -> Result<f64, SensorError> {
        Ok(self.atmosphere.measure()?.pressure_kpa)
    }

    fn read_humidity_pct(&mut self) -> Result<f64, SensorError> {
        Ok(self.atmosphere.measure()?.humidity_pct)
    }

    fn read_uv_index(&mut self) -> Result<f64, SensorError> {
        self.uv.read_uv_index()
    }

    /// One BME280 burst covers three of the four fields, so the combined
    /// sample costs two bus transactions instead of four.
    fn sample(&mut self) -> Result<Observation, SensorError> {
        let atmos = self.atmosphere.measure()?;
        let uv_index = self.uv.read_uv_index()?;
        Ok(Observation {
            temperature_c: atmos.temperature_c,
            pressure_kpa: atmos.pressure_kpa,
            humidity_pct: atmos.humidity_pct,
            uv_index,
        })
    }
}
