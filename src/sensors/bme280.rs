//! BME280 combined temperature / pressure / humidity sensor.
//!
//! Bosch chip on the station I2C bus at the primary address (0x76). The
//! `bme280` crate owns register access and compensation math; this wrapper
//! converts readings to canonical units (deg C, kPa, %RH) and rejects
//! values outside the chip's rated envelope.

use bme280::i2c::BME280;
use rppal::hal::Delay;
use rppal::i2c::I2c;

use crate::error::SensorError;

const PA_PER_KPA: f64 = 1000.0;

// Rated envelope per the datasheet, padded a few degrees so marginal but
// real conditions still pass.
const TEMP_MIN_C: f64 = -45.0;
const TEMP_MAX_C: f64 = 90.0;
const PRESSURE_MIN_KPA: f64 = 20.0;
const PRESSURE_MAX_KPA: f64 = 120.0;
const HUMIDITY_MIN_PCT: f64 = 0.0;
const HUMIDITY_MAX_PCT: f64 = 100.0;

/// One compensated burst read, already in canonical units.
#[derive(Debug, Clone, Copy)]
pub struct AtmosphereReading {
    pub temperature_c: f64,
    pub pressure_kpa: f64,
    pub humidity_pct: f64,
}

pub struct Bme280Sensor {
    driver: BME280<I2c>,
    delay: Delay,
}

impl Bme280Sensor {
    /// Open the chip on the given I2C bus and run its init sequence.
    pub fn open(bus: u8) -> Result<Self, SensorError> {
        let i2c = I2c::with_bus(bus).map_err(SensorError::bus)?;
        let mut driver = BME280::new_primary(i2c);
        let mut delay = Delay::new();
        driver.init(&mut delay).map_err(SensorError::bus)?;
        Ok(Self { driver, delay })
    }

    /// Burst-read all three fields in one bus transaction.
    pub fn measure(&mut self) -> Result<AtmosphereReading, SensorError> {
        let m = self
            .driver
            .measure(&mut self.delay)
            .map_err(SensorError::bus)?;
        Ok(AtmosphereReading {
            temperature_c: bounded(
                f64::from(m.temperature),
                TEMP_MIN_C,
                TEMP_MAX_C,
                "temperature",
            )?,
            pressure_kpa: bounded(
                f64::from(m.pressure) / PA_PER_KPA,
                PRESSURE_MIN_KPA,
                PRESSURE_MAX_KPA,
                "pressure",
            )?,
            humidity_pct: bounded(
                f64::from(m.humidity),
                HUMIDITY_MIN_PCT,
                HUMIDITY_MAX_PCT,
                "humidity",
            )?,
        })
    }
}

fn bounded(value: f64, min: f64, max: f64, field: &'static str) -> Result<f64, SensorError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(SensorError::OutOfRange(field))
    }
}
