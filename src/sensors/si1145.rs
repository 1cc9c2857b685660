//! SI1145 UV index sensor.
//!
//! Silicon Labs chip at I2C address 0x60. Bring-up follows the vendor's
//! autonomous-measurement recipe: reset, HW_KEY handshake, UV coefficient
//! load, channel-list and ADC configuration through parameter RAM, then
//! free-running PS+ALS mode at an 8 ms cadence. After that the UV index is
//! a plain register read with no forced-measurement latency.

use std::thread;
use std::time::Duration;

use rppal::i2c::I2c;

use crate::error::SensorError;

const ADDR: u16 = 0x60;
const PART_ID: u8 = 0x45;
const HW_KEY: u8 = 0x17;

// Registers
const REG_PART_ID: u8 = 0x00;
const REG_INT_CFG: u8 = 0x03;
const REG_IRQ_EN: u8 = 0x04;
const REG_IRQ_MODE1: u8 = 0x05;
const REG_IRQ_MODE2: u8 = 0x06;
const REG_HW_KEY: u8 = 0x07;
const REG_MEAS_RATE0: u8 = 0x08;
const REG_MEAS_RATE1: u8 = 0x09;
const REG_PS_LED21: u8 = 0x0F;
const REG_UCOEF0: u8 = 0x13;
const REG_UCOEF1: u8 = 0x14;
const REG_UCOEF2: u8 = 0x15;
const REG_UCOEF3: u8 = 0x16;
const REG_PARAM_WR: u8 = 0x17;
const REG_COMMAND: u8 = 0x18;
const REG_IRQ_STAT: u8 = 0x21;
const REG_UV_INDEX0: u8 = 0x2C;

// Commands
const CMD_RESET: u8 = 0x01;
const CMD_PSALS_AUTO: u8 = 0x0F;
const CMD_PARAM_SET: u8 = 0xA0;

// Parameter RAM offsets
const PARAM_CHLIST: u8 = 0x01;
const PARAM_PSLED12_SEL: u8 = 0x02;
const PARAM_PS1_ADCMUX: u8 = 0x07;
const PARAM_PS_ADC_COUNTER: u8 = 0x0A;
const PARAM_PS_ADC_GAIN: u8 = 0x0B;
const PARAM_PS_ADC_MISC: u8 = 0x0C;
const PARAM_ALS_IR_ADCMUX: u8 = 0x0E;
const PARAM_ALS_VIS_ADC_COUNTER: u8 = 0x10;
const PARAM_ALS_VIS_ADC_GAIN: u8 = 0x11;
const PARAM_ALS_VIS_ADC_MISC: u8 = 0x12;
const PARAM_ALS_IR_ADC_COUNTER: u8 = 0x1D;
const PARAM_ALS_IR_ADC_GAIN: u8 = 0x1E;
const PARAM_ALS_IR_ADC_MISC: u8 = 0x1F;

// CHLIST: UV | ALS_IR | ALS_VIS | PS1
const CHLIST_CHANNELS: u8 = 0x80 | 0x20 | 0x10 | 0x01;
const ADC_COUNTER_511CLK: u8 = 0x70;
const ADC_MISC_RANGE: u8 = 0x20;
const ADC_MISC_PS_MODE: u8 = 0x04;
const ADC_MISC_VIS_RANGE: u8 = 0x20;
const ADCMUX_SMALL_IR: u8 = 0x00;
const ADCMUX_LARGE_IR: u8 = 0x03;

const SETTLE: Duration = Duration::from_millis(10);

/// The chip reports the index scaled by 100 in a 16-bit register, so a
/// corrupted read can decode to absurd values. Anything past this bound
/// is rejected rather than uploaded.
const UV_INDEX_MAX: f64 = 20.0;

pub struct Si1145Uv {
    bus: I2c,
}

impl Si1145Uv {
    /// Open the chip on the given I2C bus, verify its part ID, and run
    /// the full bring-up sequence.
    pub fn open(bus: u8) -> Result<Self, SensorError> {
        let mut i2c = I2c::with_bus(bus).map_err(SensorError::bus)?;
        i2c.set_slave_address(ADDR).map_err(SensorError::bus)?;
        let mut sensor = Self { bus: i2c };

        let id = sensor.read_reg(REG_PART_ID)?;
        if id != PART_ID {
            return Err(SensorError::Bus(format!(
                "unexpected part id 0x{id:02x} at address 0x{ADDR:02x}"
            )));
        }

        sensor.reset()?;
        sensor.configure()?;
        Ok(sensor)
    }

    /// Current UV index. The register holds the index scaled by 100.
    pub fn read_uv_index(&mut self) -> Result<f64, SensorError> {
        let word = self
            .bus
            .smbus_read_word(REG_UV_INDEX0)
            .map_err(SensorError::bus)?;
        let index = f64::from(word) / 100.0;
        if index > UV_INDEX_MAX {
            return Err(SensorError::OutOfRange("uv"));
        }
        Ok(index)
    }

    /// Soft reset followed by the HW_KEY handshake the datasheet requires
    /// before the chip leaves standby.
    fn reset(&mut self) -> Result<(), SensorError> {
        for reg in [
            REG_MEAS_RATE0,
            REG_MEAS_RATE1,
            REG_IRQ_EN,
            REG_IRQ_MODE1,
            REG_IRQ_MODE2,
            REG_INT_CFG,
        ] {
            self.write_reg(reg, 0x00)?;
        }
        self.write_reg(REG_IRQ_STAT, 0xFF)?;

        self.write_reg(REG_COMMAND, CMD_RESET)?;
        thread::sleep(SETTLE);
        self.write_reg(REG_HW_KEY, HW_KEY)?;
        thread::sleep(SETTLE);
        Ok(())
    }

    fn configure(&mut self) -> Result<(), SensorError> {
        // Default UV index coefficients from the datasheet calibration.
        self.write_reg(REG_UCOEF0, 0x29)?;
        self.write_reg(REG_UCOEF1, 0x89)?;
        self.write_reg(REG_UCOEF2, 0x02)?;
        self.write_reg(REG_UCOEF3, 0x00)?;

        self.write_param(PARAM_CHLIST, CHLIST_CHANNELS)?;
        self.write_reg(REG_INT_CFG, 0x01)?;
        self.write_reg(REG_IRQ_EN, 0x01)?;

        // Proximity channel 1: 20 mA on LED 1, large IR photodiode.
        self.write_reg(REG_PS_LED21, 0x03)?;
        self.write_param(PARAM_PS1_ADCMUX, ADCMUX_LARGE_IR)?;
        self.write_param(PARAM_PSLED12_SEL, 0x01)?;
        self.write_param(PARAM_PS_ADC_GAIN, 0x00)?;
        self.write_param(PARAM_PS_ADC_COUNTER, ADC_COUNTER_511CLK)?;
        self.write_param(PARAM_PS_ADC_MISC, ADC_MISC_RANGE | ADC_MISC_PS_MODE)?;

        // ALS IR channel: small photodiode, high range.
        self.write_param(PARAM_ALS_IR_ADCMUX, ADCMUX_SMALL_IR)?;
        self.write_param(PARAM_ALS_IR_ADC_GAIN, 0x00)?;
        self.write_param(PARAM_ALS_IR_ADC_COUNTER, ADC_COUNTER_511CLK)?;
        self.write_param(PARAM_ALS_IR_ADC_MISC, ADC_MISC_RANGE)?;

        // ALS visible channel: high range.
        self.write_param(PARAM_ALS_VIS_ADC_GAIN, 0x00)?;
        self.write_param(PARAM_ALS_VIS_ADC_COUNTER, ADC_COUNTER_511CLK)?;
        self.write_param(PARAM_ALS_VIS_ADC_MISC, ADC_MISC_VIS_RANGE)?;

        // 255 * 31.25 us = 8 ms autonomous cadence, then free-run.
        self.write_reg(REG_MEAS_RATE0, 0xFF)?;
        self.write_reg(REG_COMMAND, CMD_PSALS_AUTO)
    }

    /// Parameter RAM write: stage the value, then issue PARAM_SET for the
    /// target offset.
    fn write_param(&mut self, param: u8, value: u8) -> Result<(), SensorError> {
        self.write_reg(REG_PARAM_WR, value)?;
        self.write_reg(REG_COMMAND, CMD_PARAM_SET | param)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, SensorError> {
        self.bus.smbus_read_byte(reg).map_err(SensorError::bus)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.bus
            .smbus_write_byte(reg, value)
            .map_err(SensorError::bus)
    }
}
