//! GPIO output adapters.
//!
//! [`GpioPin`] drives a real Broadcom pin through `rppal` and exists only
//! with the `hardware` feature. [`MemoryPin`] is the stand-in everywhere
//! else and doubles as a probe in tests.

#[cfg(feature = "hardware")]
use rppal::gpio::{Gpio, OutputPin};

use crate::app::ports::OutputPort;

/// A real output pin, claimed from the GPIO character device.
///
/// Claimed low, matching the controller's all-off startup state. On drop
/// the claim is released and the pin reverts to an input; the controller
/// has already written `false` by then, so the line goes low before it
/// stops being driven.
#[cfg(feature = "hardware")]
pub struct GpioPin {
    pin: OutputPin,
}

#[cfg(feature = "hardware")]
impl GpioPin {
    /// Claim a pin by BCM number.
    pub fn open(gpio: &Gpio, bcm: u8) -> rppal::gpio::Result<Self> {
        Ok(Self {
            pin: gpio.get(bcm)?.into_output_low(),
        })
    }
}

#[cfg(feature = "hardware")]
impl OutputPort for GpioPin {
    fn write(&mut self, level: bool) {
        if level {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }
}

/// In-memory pin used on development machines and in tests.
#[derive(Debug, Default)]
pub struct MemoryPin {
    level: bool,
}

impl MemoryPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.level
    }
}

impl OutputPort for MemoryPin {
    fn write(&mut self, level: bool) {
        self.level = level;
    }
}
