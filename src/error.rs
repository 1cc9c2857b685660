//! Error types for the station daemon.
//!
//! One focused enum per failure domain rather than a single catch-all: the
//! daemon loop handles each class differently (a bad device command is a
//! caller bug, a sensor or upload failure is retried on the next cycle), so
//! the types keep those policies apart. Startup/wiring paths use `anyhow`
//! on top of these for context chains.

use core::fmt;

use crate::devices::{DeviceClass, OutputMode};

// ---------------------------------------------------------------------------
// Device command errors
// ---------------------------------------------------------------------------

/// Rejected `set` call on an output controller.
///
/// These indicate caller or configuration mistakes, never transient
/// conditions; the controller state is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The device exists but its class does not support the requested mode
    /// (relays are plain switches and cannot blink).
    UnsupportedMode {
        device: String,
        class: DeviceClass,
        mode: OutputMode,
    },
    /// No device with this name was registered at construction.
    UnknownDevice(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedMode {
                device,
                class,
                mode,
            } => {
                write!(f, "mode '{mode}' is not supported by {class} '{device}'")
            }
            Self::UnknownDevice(name) => write!(f, "no device named '{name}'"),
        }
    }
}

impl std::error::Error for CommandError {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// A sensor read failed.
///
/// Always treated as transient: the daemon logs it, skips the cycle, and
/// retries on the next tick with the previous display state intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// The underlying bus transaction or driver call failed.
    Bus(String),
    /// The reading is outside the physically plausible range for the field.
    OutOfRange(&'static str),
}

impl SensorError {
    /// Wrap a driver error (anything `Debug`) as a bus failure.
    pub fn bus<E: fmt::Debug>(err: E) -> Self {
        Self::Bus(format!("{err:?}"))
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(msg) => write!(f, "sensor bus error: {msg}"),
            Self::OutOfRange(field) => write!(f, "{field} reading out of range"),
        }
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Upload errors
// ---------------------------------------------------------------------------

/// A remote upload was rejected or never completed.
///
/// All variants are non-fatal to the daemon: the last-upload timestamp is
/// left untouched and the next tick retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The service rejected the station ID or password.
    Auth,
    /// A snapshot value was unfit to transmit (NaN or infinite).
    Parameter(&'static str),
    /// The request failed in transit or the server answered with anything
    /// other than its success body; carries the server's message when there
    /// is one.
    RequestFailed(String),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth => write!(f, "station ID or password rejected"),
            Self::Parameter(field) => write!(f, "unfit upload parameter: {field}"),
            Self::RequestFailed(msg) => write!(f, "upload request failed: {msg}"),
        }
    }
}

impl std::error::Error for UploadError {}
