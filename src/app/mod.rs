//! Application core — the update daemon and its collaborator seams.
//!
//! This module contains the coordination logic of the station: the
//! reachability watch, the throttled upload cycle, and the shared display
//! state. All interaction with sensors, pins, the network, and the remote
//! service happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without hardware.

pub mod daemon;
pub mod display;
pub mod events;
pub mod ports;

/// One complete set of canonical-unit readings.
///
/// Overwritten wholesale on each successful sample; fields are never
/// populated individually, so a snapshot is either whole or absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Temperature in degrees Celsius.
    pub temperature_c: f64,
    /// Barometric pressure in kilopascals.
    pub pressure_kpa: f64,
    /// Relative humidity in percent.
    pub humidity_pct: f64,
    /// Normalized UV index.
    pub uv_index: f64,
}
