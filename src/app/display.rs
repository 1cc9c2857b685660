//! Shared display state consumed by the web page.
//!
//! A single snapshot cell: the daemon formats each retained observation
//! into presentation strings and publishes them wholesale; the web layer
//! reads a clone. Fields start as `"not available"` and stay that way
//! until the first successful sample.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::app::Observation;
use crate::units;

/// Placeholder shown before the first successful sample.
pub const NOT_AVAILABLE: &str = "not available";

/// Presentation unit system for the display page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnits {
    Imperial,
    Metric,
}

/// The four formatted fields the page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayFields {
    pub temperature: String,
    pub pressure: String,
    pub humidity: String,
    pub uv: String,
}

impl Default for DisplayFields {
    fn default() -> Self {
        Self {
            temperature: NOT_AVAILABLE.to_string(),
            pressure: NOT_AVAILABLE.to_string(),
            humidity: NOT_AVAILABLE.to_string(),
            uv: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Format a snapshot for display. Canonical units are Celsius and kPa;
/// imperial output converts at this boundary only.
pub fn format_fields(obs: &Observation, units: DisplayUnits) -> DisplayFields {
    let (temperature, pressure) = match units {
        DisplayUnits::Imperial => (
            format!("{:.2} deg F", units::celsius_to_fahrenheit(obs.temperature_c)),
            format!("{:.2} in Hg", units::kpa_to_inches_hg(obs.pressure_kpa)),
        ),
        DisplayUnits::Metric => (
            format!("{:.2} deg C", obs.temperature_c),
            format!("{:.2} kPa", obs.pressure_kpa),
        ),
    };
    DisplayFields {
        temperature,
        pressure,
        humidity: format!("{:.2}%", obs.humidity_pct),
        uv: format!("{:.2}", obs.uv_index),
    }
}

/// Process-wide display cell: one writer (the daemon), any number of
/// readers (web handlers).
#[derive(Clone, Default)]
pub struct DisplayState {
    fields: Arc<RwLock<DisplayFields>>,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published fields wholesale.
    pub fn publish(&self, fields: DisplayFields) {
        let mut guard = self
            .fields
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = fields;
    }

    /// Current fields; `"not available"` until the first publish.
    pub fn snapshot(&self) -> DisplayFields {
        self.fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
