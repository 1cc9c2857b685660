//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every station event to the tracing
//! stream at a severity matching its weight. A future MQTT or metrics
//! adapter would implement the same trait.

use tracing::{info, warn};

use crate::app::events::StationEvent;
use crate::app::ports::EventSink;

pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &StationEvent) {
        match event {
            StationEvent::Started => info!("station update loop started"),
            StationEvent::NetworkUp => info!("network connection regained"),
            StationEvent::NetworkDown => warn!("network connection lost"),
            StationEvent::SampleTaken(obs) => {
                info!(
                    "environment: {:.2} C, {:.2} kPa, {:.2}% RH, UV {:.2}",
                    obs.temperature_c, obs.pressure_kpa, obs.humidity_pct, obs.uv_index,
                );
            }
            StationEvent::SampleFailed(err) => warn!(%err, "sensor sample failed"),
            StationEvent::UploadSucceeded => info!("snapshot accepted by remote service"),
            StationEvent::UploadFailed(err) => warn!(%err, "snapshot upload failed"),
        }
    }
}
