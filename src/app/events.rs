//! Outbound daemon events.
//!
//! The [`StationService`](super::daemon::StationService) emits these through
//! the [`EventSink`](super::ports::EventSink) port on every noteworthy
//! transition. Adapters on the other side decide what to do with them —
//! today that is the log sink; tests use a recording sink to assert on
//! daemon behavior without parsing log output.

use crate::app::Observation;
use crate::error::{SensorError, UploadError};

/// Structured events emitted by the update daemon.
#[derive(Debug, Clone, PartialEq)]
pub enum StationEvent {
    /// The daemon loop has started ticking.
    Started,

    /// Reachability transitioned down → up.
    NetworkUp,

    /// Reachability transitioned up → down; sampling and uploads pause.
    NetworkDown,

    /// A full sensor sample was taken (carries the snapshot).
    SampleTaken(Observation),

    /// A sensor read failed; the cycle was skipped.
    SampleFailed(SensorError),

    /// A snapshot was accepted by the remote service.
    UploadSucceeded,

    /// The remote service rejected the snapshot or was unreachable;
    /// the next tick retries.
    UploadFailed(UploadError),
}
