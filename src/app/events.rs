//! Outbound application events.
//!
//! The [`LoggerService`](super::service::LoggerService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::error::{SensorError, StorageError};

use super::telemetry::TelemetrySnapshot;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started.  Carries the boot-time ADC probe result.
    Started { pressure_available: bool },

    /// Snapshot taken at a sample tick, after the rate update.
    Telemetry(TelemetrySnapshot),

    /// Recording was armed or disarmed.
    RecordingChanged { armed: bool },

    /// A row was appended to the log.
    RowLogged,

    /// A log row could not be written and was discarded.
    RowDropped(StorageError),

    /// The clock was set; carries the stored UTC epoch seconds.
    TimeSet { utc: i64 },

    /// Both cumulative volume totals were zeroed.
    FlowCleared,

    /// The CSV log was removed.
    LogDeleted,

    /// A pressure sampling pass failed; channels kept their last values.
    PressureReadFailed(SensorError),
}
