//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (HTTP client)
//! that the [`LoggerService`](super::service::LoggerService) interprets
//! and acts upon.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Flip the recording state.
    ToggleRecording,

    /// Zero both cumulative volume totals.
    ClearCumulativeFlow,

    /// Remove the CSV log from storage.
    DeleteLog,

    /// Set the clock from a client's local wall-clock epoch seconds.
    SetLocalTime(i64),
}

/// Outcome of a successfully handled [`AppCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandReply {
    /// New recording state after a toggle.
    Recording(bool),
    FlowCleared,
    LogDeleted,
    /// Stored UTC epoch seconds after a time set.
    TimeSet(i64),
}
