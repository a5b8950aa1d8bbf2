//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LoggerService (domain)
//! ```
//!
//! Driven adapters (ADC, log store, event sinks) implement these traits.
//! The [`LoggerService`](super::service::LoggerService) consumes them via
//! generics, so the domain core never touches hardware or the filesystem
//! directly.  All port errors are typed.

use crate::error::{SensorError, StorageError};

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Pressure ADC port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One single-ended conversion per call.
pub trait PressurePort {
    /// Start a conversion on `channel` (0..4), wait for it and return the
    /// signed raw code.
    fn read_raw(&mut self, channel: u8) -> Result<i16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Log store port (driven adapter: domain ↔ flash filesystem)
// ───────────────────────────────────────────────────────────────

/// The durable, append-only CSV log.
///
/// Implementations open the backing file per call and release it before
/// returning, so a power cut between calls never leaves a handle dangling.
pub trait LogStorePort {
    /// Append `line` plus a line terminator.  The data must be flushed to
    /// the medium before this returns `Ok`.
    fn append_line(&mut self, line: &str) -> Result<(), StorageError>;

    /// Delete the log entirely.  [`StorageError::NotFound`] if it did not
    /// exist.
    fn remove(&mut self) -> Result<(), StorageError>;

    /// Current size in bytes.  [`StorageError::NotFound`] if absent.
    fn size(&self) -> Result<u64, StorageError>;

    /// Copy up to `buf.len()` bytes starting at `offset`.  Returns the
    /// number of bytes copied; `0` means end of log.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize, StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.  Adapters
/// decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
