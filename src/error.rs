//! Unified error types for the flow logger firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the main
//! loop and the HTTP edge handle failures uniformly.  All variants are
//! `Copy` and allocation-free.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(SensorError),
    /// The durable log store failed.
    Storage(StorageError),
    /// An external request carried bad parameters.
    Request(RequestError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
    /// A response could not be encoded.
    Encode(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Request(e) => write!(f, "request: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Encode(msg) => write!(f, "encode: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The ADC did not acknowledge on the bus.
    AdcNotFound,
    /// An I²C transfer to the ADC failed mid-conversion.
    AdcReadFailed,
    /// The conversion did not complete within the polling budget.
    AdcTimeout,
    /// Channel index outside 0..4.
    InvalidChannel,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcNotFound => write!(f, "ADC not found"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::AdcTimeout => write!(f, "ADC conversion timed out"),
            Self::InvalidChannel => write!(f, "invalid ADC channel"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Filesystem could not be mounted at boot.
    MountFailed,
    /// The log file could not be opened.
    OpenFailed,
    /// A write or flush did not complete.
    WriteFailed,
    /// The log file does not exist.
    NotFound,
    /// A formatted row did not fit its buffer.
    RowTooLong,
    /// Any other I/O failure.
    IoError,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MountFailed => write!(f, "filesystem mount failed"),
            Self::OpenFailed => write!(f, "log open failed"),
            Self::WriteFailed => write!(f, "log write failed"),
            Self::NotFound => write!(f, "log not found"),
            Self::RowTooLong => write!(f, "log row exceeds buffer"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Request errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// The `timestamp` query parameter is absent.
    MissingTimestamp,
    /// The `timestamp` value is not a base-10 integer.
    MalformedTimestamp,
    /// The `timestamp` value is outside the representable calendar.
    TimestampOutOfRange,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTimestamp => write!(f, "missing 'timestamp' parameter"),
            Self::MalformedTimestamp => write!(f, "'timestamp' must be an integer"),
            Self::TimestampOutOfRange => write!(f, "'timestamp' out of range"),
        }
    }
}

impl From<RequestError> for Error {
    fn from(e: RequestError) -> Self {
        Self::Request(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
