//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the logger: the sample-tick
//! orchestration, the recording state machine, the telemetry snapshot and
//! its JSON/CSV renderings, and the HTTP-independent API semantics.  All
//! interaction with hardware and storage happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod api;
pub mod commands;
pub mod csv_log;
pub mod events;
pub mod ports;
pub mod recording;
pub mod service;
pub mod telemetry;
