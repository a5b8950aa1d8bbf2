//! Point-in-time aggregate of every channel plus the recording flag.
//!
//! A [`TelemetrySnapshot`] is built fresh for each live query and each
//! logging tick and is never mutated afterwards.  The JSON document shape
//! is fixed by the browser client:
//!
//! ```text
//! { "sensor1": { "druck_MPa": f, "druck_bar": f, "angeschlossen": b },
//!   ... sensor4,
//!   "flow1": { "rate": f, "total": f },
//!   "flow2": { ... },
//!   "recording": b }
//! ```

use serde::Serialize;

use crate::config::{FLOW_CHANNELS, PRESSURE_CHANNELS};
use crate::sensors::flow::FlowReading;
use crate::sensors::pressure::PressureChannel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    pub pressure: [PressureChannel; PRESSURE_CHANNELS],
    /// Whether the pressure ADC answered at boot.
    pub pressure_available: bool,
    pub flow: [FlowReading; FLOW_CHANNELS],
    pub recording: bool,
}

#[derive(Debug, Serialize)]
struct SensorDoc {
    #[serde(rename = "druck_MPa")]
    druck_mpa: f32,
    druck_bar: f32,
    angeschlossen: bool,
}

impl From<&PressureChannel> for SensorDoc {
    fn from(p: &PressureChannel) -> Self {
        Self {
            druck_mpa: p.pressure_mpa,
            druck_bar: p.pressure_bar(),
            angeschlossen: p.connected,
        }
    }
}

#[derive(Debug, Serialize)]
struct FlowDoc {
    rate: f64,
    total: f64,
}

impl From<&FlowReading> for FlowDoc {
    fn from(f: &FlowReading) -> Self {
        Self {
            rate: f.rate,
            total: f.total_liters,
        }
    }
}

#[derive(Debug, Serialize)]
struct TelemetryDoc {
    sensor1: SensorDoc,
    sensor2: SensorDoc,
    sensor3: SensorDoc,
    sensor4: SensorDoc,
    flow1: FlowDoc,
    flow2: FlowDoc,
    recording: bool,
}

#[derive(Debug, Serialize)]
struct RecordingDoc {
    recording: bool,
}

impl TelemetrySnapshot {
    /// Serialise to the live-query JSON document.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let [s1, s2, s3, s4] = &self.pressure;
        let [f1, f2] = &self.flow;
        serde_json::to_string(&TelemetryDoc {
            sensor1: s1.into(),
            sensor2: s2.into(),
            sensor3: s3.into(),
            sensor4: s4.into(),
            flow1: f1.into(),
            flow2: f2.into(),
            recording: self.recording,
        })
    }
}

/// `{"recording":true}` / `{"recording":false}`.
pub fn recording_json(armed: bool) -> Result<String, serde_json::Error> {
    serde_json::to_string(&RecordingDoc { recording: armed })
}
