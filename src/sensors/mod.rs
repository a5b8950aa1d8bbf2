//! Sensor channels and the aggregating [`SensorHub`].
//!
//! The hub owns the flow meter and the pressure sampler and assembles a
//! [`TelemetrySnapshot`] on demand.  Building a snapshot never triggers
//! I/O: pressure values are whatever the last [`SensorHub::sample_pressure`]
//! left behind.

pub mod flow;
pub mod pressure;

use crate::app::ports::PressurePort;
use crate::app::telemetry::TelemetrySnapshot;
use crate::error::SensorError;
use flow::FlowMeter;
use pressure::PressureSampler;

/// Aggregates all sensor channels.
pub struct SensorHub<A> {
    pub flow: FlowMeter,
    pub pressure: PressureSampler<A>,
}

impl<A: PressurePort> SensorHub<A> {
    /// Construct a new hub.  Pass in pre-built channels (built in main
    /// where peripheral ownership is established).
    pub fn new(flow: FlowMeter, pressure: PressureSampler<A>) -> Self {
        Self { flow, pressure }
    }

    /// Per-interval flow rate update.
    pub fn tick_flow(&mut self) -> [u32; crate::config::FLOW_CHANNELS] {
        self.flow.tick()
    }

    /// One pass over all pressure channels.
    pub fn sample_pressure(&mut self) -> Result<(), SensorError> {
        self.pressure.sample_all()
    }

    pub fn pressure_available(&self) -> bool {
        self.pressure.is_available()
    }

    /// Point-in-time aggregate of every channel plus the recording flag.
    pub fn snapshot(&self, recording: bool) -> TelemetrySnapshot {
        TelemetrySnapshot {
            pressure: self.pressure.channels(),
            pressure_available: self.pressure.is_available(),
            flow: self.flow.readings(),
            recording,
        }
    }
}
