//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production).  Every line
//! starts with a short tag so the serial console can be grepped.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                let [f1, f2] = &t.flow;
                debug!(
                    "TELEM | flow1={:.3}L/min ({:.3}L) flow2={:.3}L/min ({:.3}L) | \
                     p=[{:.3} {:.3} {:.3} {:.3}]MPa conn=[{} {} {} {}] | rec={}",
                    f1.rate,
                    f1.total_liters,
                    f2.rate,
                    f2.total_liters,
                    t.pressure[0].pressure_mpa,
                    t.pressure[1].pressure_mpa,
                    t.pressure[2].pressure_mpa,
                    t.pressure[3].pressure_mpa,
                    u8::from(t.pressure[0].connected),
                    u8::from(t.pressure[1].connected),
                    u8::from(t.pressure[2].connected),
                    u8::from(t.pressure[3].connected),
                    t.recording,
                );
            }
            AppEvent::Started { pressure_available } => {
                info!("START | pressure_adc={}", if *pressure_available { "OK" } else { "MISSING" });
            }
            AppEvent::RecordingChanged { armed } => {
                info!("REC | {}", if *armed { "armed" } else { "disarmed" });
            }
            AppEvent::RowLogged => {
                debug!("STORE | row appended");
            }
            AppEvent::RowDropped(e) => {
                warn!("STORE | row dropped: {}", e);
            }
            AppEvent::TimeSet { utc } => {
                info!("TIME | set, utc={}", utc);
            }
            AppEvent::FlowCleared => {
                info!("FLOW | totals cleared");
            }
            AppEvent::LogDeleted => {
                info!("STORE | log deleted");
            }
            AppEvent::PressureReadFailed(e) => {
                warn!("TELEM | pressure read failed: {}", e);
            }
        }
    }
}
