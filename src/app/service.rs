//! Application service, the hexagonal core.
//!
//! [`LoggerService`] owns the sensor hub, the civil clock, the recording
//! state and the log store.  It exposes a clean, hardware-agnostic API.
//! All I/O flows through port traits, making the entire service testable
//! with mock adapters.
//!
//! ```text
//!  PressurePort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                   │      LoggerService       │
//!  PulseCounter ──▶ │  rates · clock · record  │ ──▶ LogStorePort
//!                   └──────────────────────────┘
//! ```
//!
//! Within one sample tick the rate update always happens before the row is
//! formatted, so a logged row never carries a stale rate.

use log::{debug, info, warn};

use crate::civil_time::{CENTRAL_EUROPEAN, CivilClock, TimestampString};
use crate::config::LoggerConfig;
use crate::error::{Error, StorageError};
use crate::sensors::SensorHub;

use super::commands::{AppCommand, CommandReply};
use super::csv_log;
use super::events::AppEvent;
use super::ports::{EventSink, LogStorePort, PressurePort};
use super::recording::RecordingState;
use super::telemetry::TelemetrySnapshot;

// ───────────────────────────────────────────────────────────────
// LoggerService
// ───────────────────────────────────────────────────────────────

pub struct LoggerService<A, S> {
    sensors: SensorHub<A>,
    clock: CivilClock,
    recording: RecordingState,
    store: S,
    sample_interval_ms: u64,
    sample_pressure_on_tick: bool,
    next_tick_ms: u64,
    tick_count: u64,
    rows_logged: u64,
    rows_dropped: u64,
}

impl<A: PressurePort, S: LogStorePort> LoggerService<A, S> {
    /// Construct the service.  The clock starts at UTC epoch 0 and
    /// recording starts disarmed.
    ///
    /// Does **not** schedule the first tick; call [`start`](Self::start).
    pub fn new(config: &LoggerConfig, sensors: SensorHub<A>, store: S) -> Self {
        Self {
            sensors,
            clock: CivilClock::new(CENTRAL_EUROPEAN),
            recording: RecordingState::default(),
            store,
            sample_interval_ms: u64::from(config.sample_interval_ms),
            sample_pressure_on_tick: config.sample_pressure_on_tick,
            next_tick_ms: 0,
            tick_count: 0,
            rows_logged: 0,
            rows_dropped: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Anchor the tick grid at `now_ms`; the first tick is one interval
    /// later.
    pub fn start(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        self.next_tick_ms = now_ms + self.sample_interval_ms;
        let pressure_available = self.sensors.pressure_available();
        sink.emit(&AppEvent::Started { pressure_available });
        info!(
            "LoggerService started (interval {} ms, pressure ADC {})",
            self.sample_interval_ms,
            if pressure_available { "present" } else { "absent" }
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run a tick if one is due.  Returns `true` if it did.
    ///
    /// Ticks sit on a fixed grid.  If the loop has fallen a whole interval
    /// or more behind, the grid is re-anchored at `now_ms` instead of
    /// bursting through the missed ticks.
    pub fn poll(&mut self, now_ms: u64, sink: &mut impl EventSink) -> bool {
        if now_ms < self.next_tick_ms {
            return false;
        }
        self.tick(now_ms, sink);

        self.next_tick_ms += self.sample_interval_ms;
        if now_ms >= self.next_tick_ms {
            warn!(
                "tick overrun: {} ms late, re-anchoring",
                now_ms - (self.next_tick_ms - self.sample_interval_ms)
            );
            self.next_tick_ms = now_ms + self.sample_interval_ms;
        }
        true
    }

    /// One sample interval: rate update, then (if armed) one log row.
    pub fn tick(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        self.tick_count += 1;

        let deltas = self.sensors.tick_flow();
        debug!("tick {}: pulse deltas {:?}", self.tick_count, deltas);

        if self.sample_pressure_on_tick {
            self.sample_pressure(sink);
        }

        let snapshot = self.build_snapshot();
        sink.emit(&AppEvent::Telemetry(snapshot));

        if self.recording.is_armed() {
            self.append_log_row(now_ms, &snapshot, sink);
        }
    }

    /// Format and append one row.  Failures drop the row and are reported
    /// through the sink only.
    fn append_log_row(&mut self, now_ms: u64, snapshot: &TelemetrySnapshot, sink: &mut impl EventSink) {
        let timestamp = self.clock.timestamp(now_ms);
        let result = csv_log::format_row(&timestamp, snapshot)
            .and_then(|row| self.store.append_line(&row));

        match result {
            Ok(()) => {
                self.rows_logged += 1;
                sink.emit(&AppEvent::RowLogged);
            }
            Err(e) => {
                self.rows_dropped += 1;
                warn!("log row dropped: {}", e);
                sink.emit(&AppEvent::RowDropped(e));
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Result<CommandReply, Error> {
        match cmd {
            AppCommand::ToggleRecording => {
                let armed = self.recording.toggle(now_ms);
                info!("recording {}", if armed { "armed" } else { "disarmed" });
                sink.emit(&AppEvent::RecordingChanged { armed });
                Ok(CommandReply::Recording(armed))
            }
            AppCommand::ClearCumulativeFlow => {
                self.sensors.flow.clear_totals();
                sink.emit(&AppEvent::FlowCleared);
                Ok(CommandReply::FlowCleared)
            }
            AppCommand::DeleteLog => {
                match self.store.remove() {
                    Ok(()) | Err(StorageError::NotFound) => {}
                    Err(e) => return Err(e.into()),
                }
                sink.emit(&AppEvent::LogDeleted);
                Ok(CommandReply::LogDeleted)
            }
            AppCommand::SetLocalTime(local) => {
                let utc = self.clock.set_from_local(local, now_ms)?;
                info!("clock set: local {} -> utc {}", local, utc);
                sink.emit(&AppEvent::TimeSet { utc });
                Ok(CommandReply::TimeSet(utc))
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Live query: take a fresh pressure sample, then snapshot.
    pub fn telemetry(&mut self, sink: &mut impl EventSink) -> TelemetrySnapshot {
        self.sample_pressure(sink);
        self.build_snapshot()
    }

    /// Snapshot of last-known values.  No I/O.
    pub fn build_snapshot(&self) -> TelemetrySnapshot {
        self.sensors.snapshot(self.recording.is_armed())
    }

    /// Canonical local timestamp for `now_ms` uptime.
    pub fn timestamp(&self, now_ms: u64) -> TimestampString {
        self.clock.timestamp(now_ms)
    }

    pub fn now_utc(&self, now_ms: u64) -> i64 {
        self.clock.now_utc(now_ms)
    }

    pub fn recording(&self) -> RecordingState {
        self.recording
    }

    pub fn sensors(&self) -> &SensorHub<A> {
        &self.sensors
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sample ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn rows_logged(&self) -> u64 {
        self.rows_logged
    }

    pub fn rows_dropped(&self) -> u64 {
        self.rows_dropped
    }

    /// Uptime at which the next tick falls due.
    pub fn next_tick_ms(&self) -> u64 {
        self.next_tick_ms
    }

    // ── Internal ──────────────────────────────────────────────

    fn sample_pressure(&mut self, sink: &mut impl EventSink) {
        if let Err(e) = self.sensors.sample_pressure() {
            sink.emit(&AppEvent::PressureReadFailed(e));
        }
    }
}
