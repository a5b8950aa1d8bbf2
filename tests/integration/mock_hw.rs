//! Mock adapters for integration tests.
//!
//! Scripted ADC, in-memory log store and an event sink that records every
//! emitted event, so tests can assert on the full history without real
//! hardware or a filesystem.

use std::cell::Cell;
use std::rc::Rc;

use flowlogger::app::events::AppEvent;
use flowlogger::app::ports::{EventSink, LogStorePort, PressurePort};
use flowlogger::app::service::LoggerService;
use flowlogger::config::{FLOW_CHANNELS, LoggerConfig, PRESSURE_CHANNELS};
use flowlogger::error::{SensorError, StorageError};
use flowlogger::sensors::SensorHub;
use flowlogger::sensors::flow::{FlowMeter, PulseCounter};
use flowlogger::sensors::pressure::{PressureSampler, PressureTransfer};

// ── MockAdc ───────────────────────────────────────────────────

/// Raw code for `volts` at the ±6.144 V range.
pub fn raw_for_volts(volts: f32) -> i16 {
    (volts / 6.144 * 32768.0).round() as i16
}

pub struct MockAdc {
    pub raw: [i16; PRESSURE_CHANNELS],
    pub fail: Rc<Cell<bool>>,
    pub reads: Rc<Cell<usize>>,
}

#[allow(dead_code)]
impl MockAdc {
    pub fn new(raw: [i16; PRESSURE_CHANNELS]) -> Self {
        Self {
            raw,
            fail: Rc::new(Cell::new(false)),
            reads: Rc::new(Cell::new(0)),
        }
    }
}

impl PressurePort for MockAdc {
    fn read_raw(&mut self, channel: u8) -> Result<i16, SensorError> {
        self.reads.set(self.reads.get() + 1);
        if self.fail.get() {
            return Err(SensorError::AdcReadFailed);
        }
        self.raw
            .get(usize::from(channel))
            .copied()
            .ok_or(SensorError::InvalidChannel)
    }
}

// ── MemLogStore ───────────────────────────────────────────────

/// `data == None` models an absent file.
#[derive(Default)]
pub struct MemLogStore {
    pub data: Option<Vec<u8>>,
    pub fail_appends: bool,
}

#[allow(dead_code)]
impl MemLogStore {
    pub fn failing() -> Self {
        Self {
            data: None,
            fail_appends: true,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.data
            .as_deref()
            .map(|d| {
                String::from_utf8_lossy(d)
                    .lines()
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl LogStorePort for MemLogStore {
    fn append_line(&mut self, line: &str) -> Result<(), StorageError> {
        if self.fail_appends {
            return Err(StorageError::OpenFailed);
        }
        let data = self.data.get_or_insert_with(Vec::new);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        Ok(())
    }

    fn remove(&mut self) -> Result<(), StorageError> {
        self.data.take().map(|_| ()).ok_or(StorageError::NotFound)
    }

    fn size(&self) -> Result<u64, StorageError> {
        self.data
            .as_ref()
            .map(|d| d.len() as u64)
            .ok_or(StorageError::NotFound)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize, StorageError> {
        let data = self.data.as_ref().ok_or(StorageError::NotFound)?;
        let start = (offset as usize).min(data.len());
        let n = (data.len() - start).min(buf.len());
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Service fixture ───────────────────────────────────────────

pub type TestService = LoggerService<MockAdc, MemLogStore>;

/// Fresh counters per test; the global ISR counters are shared between
/// test threads.
pub fn leak_counters() -> &'static [PulseCounter; FLOW_CHANNELS] {
    Box::leak(Box::new([PulseCounter::new(), PulseCounter::new()]))
}

pub fn build_service_with(
    config: &LoggerConfig,
    adc: Option<MockAdc>,
    store: MemLogStore,
) -> (TestService, &'static [PulseCounter; FLOW_CHANNELS]) {
    let counters = leak_counters();
    let hub = SensorHub::new(
        FlowMeter::new(counters, config),
        PressureSampler::new(adc, PressureTransfer::from_config(config)),
    );
    (LoggerService::new(config, hub, store), counters)
}

#[allow(dead_code)]
pub fn build_service(adc: Option<MockAdc>) -> (TestService, &'static [PulseCounter; FLOW_CHANNELS]) {
    build_service_with(&LoggerConfig::default(), adc, MemLogStore::default())
}

pub fn pulse(counter: &PulseCounter, n: usize) {
    for _ in 0..n {
        counter.on_edge();
    }
}
