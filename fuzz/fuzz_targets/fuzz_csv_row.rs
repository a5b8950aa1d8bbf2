//! Fuzz target: CSV row formatting
//!
//! Drives `format_row` with arbitrary timestamps and sensor values and
//! verifies:
//! - No panics, including NaN and infinite readings
//! - A row either fits `ROW_CAPACITY` or is rejected as too long
//! - Every accepted row without commas in its inputs has exactly 13 cells
//!
//! cargo fuzz run fuzz_csv_row

#![no_main]

use flowlogger::app::csv_log::{COLUMNS, ROW_CAPACITY, format_row};
use flowlogger::app::telemetry::TelemetrySnapshot;
use flowlogger::config::{FLOW_CHANNELS, PRESSURE_CHANNELS};
use flowlogger::error::StorageError;
use flowlogger::sensors::flow::FlowReading;
use flowlogger::sensors::pressure::PressureChannel;
use libfuzzer_sys::fuzz_target;

fn f32_at(data: &[u8], i: usize) -> f32 {
    let mut b = [0u8; 4];
    for (k, slot) in b.iter_mut().enumerate() {
        *slot = data.get(i * 4 + k).copied().unwrap_or(0);
    }
    f32::from_le_bytes(b)
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let available = data[0] & 1 == 1;
    let ts_len = usize::from(data[1]).min(data.len() - 2);
    let Ok(timestamp) = std::str::from_utf8(&data[2..2 + ts_len]) else {
        return;
    };
    let values = &data[2 + ts_len..];

    let pressure: [PressureChannel; PRESSURE_CHANNELS] = core::array::from_fn(|i| PressureChannel {
        pressure_mpa: f32_at(values, i),
        connected: true,
    });
    let flow: [FlowReading; FLOW_CHANNELS] = core::array::from_fn(|i| FlowReading {
        pulse_count: 0,
        rate: f64::from(f32_at(values, PRESSURE_CHANNELS + 2 * i)),
        total_liters: f64::from(f32_at(values, PRESSURE_CHANNELS + 2 * i + 1)),
    });
    let snapshot = TelemetrySnapshot {
        pressure,
        pressure_available: available,
        flow,
        recording: true,
    };

    match format_row(timestamp, &snapshot) {
        Ok(row) => {
            assert!(row.len() <= ROW_CAPACITY);
            if !timestamp.contains(',') {
                assert_eq!(row.split(',').count(), COLUMNS);
            }
        }
        Err(e) => assert_eq!(e, StorageError::RowTooLong),
    }
});
