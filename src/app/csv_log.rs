//! CSV row layout for the durable log.
//!
//! One row per logging tick, no header:
//!
//! ```text
//! timestamp, p1_MPa, p1_bar, p2_MPa, p2_bar, p3_MPa, p3_bar, p4_MPa, p4_bar,
//! rate1, rate2, total1, total2
//! ```
//!
//! Every row has the same 13 columns.  When the pressure ADC was not found
//! at boot the eight pressure cells are left empty.  Numbers carry three
//! decimals.

use core::fmt::Write as _;

use crate::error::StorageError;

use super::telemetry::TelemetrySnapshot;

/// Fixed capacity of one formatted row.
pub const ROW_CAPACITY: usize = 256;

pub type CsvRow = heapless::String<ROW_CAPACITY>;

/// Number of comma-separated cells in every row.
pub const COLUMNS: usize = 13;

/// Format one row.  Fails only if the row would not fit [`ROW_CAPACITY`].
pub fn format_row(timestamp: &str, snapshot: &TelemetrySnapshot) -> Result<CsvRow, StorageError> {
    let mut row = CsvRow::new();
    write_row(&mut row, timestamp, snapshot).map_err(|_| StorageError::RowTooLong)?;
    Ok(row)
}

fn write_row(row: &mut CsvRow, timestamp: &str, s: &TelemetrySnapshot) -> core::fmt::Result {
    row.write_str(timestamp)?;

    for p in &s.pressure {
        if s.pressure_available {
            write!(row, ",{:.3},{:.3}", p.pressure_mpa, p.pressure_bar())?;
        } else {
            row.write_str(",,")?;
        }
    }

    let [f1, f2] = &s.flow;
    write!(
        row,
        ",{:.3},{:.3},{:.3},{:.3}",
        f1.rate, f2.rate, f1.total_liters, f2.total_liters
    )
}
