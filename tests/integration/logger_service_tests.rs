//! Integration tests for the sampling pipeline:
//! pulse counters → rate estimator → snapshot → CSV row → log store.
//!
//! Uptime is passed in explicitly, so every cadence test is deterministic.

use flowlogger::app::commands::{AppCommand, CommandReply};
use flowlogger::app::csv_log::COLUMNS;
use flowlogger::app::events::AppEvent;
use flowlogger::config::{FLOW_CHANNELS, LoggerConfig, PRESSURE_CHANNELS};
use flowlogger::error::{Error, RequestError, StorageError};
use flowlogger::sensors::flow::PulseCounter;

use super::mock_hw::{
    MemLogStore, MockAdc, RecordingSink, TestService, build_service, build_service_with, pulse,
    raw_for_volts,
};

type Counters = &'static [PulseCounter; FLOW_CHANNELS];

fn started(adc: Option<MockAdc>) -> (TestService, Counters, RecordingSink) {
    let (mut svc, counters) = build_service(adc);
    let mut sink = RecordingSink::new();
    svc.start(0, &mut sink);
    (svc, counters, sink)
}

fn arm(svc: &mut TestService, now_ms: u64, sink: &mut RecordingSink) {
    let reply = svc
        .handle_command(AppCommand::ToggleRecording, now_ms, sink)
        .unwrap();
    assert_eq!(reply, CommandReply::Recording(true));
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn start_reports_adc_presence() {
    let (_, _, sink) = started(Some(MockAdc::new([0; PRESSURE_CHANNELS])));
    assert_eq!(sink.events, vec![AppEvent::Started { pressure_available: true }]);

    let (svc, _, sink) = started(None);
    assert_eq!(sink.events, vec![AppEvent::Started { pressure_available: false }]);
    assert!(!svc.recording().is_armed());
    assert_eq!(svc.next_tick_ms(), 1000);
}

// ── Rate estimation end to end ───────────────────────────────

#[test]
fn hundred_edges_in_one_interval() {
    let (mut svc, counters, mut sink) = started(None);
    pulse(&counters[0], 100);

    assert!(svc.poll(1000, &mut sink));

    let reading = svc.sensors().flow.reading(0).unwrap();
    assert_eq!(reading.pulse_count, 100);
    assert!((reading.rate - 100.0 / 7.5).abs() < 1e-9);
    assert_eq!(reading.total_liters, 100.0 * LoggerConfig::default().liters_per_pulse[0]);
    assert!((reading.total_liters - 100.0 / 5880.0).abs() < 1e-12);

    // Channel 2 saw nothing.
    let other = svc.sensors().flow.reading(1).unwrap();
    assert_eq!(other.rate, 0.0);
    assert_eq!(other.total_liters, 0.0);
}

#[test]
fn quiet_interval_drops_rate_to_zero() {
    let (mut svc, counters, mut sink) = started(None);
    pulse(&counters[1], 15);
    svc.poll(1000, &mut sink);
    assert!((svc.build_snapshot().flow[1].rate - 2.0).abs() < 1e-9);

    svc.poll(2000, &mut sink);
    let snap = svc.build_snapshot();
    assert_eq!(snap.flow[1].rate, 0.0);
    assert_eq!(snap.flow[1].pulse_count, 15);
}

#[test]
fn edges_between_ticks_land_in_exactly_one_interval() {
    let (mut svc, counters, mut sink) = started(None);
    let mut seen = 0.0;
    for (i, n) in [3usize, 0, 17, 1, 40].into_iter().enumerate() {
        pulse(&counters[0], n);
        svc.poll((i as u64 + 1) * 1000, &mut sink);
        seen += svc.build_snapshot().flow[0].rate * 7.5;
    }
    assert!((seen - 61.0).abs() < 1e-9);
}

// ── Cadence ──────────────────────────────────────────────────

#[test]
fn ticks_follow_a_fixed_grid() {
    let (mut svc, _, mut sink) = started(None);

    assert!(!svc.poll(999, &mut sink));
    assert!(svc.poll(1000, &mut sink));
    assert!(!svc.poll(1500, &mut sink));
    // A late tick does not shift the grid.
    assert!(svc.poll(2003, &mut sink));
    assert_eq!(svc.next_tick_ms(), 3000);
    assert!(svc.poll(3000, &mut sink));
    assert_eq!(svc.tick_count(), 3);
}

#[test]
fn grid_reanchors_after_a_long_stall() {
    let (mut svc, _, mut sink) = started(None);
    assert!(svc.poll(1000, &mut sink));

    // Missed the 2000..5000 ticks: one tick, no burst.
    assert!(svc.poll(5500, &mut sink));
    assert_eq!(svc.next_tick_ms(), 6500);
    assert!(!svc.poll(6000, &mut sink));
    assert!(svc.poll(6500, &mut sink));
    assert_eq!(svc.tick_count(), 3);
}

#[test]
fn every_tick_emits_telemetry() {
    let (mut svc, _, mut sink) = started(None);
    for t in [1000, 2000, 3000] {
        svc.poll(t, &mut sink);
    }
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 3);
}

// ── Recording ────────────────────────────────────────────────

#[test]
fn disarmed_ticks_write_nothing() {
    let (mut svc, counters, mut sink) = started(None);
    pulse(&counters[0], 10);
    for t in [1000, 2000, 3000] {
        svc.poll(t, &mut sink);
    }
    assert!(svc.store().data.is_none());
    assert_eq!(svc.rows_logged(), 0);
}

#[test]
fn one_row_per_tick_while_armed() {
    let (mut svc, _, mut sink) = started(None);
    arm(&mut svc, 500, &mut sink);

    for t in [1000, 2000, 3000] {
        svc.poll(t, &mut sink);
    }
    assert_eq!(svc.store().lines().len(), 3);
    assert_eq!(svc.rows_logged(), 3);
    assert_eq!(sink.count(|e| *e == AppEvent::RowLogged), 3);

    // Disarm: further ticks append nothing.
    svc.handle_command(AppCommand::ToggleRecording, 3500, &mut sink)
        .unwrap();
    svc.poll(4000, &mut sink);
    assert_eq!(svc.store().lines().len(), 3);
}

#[test]
fn double_toggle_returns_to_disarmed() {
    let (mut svc, _, mut sink) = started(None);
    arm(&mut svc, 10, &mut sink);
    let reply = svc
        .handle_command(AppCommand::ToggleRecording, 20, &mut sink)
        .unwrap();
    assert_eq!(reply, CommandReply::Recording(false));
    assert!(!svc.recording().is_armed());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RecordingChanged { .. })),
        2
    );
}

#[test]
fn row_carries_rate_of_the_same_tick() {
    let (mut svc, counters, mut sink) = started(None);
    arm(&mut svc, 0, &mut sink);
    pulse(&counters[0], 100);
    svc.poll(1000, &mut sink);

    let lines = svc.store().lines();
    assert_eq!(
        lines[0],
        "01.01.1970 01:00:01 CET,,,,,,,,,13.333,0.000,0.017,0.000"
    );
    assert_eq!(lines[0].split(',').count(), COLUMNS);
}

#[test]
fn rows_use_last_known_pressure_values() {
    let adc = MockAdc::new([raw_for_volts(1.5); PRESSURE_CHANNELS]);
    let reads = adc.reads.clone();
    let (mut svc, _, mut sink) = started(Some(adc));
    arm(&mut svc, 0, &mut sink);

    // Nothing sampled yet: zeros, ADC untouched by the tick.
    svc.poll(1000, &mut sink);
    assert_eq!(reads.get(), 0);

    // A live query samples; the next row reuses those values.
    svc.telemetry(&mut sink);
    assert_eq!(reads.get(), PRESSURE_CHANNELS);
    svc.poll(2000, &mut sink);
    assert_eq!(reads.get(), PRESSURE_CHANNELS);

    let lines = svc.store().lines();
    let first: Vec<&str> = lines[0].split(',').collect();
    let second: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(&first[1..3], &["0.000", "0.000"]);
    assert_eq!(&second[1..3], &["2.500", "25.000"]);
    assert_eq!(second.len(), COLUMNS);
}

#[test]
fn tick_sampling_reads_the_adc_every_interval() {
    let config = LoggerConfig {
        sample_pressure_on_tick: true,
        ..Default::default()
    };
    let adc = MockAdc::new([raw_for_volts(2.5); PRESSURE_CHANNELS]);
    let reads = adc.reads.clone();
    let (mut svc, _) = build_service_with(&config, Some(adc), MemLogStore::default());
    let mut sink = RecordingSink::new();
    svc.start(0, &mut sink);

    svc.poll(1000, &mut sink);
    svc.poll(2000, &mut sink);
    assert_eq!(reads.get(), 2 * PRESSURE_CHANNELS);

    let snap = svc.build_snapshot();
    assert!(snap.pressure.iter().all(|p| p.connected));
    assert!((snap.pressure[0].pressure_mpa - 5.0).abs() < 1e-3);
}

#[test]
fn failed_pressure_read_is_reported_and_keeps_values() {
    let adc = MockAdc::new([raw_for_volts(1.5); PRESSURE_CHANNELS]);
    let fail = adc.fail.clone();
    let (mut svc, _, mut sink) = started(Some(adc));

    let good = svc.telemetry(&mut sink);
    fail.set(true);
    let after = svc.telemetry(&mut sink);

    assert_eq!(after.pressure, good.pressure);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::PressureReadFailed(_))),
        1
    );
}

#[test]
fn store_failure_drops_row_and_keeps_ticking() {
    let (mut svc, _) = build_service_with(&LoggerConfig::default(), None, MemLogStore::failing());
    let mut sink = RecordingSink::new();
    svc.start(0, &mut sink);
    svc.handle_command(AppCommand::ToggleRecording, 0, &mut sink)
        .unwrap();

    assert!(svc.poll(1000, &mut sink));
    assert!(svc.poll(2000, &mut sink));

    assert_eq!(svc.rows_dropped(), 2);
    assert_eq!(svc.rows_logged(), 0);
    assert_eq!(
        sink.count(|e| *e == AppEvent::RowDropped(StorageError::OpenFailed)),
        2
    );
    assert!(svc.recording().is_armed());
}

// ── Flow clear ───────────────────────────────────────────────

#[test]
fn clear_flow_keeps_counts_and_rates() {
    let (mut svc, counters, mut sink) = started(None);
    pulse(&counters[0], 30);
    pulse(&counters[1], 60);
    svc.poll(1000, &mut sink);
    let before = svc.build_snapshot();

    let reply = svc
        .handle_command(AppCommand::ClearCumulativeFlow, 1200, &mut sink)
        .unwrap();
    assert_eq!(reply, CommandReply::FlowCleared);

    let after = svc.build_snapshot();
    for ch in 0..FLOW_CHANNELS {
        assert_eq!(after.flow[ch].total_liters, 0.0);
        assert_eq!(after.flow[ch].pulse_count, before.flow[ch].pulse_count);
        assert_eq!(after.flow[ch].rate, before.flow[ch].rate);
    }

    // Volume restarts from the clear.
    pulse(&counters[0], 5880);
    svc.poll(2000, &mut sink);
    assert!((svc.build_snapshot().flow[0].total_liters - 1.0).abs() < 1e-9);
}

// ── Civil time ───────────────────────────────────────────────

#[test]
fn set_time_drives_row_timestamps() {
    let (mut svc, _, mut sink) = started(None);
    // 15.07.2024 14:00:00 local, i.e. 12:00:00 UTC.
    let local = 1_721_044_800 + 7200;
    let reply = svc
        .handle_command(AppCommand::SetLocalTime(local), 1000, &mut sink)
        .unwrap();
    assert_eq!(reply, CommandReply::TimeSet(1_721_044_800));
    assert!(sink.events.contains(&AppEvent::TimeSet { utc: 1_721_044_800 }));

    arm(&mut svc, 1000, &mut sink);
    svc.poll(1000, &mut sink);
    svc.poll(3000, &mut sink);

    let lines = svc.store().lines();
    assert!(lines[0].starts_with("15.07.2024 14:00:00 CEST,"));
    assert!(lines[1].starts_with("15.07.2024 14:00:02 CEST,"));
}

#[test]
fn out_of_range_time_is_rejected_and_clock_untouched() {
    let (mut svc, _, mut sink) = started(None);
    let before = svc.timestamp(2000);
    let result = svc.handle_command(AppCommand::SetLocalTime(-1), 2000, &mut sink);
    assert_eq!(result, Err(Error::Request(RequestError::TimestampOutOfRange)));
    assert_eq!(svc.timestamp(2000), before);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::TimeSet { .. })), 0);
}

// ── Log deletion ─────────────────────────────────────────────

#[test]
fn delete_log_removes_rows_and_recording_continues() {
    let (mut svc, _, mut sink) = started(None);
    arm(&mut svc, 0, &mut sink);
    svc.poll(1000, &mut sink);
    assert!(svc.store().data.is_some());

    let reply = svc.handle_command(AppCommand::DeleteLog, 1100, &mut sink).unwrap();
    assert_eq!(reply, CommandReply::LogDeleted);
    assert!(svc.store().data.is_none());

    // Still armed: the next tick recreates the file.
    svc.poll(2000, &mut sink);
    assert_eq!(svc.store().lines().len(), 1);
}

#[test]
fn delete_missing_log_succeeds() {
    let (mut svc, _, mut sink) = started(None);
    assert_eq!(
        svc.handle_command(AppCommand::DeleteLog, 0, &mut sink),
        Ok(CommandReply::LogDeleted)
    );
    assert!(sink.events.contains(&AppEvent::LogDeleted));
}
