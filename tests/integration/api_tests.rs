//! Integration tests for the HTTP contract: route → service → response.
//!
//! The server adapter only moves bytes, so these assert on the
//! [`ApiResponse`] values that it would send.

use flowlogger::app::api::{
    self, ApiResponse, Body, CONTENT_CSV, CONTENT_JSON, CONTENT_TEXT, LOG_DISPOSITION,
    MSG_FLOW_CLEARED, MSG_LOG_DELETED, MSG_TIME_SET, Route,
};
use flowlogger::app::ports::LogStorePort;
use flowlogger::config::PRESSURE_CHANNELS;

use super::mock_hw::{MockAdc, RecordingSink, TestService, build_service, pulse, raw_for_volts};

fn get(svc: &mut TestService, uri: &str, now_ms: u64) -> ApiResponse {
    let (path, query) = api::split_uri(uri);
    let route = Route::from_path(path).expect("known route");
    api::handle(svc, route, query, now_ms, &mut RecordingSink::new())
}

fn text(resp: &ApiResponse) -> &str {
    match &resp.body {
        Body::Text(t) => t,
        other => panic!("expected text body, got {:?}", other),
    }
}

fn json(resp: &ApiResponse) -> serde_json::Value {
    assert_eq!(resp.content_type, CONTENT_JSON);
    serde_json::from_str(text(resp)).unwrap()
}

fn fresh() -> TestService {
    let (mut svc, _) = build_service(None);
    svc.start(0, &mut RecordingSink::new());
    svc
}

// ── Telemetry ────────────────────────────────────────────────

#[test]
fn telemetry_samples_the_adc() {
    let mut raw = [0; PRESSURE_CHANNELS];
    raw[0] = raw_for_volts(1.5);
    raw[3] = raw_for_volts(4.5);
    let (mut svc, counters) = build_service(Some(MockAdc::new(raw)));
    svc.start(0, &mut RecordingSink::new());
    pulse(&counters[1], 15);
    svc.poll(1000, &mut RecordingSink::new());

    let resp = get(&mut svc, "/api/sensorwerte", 1200);
    assert_eq!(resp.status, 200);
    let v = json(&resp);

    assert!((v["sensor1"]["druck_MPa"].as_f64().unwrap() - 2.5).abs() < 1e-3);
    assert!((v["sensor1"]["druck_bar"].as_f64().unwrap() - 25.0).abs() < 1e-2);
    assert_eq!(v["sensor1"]["angeschlossen"], true);
    // 0 V: open loop.
    assert_eq!(v["sensor2"]["angeschlossen"], false);
    assert_eq!(v["sensor4"]["angeschlossen"], true);
    assert!((v["flow2"]["rate"].as_f64().unwrap() - 2.0).abs() < 1e-9);
    assert_eq!(v["flow1"]["total"], 0.0);
    assert_eq!(v["recording"], false);
}

#[test]
fn telemetry_without_adc_reports_disconnected() {
    let mut svc = fresh();
    let v = json(&get(&mut svc, "/api/sensorwerte", 0));
    for key in ["sensor1", "sensor2", "sensor3", "sensor4"] {
        assert_eq!(v[key]["angeschlossen"], false);
        assert_eq!(v[key]["druck_MPa"], 0.0);
    }
}

// ── Time ─────────────────────────────────────────────────────

#[test]
fn get_time_at_boot() {
    let mut svc = fresh();
    let resp = get(&mut svc, "/getTime", 0);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type, CONTENT_TEXT);
    assert_eq!(text(&resp), "01.01.1970 01:00:00 CET");
}

#[test]
fn set_time_then_get_time() {
    let mut svc = fresh();
    // 15.01.2024 13:00:00 local winter time.
    let local = 1_705_320_000 + 3600;
    let resp = get(&mut svc, &format!("/setTime?timestamp={}", local), 5000);
    assert_eq!(resp.status, 200);
    assert_eq!(text(&resp), MSG_TIME_SET);

    let resp = get(&mut svc, "/getTime", 65_000);
    assert_eq!(text(&resp), "15.01.2024 13:01:00 CET");
}

#[test]
fn set_time_rejections_leave_clock_alone() {
    let mut svc = fresh();
    for uri in [
        "/setTime",
        "/setTime?ts=5",
        "/setTime?timestamp=",
        "/setTime?timestamp=12x",
        "/setTime?timestamp=-1",
        "/setTime?timestamp=253402300800",
    ] {
        let resp = get(&mut svc, uri, 0);
        assert_eq!(resp.status, 400, "{}", uri);
        assert_eq!(resp.content_type, CONTENT_TEXT);
    }
    assert_eq!(text(&get(&mut svc, "/getTime", 0)), "01.01.1970 01:00:00 CET");
}

// ── Recording and log ────────────────────────────────────────

#[test]
fn toggle_recording_reports_new_state() {
    let mut svc = fresh();
    let v = json(&get(&mut svc, "/toggleRecording", 0));
    assert_eq!(v["recording"], true);
    let v = json(&get(&mut svc, "/toggleRecording", 0));
    assert_eq!(v["recording"], false);
}

#[test]
fn download_missing_log_is_404() {
    let mut svc = fresh();
    let resp = get(&mut svc, "/downloadlog", 0);
    assert_eq!(resp.status, 404);
    assert_eq!(resp.content_disposition, None);
}

#[test]
fn download_describes_the_whole_file() {
    let mut svc = fresh();
    get(&mut svc, "/toggleRecording", 0);
    svc.poll(1000, &mut RecordingSink::new());
    svc.poll(2000, &mut RecordingSink::new());

    let resp = get(&mut svc, "/downloadlog", 2100);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type, CONTENT_CSV);
    assert_eq!(resp.content_disposition, Some(LOG_DISPOSITION));

    let Body::LogFile { len } = resp.body else {
        panic!("expected log body");
    };
    let mut buf = vec![0u8; len as usize];
    let n = svc.store().read_at(0, &mut buf).unwrap();
    assert_eq!(n as u64, len);
    let content = String::from_utf8(buf).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.starts_with("01.01.1970 01:00:01 CET,"));
}

#[test]
fn delete_log_then_download_is_404() {
    let mut svc = fresh();
    get(&mut svc, "/toggleRecording", 0);
    svc.poll(1000, &mut RecordingSink::new());

    let resp = get(&mut svc, "/deleteLog", 1100);
    assert_eq!(resp.status, 200);
    assert_eq!(text(&resp), MSG_LOG_DELETED);
    assert_eq!(get(&mut svc, "/downloadlog", 1200).status, 404);

    // Deleting again is still a success.
    assert_eq!(get(&mut svc, "/deleteLog", 1300).status, 200);
}

#[test]
fn clear_cumulative_flow() {
    let (mut svc, counters) = build_service(None);
    svc.start(0, &mut RecordingSink::new());
    pulse(&counters[0], 588);
    svc.poll(1000, &mut RecordingSink::new());

    let resp = get(&mut svc, "/clearCumulativeFlow", 1100);
    assert_eq!(text(&resp), MSG_FLOW_CLEARED);

    let v = json(&get(&mut svc, "/api/sensorwerte", 1200));
    assert_eq!(v["flow1"]["total"], 0.0);
    assert!(v["flow1"]["rate"].as_f64().unwrap() > 0.0);
}

// ── Static files ─────────────────────────────────────────────

#[test]
fn static_routes_name_their_files() {
    let mut svc = fresh();
    for (uri, file, content_type) in [
        ("/", "index.html", "text/html"),
        ("/styles.css", "styles.css", "text/css"),
        ("/script.js", "script.js", "application/javascript"),
    ] {
        let resp = get(&mut svc, uri, 0);
        assert_eq!(resp.status, 200);
        assert_eq!(resp.content_type, content_type);
        match resp.body {
            Body::Asset(asset) => assert_eq!(asset.file, file),
            other => panic!("{}: expected asset, got {:?}", uri, other),
        }
    }
}
