//! Flow/pressure logger main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Ads1115        FsLogStore     LogEventSink    UptimeClock     │
//! │  (PressurePort) (LogStorePort) (EventSink)                     │
//! │  EspHttpServer ─▶ app::api     Soft AP                         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            LoggerService (pure logic)                  │    │
//! │  │  rates · pressure · civil time · recording · CSV       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  GPIO ISR ─▶ FLOW_COUNTERS (lock-free AtomicU32 counts)        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_hal::delay::{Delay, FreeRtos};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::prelude::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use flowlogger::adapters::http::create_http_server;
use flowlogger::adapters::log_sink::LogEventSink;
use flowlogger::adapters::log_store::{FsLogStore, mount_spiffs};
use flowlogger::adapters::time::UptimeClock;
use flowlogger::adapters::wifi::{ApCredentials, start_access_point};
use flowlogger::app::service::LoggerService;
use flowlogger::config::LoggerConfig;
use flowlogger::drivers::ads1115::Ads1115;
use flowlogger::drivers::hw_init;
use flowlogger::drivers::watchdog::Watchdog;
use flowlogger::pins;
use flowlogger::sensors::SensorHub;
use flowlogger::sensors::flow::{FLOW_COUNTERS, FlowMeter};
use flowlogger::sensors::pressure::{PressureSampler, PressureTransfer};

/// Main-loop idle between polls.
const LOOP_DELAY_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Flowlogger v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = LoggerConfig::default();
    config.validate()?;
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 2. Storage (fatal on failure) ─────────────────────────
    if let Err(e) = mount_spiffs(&config.storage_partition_label, &config.storage_mount_point) {
        error!("storage: {}", e);
        watchdog.park("storage mount failed");
    }

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;
    let adc = match Ads1115::probe(i2c, Delay::new_default(), config.adc_i2c_address) {
        Ok(adc) => Some(adc),
        Err(e) => {
            warn!("pressure: {}, pressure channels disabled", e);
            None
        }
    };

    hw_init::init_flow_inputs()?;

    // ── 4. Domain service ─────────────────────────────────────
    let hub = SensorHub::new(
        FlowMeter::new(&FLOW_COUNTERS, &config),
        PressureSampler::new(adc, PressureTransfer::from_config(&config)),
    );
    let store = FsLogStore::new(config.log_path.as_str());
    let clock = UptimeClock::new();
    let mut sink = LogEventSink::new();

    let mut service = LoggerService::new(&config, hub, store);
    service.start(clock.uptime_ms(), &mut sink);
    let service = Arc::new(Mutex::new(service));

    // ── 5. Network ────────────────────────────────────────────
    let creds = ApCredentials::new(&config.ap_ssid, &config.ap_password)?;
    let _wifi = start_access_point(peripherals.modem, sysloop, nvs, &creds)?;
    let _server = create_http_server(service.clone(), clock, &config.storage_mount_point)?;

    info!("System ready. Entering main loop.");

    // ── 6. Main loop ──────────────────────────────────────────
    loop {
        match service.lock() {
            Ok(mut svc) => {
                svc.poll(clock.uptime_ms(), &mut sink);
            }
            Err(_) => watchdog.park("service lock poisoned"),
        }

        watchdog.feed();
        FreeRtos::delay_ms(LOOP_DELAY_MS);
    }
}
