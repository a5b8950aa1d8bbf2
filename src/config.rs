//! System configuration parameters
//!
//! All tunable constants for the flow/pressure logger.  Values are fixed at
//! build time through [`LoggerConfig::default`]; nothing is read from flash
//! at runtime.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Number of pulse-based flow channels.
pub const FLOW_CHANNELS: usize = 2;
/// Number of analog pressure channels (ADS1115 AIN0..AIN3).
pub const PRESSURE_CHANNELS: usize = 4;

/// Core logger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    // --- Flow ---
    /// Volume represented by one pulse, per channel (litres).
    pub liters_per_pulse: [f64; FLOW_CHANNELS],
    /// Divisor turning pulses-per-interval into the reported rate.
    /// YF-style sensors: frequency (Hz) = 7.5 × flow (L/min).
    pub flow_calibration_divisor: f64,

    // --- Pressure ---
    /// ADC full-scale input range (volts) at gain 2/3.
    pub adc_full_scale_volts: f32,
    /// Code span of the signed 16-bit conversion result.
    pub adc_code_span: f32,
    /// Sensor output at zero pressure (volts).
    pub pressure_offset_volts: f32,
    /// Sensor transfer slope (MPa per volt).
    pub pressure_mpa_per_volt: f32,
    /// Lowest voltage considered a connected sensor.
    pub connected_min_volts: f32,
    /// Highest voltage considered a connected sensor.
    pub connected_max_volts: f32,
    /// ADS1115 7-bit I²C address.
    pub adc_i2c_address: u8,
    /// Sample the pressure ADC on every logging tick instead of reusing the
    /// last values taken by a live query.
    pub sample_pressure_on_tick: bool,

    // --- Timing ---
    /// Rate estimation and logging interval (milliseconds).
    pub sample_interval_ms: u32,
    /// Task watchdog timeout (milliseconds).
    pub watchdog_timeout_ms: u32,

    // --- Storage ---
    /// Flash partition holding the log filesystem.
    pub storage_partition_label: heapless::String<16>,
    /// VFS mount point of the data partition.
    pub storage_mount_point: heapless::String<32>,
    /// Absolute path of the CSV log.
    pub log_path: heapless::String<64>,

    // --- Network ---
    /// Soft-AP SSID.
    pub ap_ssid: heapless::String<32>,
    /// Soft-AP WPA2 passphrase.
    pub ap_password: heapless::String<64>,
}

fn hstring<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    let _ = out.push_str(&s[..s.len().min(N)]);
    out
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            // Flow
            liters_per_pulse: [1.0 / 5880.0; FLOW_CHANNELS],
            flow_calibration_divisor: 7.5,

            // Pressure (0.5–4.5 V ratiometric transducer, 0–10 MPa)
            adc_full_scale_volts: 6.144,
            adc_code_span: 32768.0,
            pressure_offset_volts: 0.5,
            pressure_mpa_per_volt: 2.5,
            connected_min_volts: 0.4,
            connected_max_volts: 4.6,
            adc_i2c_address: 0x48,
            sample_pressure_on_tick: false,

            // Timing
            sample_interval_ms: 1000, // 1 Hz
            watchdog_timeout_ms: 10_000,

            // Storage
            storage_partition_label: hstring("spiffs"),
            storage_mount_point: hstring("/spiffs"),
            log_path: hstring("/spiffs/log.csv"),

            // Network
            ap_ssid: hstring("Druck-Durchflusssensor"),
            ap_password: hstring("12345678"),
        }
    }
}

impl LoggerConfig {
    /// Reject values that would make the measurement pipeline meaningless.
    pub fn validate(&self) -> Result<(), Error> {
        if self.liters_per_pulse.iter().any(|&l| !(l > 0.0 && l.is_finite())) {
            return Err(Error::Config("liters_per_pulse must be positive"));
        }
        if !(self.flow_calibration_divisor > 0.0 && self.flow_calibration_divisor.is_finite()) {
            return Err(Error::Config("flow_calibration_divisor must be positive"));
        }
        if !(self.adc_full_scale_volts > 0.0 && self.adc_code_span > 0.0) {
            return Err(Error::Config("ADC scale must be positive"));
        }
        if self.connected_min_volts >= self.connected_max_volts {
            return Err(Error::Config("connected voltage band is inverted"));
        }
        if self.sample_interval_ms == 0 {
            return Err(Error::Config("sample_interval_ms must be non-zero"));
        }
        if self.watchdog_timeout_ms <= self.sample_interval_ms {
            return Err(Error::Config("watchdog must outlast one sample interval"));
        }
        if self.log_path.is_empty() || !self.log_path.starts_with(self.storage_mount_point.as_str()) {
            return Err(Error::Config("log_path must live under storage_mount_point"));
        }
        if self.ap_ssid.is_empty() {
            return Err(Error::Config("ap_ssid must not be empty"));
        }
        if !self.ap_password.is_empty() && self.ap_password.len() < 8 {
            return Err(Error::Config("ap_password must be 8-64 bytes or empty"));
        }
        Ok(())
    }
}
