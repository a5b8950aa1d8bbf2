//! Analog pressure transducers on the ADS1115.
//!
//! Each channel carries a 0.5–4.5 V ratiometric sensor.  A raw conversion
//! code maps to volts through the ADC's full-scale range, volts map to MPa
//! through a fixed affine transfer, and the channel is classified as
//! connected when the voltage sits inside the plausible band.  Anything
//! outside it means an open or shorted loop.
//!
//! If the ADC was not found at boot the sampler holds `None` and every
//! sampling pass is a no-op; channels keep their last (initially zero,
//! disconnected) values.

use log::warn;

use crate::app::ports::PressurePort;
use crate::config::{LoggerConfig, PRESSURE_CHANNELS};
use crate::error::SensorError;

/// One pressure channel after the latest sampling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PressureChannel {
    /// Converted pressure (MPa).  Only meaningful when `connected`.
    pub pressure_mpa: f32,
    /// Voltage inside the valid band.
    pub connected: bool,
}

impl PressureChannel {
    pub fn pressure_bar(&self) -> f32 {
        self.pressure_mpa * 10.0
    }
}

/// Raw code → volts → MPa, plus connectivity classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureTransfer {
    volts_per_code: f32,
    offset_volts: f32,
    mpa_per_volt: f32,
    min_volts: f32,
    max_volts: f32,
}

impl PressureTransfer {
    pub fn from_config(config: &LoggerConfig) -> Self {
        Self {
            volts_per_code: config.adc_full_scale_volts / config.adc_code_span,
            offset_volts: config.pressure_offset_volts,
            mpa_per_volt: config.pressure_mpa_per_volt,
            min_volts: config.connected_min_volts,
            max_volts: config.connected_max_volts,
        }
    }

    pub fn voltage(&self, raw: i16) -> f32 {
        f32::from(raw) * self.volts_per_code
    }

    /// Classify an already-converted voltage.
    pub fn classify_voltage(&self, volts: f32) -> PressureChannel {
        PressureChannel {
            pressure_mpa: (volts - self.offset_volts) * self.mpa_per_volt,
            connected: (self.min_volts..=self.max_volts).contains(&volts),
        }
    }

    pub fn convert(&self, raw: i16) -> PressureChannel {
        self.classify_voltage(self.voltage(raw))
    }
}

/// Samples all four channels from an optional ADC.
pub struct PressureSampler<A> {
    adc: Option<A>,
    transfer: PressureTransfer,
    channels: [PressureChannel; PRESSURE_CHANNELS],
}

impl<A: PressurePort> PressureSampler<A> {
    /// `adc` is `None` when the device did not answer at boot.  The flag is
    /// sticky: there is no retry.
    pub fn new(adc: Option<A>, transfer: PressureTransfer) -> Self {
        Self {
            adc,
            transfer,
            channels: [PressureChannel::default(); PRESSURE_CHANNELS],
        }
    }

    pub fn is_available(&self) -> bool {
        self.adc.is_some()
    }

    /// Read and convert all channels.
    ///
    /// All four reads must succeed before any channel is overwritten; on a
    /// failed read every channel keeps its previous value.
    pub fn sample_all(&mut self) -> Result<(), SensorError> {
        let Some(adc) = self.adc.as_mut() else {
            return Ok(());
        };

        let mut fresh = [PressureChannel::default(); PRESSURE_CHANNELS];
        for (ch, slot) in fresh.iter_mut().enumerate() {
            match adc.read_raw(ch as u8) {
                Ok(raw) => *slot = self.transfer.convert(raw),
                Err(e) => {
                    warn!("pressure: AIN{} read failed ({}), keeping last values", ch, e);
                    return Err(e);
                }
            }
        }
        self.channels = fresh;
        Ok(())
    }

    pub fn channels(&self) -> [PressureChannel; PRESSURE_CHANNELS] {
        self.channels
    }
}
